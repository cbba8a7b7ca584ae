//! Static bot configuration.

use super::error::ConfigError;
use super::grid::{GridGeometry, STATION_BLUEPRINT_LEN, station_blueprint};
use super::types::GridPosition;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Number of item rows scanned for merges (columns are fixed at 9)
    pub rows: u32,
    /// Total uses a station provides before it is spent
    pub station_capacity: u32,
    /// Uses consumed by a single station tap
    pub station_uses: u32,
    /// Number of stations to work through
    pub station_count: usize,
    /// Stations already used up, skipped from the front of the blueprint
    pub station_start: usize,
    /// Center-pixel colours that mark an empty slot (exact match)
    pub empty_colors: Vec<[u8; 3]>,
    /// Half the side length of the sampled patch, in pixels
    pub sample_offset: u32,
    /// Similarity score a pair must exceed to merge
    pub threshold: f64,
    /// Pause after each cycle so the game UI can settle
    pub cycle_delay_ms: u64,
    /// Duration of the merge drag gesture
    pub drag_duration_ms: u32,
    pub geometry: GridGeometry,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            station_capacity: 5,
            station_uses: 1,
            station_count: 32,
            station_start: 0,
            empty_colors: vec![[223, 190, 164], [234, 208, 178]],
            sample_offset: 10,
            threshold: 0.90,
            cycle_delay_ms: 300,
            drag_duration_ms: 100,
            geometry: GridGeometry::default(),
        }
    }
}

impl BotConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms)
    }

    /// Station taps available per station (integer division).
    pub fn taps_per_station(&self) -> u32 {
        self.station_capacity
            .checked_div(self.station_uses)
            .unwrap_or(0)
    }

    /// Slice of the station blueprint this run works through, in order.
    pub fn station_positions(&self) -> Result<Vec<GridPosition>, ConfigError> {
        let end = self
            .station_start
            .checked_add(self.station_count)
            .filter(|end| *end <= STATION_BLUEPRINT_LEN)
            .ok_or(ConfigError::TooManyStations {
                start: self.station_start,
                end: self.station_start.saturating_add(self.station_count),
                available: STATION_BLUEPRINT_LEN,
            })?;
        Ok(station_blueprint()[self.station_start..end].to_vec())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if self.station_uses == 0 {
            return Err(ConfigError::ZeroStationUses);
        }
        if self.taps_per_station() == 0 {
            return Err(ConfigError::StationCapacityTooSmall {
                capacity: self.station_capacity,
                uses: self.station_uses,
            });
        }
        self.station_positions()?;
        if !self.threshold.is_finite() || self.threshold <= -1.0 || self.threshold > 1.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.sample_offset == 0 {
            return Err(ConfigError::ZeroSampleOffset);
        }
        if self.empty_colors.is_empty() {
            return Err(ConfigError::NoEmptyColors);
        }
        self.validate_geometry()
    }

    fn validate_geometry(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        let invalid = |description: String| Err(ConfigError::InvalidGeometry { description });

        for (name, size) in [("tile_width", g.tile_width), ("tile_height", g.tile_height)] {
            if !size.is_finite() || size <= 0.0 {
                return invalid(format!("{name} must be positive, got {size}"));
            }
        }
        let offset = self.sample_offset as f64;
        for (name, origin) in [("x_offset", g.x_offset), ("y_offset", g.y_offset)] {
            if !origin.is_finite() || origin < offset {
                return invalid(format!(
                    "{name} {origin} must be at least the sampling offset {offset}"
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = BotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.taps_per_station(), 5);
        assert_eq!(config.station_positions().unwrap().len(), 32);
        assert_eq!(config.cycle_delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_taps_per_station_uses_integer_division() {
        let config = BotConfig {
            station_capacity: 7,
            station_uses: 2,
            ..BotConfig::default()
        };
        assert_eq!(config.taps_per_station(), 3);
    }

    #[test]
    fn test_station_slice_respects_start() {
        let config = BotConfig {
            station_start: 30,
            station_count: 2,
            ..BotConfig::default()
        };
        assert_eq!(
            config.station_positions().unwrap(),
            vec![GridPosition::new(3, 7), GridPosition::new(3, 8)]
        );
    }

    #[test]
    fn test_rejects_too_many_stations() {
        let config = BotConfig {
            station_start: 5,
            station_count: 28,
            ..BotConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyStations { start: 5, end: 33, available: 32 })
        ));
    }

    #[test]
    fn test_rejects_zero_uses_and_small_capacity() {
        let zero_uses = BotConfig {
            station_uses: 0,
            ..BotConfig::default()
        };
        assert!(matches!(zero_uses.validate(), Err(ConfigError::ZeroStationUses)));

        let small = BotConfig {
            station_capacity: 1,
            station_uses: 2,
            ..BotConfig::default()
        };
        assert!(matches!(
            small.validate(),
            Err(ConfigError::StationCapacityTooSmall { capacity: 1, uses: 2 })
        ));
    }

    #[test]
    fn test_rejects_bad_threshold_and_rows() {
        for threshold in [f64::NAN, 1.5, -1.0] {
            let config = BotConfig {
                threshold,
                ..BotConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::InvalidThreshold(_))));
        }
        let no_rows = BotConfig {
            rows: 0,
            ..BotConfig::default()
        };
        assert!(matches!(no_rows.validate(), Err(ConfigError::NoRows)));
    }

    #[test]
    fn test_rejects_geometry_that_clips_samples() {
        let mut config = BotConfig::default();
        config.geometry.x_offset = 5.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("x_offset"));

        let mut config = BotConfig::default();
        config.geometry.tile_height = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_rejects_missing_empty_colors() {
        let config = BotConfig {
            empty_colors: Vec::new(),
            ..BotConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoEmptyColors)));
    }

    #[test]
    fn test_json_partial_override() {
        let path = std::env::temp_dir().join(format!("merge-bot-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{ "rows": 5, "threshold": 0.85, "geometry": {{ "x_offset": 400.0 }} }}"#
        )
        .unwrap();
        drop(file);

        let config = BotConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.rows, 5);
        assert_eq!(config.threshold, 0.85);
        assert_eq!(config.geometry.x_offset, 400.0);
        assert_eq!(config.geometry.y_offset, 205.0);
        assert_eq!(config.station_capacity, 5);
    }

    #[test]
    fn test_json_missing_file_reports_path() {
        let err = BotConfig::from_json_file("/nonexistent/merge-bot.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("merge-bot.json"));
    }
}
