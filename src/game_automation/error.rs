use crate::adb::AdbError;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for the automation loop.
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Rejected bot configuration. Raised before any cycle runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Grid must have at least one row")]
    NoRows,

    #[error("Uses per station tap must be positive")]
    ZeroStationUses,

    #[error(
        "Station capacity {capacity} with {uses} uses per tap leaves no whole tap per station"
    )]
    StationCapacityTooSmall { capacity: u32, uses: u32 },

    #[error(
        "Stations {start}..{end} exceed the {available} slots of the station blueprint"
    )]
    TooManyStations {
        start: usize,
        end: usize,
        available: usize,
    },

    #[error("Similarity threshold {0} must be finite and within (-1.0, 1.0]")]
    InvalidThreshold(f64),

    #[error("Sampling offset must be positive")]
    ZeroSampleOffset,

    #[error("At least one empty-slot colour is required")]
    NoEmptyColors,

    #[error("Invalid grid geometry: {description}")]
    InvalidGeometry { description: String },

    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The error type for a running bot.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Device operation failed: {0}")]
    Device(#[from] AdbError),

    #[error("Failed to decode captured frame: {0}")]
    FrameDecode(#[from] image::ImageError),

    #[error(
        "Captured frame {width}x{height} is too small for the grid (needs at least {min_width}x{min_height})"
    )]
    FrameTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("Failed to save capture to {path:?}: {source}")]
    SaveCapture {
        path: PathBuf,
        source: std::io::Error,
    },
}
