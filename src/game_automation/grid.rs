//! Grid geometry: maps (row, column) slots to screen pixels.

use super::types::{GRID_COLUMNS, GridPosition, PixelPoint};
use serde::Deserialize;

/// Number of station slots in the board blueprint.
pub const STATION_BLUEPRINT_LEN: usize = 32;

/// Fixed placement of the item grid on the captured screen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridGeometry {
    /// Left edge of column 0 in pixels
    pub x_offset: f64,
    /// Top edge of row 0 in pixels
    pub y_offset: f64,
    pub tile_width: f64,
    pub tile_height: f64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            x_offset: 444.0,
            y_offset: 205.0,
            tile_width: 115.25,
            tile_height: 115.333,
        }
    }
}

impl GridGeometry {
    /// Pixel center of a grid slot. Truncates toward zero.
    pub fn index_to_pixel(&self, pos: GridPosition) -> PixelPoint {
        let x = self.x_offset + self.tile_width * pos.col as f64 + self.tile_width / 2.0;
        let y = self.y_offset + self.tile_height * pos.row as f64 + self.tile_height / 2.0;
        let point = PixelPoint {
            x: x as u32,
            y: y as u32,
        };
        log::trace!("Tile {} converted to pixel coordinates {}", pos, point);
        point
    }

    /// Square sampling window of side `2 * offset` centered on the slot.
    pub fn sample_rect(&self, pos: GridPosition, offset: u32) -> SampleRect {
        let center = self.index_to_pixel(pos);
        SampleRect {
            x: center.x.saturating_sub(offset),
            y: center.y.saturating_sub(offset),
            width: offset * 2,
            height: offset * 2,
        }
    }
}

/// Pixel rectangle, half-open on the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SampleRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &SampleRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// All item positions in row-major order (left to right, top to bottom).
pub fn item_positions(rows: u32) -> Vec<GridPosition> {
    (0..rows)
        .flat_map(|row| (0..GRID_COLUMNS).map(move |col| GridPosition::new(row, col)))
        .collect()
}

/// Station slots in the order they are consumed.
///
/// Rows 6 and 5 hold seven stations each (columns 0..7), rows 4 and 3 hold
/// nine each.
pub fn station_blueprint() -> Vec<GridPosition> {
    let short_rows = [6, 5]
        .into_iter()
        .flat_map(|row| (0..7).map(move |col| GridPosition::new(row, col)));
    let full_rows = [4, 3]
        .into_iter()
        .flat_map(|row| (0..GRID_COLUMNS).map(move |col| GridPosition::new(row, col)));
    short_rows.chain(full_rows).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_to_pixel_defaults() {
        let geometry = GridGeometry::default();
        // 444 + 57.625 = 501.625, 205 + 57.6665 = 262.6665
        assert_eq!(
            geometry.index_to_pixel(GridPosition::new(0, 0)),
            PixelPoint { x: 501, y: 262 }
        );
        // 444 + 115.25 * 8 + 57.625 = 1423.625, 205 + 115.333 * 2 + 57.6665 = 493.3325
        assert_eq!(
            geometry.index_to_pixel(GridPosition::new(2, 8)),
            PixelPoint { x: 1423, y: 493 }
        );
    }

    #[test]
    fn test_index_to_pixel_is_deterministic() {
        let geometry = GridGeometry::default();
        for pos in item_positions(7) {
            assert_eq!(geometry.index_to_pixel(pos), geometry.index_to_pixel(pos));
        }
    }

    #[test]
    fn test_sample_rects_are_disjoint() {
        let geometry = GridGeometry::default();
        let positions = item_positions(7);
        let rects: Vec<SampleRect> = positions
            .iter()
            .map(|p| geometry.sample_rect(*p, 10))
            .collect();

        for (i, a) in rects.iter().enumerate() {
            assert_eq!(a.width, 20);
            assert_eq!(a.height, 20);
            for (j, b) in rects.iter().enumerate().skip(i + 1) {
                assert!(
                    !a.overlaps(b),
                    "{} and {} overlap",
                    positions[i],
                    positions[j]
                );
            }
        }
    }

    #[test]
    fn test_sample_rect_centered_on_pixel() {
        let geometry = GridGeometry::default();
        let rect = geometry.sample_rect(GridPosition::new(0, 0), 10);
        assert_eq!(
            rect,
            SampleRect {
                x: 491,
                y: 252,
                width: 20,
                height: 20,
            }
        );
    }

    #[test]
    fn test_item_positions_row_major() {
        let positions = item_positions(2);
        assert_eq!(positions.len(), 18);
        assert_eq!(positions[0], GridPosition::new(0, 0));
        assert_eq!(positions[8], GridPosition::new(0, 8));
        assert_eq!(positions[9], GridPosition::new(1, 0));
    }

    #[test]
    fn test_station_blueprint_layout() {
        let blueprint = station_blueprint();
        assert_eq!(blueprint.len(), STATION_BLUEPRINT_LEN);
        assert_eq!(blueprint[0], GridPosition::new(6, 0));
        assert_eq!(blueprint[6], GridPosition::new(6, 6));
        assert_eq!(blueprint[7], GridPosition::new(5, 0));
        assert_eq!(blueprint[14], GridPosition::new(4, 0));
        assert_eq!(blueprint[22], GridPosition::new(4, 8));
        assert_eq!(blueprint[23], GridPosition::new(3, 0));
        assert_eq!(blueprint[31], GridPosition::new(3, 8));
    }
}
