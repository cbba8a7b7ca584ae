//! Empty-slot detection by exact colour of the tile's center pixel.

use super::frame::Frame;
use super::grid::GridGeometry;
use super::types::GridPosition;
use image::Rgb;

#[derive(Debug, Clone)]
pub struct TileClassifier {
    geometry: GridGeometry,
    empty_colors: Vec<Rgb<u8>>,
}

impl TileClassifier {
    pub fn new(geometry: GridGeometry, empty_colors: &[[u8; 3]]) -> Self {
        Self {
            geometry,
            empty_colors: empty_colors.iter().map(|c| Rgb(*c)).collect(),
        }
    }

    /// True iff the center pixel equals one of the empty-slot colours.
    /// A center outside the frame is never empty.
    pub fn is_empty(&self, frame: &Frame, pos: GridPosition) -> bool {
        let center = self.geometry.index_to_pixel(pos);
        frame
            .pixel(center)
            .is_some_and(|color| self.empty_colors.contains(&color))
    }
}
