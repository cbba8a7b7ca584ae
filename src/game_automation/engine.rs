//! Single-pass pairing of identical tiles over one captured frame.
//!
//! The worklist starts as every grid position in row-major order. The head
//! is popped; if occupied it is compared against the rest of the worklist in
//! order and the first candidate above threshold wins. Both tiles of a
//! pairing leave the worklist. A head with no partner is dropped for this
//! pass.

use super::classifier::TileClassifier;
use super::config::BotConfig;
use super::error::{AutomationError, AutomationResult};
use super::frame::{Frame, Patch};
use super::grid::{GridGeometry, item_positions};
use super::similarity::SimilarityMatcher;
use super::types::{GridPosition, Pairing};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct MatchingEngine {
    geometry: GridGeometry,
    classifier: TileClassifier,
    matcher: SimilarityMatcher,
    sample_offset: u32,
    positions: Vec<GridPosition>,
}

impl MatchingEngine {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            geometry: config.geometry.clone(),
            classifier: TileClassifier::new(config.geometry.clone(), &config.empty_colors),
            matcher: SimilarityMatcher::new(config.threshold),
            sample_offset: config.sample_offset,
            positions: item_positions(config.rows),
        }
    }

    pub fn positions(&self) -> &[GridPosition] {
        &self.positions
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn classifier(&self) -> &TileClassifier {
        &self.classifier
    }

    /// Ensure every sampling rectangle of the grid lies inside `frame`.
    pub fn check_frame(&self, frame: &Frame) -> AutomationResult<()> {
        let (min_width, min_height) = self
            .positions
            .iter()
            .map(|pos| self.geometry.sample_rect(*pos, self.sample_offset))
            .fold((0, 0), |(w, h), rect| (w.max(rect.right()), h.max(rect.bottom())));

        if frame.width() < min_width || frame.height() < min_height {
            return Err(AutomationError::FrameTooSmall {
                width: frame.width(),
                height: frame.height(),
                min_width,
                min_height,
            });
        }
        Ok(())
    }

    /// Lazily yields pairings so the caller can act on each one as it is found.
    pub fn pass<'a>(&'a self, frame: &'a Frame) -> Pass<'a> {
        Pass {
            engine: self,
            frame,
            worklist: self.positions.iter().copied().collect(),
        }
    }

    /// Run a whole pass and collect its pairings.
    pub fn scan(&self, frame: &Frame) -> Vec<Pairing> {
        self.pass(frame).collect()
    }

    fn patch(&self, frame: &Frame, pos: GridPosition) -> Option<Patch> {
        frame.patch(&self.geometry.sample_rect(pos, self.sample_offset))
    }
}

/// One pass over the grid. Every `next` call shrinks the worklist, so the
/// iterator always ends.
pub struct Pass<'a> {
    engine: &'a MatchingEngine,
    frame: &'a Frame,
    worklist: VecDeque<GridPosition>,
}

impl Pass<'_> {
    /// Index in the worklist of the first tile matching `tile`.
    fn find_match(&self, tile: GridPosition) -> Option<usize> {
        let engine = self.engine;
        if self.worklist.is_empty() {
            log::debug!("No tiles left to match against {}", tile);
            return None;
        }
        let Some(target) = engine.patch(self.frame, tile) else {
            log::debug!("Tile {} has no sample patch in this frame", tile);
            return None;
        };

        for (idx, candidate) in self.worklist.iter().enumerate() {
            if engine.classifier.is_empty(self.frame, *candidate) {
                continue;
            }
            let Some(template) = engine.patch(self.frame, *candidate) else {
                continue;
            };
            let score = engine.matcher.score(&template, &target);
            log::debug!(
                "Correlation coefficient for tiles {} and {}: {:?}",
                tile,
                candidate,
                score
            );
            if engine.matcher.accepts(score) {
                return Some(idx);
            }
        }
        log::debug!("No match found for tile {}", tile);
        None
    }
}

impl Iterator for Pass<'_> {
    type Item = Pairing;

    fn next(&mut self) -> Option<Pairing> {
        while let Some(tile) = self.worklist.pop_front() {
            if self.engine.classifier.is_empty(self.frame, tile) {
                continue;
            }
            if let Some(idx) = self.find_match(tile)
                && let Some(partner) = self.worklist.remove(idx)
            {
                log::info!("Found a match for tile {}: {}", tile, partner);
                return Some(Pairing {
                    anchor: tile,
                    partner,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const EMPTY: Rgb<u8> = Rgb([223, 190, 164]);

    /// Board of the default geometry with every slot painted empty.
    fn empty_board() -> RgbImage {
        RgbImage::from_pixel(1600, 1100, EMPTY)
    }

    /// Paint a 20x20 textured patch over `pos`, keyed by `kind`.
    fn paint_tile(image: &mut RgbImage, pos: GridPosition, kind: u8) {
        let rect = GridGeometry::default().sample_rect(pos, 10);
        for dy in 0..rect.height {
            for dx in 0..rect.width {
                let pixel = match kind {
                    0 => Rgb([(dx * 12) as u8, (dy * 12) as u8, 40]),
                    1 => Rgb([(dy * 12) as u8, 200, (dx * 12) as u8]),
                    2 => {
                        if (dx / 5 + dy / 5) % 2 == 0 {
                            Rgb([10, 10, 200])
                        } else {
                            Rgb([250, 240, 0])
                        }
                    }
                    _ => Rgb([((dx * dy) % 256) as u8, 90, (255 - dx * 10) as u8]),
                };
                image.put_pixel(rect.x + dx, rect.y + dy, pixel);
            }
        }
    }

    fn engine(rows: u32) -> MatchingEngine {
        MatchingEngine::new(&BotConfig {
            rows,
            ..BotConfig::default()
        })
    }

    #[test]
    fn test_single_pair_on_empty_board() {
        let mut image = empty_board();
        paint_tile(&mut image, GridPosition::new(0, 2), 0);
        paint_tile(&mut image, GridPosition::new(2, 7), 0);
        let frame = Frame::new(image);

        let pairings = engine(3).scan(&frame);
        assert_eq!(
            pairings,
            vec![Pairing {
                anchor: GridPosition::new(0, 2),
                partner: GridPosition::new(2, 7),
            }]
        );
    }

    #[test]
    fn test_empty_board_has_no_pairings() {
        let frame = Frame::new(empty_board());
        assert!(engine(3).scan(&frame).is_empty());
    }

    #[test]
    fn test_first_match_wins_in_row_major_order() {
        let mut image = empty_board();
        for pos in [
            GridPosition::new(0, 0),
            GridPosition::new(0, 5),
            GridPosition::new(1, 1),
        ] {
            paint_tile(&mut image, pos, 1);
        }
        let frame = Frame::new(image);

        let pairings = engine(3).scan(&frame);
        assert_eq!(
            pairings,
            vec![Pairing {
                anchor: GridPosition::new(0, 0),
                partner: GridPosition::new(0, 5),
            }]
        );
    }

    #[test]
    fn test_different_kinds_do_not_pair() {
        let mut image = empty_board();
        paint_tile(&mut image, GridPosition::new(0, 0), 0);
        paint_tile(&mut image, GridPosition::new(0, 1), 1);
        paint_tile(&mut image, GridPosition::new(1, 0), 2);
        paint_tile(&mut image, GridPosition::new(1, 1), 3);
        let frame = Frame::new(image);

        assert!(engine(2).scan(&frame).is_empty());
    }

    #[test]
    fn test_positions_never_reused_and_never_empty() {
        let mut image = empty_board();
        let kinds = [0u8, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2];
        let mut occupied = Vec::new();
        for (i, kind) in kinds.iter().enumerate() {
            let pos = GridPosition::new(i as u32 / 9, i as u32 % 9);
            paint_tile(&mut image, pos, *kind);
            occupied.push(pos);
        }
        let frame = Frame::new(image);

        let engine = engine(3);
        let pairings = engine.scan(&frame);
        assert_eq!(pairings.len(), 4);

        let mut seen = Vec::new();
        for pairing in &pairings {
            for pos in [pairing.anchor, pairing.partner] {
                assert!(!engine.classifier().is_empty(&frame, pos));
                assert!(occupied.contains(&pos));
                assert!(!seen.contains(&pos), "{} paired twice", pos);
                seen.push(pos);
            }
        }
    }

    #[test]
    fn test_pass_is_lazy() {
        let mut image = empty_board();
        paint_tile(&mut image, GridPosition::new(0, 0), 2);
        paint_tile(&mut image, GridPosition::new(0, 1), 2);
        paint_tile(&mut image, GridPosition::new(0, 2), 3);
        paint_tile(&mut image, GridPosition::new(0, 3), 3);
        let frame = Frame::new(image);
        let engine = engine(1);

        let mut pass = engine.pass(&frame);
        assert_eq!(
            pass.next().map(|p| p.partner),
            Some(GridPosition::new(0, 1))
        );
        assert_eq!(
            pass.next().map(|p| p.partner),
            Some(GridPosition::new(0, 3))
        );
        assert_eq!(pass.next(), None);
        assert_eq!(pass.next(), None);
    }

    #[test]
    fn test_check_frame_rejects_small_capture() {
        let frame = Frame::new(RgbImage::from_pixel(800, 600, EMPTY));
        let err = engine(3).check_frame(&frame).unwrap_err();
        assert!(matches!(
            err,
            AutomationError::FrameTooSmall { min_width: 1433, min_height: 503, .. }
        ));
        assert!(engine(3).check_frame(&Frame::new(empty_board())).is_ok());
    }
}
