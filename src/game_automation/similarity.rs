//! Normalized cross-correlation between two sampled tile patches.
//!
//! Both patches are standardized (mean removed, divided by the population
//! standard deviation) before they are correlated, and the raw correlation
//! is then divided by the product of the standardized norms. Identical
//! patterns score 1.0. A pair matches only when its score is strictly above
//! the threshold.

use super::frame::Patch;

/// Standardize `values` over all channels together. `None` for zero variance.
fn standardize(values: &[f64]) -> Option<Vec<f64>> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std == 0.0 || !std.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| (v - mean) / std).collect())
}

/// Normalized correlation coefficient of two equally sized sample vectors.
///
/// Returns `None` when the score is undefined: empty or mismatched inputs,
/// or a uniform (zero-variance) patch on either side.
pub fn ccoeff_normed(template: &[f64], target: &[f64]) -> Option<f64> {
    if template.is_empty() || template.len() != target.len() {
        return None;
    }
    let template_norm = standardize(template)?;
    let target_norm = standardize(target)?;

    let cross_corr: f64 = target_norm
        .iter()
        .zip(&template_norm)
        .map(|(a, t)| a * t)
        .sum();
    let template_energy: f64 = template_norm.iter().map(|t| t * t).sum();
    let target_energy: f64 = target_norm.iter().map(|a| a * a).sum();
    let norm_factor = (template_energy * target_energy).sqrt();

    let score = cross_corr / norm_factor;
    score.is_finite().then_some(score)
}

/// Thresholded "same tile type" decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityMatcher {
    threshold: f64,
}

impl SimilarityMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn score(&self, template: &Patch, target: &Patch) -> Option<f64> {
        if template.width() != target.width() || template.height() != target.height() {
            return None;
        }
        ccoeff_normed(template.values(), target.values())
    }

    /// An undefined score never matches.
    pub fn accepts(&self, score: Option<f64>) -> bool {
        score.is_some_and(|score| score > self.threshold)
    }

    pub fn is_match(&self, template: &Patch, target: &Patch) -> bool {
        self.accepts(self.score(template, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_automation::frame::Frame;
    use crate::game_automation::grid::SampleRect;
    use image::{Rgb, RgbImage};

    fn pseudo_random(seed: u32, len: usize) -> Vec<f64> {
        let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state % 256) as f64
            })
            .collect()
    }

    fn patch_from_fn(f: impl Fn(u32, u32) -> Rgb<u8>) -> Patch {
        let frame = Frame::new(RgbImage::from_fn(20, 20, f));
        let rect = SampleRect {
            x: 0,
            y: 0,
            width: 20,
            height: 20,
        };
        frame.patch(&rect).unwrap()
    }

    #[test]
    fn test_self_correlation_is_one() {
        let values = pseudo_random(7, 1200);
        let score = ccoeff_normed(&values, &values).unwrap();
        assert!((score - 1.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_score_is_symmetric() {
        let a = pseudo_random(1, 1200);
        let b = pseudo_random(2, 1200);
        assert_eq!(ccoeff_normed(&a, &b), ccoeff_normed(&b, &a));
    }

    #[test]
    fn test_inverted_pattern_scores_minus_one() {
        let a = pseudo_random(3, 300);
        let inverted: Vec<f64> = a.iter().map(|v| 255.0 - v).collect();
        let score = ccoeff_normed(&a, &inverted).unwrap();
        assert!((score + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_brightness_and_contrast_invariance() {
        let a = pseudo_random(4, 300);
        let scaled: Vec<f64> = a.iter().map(|v| v * 0.5 + 40.0).collect();
        let score = ccoeff_normed(&a, &scaled).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_uniform_patch_is_undefined() {
        let flat = vec![128.0; 300];
        let noisy = pseudo_random(5, 300);
        assert_eq!(ccoeff_normed(&flat, &noisy), None);
        assert_eq!(ccoeff_normed(&noisy, &flat), None);
        assert_eq!(ccoeff_normed(&flat, &flat), None);
    }

    #[test]
    fn test_mismatched_lengths_are_undefined() {
        assert_eq!(ccoeff_normed(&[1.0, 2.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(ccoeff_normed(&[], &[]), None);
    }

    #[test]
    fn test_matcher_reflexive_match() {
        let patch = patch_from_fn(|x, y| {
            Rgb([(x * 12) as u8, (y * 12) as u8, ((x * y) % 256) as u8])
        });
        let matcher = SimilarityMatcher::new(0.90);
        let score = matcher.score(&patch, &patch).unwrap();
        assert!((score - 1.0).abs() < 1e-9);
        assert!(matcher.is_match(&patch, &patch));
    }

    #[test]
    fn test_matcher_rejects_uniform_gray_patch() {
        let flat = patch_from_fn(|_, _| Rgb([120, 120, 120]));
        let matcher = SimilarityMatcher::new(0.90);
        assert_eq!(matcher.score(&flat, &flat), None);
        assert!(!matcher.is_match(&flat, &flat));
    }

    #[test]
    fn test_uniform_colored_patch_has_channel_variance() {
        // Statistics span the interleaved channels, so a flat non-gray
        // region still has a defined score.
        let red = patch_from_fn(|_, _| Rgb([200, 10, 10]));
        let matcher = SimilarityMatcher::new(0.90);
        assert!(matcher.is_match(&red, &red));
    }

    #[test]
    fn test_matcher_rejects_different_patterns() {
        let light = Rgb([250, 250, 250]);
        let dark = Rgb([5, 5, 5]);
        let stripes_v = patch_from_fn(|x, _| if x % 4 < 2 { light } else { dark });
        let stripes_h = patch_from_fn(|_, y| if y % 4 < 2 { light } else { dark });
        let matcher = SimilarityMatcher::new(0.90);
        assert!(!matcher.is_match(&stripes_v, &stripes_h));
    }

    #[test]
    fn test_threshold_comparison_is_strict() {
        let patch = patch_from_fn(|x, y| Rgb([(x * 12) as u8, (y * 12) as u8, 0]));
        let score = SimilarityMatcher::new(0.0).score(&patch, &patch).unwrap();
        assert!(!SimilarityMatcher::new(score).is_match(&patch, &patch));
    }

    #[test]
    fn test_accepts_scores_strictly_above_threshold() {
        let matcher = SimilarityMatcher::new(0.90);
        assert!(matcher.accepts(Some(0.95)));
        assert!(!matcher.accepts(Some(0.90)));
        assert!(!matcher.accepts(Some(-1.0)));
        assert!(!matcher.accepts(None));
    }
}
