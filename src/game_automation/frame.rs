//! Captured screen frames and the pixel patches sampled from them.

use super::grid::SampleRect;
use super::types::PixelPoint;
use image::{Rgb, RgbImage};

/// One complete RGB capture of the device screen. Read-only once built.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Decode a screencap (PNG or JPEG) and drop any alpha channel.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self::new(decoded.to_rgb8()))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, point: PixelPoint) -> Option<Rgb<u8>> {
        self.image.get_pixel_checked(point.x, point.y).copied()
    }

    pub fn contains(&self, rect: &SampleRect) -> bool {
        rect.right() <= self.width() && rect.bottom() <= self.height()
    }

    /// Copy the pixels under `rect` into a flat patch, or `None` if the
    /// rectangle leaves the frame.
    pub fn patch(&self, rect: &SampleRect) -> Option<Patch> {
        if !self.contains(rect) {
            return None;
        }
        let mut values = Vec::with_capacity((rect.width * rect.height * 3) as usize);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let Rgb(channels) = *self.image.get_pixel(x, y);
                values.extend(channels.iter().map(|&c| c as f64));
            }
        }
        Some(Patch {
            width: rect.width,
            height: rect.height,
            values,
        })
    }
}

/// Channel values of a rectangular region, row-major with RGB interleaved.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl Patch {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
