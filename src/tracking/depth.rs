//! Depth images delivered by the tracking session.

use image::{ImageBuffer, Luma};

/// 16-bit depth samples in millimetres.
pub type DepthPixels = ImageBuffer<Luma<u16>, Vec<u16>>;

/// A single depth image (DEPTH16 layout: one `u16` millimetre value per pixel).
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    pixels: DepthPixels,
}

impl DepthImage {
    pub fn new(pixels: DepthPixels) -> Self {
        Self { pixels }
    }

    /// Wrap raw samples; `None` if `samples` is too short for the dimensions.
    pub fn from_millimeters(width: u32, height: u32, samples: Vec<u16>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, samples).map(Self::new)
    }

    /// Image filled with one depth value.
    pub fn filled(width: u32, height: u32, millimeters: u16) -> Self {
        Self::new(ImageBuffer::from_pixel(width, height, Luma([millimeters])))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &DepthPixels {
        &self.pixels
    }

    /// Depth at a pixel, in millimetres.
    pub fn depth_at(&self, x: u32, y: u32) -> Option<u16> {
        (x < self.width() && y < self.height()).then(|| self.pixels.get_pixel(x, y).0[0])
    }

    /// The samples as bytes, in native byte order, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.pixels.as_raw())
    }
}
