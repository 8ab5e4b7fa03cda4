//! Mask binarization.

use image::GrayImage;

/// Mask pixels strictly above this value are foreground.
pub const MASK_THRESHOLD: u8 = 127;

/// A binarized region-of-interest mask.
///
/// Stored row-major, one flag per pixel.
#[derive(Debug, Clone)]
pub struct ForegroundMask {
    width: u32,
    height: u32,
    foreground: Vec<bool>,
}

impl ForegroundMask {
    /// Binarize a grayscale mask at [`MASK_THRESHOLD`].
    #[must_use]
    pub fn from_gray(mask: &GrayImage) -> Self {
        let foreground = mask.pixels().map(|p| p.0[0] > MASK_THRESHOLD).collect();
        Self {
            width: mask.width(),
            height: mask.height(),
            foreground,
        }
    }

    /// Number of foreground pixels.
    #[must_use]
    pub fn area(&self) -> usize {
        self.foreground.iter().filter(|&&f| f).count()
    }

    /// Mask width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major foreground flags.
    #[must_use]
    pub fn as_flags(&self) -> &[bool] {
        &self.foreground
    }
}
