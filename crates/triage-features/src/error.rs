//! Error types for feature extraction.

use std::path::PathBuf;

/// Errors from decoding or pairing an image with its mask.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Returned when an image or mask file cannot be opened or decoded.
    #[error("failed to decode {path}")]
    Decode {
        /// Path of the file that failed to decode.
        path: PathBuf,
        /// The underlying decoder error.
        source: image::ImageError,
    },

    /// Returned when the mask grid does not cover the image grid exactly.
    #[error(
        "mask is {mask_width}x{mask_height} but image is {image_width}x{image_height}"
    )]
    DimensionMismatch {
        /// Image width in pixels.
        image_width: u32,
        /// Image height in pixels.
        image_height: u32,
        /// Mask width in pixels.
        mask_width: u32,
        /// Mask height in pixels.
        mask_height: u32,
    },
}
