//! Mask-guided feature extraction for grayscale lesion images.
//!
//! Turns one (image, mask) pair into a fixed six-element [`FeatureVector`]:
//! region area, region intensity statistics, and image geometry.

mod error;
mod extract;
mod feature;
mod mask;

pub use error::ExtractError;
pub use extract::{extract_features, extract_pair, load_grayscale};
pub use feature::{FEATURE_NAMES, FeatureVector, N_FEATURES};
pub use mask::{ForegroundMask, MASK_THRESHOLD};

/// 8-bit grayscale pixel grid, re-exported so callers need not depend on `image`.
pub use image::GrayImage;
