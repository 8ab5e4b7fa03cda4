//! Region statistics over a binarized mask.

use std::path::Path;

use image::{GrayImage, Luma};
use tracing::debug;

use crate::error::ExtractError;
use crate::feature::FeatureVector;
use crate::mask::ForegroundMask;

/// Decode an image file into an 8-bit grayscale grid.
///
/// Gray inputs keep their values (16-bit ones are rescaled to 8 bits).
/// Colour inputs are reduced with BT.601 weights (0.299, 0.587, 0.114) in
/// 14-bit fixed point, the conversion OpenCV applies when loading as
/// grayscale, so intensities match that toolchain. Alpha is ignored.
///
/// # Errors
///
/// Returns [`ExtractError::Decode`] if the file is missing, unreadable, or
/// not a supported image format.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, ExtractError> {
    let decoded = image::open(path).map_err(|e| ExtractError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !decoded.color().has_color() {
        return Ok(decoded.to_luma8());
    }
    let rgb = decoded.to_rgb8();
    Ok(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([bt601_luma(r, g, b)])
    }))
}

const BT601_SHIFT: u32 = 14;

fn bt601_luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 4899 * u32::from(r) + 9617 * u32::from(g) + 1868 * u32::from(b);
    // Weights sum to 1 << 14, so the result never exceeds 255.
    ((weighted + (1 << (BT601_SHIFT - 1))) >> BT601_SHIFT) as u8
}

/// Extract the six region features from an image and its mask.
///
/// The mask is binarized at [`MASK_THRESHOLD`](crate::MASK_THRESHOLD).
/// Intensity mean and standard deviation are population statistics over the
/// image pixels under the foreground; both are exactly `0.0` when the
/// foreground is empty.
///
/// # Errors
///
/// Returns [`ExtractError::DimensionMismatch`] if the grids differ in size.
pub fn extract_features(image: &GrayImage, mask: &GrayImage) -> Result<FeatureVector, ExtractError> {
    if image.dimensions() != mask.dimensions() {
        return Err(ExtractError::DimensionMismatch {
            image_width: image.width(),
            image_height: image.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }

    let foreground = ForegroundMask::from_gray(mask);
    let (area, mean, std) = region_stats(image, &foreground);

    Ok(FeatureVector::new(area, mean, std, image.height(), image.width()))
}

/// Decode both files and extract features, absorbing every failure.
///
/// Returns `None` when either file fails to decode or the grids disagree in
/// size. The decoded grids are dropped before returning.
#[must_use]
pub fn extract_pair(image_path: &Path, mask_path: &Path) -> Option<FeatureVector> {
    let result = load_grayscale(image_path)
        .and_then(|image| load_grayscale(mask_path).map(|mask| (image, mask)))
        .and_then(|(image, mask)| extract_features(&image, &mask));

    match result {
        Ok(features) => Some(features),
        Err(e) => {
            debug!(image = %image_path.display(), error = %e, "sample not extractable");
            None
        }
    }
}

/// Count, mean, and population std of image pixels under the foreground.
fn region_stats(image: &GrayImage, foreground: &ForegroundMask) -> (usize, f64, f64) {
    let roi = || {
        image
            .pixels()
            .zip(foreground.as_flags())
            .filter(|&(_, &fg)| fg)
            .map(|(p, _)| f64::from(p.0[0]))
    };

    let area = foreground.area();
    if area == 0 {
        return (0, 0.0, 0.0);
    }

    let n = area as f64;
    let mean = roi().sum::<f64>() / n;
    let variance = roi().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (area, mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    use super::*;

    fn square_mask(width: u32, height: u32, x0: u32, y0: u32, side: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let inside = x >= x0 && x < x0 + side && y >= y0 && y < y0 + side;
            Luma([if inside { 255 } else { 0 }])
        })
    }

    #[test]
    fn uniform_region_has_zero_std() {
        let image = GrayImage::from_pixel(10, 8, Luma([200]));
        let mask = square_mask(10, 8, 2, 2, 3);
        let fv = extract_features(&image, &mask).unwrap();
        assert_eq!(fv.area(), 9.0);
        assert!((fv.mean_intensity() - 200.0).abs() < 1e-12);
        assert_eq!(fv.std_intensity(), 0.0);
        assert_eq!(fv.height(), 8.0);
        assert_eq!(fv.width(), 10.0);
        assert_eq!(fv.total_pixels(), 80.0);
    }

    #[test]
    fn population_std_over_region_only() {
        // Foreground pixels: 10, 20, 30, 40 -> mean 25, population variance 125.
        let mut image = GrayImage::from_pixel(4, 2, Luma([255]));
        for (x, v) in [10u8, 20, 30, 40].into_iter().enumerate() {
            image.put_pixel(x as u32, 0, Luma([v]));
        }
        let mask = GrayImage::from_fn(4, 2, |_, y| Luma([if y == 0 { 255 } else { 0 }]));
        let fv = extract_features(&image, &mask).unwrap();
        assert_eq!(fv.area(), 4.0);
        assert!((fv.mean_intensity() - 25.0).abs() < 1e-12);
        assert!((fv.std_intensity() - 125.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_foreground_yields_exact_zeros() {
        let image = GrayImage::from_pixel(5, 5, Luma([90]));
        let mask = GrayImage::from_pixel(5, 5, Luma([127]));
        let fv = extract_features(&image, &mask).unwrap();
        assert_eq!(fv.area(), 0.0);
        assert_eq!(fv.mean_intensity(), 0.0);
        assert_eq!(fv.std_intensity(), 0.0);
        assert!(!fv.mean_intensity().is_nan());
    }

    #[test]
    fn area_never_exceeds_total_pixels() {
        let image = GrayImage::from_fn(7, 3, |x, y| Luma([(x * 30 + y) as u8]));
        let mask = GrayImage::from_pixel(7, 3, Luma([255]));
        let fv = extract_features(&image, &mask).unwrap();
        assert_eq!(fv.area(), fv.total_pixels());
        assert_eq!(fv.total_pixels(), fv.height() * fv.width());
    }

    #[test]
    fn dimension_mismatch_error() {
        let image = GrayImage::new(4, 4);
        let mask = GrayImage::new(4, 5);
        let err = extract_features(&image, &mask).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::DimensionMismatch {
                image_height: 4,
                mask_height: 5,
                ..
            }
        ));
    }

    #[test]
    fn extraction_is_bit_reproducible() {
        let image = GrayImage::from_fn(16, 16, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]));
        let mask = square_mask(16, 16, 3, 4, 9);
        let a = extract_features(&image, &mask).unwrap();
        let b = extract_features(&image, &mask).unwrap();
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn extract_pair_reads_png_files() {
        let dir = TempDir::new().unwrap();
        let image_path = dir.path().join("a.png");
        let mask_path = dir.path().join("a_mask.png");
        GrayImage::from_pixel(6, 6, Luma([100])).save(&image_path).unwrap();
        square_mask(6, 6, 0, 0, 2).save(&mask_path).unwrap();

        let fv = extract_pair(&image_path, &mask_path).expect("pair should extract");
        assert_eq!(fv.area(), 4.0);
        assert!((fv.mean_intensity() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn bt601_weights_on_primaries() {
        assert_eq!(bt601_luma(0, 0, 0), 0);
        assert_eq!(bt601_luma(255, 255, 255), 255);
        assert_eq!(bt601_luma(255, 0, 0), 76);
        assert_eq!(bt601_luma(0, 255, 0), 150);
        assert_eq!(bt601_luma(0, 0, 255), 29);
    }

    #[test]
    fn colour_png_is_reduced_with_bt601() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("red.png");
        RgbImage::from_pixel(3, 2, Rgb([255, 0, 0])).save(&path).unwrap();

        let gray = load_grayscale(&path).unwrap();
        assert_eq!(gray.dimensions(), (3, 2));
        // BT.709 would give 54 for pure red.
        assert!(gray.pixels().all(|p| p.0[0] == 76));
    }

    #[test]
    fn gray_png_values_are_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("g.png");
        GrayImage::from_fn(4, 1, |x, _| Luma([(x * 60) as u8])).save(&path).unwrap();
        let gray = load_grayscale(&path).unwrap();
        let values: Vec<u8> = gray.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![0, 60, 120, 180]);
    }

    #[test]
    fn extract_pair_absorbs_decode_failure() {
        let dir = TempDir::new().unwrap();
        let image_path = dir.path().join("b.png");
        let mask_path = dir.path().join("b_mask.png");
        std::fs::write(&image_path, b"not a png").unwrap();
        GrayImage::new(2, 2).save(&mask_path).unwrap();

        assert!(extract_pair(&image_path, &mask_path).is_none());
        assert!(extract_pair(&dir.path().join("missing.png"), &mask_path).is_none());
    }

    #[test]
    fn load_grayscale_missing_file_error() {
        let err = load_grayscale(Path::new("/nonexistent/image.png")).unwrap_err();
        assert!(matches!(err, ExtractError::Decode { .. }));
    }
}
