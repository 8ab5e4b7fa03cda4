use std::fmt;

/// Number of features extracted per sample.
pub const N_FEATURES: usize = 6;

/// Column names, in [`FeatureVector`] order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "area",
    "mean_intensity",
    "std_intensity",
    "height",
    "width",
    "total_pixels",
];

const AREA: usize = 0;
const MEAN_INTENSITY: usize = 1;
const STD_INTENSITY: usize = 2;
const HEIGHT: usize = 3;
const WIDTH: usize = 4;
const TOTAL_PIXELS: usize = 5;

/// Features of one sample: `[area, mean_intensity, std_intensity, height, width, total_pixels]`.
///
/// Produced by [`extract_features`](crate::extract_features), which guarantees
/// `area <= total_pixels` and `total_pixels == height * width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    pub(crate) fn new(
        area: usize,
        mean_intensity: f64,
        std_intensity: f64,
        height: u32,
        width: u32,
    ) -> Self {
        let total_pixels = u64::from(height) * u64::from(width);
        Self([
            area as f64,
            mean_intensity,
            std_intensity,
            f64::from(height),
            f64::from(width),
            total_pixels as f64,
        ])
    }

    /// Wrap precomputed feature values, e.g. rows read back from a features CSV.
    #[must_use]
    pub fn from_array(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    /// Number of foreground mask pixels.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.0[AREA]
    }

    /// Mean image intensity over the foreground region (0 when empty).
    #[must_use]
    pub fn mean_intensity(&self) -> f64 {
        self.0[MEAN_INTENSITY]
    }

    /// Population standard deviation of intensity over the foreground region (0 when empty).
    #[must_use]
    pub fn std_intensity(&self) -> f64 {
        self.0[STD_INTENSITY]
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.0[HEIGHT]
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.0[WIDTH]
    }

    /// `height * width`.
    #[must_use]
    pub fn total_pixels(&self) -> f64 {
        self.0[TOTAL_PIXELS]
    }

    /// Borrow the values in column order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Copy the values into a row for a feature matrix.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "area={} mean={:.3} std={:.3} {}x{}",
            self.area(),
            self.mean_intensity(),
            self.std_intensity(),
            self.height(),
            self.width()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pixels_is_height_times_width() {
        let fv = FeatureVector::new(10, 50.0, 2.0, 30, 40);
        assert_eq!(fv.total_pixels(), 1200.0);
        assert_eq!(fv.height(), 30.0);
        assert_eq!(fv.width(), 40.0);
    }

    #[test]
    fn column_order_matches_names() {
        let fv = FeatureVector::new(7, 1.5, 0.5, 2, 3);
        assert_eq!(fv.as_slice(), &[7.0, 1.5, 0.5, 2.0, 3.0, 6.0]);
        assert_eq!(FEATURE_NAMES[AREA], "area");
        assert_eq!(FEATURE_NAMES[TOTAL_PIXELS], "total_pixels");
    }
}
