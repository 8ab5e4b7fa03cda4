//! Per-feature standardization fit on the training partition.

use serde::Serialize;

/// Standard deviations below this are treated as zero variance.
const MIN_STD: f64 = 10.0 * f64::EPSILON;

/// Per-feature population mean and standard deviation.
///
/// `transform` maps `x` to `(x - mean) / std`; a zero-variance feature
/// is divided by 1 instead, so it becomes `x - mean`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Fit on `rows` (`rows[sample][feature]`).
    ///
    /// # Panics
    ///
    /// Panics if `rows` is empty or the rows differ in length.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        assert!(!rows.is_empty(), "cannot fit a scaler on zero rows");
        let n_features = rows[0].len();
        let n = rows.len() as f64;

        let mut mean = vec![0.0f64; n_features];
        for row in rows {
            assert_eq!(row.len(), n_features, "rows must have equal length");
            for (m, &x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0f64; n_features];
        for row in rows {
            for ((v, &x), &m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m) * (x - m);
            }
        }
        let std = var.into_iter().map(|v| (v / n).sqrt()).collect();

        Self { mean, std }
    }

    /// Standardize `rows` with the fitted statistics.
    ///
    /// # Panics
    ///
    /// Panics if a row's length differs from the fitted feature count.
    #[must_use]
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                assert_eq!(row.len(), self.mean.len(), "feature count mismatch");
                row.iter()
                    .zip(&self.mean)
                    .zip(&self.std)
                    .map(|((&x, &m), &s)| (x - m) / divisor(s))
                    .collect()
            })
            .collect()
    }

    /// Fitted per-feature means.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Fitted per-feature population standard deviations (before the
    /// zero-variance substitution).
    #[must_use]
    pub fn std(&self) -> &[f64] {
        &self.std
    }
}

fn divisor(std: f64) -> f64 {
    if std < MIN_STD { 1.0 } else { std }
}
