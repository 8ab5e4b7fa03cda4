//! Confusion matrix, per-class metrics and the text classification report.

use std::fmt;

use crate::error::RfError;

/// Counts of (true class, predicted class) pairs.
///
/// Row `t`, column `p` holds the samples of class `t` predicted as `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

/// One row of a [`ClassificationReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub class: usize,
    /// Share of predictions of this class that were right; 0.0 when never predicted.
    pub precision: f64,
    /// Share of this class that was found; 0.0 when the class is absent.
    pub recall: f64,
    /// 0.0 when precision and recall are both 0.0.
    pub f1: f64,
    /// Samples whose true class is this one.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Tally aligned label slices into an `n_classes x n_classes` matrix.
    ///
    /// # Errors
    ///
    /// - [`RfError::InvalidClassCount`] for `n_classes == 0`.
    /// - [`RfError::EmptyDataset`] for empty slices.
    /// - [`RfError::LabelOutOfRange`] for any label, true or predicted, not below `n_classes`.
    ///
    /// # Panics
    ///
    /// If the slices differ in length.
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        assert_eq!(
            true_labels.len(),
            predicted.len(),
            "true and predicted labels must be aligned"
        );
        match (n_classes, true_labels.len()) {
            (0, _) => return Err(RfError::InvalidClassCount),
            (_, 0) => return Err(RfError::EmptyDataset),
            _ => {}
        }
        let mut counts = vec![vec![0; n_classes]; n_classes];
        for (sample_index, (&actual, &guess)) in true_labels.iter().zip(predicted).enumerate() {
            let label = actual.max(guess);
            if label >= n_classes {
                return Err(RfError::LabelOutOfRange {
                    sample_index,
                    label,
                    n_classes,
                });
            }
            counts[actual][guess] += 1;
        }
        Ok(Self { counts })
    }

    /// Diagonal mass over total mass.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let hits = self.counts.iter().enumerate().map(|(c, row)| row[c]).sum();
        ratio(hits, self.total())
    }

    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let mut metrics = Vec::with_capacity(self.n_classes());
        for (class, row) in self.counts.iter().enumerate() {
            let hits = row[class];
            let support = row.iter().sum();
            let called = self.counts.iter().map(|r| r[class]).sum();
            let precision = ratio(hits, called);
            let recall = ratio(hits, support);
            let denom = precision + recall;
            metrics.push(ClassMetrics {
                class,
                precision,
                recall,
                f1: if denom > 0.0 {
                    2.0 * precision * recall / denom
                } else {
                    0.0
                },
                support,
            });
        }
        metrics
    }

    /// Mean F1 over every declared class; absent classes contribute 0.0.
    #[must_use]
    pub fn macro_f1(&self) -> f64 {
        let f1_sum: f64 = self.class_metrics().iter().map(|m| m.f1).sum();
        f1_sum / self.n_classes() as f64
    }

    /// Build the per-class text report using `class_names` as row labels.
    ///
    /// # Panics
    ///
    /// Panics if `class_names.len() != n_classes`.
    #[must_use]
    pub fn report(&self, class_names: &[&str]) -> ClassificationReport {
        assert_eq!(class_names.len(), self.n_classes(), "one name per class");
        ClassificationReport {
            class_names: class_names.iter().map(|s| (*s).to_string()).collect(),
            metrics: self.class_metrics(),
            accuracy: self.accuracy(),
            total: self.total(),
        }
    }

    /// Display adapter labelling rows and columns with class names.
    ///
    /// # Panics
    ///
    /// Panics if `class_names.len() != n_classes`.
    #[must_use]
    pub fn labeled<'a>(&'a self, class_names: &'a [&'a str]) -> LabeledConfusion<'a> {
        assert_eq!(class_names.len(), self.n_classes(), "one name per class");
        LabeledConfusion {
            matrix: self,
            class_names,
        }
    }

    /// Rows indexed by true class.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.counts.len()
    }

    fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Numbered layout: `t0..` down, `p0..` across.
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: String = (0..self.n_classes())
            .map(|p| format!(" {:>6}", format!("p{p}")))
            .collect();
        writeln!(out, "{:>6}{header}", "")?;
        for (t, row) in self.counts.iter().enumerate() {
            let cells: String = row.iter().map(|n| format!(" {n:>6}")).collect();
            writeln!(out, "{:>6}{cells}", format!("t{t}"))?;
        }
        Ok(())
    }
}

/// A [`ConfusionMatrix`] rendered with class names; see [`ConfusionMatrix::labeled`].
#[derive(Debug)]
pub struct LabeledConfusion<'a> {
    matrix: &'a ConfusionMatrix,
    class_names: &'a [&'a str],
}

impl fmt::Display for LabeledConfusion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .class_names
            .iter()
            .map(|n| n.len())
            .chain(["true\\pred".len()])
            .max()
            .unwrap_or(9);
        write!(f, "{:>width$}", "true\\pred")?;
        for name in self.class_names {
            write!(f, " {name:>width$}")?;
        }
        writeln!(f)?;
        for (name, row) in self.class_names.iter().zip(self.matrix.as_rows()) {
            write!(f, "{name:>width$}")?;
            for val in row {
                write!(f, " {val:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Per-class precision/recall/F1 table with accuracy, macro and
/// support-weighted averages.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    class_names: Vec<String>,
    metrics: Vec<ClassMetrics>,
    accuracy: f64,
    total: usize,
}

impl ClassificationReport {
    /// Per-class rows in class order.
    #[must_use]
    pub fn metrics(&self) -> &[ClassMetrics] {
        &self.metrics
    }

    /// Row labels in class order.
    #[must_use]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Overall accuracy.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Unweighted mean of (precision, recall, f1) over all classes.
    #[must_use]
    pub fn macro_avg(&self) -> (f64, f64, f64) {
        let n = self.metrics.len() as f64;
        let (p, r, f) = self.sums(|_| 1.0);
        (p / n, r / n, f / n)
    }

    /// Support-weighted mean of (precision, recall, f1).
    #[must_use]
    pub fn weighted_avg(&self) -> (f64, f64, f64) {
        if self.total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let n = self.total as f64;
        let (p, r, f) = self.sums(|m| m.support as f64);
        (p / n, r / n, f / n)
    }

    fn sums(&self, weight: impl Fn(&ClassMetrics) -> f64) -> (f64, f64, f64) {
        self.metrics.iter().fold((0.0, 0.0, 0.0), |(p, r, f), m| {
            let w = weight(m);
            (p + w * m.precision, r + w * m.recall, f + w * m.f1)
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = 2usize;
        let width = self
            .class_names
            .iter()
            .map(String::len)
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, m) in self.class_names.iter().zip(&self.metrics) {
            writeln!(
                f,
                "{name:>width$}  {:>9.digits$} {:>9.digits$} {:>9.digits$} {:>9}",
                m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.digits$} {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        for (label, (p, r, f1)) in [
            ("macro avg", self.macro_avg()),
            ("weighted avg", self.weighted_avg()),
        ] {
            writeln!(
                f,
                "{label:>width$}  {p:>9.digits$} {r:>9.digits$} {f1:>9.digits$} {:>9}",
                self.total
            )?;
        }
        Ok(())
    }
}
