//! Dataset assembly from a `benign/` + `malignant/` directory tree.

use std::path::{Path, PathBuf};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{info, instrument, warn};

use triage_features::extract_pair;

use crate::IoError;
use crate::discover::{CategoryScan, SamplePair, scan_category};
use crate::domain::{Condition, Dataset};

/// Builds a [`Dataset`] from image/mask pairs on disk.
///
/// Expected layout:
///
/// ```text
/// root/
///   benign/     foo.png  foo_mask.png  ...
///   malignant/  bar.png  bar_mask.png  ...
/// ```
///
/// Images without a mask and pairs that fail to decode are skipped. A
/// missing or empty category is logged as a warning; the build only fails
/// when no category yields any sample.
pub struct DatasetBuilder {
    root: PathBuf,
}

/// What a build left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Categories that are absent, unreadable, or yielded no valid sample,
    /// in discovery order.
    pub empty_categories: Vec<Condition>,
    /// Images with no `_mask` partner.
    pub missing_masks: usize,
    /// Pairs that failed to decode or disagreed in size.
    pub failed_extractions: usize,
}

impl DatasetBuilder {
    /// Create a builder for the given dataset root.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Discover every pair, extract features, and assemble the dataset.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetBuilder::build_with_summary`].
    pub fn build(&self) -> Result<Dataset, IoError> {
        self.build_with_summary().map(|(dataset, _)| dataset)
    }

    /// Like [`DatasetBuilder::build`], also reporting what was skipped.
    ///
    /// Extraction runs in parallel; the resulting sample order is the
    /// discovery order (benign before malignant, file names sorted).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::NoDataFound`] | Zero valid samples across both categories |
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build_with_summary(&self) -> Result<(Dataset, BuildSummary), IoError> {
        let mut pairs: Vec<SamplePair> = Vec::new();
        let mut summary = BuildSummary::default();

        for condition in Condition::ALL {
            match scan_category(&self.root, condition) {
                CategoryScan::Missing => {
                    warn!(category = %condition, "category folder not found, continuing without it");
                    summary.empty_categories.push(condition);
                }
                CategoryScan::Unreadable(e) => {
                    warn!(category = %condition, error = %e, "category folder unreadable, continuing without it");
                    summary.empty_categories.push(condition);
                }
                CategoryScan::Found {
                    pairs: found,
                    missing_masks,
                } => {
                    summary.missing_masks += missing_masks;
                    pairs.extend(found);
                }
            }
        }

        // Indexed collect keeps discovery order regardless of scheduling.
        let extracted: Vec<_> = pairs
            .par_iter()
            .map(|pair| extract_pair(&pair.image_path, &pair.mask_path))
            .collect();

        let mut dataset = Dataset::default();
        for (pair, features) in pairs.iter().zip(extracted) {
            match features {
                Some(fv) => dataset.push(pair.sample_id(), fv, pair.condition),
                None => summary.failed_extractions += 1,
            }
        }

        for condition in Condition::ALL {
            let listed = summary.empty_categories.contains(&condition);
            if !listed && dataset.count(condition) == 0 {
                warn!(category = %condition, "category yielded no valid samples");
                summary.empty_categories.push(condition);
            }
        }
        summary.empty_categories.sort();

        if dataset.is_empty() {
            return Err(IoError::NoDataFound {
                root: self.root.clone(),
            });
        }

        info!(
            n_samples = dataset.n_samples(),
            n_benign = dataset.count(Condition::Benign),
            n_malignant = dataset.count(Condition::Malignant),
            missing_masks = summary.missing_masks,
            failed_extractions = summary.failed_extractions,
            "dataset built"
        );

        Ok((dataset, summary))
    }
}
