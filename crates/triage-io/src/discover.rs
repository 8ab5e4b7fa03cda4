//! Image/mask pair discovery inside one condition subdirectory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::Condition;

/// Image file extension accepted for both images and masks (case-insensitive).
pub const IMAGE_EXTENSION: &str = "png";

/// Suffix appended to an image's file stem to name its mask.
pub const MASK_SUFFIX: &str = "_mask";

/// An image with its mask, both known to exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePair {
    /// Path of the grayscale image.
    pub image_path: PathBuf,
    /// Path of the region mask.
    pub mask_path: PathBuf,
    /// Condition taken from the enclosing subdirectory.
    pub condition: Condition,
}

impl SamplePair {
    /// `<condition>/<image file stem>`, unique within a dataset root.
    #[must_use]
    pub fn sample_id(&self) -> String {
        let stem = self
            .image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}/{stem}", self.condition)
    }
}

/// Outcome of scanning one condition subdirectory.
#[derive(Debug)]
pub(crate) enum CategoryScan {
    /// The subdirectory does not exist.
    Missing,
    /// The subdirectory exists but could not be listed.
    Unreadable(std::io::Error),
    /// Pairs found, plus the number of images skipped for lacking a mask.
    Found {
        pairs: Vec<SamplePair>,
        missing_masks: usize,
    },
}

/// If `path` names an image (not a mask), return the path its mask must have.
fn mask_path_for(path: &Path) -> Option<PathBuf> {
    let ext = path.extension()?.to_str()?;
    if !ext.eq_ignore_ascii_case(IMAGE_EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.ends_with(MASK_SUFFIX) {
        return None;
    }
    Some(path.with_file_name(format!("{stem}{MASK_SUFFIX}.{ext}")))
}

/// List image/mask pairs in `root/<condition>/`, sorted by image file name.
pub(crate) fn scan_category(root: &Path, condition: Condition) -> CategoryScan {
    let dir = root.join(condition.dir_name());
    if !dir.is_dir() {
        return CategoryScan::Missing;
    }

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) => return CategoryScan::Unreadable(e),
    };

    // read_dir order is platform-dependent; sort for a reproducible dataset.
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let mut pairs = Vec::new();
    let mut missing_masks = 0usize;
    for image_path in files {
        let Some(mask_path) = mask_path_for(&image_path) else {
            continue;
        };
        if mask_path.is_file() {
            pairs.push(SamplePair {
                image_path,
                mask_path,
                condition,
            });
        } else {
            debug!(image = %image_path.display(), "no matching mask, skipping");
            missing_masks += 1;
        }
    }

    CategoryScan::Found {
        pairs,
        missing_masks,
    }
}
