//! Result artifacts: per-sample features CSV and evaluation JSON.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{Dataset, ExperimentName};

/// Writes `{experiment}_features.csv` and `{experiment}_evaluate.json`
/// into one output directory.
pub struct ResultWriter {
    dir: PathBuf,
    experiment: ExperimentName,
}

/// One CSV row: a sample's features, condition, and derived priority.
#[derive(Serialize)]
struct FeatureRow<'a> {
    sample_id: &'a str,
    area: f64,
    mean_intensity: f64,
    std_intensity: f64,
    height: f64,
    width: f64,
    total_pixels: f64,
    condition: &'a str,
    priority: &'a str,
}

impl ResultWriter {
    /// Opens `dir`, creating it and any missing parents.
    ///
    /// # Errors
    ///
    /// [`IoError::OutputDirCreate`] when the directory cannot be made.
    #[instrument(skip_all, fields(dir = %dir.display(), experiment = %experiment))]
    pub fn new(dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        if let Err(source) = fs::create_dir_all(dir) {
            return Err(IoError::OutputDirCreate {
                path: dir.to_owned(),
                source,
            });
        }
        debug!("artifact directory ready");
        Ok(Self {
            dir: dir.to_owned(),
            experiment,
        })
    }

    fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{suffix}", self.experiment))
    }

    #[must_use]
    pub fn features_path(&self) -> PathBuf {
        self.artifact_path("features.csv")
    }

    #[must_use]
    pub fn evaluation_path(&self) -> PathBuf {
        self.artifact_path("evaluate.json")
    }

    /// Write one row per sample: id, the six features, condition, priority.
    ///
    /// `priorities` are the derived priority names, aligned with `dataset`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::CsvWrite`] | The file cannot be created or a record cannot be written |
    /// | [`IoError::WriteFile`] | Flushing the file fails |
    ///
    /// # Panics
    ///
    /// Panics if `priorities.len() != dataset.n_samples()`.
    #[instrument(skip_all, fields(n_samples = dataset.n_samples()))]
    pub fn write_features(&self, dataset: &Dataset, priorities: &[&str]) -> Result<(), IoError> {
        assert_eq!(
            priorities.len(),
            dataset.n_samples(),
            "priorities must be aligned with the dataset"
        );
        let path = self.features_path();
        let csv_err = |e| IoError::CsvWrite {
            path: path.clone(),
            source: e,
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        let rows = dataset
            .sample_ids()
            .iter()
            .zip(dataset.features())
            .zip(dataset.conditions())
            .zip(priorities);
        for (((id, fv), condition), &priority) in rows {
            wtr.serialize(FeatureRow {
                sample_id: id,
                area: fv.area(),
                mean_intensity: fv.mean_intensity(),
                std_intensity: fv.std_intensity(),
                height: fv.height(),
                width: fv.width(),
                total_pixels: fv.total_pixels(),
                condition: condition.dir_name(),
                priority,
            })
            .map_err(csv_err)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "features written");
        Ok(())
    }

    /// Write an evaluation artifact to `{experiment}_evaluate.json`.
    ///
    /// # Errors
    ///
    /// [`IoError::SerializeJson`] if `artifact` fails to serialize,
    /// [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_evaluation<T: Serialize>(&self, artifact: &T) -> Result<(), IoError> {
        let path = self.evaluation_path();
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::SerializeJson {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "evaluation written");
        Ok(())
    }
}
