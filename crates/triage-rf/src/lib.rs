//! Random Forest classification: train, predict, evaluate.
//!
//! CART decision trees with Gini/Entropy split criteria, bootstrap
//! sampling, per-split feature subsampling, parallel training via rayon,
//! mean-decrease-in-impurity feature importances, and confusion-matrix
//! based metrics with a text classification report.

mod config;
mod confusion;
mod error;
mod forest;
mod importance;
mod node;
mod predict;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ClassificationReport, ConfusionMatrix, LabeledConfusion};
pub use error::RfError;
pub use forest::{FitStats, RandomForest, RandomForestResult};
pub use importance::RankedFeature;
pub use node::Impurity;
pub use predict::ClassDistribution;
pub use split::SplitCriterion;
