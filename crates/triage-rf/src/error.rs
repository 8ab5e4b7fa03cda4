/// Errors from forest fitting, prediction, and scoring.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// A forest needs at least one tree.
    #[error("forest needs at least one tree, got n_trees = {n_trees}")]
    InvalidTreeCount {
        /// Requested tree count.
        n_trees: usize,
    },

    /// A depth cap of zero would forbid even the root.
    #[error("max_depth = {max_depth} is invalid; use None for unlimited depth")]
    InvalidMaxDepth {
        /// Requested depth cap.
        max_depth: usize,
    },

    /// A node must hold at least two samples to be split.
    #[error("min_samples_split = {min_samples_split} is below 2")]
    InvalidMinSamplesSplit {
        /// Requested minimum.
        min_samples_split: usize,
    },

    /// Leaves must keep at least one sample.
    #[error("min_samples_leaf = {min_samples_leaf} is below 1")]
    InvalidMinSamplesLeaf {
        /// Requested minimum.
        min_samples_leaf: usize,
    },

    /// The per-split feature budget is outside `1..=n_features`.
    #[error("max_features resolves to {max_features}, outside 1..={n_features}")]
    InvalidMaxFeatures {
        /// Resolved budget.
        max_features: usize,
        /// Columns in the training matrix.
        n_features: usize,
    },

    /// The bootstrap share is outside (0.0, 1.0].
    #[error("bootstrap_fraction = {fraction} is outside (0.0, 1.0]")]
    InvalidBootstrapFraction {
        /// Requested share.
        fraction: f64,
    },

    /// Zero classes were declared.
    #[error("n_classes must be at least 1")]
    InvalidClassCount,

    /// No rows were supplied.
    #[error("no samples supplied")]
    EmptyDataset,

    /// Rows have no columns.
    #[error("samples have no feature columns")]
    ZeroFeatures,

    /// A row's width differs from the first row's.
    #[error("row {sample_index} has {got} columns; row 0 has {expected}")]
    FeatureCountMismatch {
        /// Width of row 0.
        expected: usize,
        /// Width of the offending row.
        got: usize,
        /// Offending row.
        sample_index: usize,
    },

    /// Rows and labels are not one-to-one.
    #[error("{n_labels} labels supplied for {n_samples} rows")]
    LabelCountMismatch {
        /// Rows supplied.
        n_samples: usize,
        /// Labels supplied.
        n_labels: usize,
    },

    /// A label is not a valid class index.
    #[error("label {label} at row {sample_index} is not below n_classes = {n_classes}")]
    LabelOutOfRange {
        /// Offending row.
        sample_index: usize,
        /// Offending label.
        label: usize,
        /// Declared class count.
        n_classes: usize,
    },

    /// The training matrix contains NaN or infinity.
    #[error("row {sample_index}, column {feature_index} is not finite")]
    NonFiniteValue {
        /// Offending row.
        sample_index: usize,
        /// Offending column.
        feature_index: usize,
    },

    /// A row passed to prediction has the wrong width.
    #[error("cannot predict a row of {got} columns with a forest fit on {expected}")]
    PredictionFeatureMismatch {
        /// Width the forest was fit on.
        expected: usize,
        /// Width of the row.
        got: usize,
    },
}
