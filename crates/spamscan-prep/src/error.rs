//! Error types for spamscan-prep.

/// Errors from scaling, splitting and correlation.
#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    /// Returned when the input has zero rows.
    #[error("input has zero rows")]
    EmptyDataset,

    /// Returned when the input has zero feature columns.
    #[error("input has zero feature columns")]
    ZeroFeatures,

    /// Returned when a row's width differs from the fitted or first row's width.
    #[error("row {row_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// Expected number of features.
        expected: usize,
        /// Actual number of features in the row.
        got: usize,
        /// Zero-based index of the offending row.
        row_index: usize,
    },

    /// Returned when the label vector is not aligned with the rows.
    #[error("got {n_labels} labels for {n_rows} rows")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_rows: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when columns passed to the correlation have different lengths.
    #[error("column {column_index} has {got} values, expected {expected}")]
    ColumnLengthMismatch {
        /// Length of the first column.
        expected: usize,
        /// Length of the offending column.
        got: usize,
        /// Zero-based index of the offending column.
        column_index: usize,
    },

    /// Returned when the number of names differs from the number of columns.
    #[error("got {n_names} names for {n_columns} columns")]
    NameCountMismatch {
        /// Number of columns.
        n_columns: usize,
        /// Number of names.
        n_names: usize,
    },

    /// Returned when the test fraction is not strictly between 0 and 1.
    #[error("test fraction must be in (0, 1), got {fraction}")]
    InvalidTestFraction {
        /// The fraction provided.
        fraction: f64,
    },

    /// Returned when a split would leave the train or test side empty.
    #[error("cannot split {n_samples} rows with test fraction {fraction}: one side would be empty")]
    TooFewSamples {
        /// Number of rows available.
        n_samples: usize,
        /// The fraction requested.
        fraction: f64,
    },
}
