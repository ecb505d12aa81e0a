//! Spambase CSV loading, validation and dataset diagnostics.

mod dataset;
mod error;
mod reader;
mod schema;
mod summary;

pub use dataset::Dataset;
pub use error::IoError;
pub use reader::SpambaseReader;
pub use schema::{LABEL_COLUMN, N_FEATURES, SPAMBASE_COLUMNS, feature_names};
pub use summary::{ColumnInfo, ColumnStats, Describe, Dtype, Preview};
