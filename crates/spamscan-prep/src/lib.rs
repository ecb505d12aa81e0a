//! Feature preprocessing for the spam pipeline: correlation heatmaps,
//! standard scaling with a zero-variance guard, and seeded train/test splits.

mod correlation;
mod error;
mod heatmap;
mod scaler;
mod split;

pub use correlation::{CorrelationMatrix, correlation_matrix};
pub use error::PrepError;
pub use heatmap::{Heatmap, HeatmapMode};
pub use scaler::{FittedScaler, ScaledData, StandardScaler, standardize_dataset};
pub use split::{TrainTestSplit, train_test_split};
