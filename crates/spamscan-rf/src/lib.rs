//! Random Forest classification: train, cross-validate, search, evaluate.
//!
//! Provides a hand-rolled Random Forest classifier with CART decision trees,
//! Gini/Entropy split criteria, parallel training via rayon, k-fold
//! cross-validation, exhaustive grid search over forest settings, and
//! held-out evaluation with a per-class classification report.

mod config;
mod confusion;
mod cv;
mod error;
mod forest;
mod grid;
mod importance;
mod node;
mod predict;
mod report;
mod result;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use cv::{CrossValidation, CrossValidationResult, FoldStrategy};
pub use error::RfError;
pub use forest::RandomForest;
pub use grid::{CandidateScore, ForestParams, GridSearch, GridSearchResult, ParamGrid};
pub use importance::RankedFeature;
pub use node::{FeatureIndex, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use report::{AveragedMetrics, ClassificationReport, Evaluation, evaluate};
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
