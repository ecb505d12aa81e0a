//! Configuration builder for Random Forest training.

use std::fmt;

use serde::Serialize;

use crate::error::RfError;
use crate::result::RandomForestResult;
use crate::split::SplitCriterion;

/// Rule for how many features each split may examine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// `floor(log2(n_features))`, at least 1.
    Log2,
    /// A fixed count.
    Fixed(usize),
    /// Every feature (plain bagged trees).
    All,
}

impl MaxFeatures {
    /// Resolve the rule to a concrete count for `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidMaxFeatures`] if the count is 0 or exceeds `n_features`.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let resolved = match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt().floor() as usize).max(1),
            MaxFeatures::Log2 => ((n_features as f64).log2().floor() as usize).max(1),
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

impl fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxFeatures::Sqrt => f.write_str("sqrt"),
            MaxFeatures::Log2 => f.write_str("log2"),
            MaxFeatures::Fixed(n) => write!(f, "{n}"),
            MaxFeatures::All => f.write_str("none"),
        }
    }
}

/// Configuration for Random Forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default              |
/// |---------------------|----------------------|
/// | `max_features`      | `Sqrt`               |
/// | `max_depth`         | `None`               |
/// | `min_samples_split` | 2                    |
/// | `min_samples_leaf`  | 1                    |
/// | `criterion`         | `Gini`               |
/// | `seed`              | 42                   |
/// | `n_classes`         | `None` (from labels) |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) seed: u64,
    pub(crate) n_classes: Option<usize>,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            seed: 42,
            n_classes: None,
        })
    }

    /// Set the max features rule.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fix the number of classes instead of inferring `max(label) + 1`.
    ///
    /// Needed when a training subset (a CV fold) may lack the highest class.
    #[must_use]
    pub fn with_n_classes(mut self, n_classes: usize) -> Self {
        self.n_classes = Some(n_classes);
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the max features rule.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a Random Forest.
    ///
    /// `features[sample][feature]` is row-major; `labels` are zero-based
    /// classes; `feature_names` name the columns and become the forest's schema.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                             |
    /// |------------------------------------|--------------------------------------------------|
    /// | [`RfError::EmptyDataset`]          | `features` is empty                              |
    /// | [`RfError::ZeroFeatures`]          | rows have zero feature columns                   |
    /// | [`RfError::LabelCountMismatch`]    | labels not aligned with rows                     |
    /// | [`RfError::FeatureCountMismatch`]  | rows have inconsistent lengths                   |
    /// | [`RfError::NonFiniteValue`]        | any value is NaN or infinite                     |
    /// | [`RfError::NameCountMismatch`]     | `feature_names` length differs from row width    |
    /// | [`RfError::LabelOutOfRange`]       | a label is `>=` the fixed `n_classes`            |
    /// | [`RfError::InvalidMaxFeatures`]    | resolved max_features outside [1, n_features]    |
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        feature_names: &[String],
    ) -> Result<RandomForestResult, RfError> {
        crate::forest::train(self, features, labels, feature_names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_for_spambase_width() {
        assert_eq!(MaxFeatures::Sqrt.resolve(57).unwrap(), 7);
        assert_eq!(MaxFeatures::Log2.resolve(57).unwrap(), 5);
        assert_eq!(MaxFeatures::All.resolve(57).unwrap(), 57);
        assert_eq!(MaxFeatures::Fixed(3).resolve(57).unwrap(), 3);
    }

    #[test]
    fn resolve_never_below_one() {
        assert_eq!(MaxFeatures::Sqrt.resolve(1).unwrap(), 1);
        assert_eq!(MaxFeatures::Log2.resolve(1).unwrap(), 1);
    }

    #[test]
    fn resolve_rejects_out_of_range() {
        assert!(MaxFeatures::Fixed(0).resolve(5).is_err());
        assert!(MaxFeatures::Fixed(6).resolve(5).is_err());
    }

    #[test]
    fn display_uses_familiar_names() {
        assert_eq!(MaxFeatures::Sqrt.to_string(), "sqrt");
        assert_eq!(MaxFeatures::Log2.to_string(), "log2");
        assert_eq!(MaxFeatures::All.to_string(), "none");
    }

    #[test]
    fn zero_trees_rejected() {
        assert!(matches!(
            RandomForestConfig::new(0),
            Err(RfError::InvalidTreeCount { n_trees: 0 })
        ));
    }

    #[test]
    fn builder_chain() {
        let cfg = RandomForestConfig::new(60)
            .unwrap()
            .with_criterion(SplitCriterion::Entropy)
            .with_max_features(MaxFeatures::Log2)
            .with_seed(7);
        assert_eq!(cfg.n_trees(), 60);
        assert_eq!(cfg.criterion(), SplitCriterion::Entropy);
        assert_eq!(cfg.max_features(), MaxFeatures::Log2);
        assert_eq!(cfg.seed(), 7);
    }
}
