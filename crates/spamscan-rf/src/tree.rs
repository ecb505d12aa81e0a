use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    node::{Node, NodeIndex},
    split::{SplitCriterion, SplitSearch},
};

/// Configuration for a single CART decision tree.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum depth (root is depth 0). `None` grows until leaves are pure.
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

    /// Set the minimum number of samples required in each child.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set how many features are scanned per split. `None` scans all of them.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train a tree on a row-major dataset.
    ///
    /// The number of classes is `max(label) + 1`.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                   |
    /// |--------------------------------------|----------------------------------------|
    /// | [`RfError::EmptyDataset`]            | `features` is empty                    |
    /// | [`RfError::ZeroFeatures`]            | rows have zero columns                 |
    /// | [`RfError::LabelCountMismatch`]      | `labels.len() != features.len()`       |
    /// | [`RfError::FeatureCountMismatch`]    | rows have inconsistent lengths         |
    /// | [`RfError::NonFiniteValue`]          | a value is NaN or infinite             |
    /// | [`RfError::InvalidMaxFeatures`]      | `max_features` outside [1, n_features] |
    /// | [`RfError::InvalidMaxDepth`]         | `max_depth` is `Some(0)`               |
    /// | [`RfError::InvalidMinSamplesSplit`]  | `min_samples_split` < 2                |
    /// | [`RfError::InvalidMinSamplesLeaf`]   | `min_samples_leaf` < 1                 |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        let n_features = validate_training_data(features, labels)?;
        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
        let columns = to_columns(features, n_features);
        let samples: Vec<usize> = (0..features.len()).collect();
        self.fit_columns(&columns, labels, &samples, n_classes)
    }

    /// Train on pre-transposed columns using only the rows listed in `samples`.
    ///
    /// `samples` may repeat indices (bootstrap draws). Inputs are assumed
    /// validated; only the config itself is checked here.
    pub(crate) fn fit_columns(
        &self,
        columns: &[Vec<f64>],
        labels: &[usize],
        samples: &[usize],
        n_classes: usize,
    ) -> Result<DecisionTree, RfError> {
        let n_features = columns.len();
        if self.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let mut builder = TreeBuilder {
            search: SplitSearch {
                columns,
                labels,
                n_classes,
                criterion: self.criterion,
                max_features,
                min_samples_leaf: self.min_samples_leaf,
            },
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        builder.grow(samples, 0);

        debug!(n_nodes = builder.arena.len(), n_classes, "decision tree built");

        Ok(DecisionTree {
            nodes: builder.arena,
            n_features,
            n_classes,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that a row-major dataset is non-empty, rectangular, finite and
/// aligned with its labels. Returns the feature count.
pub(crate) fn validate_training_data(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<usize, RfError> {
    let Some(first) = features.first() else {
        return Err(RfError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Transpose row-major features into `columns[feature][sample]`.
pub(crate) fn to_columns(features: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect()
}

struct TreeBuilder<'a> {
    search: SplitSearch<'a>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, samples: &[usize], depth: usize) -> NodeIndex {
        let n_samples = samples.len();
        let mut class_counts = vec![0usize; self.search.n_classes];
        for &s in samples {
            class_counts[self.search.labels[s]] += 1;
        }

        let pure = class_counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_deep = self.max_depth.is_some_and(|d| depth >= d);
        if pure || too_deep || n_samples < self.min_samples_split {
            return self.push_leaf(&class_counts, n_samples);
        }

        let Some(split) = self.search.best_split(samples, &mut self.rng) else {
            return self.push_leaf(&class_counts, n_samples);
        };

        // Reserve the slot so children get higher indices, then overwrite.
        let idx = self.push_leaf(&class_counts, n_samples);
        let left = self.grow(&split.left, depth + 1);
        let right = self.grow(&split.right, depth + 1);
        self.arena[idx.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            n_samples,
            impurity_decrease: split.impurity_decrease,
        };
        idx
    }

    fn push_leaf(&mut self, class_counts: &[usize], n_samples: usize) -> NodeIndex {
        let total = n_samples.max(1) as f64;
        let distribution = class_counts.iter().map(|&c| c as f64 / total).collect();
        let prediction = argmax_first(class_counts);
        self.arena.push(Node::Leaf {
            prediction,
            distribution,
            n_samples,
        });
        NodeIndex::new(self.arena.len() - 1)
    }
}

/// Index of the largest count; the lowest index wins ties.
fn argmax_first(counts: &[usize]) -> usize {
    let mut best = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = i;
        }
    }
    best
}

/// A fitted CART decision tree stored as a node arena rooted at index 0.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        match self.leaf(sample)? {
            Node::Leaf { prediction, .. } => Ok(*prediction),
            Node::Split { .. } => unreachable!("traversal always ends at a leaf"),
        }
    }

    /// Class distribution of the leaf reached by `sample` (length `n_classes`).
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], RfError> {
        match self.leaf(sample)? {
            Node::Leaf { distribution, .. } => Ok(distribution),
            Node::Split { .. } => unreachable!("traversal always ends at a leaf"),
        }
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1.0.
    ///
    /// All zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Total number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, d)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }

    fn leaf(&self, sample: &[f64]) -> Result<&Node, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                node @ Node::Leaf { .. } => return Ok(node),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dataset_error() {
        let err = DecisionTreeConfig::new().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn label_count_mismatch_error() {
        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0], vec![2.0]], &[0])
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelCountMismatch {
                n_samples: 2,
                n_labels: 1
            }
        ));
    }

    #[test]
    fn non_finite_value_error() {
        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, 2.0], vec![f64::NAN, 0.0]], &[0, 1])
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::NonFiniteValue {
                sample_index: 1,
                feature_index: 0
            }
        ));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let tree = DecisionTreeConfig::new().fit(&features, &[1, 1, 1]).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict(&[0.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn separable_data_single_split() {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.predict(&[2.5, 0.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[10.5, 0.0]).unwrap(), 1);
        assert_eq!(tree.feature_importances(), vec![1.0, 0.0]);
    }

    #[test]
    fn xor_needs_two_levels() {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let labels = vec![0, 1, 1, 0];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(tree.depth() >= 2);
        for (row, &label) in features.iter().zip(&labels) {
            assert_eq!(tree.predict(row).unwrap(), label);
        }
    }

    #[test]
    fn max_depth_limits_growth() {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &[0, 1, 1, 0])
            .unwrap();
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn predict_proba_sums_to_one() {
        let features = vec![vec![1.0], vec![1.0], vec![2.0], vec![2.0]];
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &[0, 1, 1, 1])
            .unwrap();
        let proba = tree.predict_proba(&[1.0]).unwrap();
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((proba[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn wrong_width_at_prediction() {
        let tree = DecisionTreeConfig::new()
            .fit(&[vec![1.0, 2.0], vec![2.0, 1.0]], &[0, 1])
            .unwrap();
        assert!(matches!(
            tree.predict(&[1.0]),
            Err(RfError::PredictionFeatureMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn invalid_config_rejected() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0, 1];
        assert!(matches!(
            DecisionTreeConfig::new()
                .with_max_depth(Some(0))
                .fit(&features, &labels),
            Err(RfError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new()
                .with_min_samples_split(1)
                .fit(&features, &labels),
            Err(RfError::InvalidMinSamplesSplit { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new()
                .with_max_features(Some(2))
                .fit(&features, &labels),
            Err(RfError::InvalidMaxFeatures { .. })
        ));
    }

    #[test]
    fn argmax_prefers_lowest_index_on_tie() {
        assert_eq!(argmax_first(&[3, 3]), 0);
        assert_eq!(argmax_first(&[1, 4, 4]), 1);
    }
}
