//! k-fold cross-validation for Random Forest.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::RandomForestConfig;
use crate::confusion::ConfusionMatrix;
use crate::error::RfError;
use crate::importance::{RankedFeature, aggregate_importances};

/// How rows are assigned to folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldStrategy {
    /// Shuffle all rows, then cut the permutation into contiguous folds.
    #[default]
    Shuffled,
    /// Shuffle within each class, then deal rows round-robin across folds.
    Stratified,
}

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` and
/// `with_strategy` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
    strategy: FoldStrategy,
}

/// Results of k-fold cross-validation.
#[derive(Debug, Serialize)]
pub struct CrossValidationResult {
    /// Accuracy for each fold, in fold order.
    pub fold_accuracies: Vec<f64>,
    /// Confusion matrix summed across all folds.
    pub confusion_matrix: ConfusionMatrix,
    /// Mean accuracy across folds.
    pub mean_accuracy: f64,
    /// Population standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Importances aggregated over every tree of every fold.
    pub feature_importances: Vec<RankedFeature>,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of samples.
    pub n_samples: usize,
    /// Number of features.
    pub n_features: usize,
    /// Number of classes.
    pub n_classes: usize,
}

impl Default for CrossValidation {
    /// Five shuffled folds, seed 42.
    fn default() -> Self {
        Self {
            n_folds: 5,
            seed: 42,
            strategy: FoldStrategy::Shuffled,
        }
    }
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        Ok(Self {
            n_folds,
            seed: 42,
            strategy: FoldStrategy::default(),
        })
    }

    /// Set the random seed for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the fold assignment strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: FoldStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Return the fold strategy.
    #[must_use]
    pub fn strategy(&self) -> FoldStrategy {
        self.strategy
    }

    /// Held-out row indices for each fold, sorted ascending.
    ///
    /// The folds are disjoint and together cover `0..labels.len()`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero labels |
    /// | [`RfError::TooFewSamples`] | Fewer rows than folds (shuffled) |
    /// | [`RfError::TooFewSamplesForFolds`] | A class has fewer rows than folds (stratified) |
    pub fn split(&self, labels: &[usize]) -> Result<Vec<Vec<usize>>, RfError> {
        if labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        let mut folds = match self.strategy {
            FoldStrategy::Shuffled => self.shuffled_split(labels.len())?,
            FoldStrategy::Stratified => self.stratified_split(labels)?,
        };
        folds.iter_mut().for_each(|fold| fold.sort_unstable());
        Ok(folds)
    }

    /// Run k-fold cross-validation.
    ///
    /// Each fold trains a forest on the remaining folds and scores it on the
    /// held-out fold. Fold forests are seeded `config.seed + fold` and share
    /// the class count of the full label vector.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero samples |
    /// | [`RfError::LabelCountMismatch`] | Labels not aligned with rows |
    /// | [`RfError::TooFewSamples`] | Fewer rows than folds |
    /// | [`RfError::TooFewSamplesForFolds`] | A class has fewer samples than folds (stratified) |
    /// | Other RF errors | From underlying training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        features: &[Vec<f64>],
        labels: &[usize],
        feature_names: &[String],
    ) -> Result<CrossValidationResult, RfError> {
        if features.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if features.len() != labels.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: features.len(),
                n_labels: labels.len(),
            });
        }

        let n_samples = features.len();
        let n_features = features[0].len();
        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;

        let folds = self.split(labels)?;

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut confusion_matrix: Option<ConfusionMatrix> = None;
        let mut all_importances: Vec<Vec<f64>> = Vec::new();
        let mut held_out = vec![false; n_samples];

        for (fold, test_indices) in folds.iter().enumerate() {
            held_out.iter_mut().for_each(|h| *h = false);
            for &i in test_indices {
                held_out[i] = true;
            }

            let mut train_features = Vec::with_capacity(n_samples - test_indices.len());
            let mut train_labels = Vec::with_capacity(n_samples - test_indices.len());
            for (i, row) in features.iter().enumerate() {
                if !held_out[i] {
                    train_features.push(row.clone());
                    train_labels.push(labels[i]);
                }
            }
            let test_features: Vec<Vec<f64>> =
                test_indices.iter().map(|&i| features[i].clone()).collect();
            let test_labels: Vec<usize> = test_indices.iter().map(|&i| labels[i]).collect();

            let fold_config = config
                .clone()
                .with_seed(config.seed.wrapping_add(fold as u64))
                .with_n_classes(n_classes);
            let result = fold_config.fit(&train_features, &train_labels, feature_names)?;
            let predictions = result.forest().predict_batch(&test_features)?;

            let fold_matrix = ConfusionMatrix::from_labels(&test_labels, &predictions, n_classes)?;
            let fold_accuracy = fold_matrix.accuracy();
            fold_accuracies.push(fold_accuracy);
            debug!(fold, accuracy = fold_accuracy, "fold completed");

            match confusion_matrix.as_mut() {
                Some(total) => total.merge(&fold_matrix),
                None => confusion_matrix = Some(fold_matrix),
            }

            all_importances.extend(
                result
                    .forest()
                    .trees
                    .iter()
                    .map(|t| t.feature_importances()),
            );
        }

        let confusion_matrix = confusion_matrix.ok_or(RfError::EmptyDataset)?;
        let (mean_accuracy, std_accuracy) = mean_std(&fold_accuracies);
        let feature_importances = aggregate_importances(&all_importances, feature_names);

        debug!(mean_accuracy, std_accuracy, "cross-validation complete");

        Ok(CrossValidationResult {
            fold_accuracies,
            confusion_matrix,
            mean_accuracy,
            std_accuracy,
            feature_importances,
            n_folds: self.n_folds,
            n_samples,
            n_features,
            n_classes,
        })
    }

    /// Cut a seeded permutation into `n_folds` contiguous chunks; the first
    /// `n % n_folds` chunks get one extra row.
    fn shuffled_split(&self, n_samples: usize) -> Result<Vec<Vec<usize>>, RfError> {
        if n_samples < self.n_folds {
            return Err(RfError::TooFewSamples {
                n_samples,
                n_folds: self.n_folds,
            });
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(&mut rng);

        let base = n_samples / self.n_folds;
        let extra = n_samples % self.n_folds;
        let mut folds = Vec::with_capacity(self.n_folds);
        let mut start = 0;
        for fold in 0..self.n_folds {
            let size = base + usize::from(fold < extra);
            folds.push(order[start..start + size].to_vec());
            start += size;
        }
        Ok(folds)
    }

    /// Group samples by class, shuffle within each class, then deal them
    /// round-robin so every fold sees roughly the class proportions.
    fn stratified_split(&self, labels: &[usize]) -> Result<Vec<Vec<usize>>, RfError> {
        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut class_indices: Vec<Vec<usize>> = vec![vec![]; n_classes];
        for (i, &label) in labels.iter().enumerate() {
            class_indices[label].push(i);
        }

        for (class, indices) in class_indices.iter().enumerate() {
            if !indices.is_empty() && indices.len() < self.n_folds {
                return Err(RfError::TooFewSamplesForFolds {
                    class,
                    count: indices.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        let mut folds = vec![Vec::new(); self.n_folds];
        // Continue the deal across classes so fold sizes stay within one row.
        let mut next = 0;
        for indices in &mut class_indices {
            indices.shuffle(&mut rng);
            for &idx in indices.iter() {
                folds[next % self.n_folds].push(idx);
                next += 1;
            }
        }
        Ok(folds)
    }
}

/// Mean and population standard deviation.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
