//! Exhaustive hyperparameter search over a grid of forest settings.

use std::fmt;
use std::ops::Range;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::{MaxFeatures, RandomForestConfig};
use crate::cv::{CrossValidation, FoldStrategy};
use crate::error::RfError;
use crate::forest::RandomForest;
use crate::importance::RankedFeature;
use crate::split::SplitCriterion;

/// One point of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForestParams {
    /// Number of trees.
    pub n_trees: usize,
    /// Split criterion.
    pub criterion: SplitCriterion,
    /// Features examined per split.
    pub max_features: MaxFeatures,
}

impl ForestParams {
    /// Build a forest config for these parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn to_config(&self, seed: u64) -> Result<RandomForestConfig, RfError> {
        Ok(RandomForestConfig::new(self.n_trees)?
            .with_criterion(self.criterion)
            .with_max_features(self.max_features)
            .with_seed(seed))
    }
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n_trees={}, criterion={}, max_features={}",
            self.n_trees, self.criterion, self.max_features
        )
    }
}

/// The axes of the search.
///
/// Candidates enumerate `n_trees` outermost, then `criteria`, then
/// `max_features`.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    n_trees: Vec<usize>,
    criteria: Vec<SplitCriterion>,
    max_features: Vec<MaxFeatures>,
}

impl Default for ParamGrid {
    /// `n_trees` in `50..100`, both criteria, and `sqrt`/`log2`/`none`: 300 candidates.
    fn default() -> Self {
        Self {
            n_trees: (50..100).collect(),
            criteria: vec![SplitCriterion::Gini, SplitCriterion::Entropy],
            max_features: vec![MaxFeatures::Sqrt, MaxFeatures::Log2, MaxFeatures::All],
        }
    }
}

impl ParamGrid {
    /// Create a grid from explicit axis values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyGrid`] | Any axis is empty |
    /// | [`RfError::InvalidTreeCount`] | A tree count is zero |
    pub fn new(
        n_trees: Vec<usize>,
        criteria: Vec<SplitCriterion>,
        max_features: Vec<MaxFeatures>,
    ) -> Result<Self, RfError> {
        if n_trees.is_empty() {
            return Err(RfError::EmptyGrid { axis: "n_trees" });
        }
        if criteria.is_empty() {
            return Err(RfError::EmptyGrid { axis: "criterion" });
        }
        if max_features.is_empty() {
            return Err(RfError::EmptyGrid {
                axis: "max_features",
            });
        }
        if n_trees.contains(&0) {
            return Err(RfError::InvalidTreeCount { n_trees: 0 });
        }
        Ok(Self {
            n_trees,
            criteria,
            max_features,
        })
    }

    /// The default criteria and feature rules over a stepped tree-count range.
    ///
    /// # Errors
    ///
    /// Same as [`ParamGrid::new`]; an empty range or zero step yields
    /// [`RfError::EmptyGrid`].
    pub fn with_tree_range(trees: Range<usize>, step: usize) -> Result<Self, RfError> {
        if step == 0 {
            return Err(RfError::EmptyGrid { axis: "n_trees" });
        }
        let defaults = Self::default();
        Self::new(
            trees.step_by(step).collect(),
            defaults.criteria,
            defaults.max_features,
        )
    }

    /// Every candidate in enumeration order.
    #[must_use]
    pub fn candidates(&self) -> Vec<ForestParams> {
        let mut out = Vec::with_capacity(self.len());
        for &n_trees in &self.n_trees {
            for &criterion in &self.criteria {
                for &max_features in &self.max_features {
                    out.push(ForestParams {
                        n_trees,
                        criterion,
                        max_features,
                    });
                }
            }
        }
        out
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_trees.len() * self.criteria.len() * self.max_features.len()
    }

    /// Always false for a validated grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cross-validated score of one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    /// The parameters scored.
    pub params: ForestParams,
    /// Mean fold accuracy.
    pub mean_score: f64,
    /// Population standard deviation of fold accuracies.
    pub std_score: f64,
    /// Accuracy of each fold.
    pub fold_scores: Vec<f64>,
    /// 1 = best; equal scores share a rank.
    pub rank: usize,
}

/// Outcome of a grid search.
#[derive(Debug)]
pub struct GridSearchResult {
    /// Every candidate in enumeration order.
    pub candidates: Vec<CandidateScore>,
    /// Index of the winning candidate in `candidates`.
    pub best_index: usize,
    /// Parameters of the winning candidate.
    pub best_params: ForestParams,
    /// The winner refit on the full training data.
    pub best_forest: RandomForest,
    /// MDI importances of the refit forest.
    pub best_importances: Vec<RankedFeature>,
}

impl GridSearchResult {
    /// The winning candidate's score.
    #[must_use]
    pub fn best_score(&self) -> &CandidateScore {
        &self.candidates[self.best_index]
    }
}

/// Grid search driver.
///
/// Construct via [`GridSearch::new`]; the default CV is 5 stratified folds.
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    cv: CrossValidation,
    seed: u64,
}

impl GridSearch {
    /// Create a search over `grid`.
    #[must_use]
    pub fn new(grid: ParamGrid) -> Self {
        Self {
            grid,
            cv: CrossValidation::default().with_strategy(FoldStrategy::Stratified),
            seed: 42,
        }
    }

    /// Set the cross-validation used to score each candidate.
    #[must_use]
    pub fn with_cv(mut self, cv: CrossValidation) -> Self {
        self.cv = cv;
        self
    }

    /// Set the seed every candidate forest and the refit use.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Borrow the grid.
    #[must_use]
    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    /// Score every candidate with cross-validation, pick the best mean
    /// accuracy (earliest wins ties), and refit it on all of `features`.
    ///
    /// Candidates are scored in parallel; all of them see the same folds.
    ///
    /// # Errors
    ///
    /// Any [`RfError`] from fold assignment or training.
    #[instrument(skip_all, fields(n_candidates = self.grid.len(), n_samples = features.len()))]
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        feature_names: &[String],
    ) -> Result<GridSearchResult, RfError> {
        let params = self.grid.candidates();
        info!(
            n_candidates = params.len(),
            n_folds = self.cv.n_folds(),
            "starting grid search"
        );

        let scored: Vec<(ForestParams, Vec<f64>, f64, f64)> = params
            .par_iter()
            .map(|p| -> Result<_, RfError> {
                let config = p.to_config(self.seed)?;
                let cv = self.cv.evaluate(&config, features, labels, feature_names)?;
                debug!(params = %p, mean = cv.mean_accuracy, "candidate scored");
                Ok((*p, cv.fold_accuracies, cv.mean_accuracy, cv.std_accuracy))
            })
            .collect::<Result<_, RfError>>()?;

        let mut best_index = 0;
        for (i, s) in scored.iter().enumerate() {
            if s.2 > scored[best_index].2 {
                best_index = i;
            }
        }

        let candidates: Vec<CandidateScore> = scored
            .iter()
            .map(|(p, folds, mean, std)| CandidateScore {
                params: *p,
                mean_score: *mean,
                std_score: *std,
                fold_scores: folds.clone(),
                rank: 1 + scored.iter().filter(|other| other.2 > *mean).count(),
            })
            .collect();

        let best_params = candidates[best_index].params;
        info!(
            best = %best_params,
            score = candidates[best_index].mean_score,
            "grid search complete, refitting best candidate"
        );

        let refit = best_params
            .to_config(self.seed)?
            .fit(features, labels, feature_names)?;
        let best_importances = refit.importances().to_vec();

        Ok(GridSearchResult {
            candidates,
            best_index,
            best_params,
            best_forest: refit.into_forest(),
            best_importances,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_data() -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(vec![i as f64 * 0.1, (i % 4) as f64, 1.0]);
            labels.push(0);
            features.push(vec![5.0 + i as f64 * 0.1, (i % 4) as f64, 1.0]);
            labels.push(1);
        }
        let names = vec!["signal".into(), "noise".into(), "const".into()];
        (features, labels, names)
    }

    #[test]
    fn default_grid_has_300_candidates() {
        let grid = ParamGrid::default();
        assert_eq!(grid.len(), 300);
        let candidates = grid.candidates();
        assert_eq!(candidates.len(), 300);
        assert_eq!(
            candidates[0],
            ForestParams {
                n_trees: 50,
                criterion: SplitCriterion::Gini,
                max_features: MaxFeatures::Sqrt,
            }
        );
        assert_eq!(candidates[299].n_trees, 99);
        assert_eq!(candidates[299].max_features, MaxFeatures::All);
    }

    #[test]
    fn empty_axes_rejected() {
        let err = ParamGrid::new(vec![], vec![SplitCriterion::Gini], vec![MaxFeatures::All]);
        assert!(matches!(err, Err(RfError::EmptyGrid { axis: "n_trees" })));
        let err = ParamGrid::new(vec![5], vec![], vec![MaxFeatures::All]);
        assert!(matches!(err, Err(RfError::EmptyGrid { axis: "criterion" })));
        assert!(ParamGrid::with_tree_range(10..10, 1).is_err());
        assert!(ParamGrid::with_tree_range(10..20, 0).is_err());
        assert!(ParamGrid::new(vec![0], vec![SplitCriterion::Gini], vec![MaxFeatures::All]).is_err());
    }

    #[test]
    fn stepped_range() {
        let grid = ParamGrid::with_tree_range(50..100, 25).unwrap();
        assert_eq!(grid.len(), 2 * 2 * 3);
    }

    #[test]
    fn search_picks_top_ranked_candidate() {
        let (features, labels, names) = make_data();
        let grid = ParamGrid::new(
            vec![3, 6],
            vec![SplitCriterion::Gini, SplitCriterion::Entropy],
            vec![MaxFeatures::Sqrt, MaxFeatures::All],
        )
        .unwrap();
        let result = GridSearch::new(grid)
            .with_cv(
                CrossValidation::new(4)
                    .unwrap()
                    .with_strategy(FoldStrategy::Stratified),
            )
            .with_seed(3)
            .fit(&features, &labels, &names)
            .unwrap();

        assert_eq!(result.candidates.len(), 8);
        let best = result.best_score();
        assert_eq!(best.rank, 1);
        assert_eq!(best.params, result.best_params);
        for c in &result.candidates {
            assert!(c.mean_score <= best.mean_score);
            assert_eq!(c.fold_scores.len(), 4);
        }
        // Earliest of the top scorers wins.
        let first_top = result
            .candidates
            .iter()
            .position(|c| c.mean_score == best.mean_score)
            .unwrap();
        assert_eq!(first_top, result.best_index);

        assert_eq!(result.best_forest.n_trees(), result.best_params.n_trees);
        assert_eq!(result.best_importances[0].name, "signal");
        let predictions = result.best_forest.predict_batch(&features).unwrap();
        let correct = predictions.iter().zip(&labels).filter(|&(p, l)| p == l).count();
        assert!(correct as f64 / labels.len() as f64 >= 0.95);
    }
}
