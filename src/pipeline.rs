//! End-to-end orchestration: load, visualize, split, scale, train, evaluate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};

use spamscan_io::{ColumnInfo, Describe, Preview, SpambaseReader};
use spamscan_prep::{CorrelationMatrix, StandardScaler, correlation_matrix, train_test_split};
use spamscan_rf::{
    CandidateScore, CrossValidation, Evaluation, FoldStrategy, ForestParams, GridSearch, ParamGrid,
    RandomForestConfig, RankedFeature, evaluate,
};

/// Display names for class 0 and class 1.
pub const TARGET_NAMES: [&str; 2] = ["not_spam", "spam"];

/// Settings for one pipeline run.
///
/// Construct via [`PipelineConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter        | Default     |
/// |------------------|-------------|
/// | `seed`           | 42          |
/// | `test_fraction`  | 0.2         |
/// | `cv_folds`       | 10          |
/// | `cv_trees`       | 100         |
/// | `search_folds`   | 5           |
/// | tree range       | `50..100`, step 1 |
/// | `preview_rows`   | 5           |
/// | `correlation`    | enabled     |
/// | `top_features`   | 10          |
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    data: PathBuf,
    seed: u64,
    test_fraction: f64,
    cv_folds: usize,
    cv_trees: usize,
    search_folds: usize,
    min_trees: usize,
    max_trees: usize,
    tree_step: usize,
    preview_rows: usize,
    correlation: bool,
    top_features: usize,
}

impl PipelineConfig {
    /// Create a config reading the Spambase CSV at `data`.
    #[must_use]
    pub fn new(data: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            seed: 42,
            test_fraction: 0.2,
            cv_folds: 10,
            cv_trees: 100,
            search_folds: 5,
            min_trees: 50,
            max_trees: 100,
            tree_step: 1,
            preview_rows: 5,
            correlation: true,
            top_features: 10,
        }
    }

    /// Seed threaded through the split, cross-validation and every forest.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fraction of rows held out for the final evaluation.
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Folds for the diagnostic cross-validation.
    #[must_use]
    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    /// Trees in the diagnostic cross-validation forest.
    #[must_use]
    pub fn with_cv_trees(mut self, cv_trees: usize) -> Self {
        self.cv_trees = cv_trees;
        self
    }

    /// Folds used to score each grid candidate.
    #[must_use]
    pub fn with_search_folds(mut self, search_folds: usize) -> Self {
        self.search_folds = search_folds;
        self
    }

    /// Tree counts searched: `min..max` stepping by `step`.
    #[must_use]
    pub fn with_tree_range(mut self, min: usize, max: usize, step: usize) -> Self {
        self.min_trees = min;
        self.max_trees = max;
        self.tree_step = step;
        self
    }

    /// Rows kept in the preview.
    #[must_use]
    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }

    /// Whether to compute the correlation matrix.
    #[must_use]
    pub fn with_correlation(mut self, correlation: bool) -> Self {
        self.correlation = correlation;
        self
    }

    /// Number of ranked importances kept in the report.
    #[must_use]
    pub fn with_top_features(mut self, top_features: usize) -> Self {
        self.top_features = top_features;
        self
    }

    /// Path of the input file.
    #[must_use]
    pub fn data(&self) -> &Path {
        &self.data
    }
}

/// Loader diagnostics.
#[derive(Debug, Serialize)]
pub struct Diagnostics {
    /// First rows of the table.
    pub preview: Preview,
    /// Per-column dtype and null counts.
    pub info: Vec<ColumnInfo>,
    /// Missing values per column.
    pub null_counts: Vec<(String, usize)>,
    /// Summary statistics per column.
    pub describe: Describe,
    /// Rows per class.
    pub class_counts: Vec<usize>,
}

/// Diagnostic cross-validation scores.
#[derive(Debug, Serialize)]
pub struct CvSummary {
    /// Accuracy per fold.
    pub scores: Vec<f64>,
    /// Mean fold accuracy.
    pub mean: f64,
    /// Population standard deviation of fold accuracy.
    pub std: f64,
}

/// Grid search outcome, without the fitted forest.
#[derive(Debug, Serialize)]
pub struct SearchSummary {
    /// Number of candidates scored.
    pub n_candidates: usize,
    /// Winning parameters.
    pub best_params: ForestParams,
    /// Winning mean CV accuracy.
    pub best_score: f64,
    /// Every candidate, enumeration order.
    pub candidates: Vec<CandidateScore>,
}

/// Everything one run produced.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    /// Rows loaded.
    pub n_rows: usize,
    /// Feature columns loaded.
    pub n_features: usize,
    /// Loader diagnostics.
    pub diagnostics: Diagnostics,
    /// Pearson matrix over all columns, if requested.
    #[serde(skip)]
    pub correlation: Option<CorrelationMatrix>,
    /// Training rows after the split.
    pub n_train: usize,
    /// Held-out rows after the split.
    pub n_test: usize,
    /// Features that were constant in the training rows.
    pub constant_features: Vec<String>,
    /// Diagnostic cross-validation.
    pub cross_validation: CvSummary,
    /// Hyperparameter search.
    pub search: SearchSummary,
    /// Held-out evaluation of the refit winner.
    pub evaluation: Evaluation,
    /// Most important features of the refit winner.
    pub top_features: Vec<RankedFeature>,
}

/// Run the whole pipeline once.
///
/// Rows are split before scaling, so the scaler only sees training rows.
///
/// # Errors
///
/// Any stage failure, with the stage named in the error context.
#[instrument(skip_all, fields(data = %config.data.display(), seed = config.seed))]
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let dataset = SpambaseReader::new(&config.data)
        .read()
        .with_context(|| format!("failed to load {}", config.data.display()))?;

    let diagnostics = Diagnostics {
        preview: dataset.head(config.preview_rows),
        info: dataset.info(),
        null_counts: dataset.null_counts(),
        describe: dataset.describe(),
        class_counts: dataset.class_counts(),
    };

    let correlation = if config.correlation {
        let matrix = correlation_matrix(&dataset.columns(), &dataset.column_names())
            .context("failed to compute correlation matrix")?;
        info!(n_columns = matrix.len(), "correlation matrix computed");
        Some(matrix)
    } else {
        None
    };

    let split = train_test_split(dataset.n_samples(), config.test_fraction, config.seed)
        .context("failed to split rows")?;
    let (train_raw, test_raw) = split.select(dataset.features());
    let (train_y, test_y) = split.select(dataset.labels());
    info!(n_train = train_y.len(), n_test = test_y.len(), "rows split");

    let scaler = StandardScaler::new()
        .fit(&train_raw)
        .context("failed to fit scaler")?;
    let train_x = scaler.transform(&train_raw).context("failed to scale training rows")?;
    let test_x = scaler.transform(&test_raw).context("failed to scale test rows")?;
    let constant_features: Vec<String> = scaler
        .constant_features()
        .iter()
        .map(|&j| dataset.feature_names()[j].clone())
        .collect();
    if !constant_features.is_empty() {
        warn!(features = ?constant_features, "constant training features");
    }

    let names = dataset.feature_names();

    let cv_config = RandomForestConfig::new(config.cv_trees)?.with_seed(config.seed);
    let cv = CrossValidation::new(config.cv_folds)?
        .with_seed(config.seed)
        .evaluate(&cv_config, &train_x, &train_y, names)
        .context("cross-validation failed")?;
    info!(
        mean = cv.mean_accuracy,
        std = cv.std_accuracy,
        "cross-validation complete"
    );

    let grid = ParamGrid::with_tree_range(config.min_trees..config.max_trees, config.tree_step)
        .context("invalid tree-count range")?;
    let search_cv = CrossValidation::new(config.search_folds)?
        .with_seed(config.seed)
        .with_strategy(FoldStrategy::Stratified);
    let search = GridSearch::new(grid)
        .with_cv(search_cv)
        .with_seed(config.seed)
        .fit(&train_x, &train_y, names)
        .context("grid search failed")?;

    let mut evaluation = evaluate(&search.best_forest, &test_x, names, &test_y)
        .context("evaluation failed")?;
    evaluation.report = evaluation.report.with_target_names(&TARGET_NAMES);
    info!(accuracy = evaluation.accuracy, "test accuracy");

    let best_score = search.best_score().mean_score;
    let top_features = search
        .best_importances
        .iter()
        .take(config.top_features)
        .cloned()
        .collect();

    Ok(PipelineReport {
        n_rows: dataset.n_samples(),
        n_features: dataset.n_features(),
        diagnostics,
        correlation,
        n_train: train_y.len(),
        n_test: test_y.len(),
        constant_features,
        cross_validation: CvSummary {
            scores: cv.fold_accuracies,
            mean: cv.mean_accuracy,
            std: cv.std_accuracy,
        },
        search: SearchSummary {
            n_candidates: search.candidates.len(),
            best_params: search.best_params,
            best_score,
            candidates: search.candidates,
        },
        evaluation,
        top_features,
    })
}
