//! Random Forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::importance::aggregate_importances;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig, to_columns, validate_training_data};

/// A fitted Random Forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Draw `n` row indices with replacement.
fn bootstrap_sample(n: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Train the ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[String],
) -> Result<RandomForestResult, RfError> {
    let n_features = validate_training_data(features, labels)?;
    if feature_names.len() != n_features {
        return Err(RfError::NameCountMismatch {
            n_features,
            n_names: feature_names.len(),
        });
    }
    let n_samples = features.len();

    let inferred = labels.iter().max().copied().unwrap_or(0) + 1;
    let n_classes = match config.n_classes {
        Some(n) => {
            if let Some((sample_index, &label)) =
                labels.iter().enumerate().find(|&(_, &l)| l >= n)
            {
                return Err(RfError::LabelOutOfRange {
                    label,
                    sample_index,
                    n_classes: n,
                });
            }
            n
        }
        None => inferred,
    };

    let max_features = config.max_features.resolve(n_features)?;
    let tree_config = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));

    debug!(
        n_samples,
        n_features,
        n_classes,
        max_features,
        criterion = %config.criterion,
        "training random forest"
    );

    let columns = to_columns(features, n_features);

    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    // collect() on an indexed parallel iterator keeps seed order, so the
    // forest is identical for any thread count.
    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let samples = bootstrap_sample(n_samples, &mut rng);
            tree_config
                .clone()
                .with_seed(rng.r#gen())
                .fit_columns(&columns, labels, &samples, n_classes)
        })
        .collect::<Result<_, _>>()?;

    let per_tree: Vec<Vec<f64>> = trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree, feature_names);

    let metadata = TrainingMetadata {
        n_trees: trees.len(),
        n_features,
        n_classes,
        n_samples,
        max_features_resolved: max_features,
    };

    let forest = RandomForest {
        trees,
        n_features,
        n_classes,
        feature_names: feature_names.to_vec(),
    };

    debug!(n_trees = forest.trees.len(), "random forest trained");

    Ok(RandomForestResult::new(forest, importances, metadata))
}
