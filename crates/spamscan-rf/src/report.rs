//! Held-out evaluation of a fitted forest.

use std::fmt;

use serde::Serialize;
use tracing::{info, instrument};

use crate::confusion::{ClassMetrics, ConfusionMatrix};
use crate::error::RfError;
use crate::forest::RandomForest;

/// Precision, recall and F1 averaged across classes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AveragedMetrics {
    /// Averaged precision.
    pub precision: f64,
    /// Averaged recall.
    pub recall: f64,
    /// Averaged F1.
    pub f1: f64,
    /// Total support.
    pub support: usize,
}

/// Per-class metrics plus overall accuracy and averages.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    /// One entry per class, in class order.
    pub classes: Vec<ClassMetrics>,
    /// Display names, one per class.
    pub target_names: Vec<String>,
    /// Fraction of correct predictions.
    pub accuracy: f64,
    /// Unweighted mean over classes.
    pub macro_avg: AveragedMetrics,
    /// Mean over classes weighted by support.
    pub weighted_avg: AveragedMetrics,
}

impl ClassificationReport {
    /// Derive the report from a confusion matrix. Classes are named by index.
    #[must_use]
    pub fn from_confusion(matrix: &ConfusionMatrix) -> Self {
        let classes = matrix.class_metrics();
        let total: usize = classes.iter().map(|c| c.support).sum();
        let n = classes.len().max(1) as f64;

        let macro_avg = AveragedMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
            support: total,
        };
        let weighted = |metric: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| metric(c) * c.support as f64)
                .sum::<f64>()
                / total as f64
        };
        let weighted_avg = AveragedMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total,
        };

        Self {
            target_names: (0..classes.len()).map(|c| c.to_string()).collect(),
            classes,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }

    /// Replace the class display names. Ignored unless one name per class.
    #[must_use]
    pub fn with_target_names<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        if names.len() == self.classes.len() {
            self.target_names = names.iter().map(|n| n.as_ref().to_string()).collect();
        }
        self
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .target_names
            .iter()
            .map(String::len)
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, c) in self.target_names.iter().zip(&self.classes) {
            writeln!(
                f,
                "{name:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (label, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{label:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                avg.precision, avg.recall, avg.f1, avg.support
            )?;
        }
        Ok(())
    }
}

/// Predictions and metrics on a held-out set.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Predicted class per row.
    pub predictions: Vec<usize>,
    /// Fraction of rows predicted correctly.
    pub accuracy: f64,
    /// Counts by true and predicted class.
    pub confusion_matrix: ConfusionMatrix,
    /// Per-class precision, recall, F1 and support.
    pub report: ClassificationReport,
}

/// Score `forest` on a labelled set.
///
/// `feature_names` must equal the names the forest was fit on, in order.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::SchemaMismatch`] | Feature names differ in count or order |
/// | [`RfError::PredictionFeatureMismatch`] | A row has the wrong width |
/// | [`RfError::EmptyDataset`] | Zero rows |
/// | [`RfError::LabelCountMismatch`] | Labels not aligned with rows |
/// | [`RfError::LabelOutOfRange`] | A label is outside the forest's classes |
#[instrument(skip_all, fields(n_samples = features.len()))]
pub fn evaluate(
    forest: &RandomForest,
    features: &[Vec<f64>],
    feature_names: &[String],
    labels: &[usize],
) -> Result<Evaluation, RfError> {
    if feature_names != forest.feature_names() {
        return Err(RfError::SchemaMismatch {
            expected: forest.feature_names().to_vec(),
            got: feature_names.to_vec(),
        });
    }
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }

    let predictions = forest.predict_batch(features)?;
    let confusion_matrix = ConfusionMatrix::from_labels(labels, &predictions, forest.n_classes())?;
    let report = ClassificationReport::from_confusion(&confusion_matrix);
    let accuracy = confusion_matrix.accuracy();

    info!(accuracy, "evaluation complete");

    Ok(Evaluation {
        predictions,
        accuracy,
        confusion_matrix,
        report,
    })
}
