//! Confusion matrix and per-class classification metrics.

use std::fmt;

use serde::Serialize;

use crate::error::RfError;

/// `matrix[true_class][predicted_class]` counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

/// Per-class precision, recall, F1 and support.
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    /// The class index.
    pub class: usize,
    /// TP / (TP + FP); 0.0 when the class is never predicted.
    pub precision: f64,
    /// TP / (TP + FN); 0.0 when the class has no true samples.
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0.0 when both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from aligned true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero labels provided |
    /// | [`RfError::LabelCountMismatch`] | Slices differ in length |
    /// | [`RfError::LabelOutOfRange`] | A true or predicted label is `>= n_classes` |
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if true_labels.len() != predicted.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: predicted.len(),
                n_labels: true_labels.len(),
            });
        }
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (sample_index, (&t, &p)) in true_labels.iter().zip(predicted).enumerate() {
            let label = t.max(p);
            if label >= n_classes {
                return Err(RfError::LabelOutOfRange {
                    label,
                    sample_index,
                    n_classes,
                });
            }
            matrix[t][p] += 1;
        }
        Ok(Self { matrix, n_classes })
    }

    /// Total number of samples counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Fraction of samples on the diagonal.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }

    /// True positives for `class`.
    #[must_use]
    pub fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    /// Samples predicted as `class` whose true class differs.
    #[must_use]
    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&t| t != class)
            .map(|t| self.matrix[t][class])
            .sum()
    }

    /// Samples of `class` predicted as something else.
    #[must_use]
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&p| p != class)
            .map(|p| self.matrix[class][p])
            .sum()
    }

    /// Per-class precision, recall, F1 and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|c| {
                let tp = self.true_positives(c);
                let fp = self.false_positives(c);
                let support = tp + self.false_negatives(c);
                let precision = ratio(tp, tp + fp);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Element-wise sum with another matrix of the same size.
    pub(crate) fn merge(&mut self, other: &ConfusionMatrix) {
        for (row, other_row) in self.matrix.iter_mut().zip(&other.matrix) {
            for (cell, &o) in row.iter_mut().zip(other_row) {
                *cell += o;
            }
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for j in 0..self.n_classes {
            write!(f, " pred_{j:<3}")?;
        }
        writeln!(f)?;
        for (i, row) in self.matrix.iter().enumerate() {
            write!(f, "true_{i:<3}")?;
            for val in row {
                write!(f, " {val:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
