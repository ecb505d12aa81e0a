use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::node::FeatureIndex;

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitCriterion {
    /// Gini impurity: `1 - Σ p_i²`.
    Gini,
    /// Shannon entropy in bits: `-Σ p_i · log2(p_i)`.
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node with the given class counts.
    ///
    /// An empty node has impurity 0.
    #[must_use]
    pub fn impurity(self, class_counts: &[usize], n_samples: usize) -> f64 {
        if n_samples == 0 {
            return 0.0;
        }
        let n = n_samples as f64;
        match self {
            SplitCriterion::Gini => {
                1.0 - class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum::<f64>()
            }
            SplitCriterion::Entropy => -class_counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.log2()
                })
                .sum::<f64>(),
        }
    }
}

impl fmt::Display for SplitCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitCriterion::Gini => f.write_str("gini"),
            SplitCriterion::Entropy => f.write_str("entropy"),
        }
    }
}

/// Best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// `n·I(parent) - n_l·I(left) - n_r·I(right)`.
    pub(crate) impurity_decrease: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Read-only inputs shared by every split search in one tree.
///
/// `columns` is column-major: `columns[feature][sample]`.
pub(crate) struct SplitSearch<'a> {
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch<'_> {
    /// Find the best exact split for the samples in `samples`.
    ///
    /// Features are visited in random order until `max_features` non-constant
    /// features have been scanned; constant features do not count toward the
    /// budget. Returns `None` when no feature admits a split that respects
    /// `min_samples_leaf`.
    pub(crate) fn best_split(&self, samples: &[usize], rng: &mut impl Rng) -> Option<SplitResult> {
        let n = samples.len();
        let n_features = self.columns.len();
        if n < 2 || n_features == 0 {
            return None;
        }

        let mut parent_counts = vec![0usize; self.n_classes];
        for &s in samples {
            parent_counts[self.labels[s]] += 1;
        }
        let parent_weighted = n as f64 * self.criterion.impurity(&parent_counts, n);

        let mut order: Vec<usize> = (0..n_features).collect();
        let mut visited = 0usize;
        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);

        for i in 0..n_features {
            if visited >= self.max_features {
                break;
            }
            let j = rng.gen_range(i..n_features);
            order.swap(i, j);
            let feature = order[i];
            let column = &self.columns[feature];

            sorted.clear();
            sorted.extend(samples.iter().map(|&s| (column[s], self.labels[s])));
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
            if sorted[0].0 == sorted[n - 1].0 {
                continue;
            }
            visited += 1;

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.clone();
            for k in 0..n - 1 {
                let (value, class) = sorted[k];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next = sorted[k + 1].0;
                if value == next {
                    continue;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let decrease = parent_weighted
                    - n_left as f64 * self.criterion.impurity(&left_counts, n_left)
                    - n_right as f64 * self.criterion.impurity(&right_counts, n_right);
                if best.is_none_or(|(_, _, d)| decrease > d) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some((feature, threshold, decrease));
                }
            }
        }

        let (feature, threshold, impurity_decrease) = best?;
        let column = &self.columns[feature];
        let (left, right): (Vec<usize>, Vec<usize>) =
            samples.iter().partition(|&&s| column[s] <= threshold);

        Some(SplitResult {
            feature: FeatureIndex::new(feature),
            threshold,
            impurity_decrease,
            left,
            right,
        })
    }
}
