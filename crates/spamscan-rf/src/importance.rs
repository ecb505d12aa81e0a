//! Feature importance aggregation across trees.

use serde::Serialize;

/// A feature with its normalized importance and 1-based rank.
#[derive(Debug, Clone, Serialize)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Importance, normalized so all features sum to 1.0.
    pub importance: f64,
    /// 1 = most important.
    pub rank: usize,
}

/// Sum per-tree importance vectors, normalize, and rank descending.
///
/// Equal importances keep column order.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    if per_tree.is_empty() || names.is_empty() {
        return Vec::new();
    }

    let mut totals = vec![0.0f64; names.len()];
    for tree in per_tree {
        for (total, &value) in totals.iter_mut().zip(tree) {
            *total += value;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(totals)
        .map(|(name, importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, feature) in ranked.iter_mut().enumerate() {
        feature.rank = i + 1;
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{i}")).collect()
    }

    #[test]
    fn normalizes_and_ranks() {
        let per_tree = vec![vec![0.0, 1.0, 0.0], vec![0.5, 0.5, 0.0]];
        let ranked = aggregate_importances(&per_tree, &names(3));
        assert_eq!(ranked[0].name, "f1");
        assert_eq!(ranked[0].rank, 1);
        assert!((ranked[0].importance - 0.75).abs() < 1e-12);
        assert_eq!(ranked[1].name, "f0");
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn all_zero_stays_zero() {
        let ranked = aggregate_importances(&[vec![0.0, 0.0]], &names(2));
        assert!(ranked.iter().all(|f| f.importance == 0.0));
        assert_eq!(ranked[0].name, "f0");
    }

    #[test]
    fn empty_inputs() {
        assert!(aggregate_importances(&[], &names(2)).is_empty());
    }
}
