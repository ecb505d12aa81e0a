//! Seeded shuffled train/test split.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::PrepError;

/// Disjoint row indices covering every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    /// Training row indices, in shuffled order.
    pub train: Vec<usize>,
    /// Held-out row indices, in shuffled order.
    pub test: Vec<usize>,
}

impl TrainTestSplit {
    /// Gather `(train, test)` copies of `rows`.
    #[must_use]
    pub fn select<T: Clone>(&self, rows: &[T]) -> (Vec<T>, Vec<T>) {
        let pick = |idx: &[usize]| -> Vec<T> {
            idx.iter().map(|&i| rows[i].clone()).collect()
        };
        (pick(&self.train), pick(&self.test))
    }
}

/// Shuffle `0..n_samples` with a seeded RNG and hold out the first
/// `ceil(test_fraction * n_samples)` rows of the permutation.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PrepError::InvalidTestFraction`] | Fraction not strictly inside (0, 1) |
/// | [`PrepError::TooFewSamples`] | Train or test side would be empty |
pub fn train_test_split(
    n_samples: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, PrepError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PrepError::InvalidTestFraction {
            fraction: test_fraction,
        });
    }
    let n_test = (test_fraction * n_samples as f64).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(PrepError::TooFewSamples {
            n_samples,
            fraction: test_fraction,
        });
    }

    let mut order: Vec<usize> = (0..n_samples).collect();
    order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    let train = order.split_off(n_test);
    debug!(n_train = train.len(), n_test, "train/test split");

    Ok(TrainTestSplit { train, test: order })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_follow_ceil() {
        let split = train_test_split(101, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 21);
        assert_eq!(split.train.len(), 80);
        let split = train_test_split(100, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 20);
    }

    #[test]
    fn disjoint_and_covering() {
        let split = train_test_split(57, 0.3, 1).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..57).collect::<Vec<_>>());
    }

    #[test]
    fn seeded() {
        assert_eq!(train_test_split(50, 0.2, 9).unwrap(), train_test_split(50, 0.2, 9).unwrap());
        assert_ne!(train_test_split(50, 0.2, 9).unwrap(), train_test_split(50, 0.2, 10).unwrap());
    }

    #[test]
    fn select_gathers_rows() {
        let split = TrainTestSplit {
            train: vec![2, 0],
            test: vec![1],
        };
        let (train, test) = split.select(&["a", "b", "c"]);
        assert_eq!(train, vec!["c", "a"]);
        assert_eq!(test, vec!["b"]);
    }

    #[test]
    fn invalid_inputs() {
        assert!(matches!(
            train_test_split(10, 0.0, 0),
            Err(PrepError::InvalidTestFraction { .. })
        ));
        assert!(matches!(
            train_test_split(10, 1.0, 0),
            Err(PrepError::InvalidTestFraction { .. })
        ));
        assert!(matches!(
            train_test_split(1, 0.5, 0),
            Err(PrepError::TooFewSamples { .. })
        ));
        assert!(matches!(
            train_test_split(0, 0.2, 0),
            Err(PrepError::TooFewSamples { .. })
        ));
    }
}
