//! Pairwise Pearson correlation between columns.

use serde::Serialize;
use tracing::instrument;

use crate::error::PrepError;

/// Symmetric matrix of Pearson coefficients with unit diagonal.
///
/// Off-diagonal entries involving a zero-variance column are NaN.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Column names, in matrix order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Matrix side length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Coefficient between columns `i` and `j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<f64>] {
        &self.values
    }
}

/// Pearson correlation over column-major data.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PrepError::ZeroFeatures`] | No columns |
/// | [`PrepError::EmptyDataset`] | Columns are empty |
/// | [`PrepError::NameCountMismatch`] | `names.len() != columns.len()` |
/// | [`PrepError::ColumnLengthMismatch`] | Columns differ in length |
#[instrument(skip_all, fields(n_columns = columns.len()))]
pub fn correlation_matrix(columns: &[Vec<f64>], names: &[String]) -> Result<CorrelationMatrix, PrepError> {
    let first = columns.first().ok_or(PrepError::ZeroFeatures)?;
    if names.len() != columns.len() {
        return Err(PrepError::NameCountMismatch {
            n_columns: columns.len(),
            n_names: names.len(),
        });
    }
    let n = first.len();
    if n == 0 {
        return Err(PrepError::EmptyDataset);
    }
    if let Some((column_index, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n) {
        return Err(PrepError::ColumnLengthMismatch {
            expected: n,
            got: col.len(),
            column_index,
        });
    }

    // Centre each column once; the coefficient is then a normalized dot product.
    let centred: Vec<Vec<f64>> = columns
        .iter()
        .map(|col| {
            let mean = col.iter().sum::<f64>() / n as f64;
            col.iter().map(|&x| x - mean).collect()
        })
        .collect();
    let norms: Vec<f64> = centred
        .iter()
        .map(|c| c.iter().map(|x| x * x).sum::<f64>().sqrt())
        .collect();

    let k = columns.len();
    let mut values = vec![vec![0.0f64; k]; k];
    for i in 0..k {
        values[i][i] = 1.0;
        for j in (i + 1)..k {
            let r = if norms[i] == 0.0 || norms[j] == 0.0 {
                f64::NAN
            } else {
                let dot: f64 = centred[i].iter().zip(&centred[j]).map(|(a, b)| a * b).sum();
                (dot / (norms[i] * norms[j])).clamp(-1.0, 1.0)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        names: names.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn perfect_and_anti_correlation() {
        let cols = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![2.0, 4.0, 6.0, 8.0],
            vec![4.0, 3.0, 2.0, 1.0],
        ];
        let m = correlation_matrix(&cols, &names(3)).unwrap();
        assert!((m.get(0, 1) - 1.0).abs() < 1e-12);
        assert!((m.get(0, 2) + 1.0).abs() < 1e-12);
        assert!((m.get(1, 2) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_with_unit_diagonal() {
        let cols = vec![
            vec![1.0, 5.0, 2.0, 8.0, 3.0],
            vec![0.5, 0.1, 0.9, 0.3, 0.7],
            vec![10.0, 12.0, 9.0, 15.0, 11.0],
        ];
        let m = correlation_matrix(&cols, &names(3)).unwrap();
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..3 {
                assert_eq!(m.get(i, j), m.get(j, i));
                assert!((-1.0..=1.0).contains(&m.get(i, j)));
            }
        }
    }

    #[test]
    fn known_value() {
        // x = 1..5, y = [2, 4, 5, 4, 5] -> r = 0.7745966...
        let cols = vec![vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.0, 4.0, 5.0, 4.0, 5.0]];
        let m = correlation_matrix(&cols, &names(2)).unwrap();
        assert!((m.get(0, 1) - 0.774_596_669_241_483_4).abs() < 1e-12);
    }

    #[test]
    fn constant_column_is_nan_off_diagonal() {
        let cols = vec![vec![1.0, 2.0, 3.0], vec![7.0, 7.0, 7.0]];
        let m = correlation_matrix(&cols, &names(2)).unwrap();
        assert!(m.get(0, 1).is_nan());
        assert_eq!(m.get(1, 1), 1.0);
    }

    #[test]
    fn errors() {
        assert!(matches!(correlation_matrix(&[], &[]), Err(PrepError::ZeroFeatures)));
        assert!(matches!(
            correlation_matrix(&[vec![1.0]], &names(2)),
            Err(PrepError::NameCountMismatch { .. })
        ));
        assert!(matches!(
            correlation_matrix(&[vec![1.0, 2.0], vec![1.0]], &names(2)),
            Err(PrepError::ColumnLengthMismatch { column_index: 1, .. })
        ));
    }
}
