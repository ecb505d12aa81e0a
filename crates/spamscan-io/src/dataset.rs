//! The loaded Spambase table.

use crate::schema::LABEL_COLUMN;
use crate::summary::{ColumnInfo, ColumnStats, Describe, Dtype, Preview};

/// Spambase rows split into a feature matrix and a label vector.
///
/// Produced by [`SpambaseReader`](crate::SpambaseReader). `features[i]` and
/// `labels[i]` describe the same row, in file order.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature column names, label excluded.
    feature_names: Vec<String>,
    /// Feature values: `features[sample_index][feature_index]`.
    features: Vec<Vec<f64>>,
    /// 0 = not spam, 1 = spam.
    labels: Vec<usize>,
}

impl Dataset {
    pub(crate) fn new(feature_names: Vec<String>, features: Vec<Vec<f64>>, labels: Vec<usize>) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        Self {
            feature_names,
            features,
            labels,
        }
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Feature column names, label excluded.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Row-major feature matrix.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Label per row.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// All column names, label last.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let mut names = self.feature_names.clone();
        names.push(LABEL_COLUMN.to_string());
        names
    }

    /// Column-major copy of the full table, label column last.
    #[must_use]
    pub fn columns(&self) -> Vec<Vec<f64>> {
        let mut columns: Vec<Vec<f64>> = (0..self.n_features())
            .map(|j| self.features.iter().map(|row| row[j]).collect())
            .collect();
        columns.push(self.labels.iter().map(|&l| l as f64).collect());
        columns
    }

    /// Row counts for class 0 and class 1.
    #[must_use]
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; 2];
        for &label in &self.labels {
            if label >= counts.len() {
                counts.resize(label + 1, 0);
            }
            counts[label] += 1;
        }
        counts
    }

    /// The first `n` rows (fewer if the table is shorter), label included.
    #[must_use]
    pub fn head(&self, n: usize) -> Preview {
        let rows = self
            .features
            .iter()
            .zip(&self.labels)
            .take(n)
            .map(|(row, &label)| {
                let mut values = row.clone();
                values.push(label as f64);
                values
            })
            .collect();
        Preview {
            columns: self.column_names(),
            rows,
            total_rows: self.n_samples(),
        }
    }

    /// Per-column name, inferred dtype and null counts.
    ///
    /// A column whose every value is integral reports `int64`.
    #[must_use]
    pub fn info(&self) -> Vec<ColumnInfo> {
        let n = self.n_samples();
        self.column_names()
            .into_iter()
            .zip(self.columns())
            .enumerate()
            .map(|(index, (name, values))| ColumnInfo {
                index,
                name,
                non_null: n,
                nulls: 0,
                dtype: if values.iter().all(|v| v.fract() == 0.0) {
                    Dtype::Int64
                } else {
                    Dtype::Float64
                },
            })
            .collect()
    }

    /// Missing-value count per column.
    ///
    /// The reader rejects missing or unparseable cells, so every count is zero
    /// for a loaded dataset.
    #[must_use]
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        self.info().into_iter().map(|c| (c.name, c.nulls)).collect()
    }

    /// Summary statistics for every column, label included.
    #[must_use]
    pub fn describe(&self) -> Describe {
        let columns = self
            .column_names()
            .into_iter()
            .zip(self.columns())
            .map(|(name, values)| ColumnStats::from_values(name, values))
            .collect();
        Describe { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Dataset {
        Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 0.5], vec![2.0, 1.5], vec![3.0, 2.5], vec![4.0, 3.5]],
            vec![0, 1, 1, 0],
        )
    }

    #[test]
    fn columns_are_transposed_with_label_last() {
        let ds = small();
        let cols = ds.columns();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[0], vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(cols[2], vec![0.0, 1.0, 1.0, 0.0]);
        assert_eq!(ds.column_names(), vec!["a", "b", "target"]);
    }

    #[test]
    fn head_truncates() {
        let ds = small();
        let preview = ds.head(2);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[1], vec![2.0, 1.5, 1.0]);
        assert_eq!(ds.head(10).rows.len(), 4);
    }

    #[test]
    fn info_infers_dtypes() {
        let info = small().info();
        assert_eq!(info[0].dtype, Dtype::Int64);
        assert_eq!(info[1].dtype, Dtype::Float64);
        assert_eq!(info[2].dtype, Dtype::Int64);
        assert!(info.iter().all(|c| c.non_null == 4 && c.nulls == 0));
    }

    #[test]
    fn null_counts_are_zero() {
        let nulls = small().null_counts();
        assert_eq!(nulls.len(), 3);
        assert!(nulls.iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn class_counts_binary() {
        assert_eq!(small().class_counts(), vec![2, 2]);
    }

    #[test]
    fn describe_covers_label() {
        let d = small().describe();
        assert_eq!(d.columns.len(), 3);
        assert_eq!(d.columns[2].name, "target");
        assert!((d.columns[0].mean - 2.5).abs() < 1e-12);
    }
}
