//! Per-feature standardization to zero mean and unit variance.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::PrepError;

/// Fits per-feature mean and population standard deviation.
///
/// Columns with zero variance get scale 1.0, so they are centred to zero
/// instead of dividing by zero. See [`FittedScaler::constant_features`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

/// Scaling parameters learned by [`StandardScaler::fit`]. Immutable once fit.
#[derive(Debug, Clone, Serialize)]
pub struct FittedScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
    scale: Vec<f64>,
    constant_features: Vec<usize>,
}

/// Standardized rows with their labels reattached.
#[derive(Debug, Clone)]
pub struct ScaledData {
    /// Standardized feature rows, in input order.
    pub features: Vec<Vec<f64>>,
    /// Labels, unchanged.
    pub labels: Vec<usize>,
    /// Feature column names, unchanged.
    pub feature_names: Vec<String>,
    /// The parameters used.
    pub scaler: FittedScaler,
}

impl StandardScaler {
    /// Create a scaler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Learn mean and population standard deviation (n denominator) per column.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PrepError::EmptyDataset`] | Zero rows |
    /// | [`PrepError::ZeroFeatures`] | Rows have zero columns |
    /// | [`PrepError::FeatureCountMismatch`] | Rows differ in width |
    #[instrument(skip_all, fields(n_rows = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>]) -> Result<FittedScaler, PrepError> {
        let n_features = check_rectangular(features)?;
        let n = features.len() as f64;

        let mut mean = vec![0.0f64; n_features];
        let mut min = vec![f64::INFINITY; n_features];
        let mut max = vec![f64::NEG_INFINITY; n_features];
        for row in features {
            for (j, &x) in row.iter().enumerate() {
                mean[j] += x;
                min[j] = min[j].min(x);
                max[j] = max[j].max(x);
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        // A summed mean of a non-representable constant carries rounding
        // error, so constancy is decided on the exact range instead of the std.
        let constant_features: Vec<usize> = (0..n_features).filter(|&j| min[j] == max[j]).collect();
        for &j in &constant_features {
            mean[j] = min[j];
        }

        let mut variance = vec![0.0f64; n_features];
        for row in features {
            for ((v, &x), &m) in variance.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }
        let std: Vec<f64> = variance.iter().map(|v| (v / n).sqrt()).collect();

        let scale: Vec<f64> = std
            .iter()
            .enumerate()
            .map(|(j, &s)| if min[j] == max[j] { 1.0 } else { s })
            .collect();

        if !constant_features.is_empty() {
            warn!(
                columns = ?constant_features,
                "zero-variance features will be centred but not scaled"
            );
        }
        debug!(n_features, "scaler fitted");

        Ok(FittedScaler {
            mean,
            std,
            scale,
            constant_features,
        })
    }

    /// Fit on `features` and transform them in one step.
    ///
    /// # Errors
    ///
    /// Same as [`StandardScaler::fit`].
    pub fn fit_transform(
        &self,
        features: &[Vec<f64>],
    ) -> Result<(FittedScaler, Vec<Vec<f64>>), PrepError> {
        let fitted = self.fit(features)?;
        let scaled = fitted.transform(features)?;
        Ok((fitted, scaled))
    }
}

impl FittedScaler {
    /// Apply `(x - mean) / scale` to every row.
    ///
    /// # Errors
    ///
    /// Returns [`PrepError::FeatureCountMismatch`] if a row's width differs
    /// from the fitted feature count.
    pub fn transform(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, PrepError> {
        features
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                if row.len() != self.n_features() {
                    return Err(PrepError::FeatureCountMismatch {
                        expected: self.n_features(),
                        got: row.len(),
                        row_index,
                    });
                }
                Ok(row
                    .iter()
                    .zip(&self.mean)
                    .zip(&self.scale)
                    .map(|((&x, &m), &s)| (x - m) / s)
                    .collect())
            })
            .collect()
    }

    /// Per-feature mean.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Per-feature population standard deviation as measured.
    #[must_use]
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Per-feature divisor; 1.0 for constant columns.
    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Number of features seen during fit.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Column indices whose values were all equal at fit time.
    #[must_use]
    pub fn constant_features(&self) -> &[usize] {
        &self.constant_features
    }
}

/// Fit a scaler on all of `features`, transform them, and reattach `labels`.
///
/// Row order is preserved.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PrepError::LabelCountMismatch`] | Labels not aligned with rows |
/// | [`PrepError::NameCountMismatch`] | One name per feature column required |
/// | Others | Same as [`StandardScaler::fit`] |
pub fn standardize_dataset(
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[String],
) -> Result<ScaledData, PrepError> {
    if features.len() != labels.len() {
        return Err(PrepError::LabelCountMismatch {
            n_rows: features.len(),
            n_labels: labels.len(),
        });
    }
    let (scaler, features) = StandardScaler::new().fit_transform(features)?;
    if feature_names.len() != scaler.n_features() {
        return Err(PrepError::NameCountMismatch {
            n_columns: scaler.n_features(),
            n_names: feature_names.len(),
        });
    }
    Ok(ScaledData {
        features,
        labels: labels.to_vec(),
        feature_names: feature_names.to_vec(),
        scaler,
    })
}

/// Width of the rows, checking they are non-empty and all equally wide.
pub(crate) fn check_rectangular(rows: &[Vec<f64>]) -> Result<usize, PrepError> {
    let first = rows.first().ok_or(PrepError::EmptyDataset)?;
    let width = first.len();
    if width == 0 {
        return Err(PrepError::ZeroFeatures);
    }
    if let Some((row_index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(PrepError::FeatureCountMismatch {
            expected: width,
            got: row.len(),
            row_index,
        });
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(rows: &[Vec<f64>], j: usize) -> Vec<f64> {
        rows.iter().map(|r| r[j]).collect()
    }

    #[test]
    fn columns_have_zero_mean_unit_std() {
        let rows = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 45.0],
        ];
        let (fitted, scaled) = StandardScaler::new().fit_transform(&rows).unwrap();
        assert_eq!(fitted.n_features(), 2);
        for j in 0..2 {
            let col = column(&scaled, j);
            let mean = col.iter().sum::<f64>() / 4.0;
            let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-12, "mean = {mean}");
            assert!((var.sqrt() - 1.0).abs() < 1e-12, "std = {}", var.sqrt());
        }
    }

    #[test]
    fn population_std() {
        let fitted = StandardScaler::new()
            .fit(&[vec![2.0], vec![4.0], vec![4.0], vec![4.0], vec![5.0], vec![5.0], vec![7.0], vec![9.0]])
            .unwrap();
        assert!((fitted.mean()[0] - 5.0).abs() < 1e-12);
        assert!((fitted.std()[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_is_centred_not_divided() {
        let rows = vec![vec![1.0, 3.0], vec![2.0, 3.0], vec![3.0, 3.0]];
        let (fitted, scaled) = StandardScaler::new().fit_transform(&rows).unwrap();
        assert_eq!(fitted.constant_features(), &[1]);
        assert_eq!(fitted.scale()[1], 1.0);
        assert!(scaled.iter().all(|r| r[1] == 0.0 && r.iter().all(|v| v.is_finite())));
    }

    #[test]
    fn inexact_constant_is_detected() {
        for (n, v) in [(3680, 0.1), (80, 1000.3)] {
            let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, v]).collect();
            let (fitted, scaled) = StandardScaler::new().fit_transform(&rows).unwrap();
            assert_eq!(fitted.constant_features(), &[1], "constant {v} over {n} rows");
            assert_eq!(fitted.scale()[1], 1.0);
            assert_eq!(fitted.mean()[1], v);
            assert!(scaled.iter().all(|r| r[1] == 0.0));

            // An unseen value is shifted, not blown up by a noise-level std.
            let out = fitted.transform(&[vec![0.0, v + 1.0]]).unwrap();
            assert!((out[0][1] - 1.0).abs() < 1e-9, "got {}", out[0][1]);
        }
    }

    #[test]
    fn transform_uses_fitted_parameters() {
        let fitted = StandardScaler::new().fit(&[vec![0.0], vec![2.0]]).unwrap();
        let out = fitted.transform(&[vec![4.0]]).unwrap();
        // mean 1, std 1
        assert!((out[0][0] - 3.0).abs() < 1e-12);
        // Parameters are unchanged by transform.
        assert!((fitted.mean()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let fitted = StandardScaler::new().fit(&[vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        let err = fitted.transform(&[vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            PrepError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                row_index: 0
            }
        ));
    }

    #[test]
    fn standardize_dataset_keeps_labels_and_order() {
        let rows = vec![vec![5.0], vec![1.0], vec![3.0]];
        let names = vec!["make".to_string()];
        let scaled = standardize_dataset(&rows, &[1, 0, 1], &names).unwrap();
        assert_eq!(scaled.labels, vec![1, 0, 1]);
        assert_eq!(scaled.feature_names, names);
        assert!(scaled.features[0][0] > 0.0);
        assert!(scaled.features[1][0] < 0.0);
        assert!(scaled.features[2][0].abs() < 1e-12);
    }

    #[test]
    fn errors() {
        assert!(matches!(StandardScaler::new().fit(&[]), Err(PrepError::EmptyDataset)));
        assert!(matches!(
            StandardScaler::new().fit(&[vec![]]),
            Err(PrepError::ZeroFeatures)
        ));
        assert!(matches!(
            standardize_dataset(&[vec![1.0]], &[0, 1], &["a".to_string()]),
            Err(PrepError::LabelCountMismatch { .. })
        ));
        assert!(matches!(
            standardize_dataset(&[vec![1.0, 2.0]], &[0], &["a".to_string()]),
            Err(PrepError::NameCountMismatch { n_columns: 2, n_names: 1 })
        ));
    }
}
