//! Spambase CSV reader with full input validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::dataset::Dataset;
use crate::schema::{N_FEATURES, SPAMBASE_COLUMNS, feature_names};

/// Reads a headerless Spambase CSV file.
///
/// Expected format:
/// - No header row; column names come from [`SPAMBASE_COLUMNS`]
/// - 57 numeric feature fields followed by a 0/1 label, comma separated
/// - Surrounding whitespace in a field is ignored
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::WrongColumnCount`] | Row does not have 58 fields |
/// | [`IoError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable |
/// | [`IoError::InvalidLabel`] | Label cell is not 0 or 1 |
pub struct SpambaseReader {
    path: PathBuf,
}

impl SpambaseReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets short or long rows through so WrongColumnCount
        // fires instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let expected = SPAMBASE_COLUMNS.len();
        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected {
                return Err(IoError::WrongColumnCount {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let mut row = Vec::with_capacity(N_FEATURES);
            for (col_index, raw) in record.iter().take(N_FEATURES).enumerate() {
                row.push(self.parse_feature(raw, row_index, col_index)?);
            }
            let raw_label = record.get(N_FEATURES).unwrap_or("");
            labels.push(self.parse_label(raw_label, row_index)?);
            features.push(row);
        }

        if features.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let dataset = Dataset::new(feature_names(), features, labels);
        let counts = dataset.class_counts();
        debug!(not_spam = counts[0], spam = counts[1], "class balance");
        info!(
            n_rows = dataset.n_samples(),
            n_features = dataset.n_features(),
            "spambase dataset loaded"
        );

        Ok(dataset)
    }

    fn parse_feature(&self, raw: &str, row_index: usize, col_index: usize) -> Result<f64, IoError> {
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(IoError::NonFiniteValue {
                path: self.path.clone(),
                row_index,
                col_index,
                raw: raw.to_string(),
            }),
        }
    }

    /// Accept `0`/`1`, including float spellings such as `1.0`.
    fn parse_label(&self, raw: &str, row_index: usize) -> Result<usize, IoError> {
        match raw.parse::<f64>() {
            Ok(v) if v == 0.0 => Ok(0),
            Ok(v) if v == 1.0 => Ok(1),
            _ => Err(IoError::InvalidLabel {
                path: self.path.clone(),
                row_index,
                raw: raw.to_string(),
            }),
        }
    }
}
