//! Printable dataset diagnostics: preview, column info, describe.

use std::fmt;

use serde::Serialize;

/// Columns shown at each edge when a preview is too wide.
const EDGE_COLUMNS: usize = 5;

/// The first rows of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    /// All column names, label last.
    pub columns: Vec<String>,
    /// Row values aligned with `columns`.
    pub rows: Vec<Vec<f64>>,
    /// Row count of the whole dataset.
    pub total_rows: usize,
}

impl Preview {
    /// Column indices to print; `None` marks the elided middle.
    fn visible_columns(&self) -> Vec<Option<usize>> {
        let n = self.columns.len();
        if n <= 2 * EDGE_COLUMNS {
            return (0..n).map(Some).collect();
        }
        (0..EDGE_COLUMNS)
            .map(Some)
            .chain(std::iter::once(None))
            .chain((n - EDGE_COLUMNS..n).map(Some))
            .collect()
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible = self.visible_columns();
        let cell = |row: &[f64], col: Option<usize>| match col {
            Some(j) => format_value(row[j]),
            None => "...".to_string(),
        };
        let widths: Vec<usize> = visible
            .iter()
            .map(|&col| {
                let header = col.map_or(3, |j| self.columns[j].len());
                self.rows
                    .iter()
                    .map(|row| cell(row, col).len())
                    .fold(header, usize::max)
            })
            .collect();
        let index_width = self.rows.len().saturating_sub(1).to_string().len();

        write!(f, "{:index_width$}", "")?;
        for (&col, &w) in visible.iter().zip(&widths) {
            let name = col.map_or("...", |j| self.columns[j].as_str());
            write!(f, "  {name:>w$}")?;
        }
        writeln!(f)?;
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{i:<index_width$}")?;
            for (&col, &w) in visible.iter().zip(&widths) {
                write!(f, "  {:>w$}", cell(row, col))?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "\n[{} rows x {} columns]",
            self.total_rows,
            self.columns.len()
        )
    }
}

/// Storage type inferred from a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    /// Every value is integral.
    Int64,
    /// At least one value has a fractional part.
    Float64,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Int64 => f.write_str("int64"),
            Dtype::Float64 => f.write_str("float64"),
        }
    }
}

/// One line of the column overview.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    /// Zero-based column position.
    pub index: usize,
    /// Column name.
    pub name: String,
    /// Number of present values.
    pub non_null: usize,
    /// Number of missing values.
    pub nulls: usize,
    /// Inferred storage type.
    pub dtype: Dtype,
}

impl fmt::Display for ColumnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3}  {:<28} {} non-null  {}",
            self.index, self.name, self.non_null, self.dtype
        )
    }
}

/// Summary statistics for one column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Number of values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN below two values.
    pub std: f64,
    /// Smallest value.
    pub min: f64,
    /// 25th percentile.
    pub q25: f64,
    /// Median.
    pub q50: f64,
    /// 75th percentile.
    pub q75: f64,
    /// Largest value.
    pub max: f64,
}

impl ColumnStats {
    pub(crate) fn from_values(name: String, mut values: Vec<f64>) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                name,
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = if count < 2 {
            f64::NAN
        } else {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };
        values.sort_by(f64::total_cmp);
        Self {
            name,
            count,
            mean,
            std,
            min: values[0],
            q25: quantile(&values, 0.25),
            q50: quantile(&values, 0.50),
            q75: quantile(&values, 0.75),
            max: values[count - 1],
        }
    }
}

/// Linear interpolation between closest ranks of sorted `values`.
pub(crate) fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Summary statistics for every column.
#[derive(Debug, Clone, Serialize)]
pub struct Describe {
    /// One entry per column, in column order.
    pub columns: Vec<ColumnStats>,
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .columns
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0);
        write!(f, "{:name_width$}", "")?;
        for header in ["count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
            write!(f, " {header:>11}")?;
        }
        writeln!(f)?;
        for c in &self.columns {
            write!(f, "{:<name_width$} {:>11}", c.name, c.count)?;
            for v in [c.mean, c.std, c.min, c.q25, c.q50, c.q75, c.max] {
                write!(f, " {v:>11.6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Integral values print without a fraction, others with up to six decimals.
fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
