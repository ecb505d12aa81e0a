//! Integration tests: CSV on disk -> Dataset -> diagnostics.

use std::io::Write;

use spamscan_io::{Dtype, IoError, LABEL_COLUMN, SPAMBASE_COLUMNS, SpambaseReader};
use tempfile::NamedTempFile;

/// Ten rows in Spambase layout. Column 0 holds 0.0..0.9, column 55 holds
/// integral run lengths, and the label alternates starting with spam.
fn write_fixture() -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    for i in 0..10 {
        let mut fields: Vec<String> = (0..57)
            .map(|j| match j {
                0 => format!("{:.1}", i as f64 * 0.1),
                55 => format!("{}", 10 + i),
                _ => format!("{:.2}", ((i * 7 + j) % 13) as f64 / 10.0),
            })
            .collect();
        fields.push(if i % 2 == 0 { "1" } else { "0" }.to_string());
        writeln!(f, "{}", fields.join(",")).unwrap();
    }
    f.flush().unwrap();
    f
}

#[test]
fn load_and_summarize() {
    let f = write_fixture();
    let ds = SpambaseReader::new(f.path()).read().expect("fixture should parse");

    assert_eq!(ds.n_samples(), 10);
    assert_eq!(ds.n_features(), 57);
    assert_eq!(ds.column_names().len(), SPAMBASE_COLUMNS.len());
    assert_eq!(ds.column_names().last().map(String::as_str), Some(LABEL_COLUMN));
    assert_eq!(ds.class_counts(), vec![5, 5]);

    let columns = ds.columns();
    assert_eq!(columns.len(), 58);
    assert_eq!(columns[57].len(), 10);

    // Column 0 is 0.0, 0.1, ..., 0.9.
    let describe = ds.describe();
    let make = &describe.columns[0];
    assert_eq!(make.name, "make");
    assert_eq!(make.count, 10);
    assert!((make.mean - 0.45).abs() < 1e-9);
    assert!((make.q25 - 0.225).abs() < 1e-9);
    assert!((make.q50 - 0.45).abs() < 1e-9);
    assert!((make.q75 - 0.675).abs() < 1e-9);
    assert!((make.max - 0.9).abs() < 1e-9);

    let info = ds.info();
    assert_eq!(info.len(), 58);
    assert_eq!(info[0].dtype, Dtype::Float64);
    assert_eq!(info[55].dtype, Dtype::Int64);
    assert_eq!(info[57].dtype, Dtype::Int64);
    assert!(ds.null_counts().iter().all(|(_, n)| *n == 0));

    let preview = ds.head(5).to_string();
    assert!(preview.contains("make"));
    assert!(preview.contains("target"));
    assert!(preview.contains("[10 rows x 58 columns]"));
}

#[test]
fn error_names_the_file() {
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "1,2,3").unwrap();
    f.flush().unwrap();
    let err = SpambaseReader::new(f.path()).read().unwrap_err();
    assert!(matches!(err, IoError::WrongColumnCount { got: 3, .. }));
    assert!(err.to_string().contains(&f.path().display().to_string()));
}
