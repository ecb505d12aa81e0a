//! End-to-end tests: synthetic Spambase-shaped CSV -> full pipeline run.

use std::io::Write;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::NamedTempFile;

use spamscan::{PipelineConfig, run};

const N_FEATURES: usize = 57;

/// Standard normal draw via Box-Muller.
fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.r#gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Two Gaussian clusters, unit variance, means 0 and 3 in every feature.
/// Labels alternate. Columns listed in `constant` are fixed at `fill`.
fn write_two_clusters(n_rows: usize, seed: u64, constant: &[usize], fill: f64) -> NamedTempFile {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut f = NamedTempFile::new().unwrap();
    for i in 0..n_rows {
        let label = i % 2;
        let mut fields: Vec<String> = (0..N_FEATURES)
            .map(|j| {
                if constant.contains(&j) {
                    fill.to_string()
                } else {
                    format!("{:.6}", 3.0 * label as f64 + gaussian(&mut rng))
                }
            })
            .collect();
        fields.push(label.to_string());
        writeln!(f, "{}", fields.join(",")).unwrap();
    }
    f.flush().unwrap();
    f
}

fn small_config(f: &NamedTempFile) -> PipelineConfig {
    PipelineConfig::new(f.path())
        .with_seed(42)
        .with_cv_trees(20)
        .with_tree_range(8, 11, 1)
}

#[test]
fn separable_clusters_score_high() {
    let f = write_two_clusters(100, 7, &[], 0.0);
    let report = run(&small_config(&f)).unwrap();

    assert_eq!(report.n_rows, 100);
    assert_eq!(report.n_features, 57);
    assert_eq!(report.n_train, 80);
    assert_eq!(report.n_test, 20);
    assert_eq!(report.diagnostics.class_counts, vec![50, 50]);
    assert_eq!(report.diagnostics.info.len(), 58);
    assert_eq!(report.diagnostics.preview.rows.len(), 5);

    assert_eq!(report.cross_validation.scores.len(), 10);
    assert!(
        report
            .cross_validation
            .scores
            .iter()
            .all(|s| (0.0..=1.0).contains(s))
    );

    // 3 tree counts x 2 criteria x 3 feature rules.
    assert_eq!(report.search.n_candidates, 18);
    assert!((8..11).contains(&report.search.best_params.n_trees));

    assert_eq!(report.evaluation.predictions.len(), 20);
    assert!(
        report.evaluation.accuracy >= 0.9,
        "test accuracy = {}",
        report.evaluation.accuracy
    );
    assert_eq!(report.evaluation.report.target_names, vec!["not_spam", "spam"]);
    assert_eq!(report.evaluation.confusion_matrix.total(), 20);

    let matrix = report.correlation.as_ref().unwrap();
    assert_eq!(matrix.len(), 58);
    assert_eq!(report.top_features.len(), 10);
}

#[test]
fn constant_column_is_guarded() {
    let f = write_two_clusters(60, 11, &[3], 0.0);
    let report = run(&small_config(&f).with_cv_folds(5)).unwrap();

    assert_eq!(report.constant_features, vec!["3d".to_string()]);
    let matrix = report.correlation.as_ref().unwrap();
    assert!(matrix.get(3, 0).is_nan());
    assert_eq!(matrix.get(3, 3), 1.0);
    assert!(report.evaluation.accuracy.is_finite());
}

#[test]
fn inexact_constant_column_is_guarded() {
    let f = write_two_clusters(200, 13, &[3], 0.1);
    let report = run(&small_config(&f).with_cv_folds(5).with_correlation(false)).unwrap();

    assert_eq!(report.constant_features, vec!["3d".to_string()]);
    assert!(report.evaluation.accuracy >= 0.9);
    assert!(
        report
            .top_features
            .iter()
            .all(|f| f.name != "3d" || f.importance == 0.0)
    );
}

#[test]
fn same_seed_same_report() {
    let f = write_two_clusters(60, 3, &[], 0.0);
    let config = small_config(&f).with_cv_folds(4).with_correlation(false);
    let a = run(&config).unwrap();
    let b = run(&config).unwrap();
    assert_eq!(a.cross_validation.scores, b.cross_validation.scores);
    assert_eq!(a.search.best_params, b.search.best_params);
    assert_eq!(a.evaluation.predictions, b.evaluation.predictions);
    assert!(a.correlation.is_none());
}

#[test]
fn report_serializes_to_json() {
    let f = write_two_clusters(40, 5, &[], 0.0);
    let report = run(&small_config(&f).with_cv_folds(4).with_search_folds(3)).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["n_rows"], 40);
    assert_eq!(json["search"]["n_candidates"], 18);
    assert!(json["evaluation"]["accuracy"].as_f64().is_some());
    assert!(json.get("correlation").is_none());
}

#[test]
fn missing_file_names_the_path() {
    let err = run(&PipelineConfig::new("/nonexistent/spambase.csv")).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/spambase.csv"));
}

#[test]
fn invalid_test_fraction_fails() {
    let f = write_two_clusters(20, 1, &[], 0.0);
    let err = run(&small_config(&f).with_test_fraction(1.5)).unwrap_err();
    assert!(format!("{err:#}").contains("test fraction"));
}
