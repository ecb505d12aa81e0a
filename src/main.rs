use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use spamscan::{PipelineConfig, PipelineReport, run};
use spamscan_prep::{Heatmap, HeatmapMode};
use spamscan_rf::{ClassificationReport, ConfusionMatrix, ForestParams, RankedFeature};

#[derive(Parser)]
#[command(name = "spamscan")]
#[command(about = "Spam classification on the UCI Spambase dataset with a tuned Random Forest")]
#[command(version)]
struct Cli {
    /// Path to the headerless Spambase CSV file
    #[arg(long, default_value = "data/spambase.csv")]
    data: PathBuf,

    /// RNG seed for the split, cross-validation and every forest
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fraction of rows held out for the final evaluation
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Number of diagnostic cross-validation folds
    #[arg(long, default_value_t = 10)]
    cv_folds: usize,

    /// Number of trees in the diagnostic cross-validation forest
    #[arg(long, default_value_t = 100)]
    cv_trees: usize,

    /// Number of cross-validation folds per grid-search candidate
    #[arg(long, default_value_t = 5)]
    search_folds: usize,

    /// Smallest tree count searched
    #[arg(long, default_value_t = 50)]
    min_trees: usize,

    /// Tree count upper bound (exclusive)
    #[arg(long, default_value_t = 100)]
    max_trees: usize,

    /// Stride through the tree-count range
    #[arg(long, default_value_t = 1)]
    tree_step: usize,

    /// Rows shown in the data preview
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,

    /// Skip the correlation heatmap
    #[arg(long, default_value_t = false)]
    no_heatmap: bool,

    /// Draw the heatmap with shade glyphs instead of ANSI colours
    #[arg(long, default_value_t = false)]
    plain: bool,

    /// Print a JSON summary instead of text reports
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

// --- JSON stdout output struct ---

#[derive(Serialize)]
struct RunOutput<'a> {
    data: String,
    seed: u64,
    n_rows: usize,
    n_features: usize,
    class_counts: &'a [usize],
    n_train: usize,
    n_test: usize,
    constant_features: &'a [String],
    cv_scores: &'a [f64],
    cv_mean_accuracy: f64,
    cv_std_accuracy: f64,
    n_candidates: usize,
    best_params: ForestParams,
    best_cv_accuracy: f64,
    test_accuracy: f64,
    confusion_matrix: &'a ConfusionMatrix,
    report: &'a ClassificationReport,
    top_features: &'a [RankedFeature],
}

fn print_text(report: &PipelineReport, heatmap: Option<HeatmapMode>) {
    let diag = &report.diagnostics;
    println!("{}", diag.preview);

    println!("RangeIndex: {} entries, 0 to {}", report.n_rows, report.n_rows.saturating_sub(1));
    println!("Data columns (total {} columns):", diag.info.len());
    for column in &diag.info {
        println!("{column}");
    }
    println!();

    println!("Null values per column:");
    for (name, nulls) in &diag.null_counts {
        println!("{name:<28} {nulls}");
    }
    println!();

    println!("{}", diag.describe);

    if let (Some(mode), Some(matrix)) = (heatmap, report.correlation.as_ref()) {
        println!("Feature correlation:");
        println!("{}", Heatmap::new(matrix).render(mode));
    }

    let scores: Vec<String> = report
        .cross_validation
        .scores
        .iter()
        .map(|s| format!("{s:.4}"))
        .collect();
    println!("\nCross validation score is:\n[{}]", scores.join(" "));
    println!(
        "mean {:.4} (std {:.4})\n",
        report.cross_validation.mean, report.cross_validation.std
    );

    println!(
        "Best parameters ({} candidates): {} (cv accuracy {:.4})",
        report.search.n_candidates, report.search.best_params, report.search.best_score
    );
    println!("Model Accuracy: {:.2}", report.evaluation.accuracy);
    println!("Classification Report:\n{}", report.evaluation.report);
    println!("Confusion matrix:\n{}", report.evaluation.confusion_matrix);

    println!("Top features:");
    for f in &report.top_features {
        println!("{:>3}. {:<28} {:.4}", f.rank, f.name, f.importance);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let heatmap = (!cli.no_heatmap && !cli.json).then_some(if cli.plain {
        HeatmapMode::Plain
    } else {
        HeatmapMode::Ansi
    });

    let config = PipelineConfig::new(&cli.data)
        .with_seed(cli.seed)
        .with_test_fraction(cli.test_fraction)
        .with_cv_folds(cli.cv_folds)
        .with_cv_trees(cli.cv_trees)
        .with_search_folds(cli.search_folds)
        .with_tree_range(cli.min_trees, cli.max_trees, cli.tree_step)
        .with_preview_rows(cli.preview_rows)
        .with_correlation(heatmap.is_some());

    let report = run(&config).context("pipeline failed")?;

    if cli.json {
        let output = RunOutput {
            data: cli.data.display().to_string(),
            seed: cli.seed,
            n_rows: report.n_rows,
            n_features: report.n_features,
            class_counts: &report.diagnostics.class_counts,
            n_train: report.n_train,
            n_test: report.n_test,
            constant_features: &report.constant_features,
            cv_scores: &report.cross_validation.scores,
            cv_mean_accuracy: report.cross_validation.mean,
            cv_std_accuracy: report.cross_validation.std,
            n_candidates: report.search.n_candidates,
            best_params: report.search.best_params,
            best_cv_accuracy: report.search.best_score,
            test_accuracy: report.evaluation.accuracy,
            confusion_matrix: &report.evaluation.confusion_matrix,
            report: &report.evaluation.report,
            top_features: &report.top_features,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&report, heatmap);
    }

    Ok(())
}
