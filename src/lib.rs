//! Spam classification pipeline over the UCI Spambase dataset.
//!
//! The binary in `main.rs` is a thin CLI over [`pipeline::run`].

pub mod pipeline;

pub use pipeline::{PipelineConfig, PipelineReport, TARGET_NAMES, run};
