//! Pipeline orchestration for GameScore.
//!
//! This crate ties together listing discovery, the score cache, detail
//! scraping, and report generation into one end-to-end run.

pub mod pipeline;

pub use pipeline::{
    ProgressReporter, RunResult, ScrapePipeline, ScrapeSummary, SilentProgress, run, write_report,
};
