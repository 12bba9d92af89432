//! Shared types, error model, and configuration for GameScore.
//!
//! This crate is the foundation depended on by all other GameScore crates.
//! It provides:
//! - [`GameScoreError`]: the unified error type
//! - Domain types ([`ListingEntry`], [`ScoreRecord`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FilesConfig, PolitenessWindow, ReportConfig, RunConfig, ScrapeConfig,
    SelectorsConfig, SitesConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from, write_default_config,
};
pub use error::{GameScoreError, Result};
pub use types::{CACHE_HEADERS, ListingEntry, NOT_AVAILABLE, ScoreRecord};
