//! Detail-page scraping: slug derivation, politeness delay, response
//! classification, and pluggable field extraction.
//!
//! This crate provides:
//! - [`slug`]: display name → detail-page path segment
//! - [`extract`]: [`DetailExtractor`] strategy and the CSS selector implementation
//! - [`delay`]: injectable [`DelayPolicy`] for the wait before each request
//! - [`detail`]: [`DetailScraper`], one sequential fetch per cache miss

pub mod delay;
pub mod detail;
pub mod extract;
pub mod slug;

pub use delay::{DelayPolicy, FixedDelay, RandomDelay};
pub use detail::{DetailScraper, ResponseClass, ScrapeOutcome, SkipReason, classify};
pub use extract::{
    DetailExtractor, ExtractedFields, ScoreField, SelectorExtractor, extract_fields,
    release_year_from_date,
};
pub use slug::{derive_slug, detail_url};
