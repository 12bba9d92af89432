//! End-to-end run: listing → cache lookup → detail scrape → cache append → report.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, instrument};

use gamescore_crawler::{DetailScraper, ScrapeOutcome, SkipReason};
use gamescore_discovery::ListingSource;
use gamescore_report::{
    ReportBuilder, ReportOptions, ReportWriter, XlsxReportWriter, output_file_name,
};
use gamescore_shared::{ListingEntry, Result, RunConfig, ScoreRecord};
use gamescore_storage::ResultCache;

/// Outcome of the scrape phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    /// Entries on the listing page.
    pub listed: usize,
    /// Entries already in the cache (no request made).
    pub already_cached: usize,
    /// Records appended during this run.
    pub scraped: usize,
    /// Entries that produced no record this run, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
}

/// Result of a full run.
#[derive(Debug)]
pub struct RunResult {
    pub summary: ScrapeSummary,
    /// Records in the cache, and rows in the report.
    pub records: usize,
    pub report_path: PathBuf,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before the politeness wait preceding a detail request.
    fn waiting(&self, name: &str, delay: Duration);
    /// Called for an entry that is already cached.
    fn item_cached(&self, name: &str, current: usize, total: usize);
    /// Called after a record was appended to the cache.
    fn item_scraped(&self, record: &ScoreRecord, current: usize, total: usize);
    /// Called when an entry produced no record.
    fn item_skipped(&self, name: &str, reason: &SkipReason, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, result: &RunResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn waiting(&self, _name: &str, _delay: Duration) {}
    fn item_cached(&self, _name: &str, _current: usize, _total: usize) {}
    fn item_scraped(&self, _record: &ScoreRecord, _current: usize, _total: usize) {}
    fn item_skipped(&self, _name: &str, _reason: &SkipReason, _current: usize, _total: usize) {}
    fn done(&self, _result: &RunResult) {}
}

// ---------------------------------------------------------------------------
// ScrapePipeline
// ---------------------------------------------------------------------------

/// Per-entry state: only cache misses are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemState {
    NeedsScrape,
    Cached,
}

/// Walks the listing in order, scraping each entry the cache doesn't have.
pub struct ScrapePipeline {
    cache: ResultCache,
    scraper: DetailScraper,
}

impl ScrapePipeline {
    pub fn new(cache: ResultCache, scraper: DetailScraper) -> Self {
        Self { cache, scraper }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn into_cache(self) -> ResultCache {
        self.cache
    }

    /// Process every entry. Stops at the first access-denied response; all
    /// records appended before it are already on disk.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub async fn scrape(
        &mut self,
        entries: &[ListingEntry],
        progress: &dyn ProgressReporter,
    ) -> Result<ScrapeSummary> {
        let total = entries.len();
        let mut summary = ScrapeSummary {
            listed: total,
            ..ScrapeSummary::default()
        };

        for (i, entry) in entries.iter().enumerate() {
            let current = i + 1;
            let state = if self.cache.contains(&entry.name) {
                ItemState::Cached
            } else {
                ItemState::NeedsScrape
            };

            if state == ItemState::Cached {
                debug!(name = %entry.name, "cached, skipping request");
                summary.already_cached += 1;
                progress.item_cached(&entry.name, current, total);
                continue;
            }

            let outcome = self
                .scraper
                .fetch(entry, |delay| progress.waiting(&entry.name, delay))
                .await?;

            match outcome {
                ScrapeOutcome::Scraped(record) => {
                    self.cache.append(record.clone())?;
                    info!(name = %record.name, cached = self.cache.len(), "record cached");
                    summary.scraped += 1;
                    progress.item_scraped(&record, current, total);
                }
                ScrapeOutcome::Skipped { reason, .. } => {
                    progress.item_skipped(&entry.name, &reason, current, total);
                    summary.skipped.push((entry.name.clone(), reason));
                }
            }
        }

        info!(
            listed = summary.listed,
            already_cached = summary.already_cached,
            scraped = summary.scraped,
            skipped = summary.skipped.len(),
            "scrape finished"
        );

        Ok(summary)
    }
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

/// Run the whole pipeline.
///
/// 1. Load the listing (snapshot or network)
/// 2. Open the score cache
/// 3. Scrape every uncached entry, appending as we go
/// 4. Build and write the spreadsheet report
#[instrument(skip_all, fields(list_url = %config.list_url))]
pub async fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunResult> {
    let start = Instant::now();

    progress.phase("Loading game list");
    let entries = ListingSource::new(config)?.load().await?;

    progress.phase("Loading score cache");
    let cache = if config.skip_rescraping {
        ResultCache::open(&config.cache_file)?
    } else {
        info!("rescraping everything, starting from an empty cache");
        ResultCache::fresh(&config.cache_file)
    };

    let scraper = DetailScraper::new(config)?;
    let mut pipeline = ScrapePipeline::new(cache, scraper);

    progress.phase("Looking for games");
    let summary = pipeline.scrape(&entries, progress).await?;

    progress.phase("Cooking up Excel file");
    let timestamp = config
        .save_with_timestamp
        .then(|| Local::now().naive_local());
    let cache = pipeline.into_cache();
    let report_path = write_report(config, cache.records(), timestamp)?;

    let result = RunResult {
        summary,
        records: cache.len(),
        report_path,
        elapsed: start.elapsed(),
    };
    progress.done(&result);

    info!(
        records = result.records,
        report = %result.report_path.display(),
        elapsed_ms = result.elapsed.as_millis(),
        "run completed"
    );

    Ok(result)
}

/// Build the report table from `records` and write it into the output directory.
pub fn write_report(
    config: &RunConfig,
    records: &[ScoreRecord],
    timestamp: Option<NaiveDateTime>,
) -> Result<PathBuf> {
    let table = ReportBuilder::new(ReportOptions::from(config)).build(records);
    let path = report_path(&config.output_dir, timestamp);
    XlsxReportWriter.write(&table, &path)?;
    Ok(path)
}

fn report_path(output_dir: &Path, timestamp: Option<NaiveDateTime>) -> PathBuf {
    output_dir.join(output_file_name(timestamp))
}
