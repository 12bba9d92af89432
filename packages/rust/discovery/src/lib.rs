//! Listing discovery: obtain the listing page and turn it into entries.
//!
//! The raw listing document is cached verbatim in a local snapshot file.
//! When the snapshot exists it is used as-is (no expiry); otherwise the
//! listing URL is fetched once and the body is written to the snapshot.

mod parser;

use std::path::{Path, PathBuf};
use std::time::Duration;

use gamescore_shared::{GameScoreError, ListingEntry, Result, RunConfig};
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

pub use parser::{ListingRules, join_link, parse_listing};

/// Maximum number of redirects to follow when fetching the listing.
const MAX_REDIRECTS: usize = 5;

// ---------------------------------------------------------------------------
// ListingSource
// ---------------------------------------------------------------------------

/// Loads the listing page from its snapshot or the network.
pub struct ListingSource {
    snapshot_path: PathBuf,
    list_url: Url,
    entry_url: String,
    rules: ListingRules,
    client: Client,
}

impl ListingSource {
    /// Create a listing source from the run configuration.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let rules = ListingRules::new(
            &config.selectors.listing_item,
            &config.selectors.name_marker,
        )?;
        let client = build_client(&config.user_agent, config.request_timeout_secs)?;

        Ok(Self {
            snapshot_path: config.listing_snapshot.clone(),
            list_url: config.list_url.clone(),
            entry_url: config.entry_url.clone(),
            rules,
            client,
        })
    }

    /// Path of the local listing snapshot.
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Load every listing entry, in document order.
    #[instrument(skip_all, fields(snapshot = %self.snapshot_path.display()))]
    pub async fn load(&self) -> Result<Vec<ListingEntry>> {
        let html = self.read_or_fetch().await?;
        let entries = parse_listing(&html, &self.rules, &self.entry_url);
        info!(entries = entries.len(), "listing parsed");
        Ok(entries)
    }

    async fn read_or_fetch(&self) -> Result<String> {
        if self.snapshot_path.exists() {
            debug!("reading listing snapshot");
            return std::fs::read_to_string(&self.snapshot_path)
                .map_err(|e| GameScoreError::io(&self.snapshot_path, e));
        }

        info!(url = %self.list_url, "no listing snapshot, fetching");
        let body = fetch_listing(&self.client, &self.list_url).await?;

        if let Some(parent) = self.snapshot_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| GameScoreError::io(parent, e))?;
            }
        }
        std::fs::write(&self.snapshot_path, &body)
            .map_err(|e| GameScoreError::io(&self.snapshot_path, e))?;
        info!(bytes = body.len(), "listing snapshot saved");

        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with the configured identity.
fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| GameScoreError::Network(format!("failed to build HTTP client: {e}")))
}

/// Fetch the listing body. Non-success statuses are errors so an error page
/// never ends up in the snapshot.
async fn fetch_listing(client: &Client, url: &Url) -> Result<String> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| GameScoreError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(GameScoreError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| GameScoreError::Network(format!("{url}: failed to read body: {e}")))
}
