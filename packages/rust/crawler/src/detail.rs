//! Detail-page scraper: politeness wait, fetch, classify, extract.

use std::time::Duration;

use gamescore_shared::{GameScoreError, ListingEntry, Result, RunConfig, ScoreRecord};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::delay::{DelayPolicy, RandomDelay};
use crate::extract::{DetailExtractor, SelectorExtractor, extract_fields};
use crate::slug;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// How a detail response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 200: parse the page.
    Success,
    /// 403: the site is refusing traffic; stop the run.
    Denied,
    /// Anything else: skip the item, retry on a later run.
    Transient,
}

/// Classify a detail response status.
pub fn classify(status: u16) -> ResponseClass {
    match status {
        200 => ResponseClass::Success,
        403 => ResponseClass::Denied,
        _ => ResponseClass::Transient,
    }
}

/// Why a detail page produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Status(u16),
    Transport(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Transport(msg) => write!(f, "{msg}"),
        }
    }
}

/// Result of one non-fatal detail fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// The page was found; fields may be partially `N/A`.
    Scraped(ScoreRecord),
    /// Nothing to cache for this item.
    Skipped { url: String, reason: SkipReason },
}

// ---------------------------------------------------------------------------
// DetailScraper
// ---------------------------------------------------------------------------

/// Fetches detail pages one at a time, waiting before each request.
pub struct DetailScraper {
    client: Client,
    critic_site_url: String,
    extractor: Box<dyn DetailExtractor>,
    delay: Box<dyn DelayPolicy>,
}

impl DetailScraper {
    /// Scraper with CSS selector extraction and a random politeness delay.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let extractor = SelectorExtractor::new(&config.selectors)?;
        let delay = RandomDelay::new(config.politeness);
        Self::with_parts(config, Box::new(extractor), Box::new(delay))
    }

    /// Scraper with an explicit extraction strategy and delay source.
    pub fn with_parts(
        config: &RunConfig,
        extractor: Box<dyn DetailExtractor>,
        delay: Box<dyn DelayPolicy>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GameScoreError::Network(format!("failed to build HTTP client: {e}")))?;

        debug!(extractor = extractor.name(), "detail scraper ready");

        Ok(Self {
            client,
            critic_site_url: config.critic_site_url.clone(),
            extractor,
            delay,
        })
    }

    /// Detail URL for a display name.
    pub fn detail_url(&self, name: &str) -> String {
        slug::detail_url(&self.critic_site_url, name)
    }

    /// Wait, fetch and extract the detail page for `entry`.
    ///
    /// `on_wait` is told the delay before the wait starts. A 403 response is
    /// returned as [`GameScoreError::AccessDenied`].
    #[instrument(skip_all, fields(name = %entry.name))]
    pub async fn fetch(
        &mut self,
        entry: &ListingEntry,
        on_wait: impl FnOnce(Duration),
    ) -> Result<ScrapeOutcome> {
        let delay = self.delay.next_delay();
        on_wait(delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let url = self.detail_url(&entry.name);
        debug!(%url, "requesting detail page");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "detail request failed, skipping");
                return Ok(ScrapeOutcome::Skipped {
                    url,
                    reason: SkipReason::Transport(e.to_string()),
                });
            }
        };

        let status = response.status().as_u16();
        match classify(status) {
            ResponseClass::Denied => return Err(GameScoreError::AccessDenied { url }),
            ResponseClass::Transient => {
                warn!(%url, status, "unexpected status, skipping");
                return Ok(ScrapeOutcome::Skipped {
                    url,
                    reason: SkipReason::Status(status),
                });
            }
            ResponseClass::Success => {}
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, error = %e, "failed to read detail body, skipping");
                return Ok(ScrapeOutcome::Skipped {
                    url,
                    reason: SkipReason::Transport(e.to_string()),
                });
            }
        };

        let fields = extract_fields(self.extractor.as_ref(), &body);
        let record = ScoreRecord::from_fields(
            entry,
            fields.critic_score,
            fields.user_score,
            fields.release_year,
        );

        if record.is_complete() {
            info!(
                critic = %record.critic_score,
                user = %record.user_score,
                year = %record.release_year,
                "all fields found"
            );
        } else {
            warn!(
                %url,
                critic = %record.critic_score,
                user = %record.user_score,
                year = %record.release_year,
                "page found, some fields missing"
            );
        }

        Ok(ScrapeOutcome::Scraped(record))
    }
}
