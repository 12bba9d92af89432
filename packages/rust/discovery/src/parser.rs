//! Listing page parser.
//!
//! The listing is a flat `<ul>` of catalog entries:
//! `<li class="az-list-item"><a href="/half-life-2">Half-Life 2 Free Download</a></li>`

use gamescore_shared::{GameScoreError, ListingEntry, Result};
use scraper::{Html, Selector};
use tracing::debug;

/// How to find entries on the listing page.
#[derive(Debug, Clone)]
pub struct ListingRules {
    item_selector: Selector,
    anchor_selector: Selector,
    name_marker: String,
}

impl ListingRules {
    pub fn new(item_selector: &str, name_marker: &str) -> Result<Self> {
        let item_selector = Selector::parse(item_selector).map_err(|e| {
            GameScoreError::parse(format!("invalid listing selector '{item_selector}': {e:?}"))
        })?;
        let anchor_selector = Selector::parse("a")
            .map_err(|e| GameScoreError::parse(format!("anchor selector: {e:?}")))?;
        Ok(Self {
            item_selector,
            anchor_selector,
            name_marker: name_marker.to_string(),
        })
    }

    /// Everything before the first occurrence of the marker, trimmed.
    fn display_name(&self, anchor_text: &str) -> String {
        let name = if self.name_marker.is_empty() {
            anchor_text
        } else {
            anchor_text
                .split(self.name_marker.as_str())
                .next()
                .unwrap_or(anchor_text)
        };
        name.trim().to_string()
    }
}

/// Parse the listing document into entries, in document order.
///
/// Items without an anchor, without an `href`, or with an empty name are
/// skipped. Duplicate names are passed through.
pub fn parse_listing(html: &str, rules: &ListingRules, entry_url: &str) -> Vec<ListingEntry> {
    let doc = Html::parse_document(html);
    let mut entries = Vec::new();

    for item in doc.select(&rules.item_selector) {
        let Some(anchor) = item.select(&rules.anchor_selector).next() else {
            debug!("listing item without anchor, skipping");
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            debug!("listing anchor without href, skipping");
            continue;
        };

        let text = anchor.text().collect::<String>();
        let name = rules.display_name(&text);
        if name.is_empty() {
            debug!(href, "listing anchor without a name, skipping");
            continue;
        }

        entries.push(ListingEntry {
            name,
            link: join_link(entry_url, href),
        });
    }

    entries
}

/// Concatenate the listing origin and a relative href without doubling the
/// `/` at the seam.
pub fn join_link(entry_url: &str, href: &str) -> String {
    match (entry_url.ends_with('/'), href.starts_with('/')) {
        (true, true) => format!("{entry_url}{}", &href[1..]),
        _ => format!("{entry_url}{href}"),
    }
}
