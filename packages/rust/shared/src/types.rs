//! Core domain types: listing entries and scraped score records.

use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel for a field that could not be extracted from the detail page.
pub const NOT_AVAILABLE: &str = "N/A";

/// Column headers of the persisted score cache, in file order.
pub const CACHE_HEADERS: [&str; 5] = ["Name", "Link", "Critic Score", "User Score", "Release Year"];

// ---------------------------------------------------------------------------
// ListingEntry
// ---------------------------------------------------------------------------

/// One item discovered on the listing page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Display name (anchor text truncated at the name marker).
    pub name: String,
    /// Absolute URL of the item on the listing site.
    pub link: String,
}

impl ListingEntry {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ScoreRecord
// ---------------------------------------------------------------------------

/// A scraped item as stored in the score cache.
///
/// `name` is the cache key. Score fields hold either the scraped text or
/// [`NOT_AVAILABLE`]; records are never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Critic Score", deserialize_with = "sentinel_if_empty")]
    pub critic_score: String,
    #[serde(rename = "User Score", deserialize_with = "sentinel_if_empty")]
    pub user_score: String,
    #[serde(rename = "Release Year", deserialize_with = "sentinel_if_empty")]
    pub release_year: String,
}

impl ScoreRecord {
    /// Build a record from optional scraped fields, substituting the sentinel
    /// for anything missing or blank.
    pub fn from_fields(
        entry: &ListingEntry,
        critic_score: Option<String>,
        user_score: Option<String>,
        release_year: Option<String>,
    ) -> Self {
        Self {
            name: entry.name.clone(),
            link: entry.link.clone(),
            critic_score: or_sentinel(critic_score),
            user_score: or_sentinel(user_score),
            release_year: or_sentinel(release_year),
        }
    }

    /// True when all three scraped fields were found.
    pub fn is_complete(&self) -> bool {
        [&self.critic_score, &self.user_score, &self.release_year]
            .iter()
            .all(|v| v.as_str() != NOT_AVAILABLE)
    }
}

fn or_sentinel(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Blank cells (as written by spreadsheet tools) read back as the sentinel.
fn sentinel_if_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(or_sentinel(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ListingEntry {
        ListingEntry::new("Half-Life 2", "https://example.com/half-life-2")
    }

    #[test]
    fn missing_fields_become_sentinel_independently() {
        let record = ScoreRecord::from_fields(&entry(), Some("96".into()), None, Some("  ".into()));
        assert_eq!(record.critic_score, "96");
        assert_eq!(record.user_score, NOT_AVAILABLE);
        assert_eq!(record.release_year, NOT_AVAILABLE);
        assert!(!record.is_complete());
    }

    #[test]
    fn complete_record() {
        let record = ScoreRecord::from_fields(
            &entry(),
            Some("96".into()),
            Some(" 9.1 ".into()),
            Some("2004".into()),
        );
        assert_eq!(record.user_score, "9.1");
        assert!(record.is_complete());
    }
}
