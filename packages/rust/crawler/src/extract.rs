//! Pluggable field extraction for detail pages.
//!
//! A [`DetailExtractor`] answers one question per [`ScoreField`]: what text
//! does this document hold for the field, if any. Each field is extracted
//! independently so a missing element never affects the others.

use gamescore_shared::{GameScoreError, Result, SelectorsConfig};
use scraper::{Html, Selector};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The three fields scraped from every detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreField {
    CriticScore,
    UserScore,
    ReleaseYear,
}

impl ScoreField {
    pub const ALL: [ScoreField; 3] = [Self::CriticScore, Self::UserScore, Self::ReleaseYear];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CriticScore => "critic_score",
            Self::UserScore => "user_score",
            Self::ReleaseYear => "release_year",
        }
    }
}

/// Strategy for pulling raw field text out of a parsed detail page.
pub trait DetailExtractor: Send + Sync {
    /// Raw text for `field`, or `None` when the page has no such element.
    fn extract(&self, doc: &Html, field: ScoreField) -> Option<String>;

    /// Human-readable extractor name for tracing.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// CSS selector strategy
// ---------------------------------------------------------------------------

/// Extracts each field as the text of the first element matching its selector.
pub struct SelectorExtractor {
    critic_score: Selector,
    user_score: Selector,
    release_year: Selector,
}

impl SelectorExtractor {
    /// Compile the detail selectors from configuration.
    pub fn new(selectors: &SelectorsConfig) -> Result<Self> {
        Self::from_selectors(
            &selectors.critic_score,
            &selectors.user_score,
            &selectors.release_year,
        )
    }

    pub fn from_selectors(critic_score: &str, user_score: &str, release_year: &str) -> Result<Self> {
        Ok(Self {
            critic_score: compile(ScoreField::CriticScore, critic_score)?,
            user_score: compile(ScoreField::UserScore, user_score)?,
            release_year: compile(ScoreField::ReleaseYear, release_year)?,
        })
    }

    fn selector(&self, field: ScoreField) -> &Selector {
        match field {
            ScoreField::CriticScore => &self.critic_score,
            ScoreField::UserScore => &self.user_score,
            ScoreField::ReleaseYear => &self.release_year,
        }
    }
}

fn compile(field: ScoreField, selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| {
        GameScoreError::parse(format!("invalid {} selector '{selector}': {e:?}", field.as_str()))
    })
}

impl DetailExtractor for SelectorExtractor {
    fn extract(&self, doc: &Html, field: ScoreField) -> Option<String> {
        doc.select(self.selector(field))
            .next()
            .map(|el| el.text().collect::<String>())
    }

    fn name(&self) -> &str {
        "css-selector"
    }
}

// ---------------------------------------------------------------------------
// Field post-processing
// ---------------------------------------------------------------------------

/// Fields pulled from one detail page, before sentinel substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub critic_score: Option<String>,
    pub user_score: Option<String>,
    pub release_year: Option<String>,
}

/// Parse a detail page and run every field through the extractor.
pub fn extract_fields(extractor: &dyn DetailExtractor, html: &str) -> ExtractedFields {
    let doc = Html::parse_document(html);
    ExtractedFields {
        critic_score: extractor.extract(&doc, ScoreField::CriticScore),
        user_score: extractor.extract(&doc, ScoreField::UserScore),
        release_year: extractor
            .extract(&doc, ScoreField::ReleaseYear)
            .and_then(|raw| release_year_from_date(&raw)),
    }
}

/// The site renders dates as `Nov 16, 2004`; the year is the segment after `", "`.
pub fn release_year_from_date(raw: &str) -> Option<String> {
    raw.split(", ")
        .nth(1)
        .map(str::trim)
        .filter(|year| !year.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SelectorExtractor {
        SelectorExtractor::from_selectors(".critic span", ".user span", ".release span").unwrap()
    }

    #[test]
    fn extracts_all_fields() {
        let html = std::fs::read_to_string("../../../fixtures/html/detail.html")
            .expect("read detail fixture");
        let fields = extract_fields(&extractor(), &html);
        assert_eq!(fields.critic_score.as_deref(), Some("90"));
        assert_eq!(fields.user_score.as_deref(), Some("8.5"));
        assert_eq!(fields.release_year.as_deref(), Some("2019"));
    }

    #[test]
    fn missing_elements_are_independent() {
        let html = r#"<div class="user"><span>7.9</span></div>"#;
        let fields = extract_fields(&extractor(), html);
        assert_eq!(fields.critic_score, None);
        assert_eq!(fields.user_score.as_deref(), Some("7.9"));
        assert_eq!(fields.release_year, None);
    }

    #[test]
    fn release_year_needs_comma_segment() {
        assert_eq!(release_year_from_date("Nov 16, 2004").as_deref(), Some("2004"));
        assert_eq!(release_year_from_date("TBA"), None);
        assert_eq!(release_year_from_date("Mar 3, "), None);

        let html = r#"<div class="release"><span>Coming soon</span></div>"#;
        assert_eq!(extract_fields(&extractor(), html).release_year, None);
    }

    #[test]
    fn invalid_selector_names_the_field() {
        let err = SelectorExtractor::from_selectors("span", "div[", "span").err().unwrap();
        assert!(err.to_string().contains("user_score"));
    }
}
