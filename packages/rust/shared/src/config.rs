//! Application configuration for GameScore.
//!
//! User config lives at `~/.gamescore/gamescore.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GameScoreError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "gamescore.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".gamescore";

/// Shipped listing URL; must be replaced before a run.
pub const PLACEHOLDER_LIST_URL: &str = "https://creamwhip.com/games-list/";

/// Shipped listing origin; must be replaced before a run.
pub const PLACEHOLDER_ENTRY_URL: &str = "https://creamwhip.com";

// ---------------------------------------------------------------------------
// Config structs (matching gamescore.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote sites.
    #[serde(default)]
    pub sites: SitesConfig,

    /// Local file locations.
    #[serde(default)]
    pub files: FilesConfig,

    /// Detail-page scraping behaviour.
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Spreadsheet report preferences.
    #[serde(default)]
    pub report: ReportConfig,

    /// CSS selectors for the listing and detail pages.
    #[serde(default)]
    pub selectors: SelectorsConfig,
}

/// `[sites]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesConfig {
    /// Page enumerating every catalog item.
    #[serde(default = "default_list_url")]
    pub list_url: String,

    /// Origin prepended to each relative listing href.
    #[serde(default = "default_entry_url")]
    pub entry_url: String,

    /// Base path the detail slug is appended to.
    #[serde(default = "default_critic_site_url")]
    pub critic_site_url: String,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            list_url: default_list_url(),
            entry_url: default_entry_url(),
            critic_site_url: default_critic_site_url(),
        }
    }
}

fn default_list_url() -> String {
    PLACEHOLDER_LIST_URL.into()
}
fn default_entry_url() -> String {
    PLACEHOLDER_ENTRY_URL.into()
}
fn default_critic_site_url() -> String {
    "https://www.criticsite.com/game/".into()
}

/// `[files]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Local snapshot of the listing page.
    #[serde(default = "default_listing_snapshot")]
    pub listing_snapshot: String,

    /// Score cache (CSV).
    #[serde(default = "default_cache_file")]
    pub cache_file: String,

    /// Directory the spreadsheet report is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            listing_snapshot: default_listing_snapshot(),
            cache_file: default_cache_file(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_listing_snapshot() -> String {
    "gamelist.html".into()
}
fn default_cache_file() -> String {
    "scores.csv".into()
}
fn default_output_dir() -> String {
    ".".into()
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Reuse the score cache from previous runs.
    #[serde(default = "default_true")]
    pub skip_rescraping: bool,

    /// Randomized wait before each detail request, `[min, max]` seconds.
    #[serde(default = "default_wait")]
    pub wait_between_requests: [u64; 2],

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport timeout per request, in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            skip_rescraping: true,
            wait_between_requests: default_wait(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_wait() -> [u64; 2] {
    [2, 10]
}
fn default_user_agent() -> String {
    "MyBot/1.0".into()
}
fn default_timeout() -> u64 {
    30
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Name the report `output_<YYMMDD_HHMM>.xlsx` instead of `output.xlsx`.
    #[serde(default = "default_true")]
    pub save_with_timestamp: bool,

    /// Append a link glyph to every name cell.
    #[serde(default)]
    pub enable_link_symbol: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            save_with_timestamp: true,
            enable_link_symbol: false,
        }
    }
}

/// `[selectors]` section.
///
/// Detail selectors can be copied from the browser inspector
/// ("Copy" → "Copy selector") when the site markup changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorsConfig {
    /// Listing item elements; the first anchor inside each is the entry.
    #[serde(default = "default_listing_item")]
    pub listing_item: String,

    /// Anchor text is truncated at the first occurrence of this marker.
    #[serde(default = "default_name_marker")]
    pub name_marker: String,

    /// Critic score element, e.g. `<span>90</span>`.
    #[serde(default = "default_critic_score")]
    pub critic_score: String,

    /// User score element, e.g. `<span>8.5</span>`.
    #[serde(default = "default_user_score")]
    pub user_score: String,

    /// Release date element, rendered like `Nov 16, 2004`.
    #[serde(default = "default_release_year")]
    pub release_year: String,
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            listing_item: default_listing_item(),
            name_marker: default_name_marker(),
            critic_score: default_critic_score(),
            user_score: default_user_score(),
            release_year: default_release_year(),
        }
    }
}

fn default_listing_item() -> String {
    "li.az-list-item".into()
}
fn default_name_marker() -> String {
    " Free Download".into()
}
fn default_critic_score() -> String {
    "#__layout > div > div.c-layoutDefault_page > div.c-pageProductGame > div:nth-child(1) > div > div > div.c-productHero_player-scoreInfo.u-grid.g-grid-container > div.c-productHero_score-container.u-flexbox.u-flexbox-column.g-bg-white > div.c-productHero_scoreInfo.g-inner-spacing-top-medium.g-outer-spacing-bottom-medium.g-outer-spacing-top-medium > div:nth-child(1) > div > div.c-productScoreInfo_scoreContent.u-flexbox.u-flexbox-alignCenter.u-flexbox-justifyFlexEnd.g-width-100.u-flexbox-nowrap > div.c-productScoreInfo_scoreNumber.u-float-right > div > div > span".into()
}
fn default_user_score() -> String {
    "#__layout > div > div.c-layoutDefault_page > div.c-pageProductGame > div:nth-child(1) > div > div > div.c-productHero_player-scoreInfo.u-grid.g-grid-container > div.c-productHero_score-container.u-flexbox.u-flexbox-column.g-bg-white > div.c-productHero_scoreInfo.g-inner-spacing-top-medium.g-outer-spacing-bottom-medium.g-outer-spacing-top-medium > div.c-productScoreInfo.u-clearfix > div.c-productScoreInfo_scoreContent.u-flexbox.u-flexbox-alignCenter.u-flexbox-justifyFlexEnd.g-width-100.u-flexbox-nowrap > div.c-productScoreInfo_scoreNumber.u-float-right > div > div > span".into()
}
fn default_release_year() -> String {
    "#__layout > div > div.c-layoutDefault_page > div.c-pageProductGame > div:nth-child(1) > div > div > div.c-productHero_player-scoreInfo.u-grid.g-grid-container > div.c-productHero_score-container.u-flexbox.u-flexbox-column.g-bg-white > div.g-text-xsmall > span.u-text-uppercase".into()
}

// ---------------------------------------------------------------------------
// Run config (validated, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Inclusive range of whole seconds to wait before each detail request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessWindow {
    pub min_secs: u64,
    pub max_secs: u64,
}

/// Validated runtime configuration, built once at startup and passed by
/// reference into every component.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub list_url: Url,
    pub entry_url: String,
    pub critic_site_url: String,
    pub listing_snapshot: PathBuf,
    pub cache_file: PathBuf,
    pub output_dir: PathBuf,
    pub skip_rescraping: bool,
    pub save_with_timestamp: bool,
    pub enable_link_symbol: bool,
    pub politeness: PolitenessWindow,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub selectors: SelectorsConfig,
}

impl TryFrom<&AppConfig> for RunConfig {
    type Error = GameScoreError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let sites = &config.sites;
        if sites.list_url == PLACEHOLDER_LIST_URL || sites.entry_url == PLACEHOLDER_ENTRY_URL {
            return Err(GameScoreError::config(
                "please set [sites] list_url and entry_url to the real listing site",
            ));
        }

        let list_url = parse_http_url("list_url", &sites.list_url)?;
        parse_http_url("entry_url", &sites.entry_url)?;
        parse_http_url("critic_site_url", &sites.critic_site_url)?;

        let [min_secs, max_secs] = config.scrape.wait_between_requests;
        if min_secs > max_secs {
            return Err(GameScoreError::config(format!(
                "wait_between_requests minimum ({min_secs}) exceeds maximum ({max_secs})"
            )));
        }

        let selectors = &config.selectors;
        for (key, value) in [
            ("listing_item", &selectors.listing_item),
            ("critic_score", &selectors.critic_score),
            ("user_score", &selectors.user_score),
            ("release_year", &selectors.release_year),
        ] {
            if value.trim().is_empty() {
                return Err(GameScoreError::config(format!("selector '{key}' is empty")));
            }
        }

        Ok(Self {
            list_url,
            entry_url: sites.entry_url.clone(),
            critic_site_url: sites.critic_site_url.clone(),
            listing_snapshot: PathBuf::from(&config.files.listing_snapshot),
            cache_file: PathBuf::from(&config.files.cache_file),
            output_dir: PathBuf::from(&config.files.output_dir),
            skip_rescraping: config.scrape.skip_rescraping,
            save_with_timestamp: config.report.save_with_timestamp,
            enable_link_symbol: config.report.enable_link_symbol,
            politeness: PolitenessWindow { min_secs, max_secs },
            user_agent: config.scrape.user_agent.clone(),
            request_timeout_secs: config.scrape.request_timeout_secs,
            selectors: selectors.clone(),
        })
    }
}

fn parse_http_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| GameScoreError::config(format!("invalid {key} '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(GameScoreError::config(format!(
            "{key} must be http or https, got '{other}'"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.gamescore/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GameScoreError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.gamescore/gamescore.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GameScoreError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GameScoreError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
///
/// An existing config file is never overwritten.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    write_default_config(&path)?;
    Ok(path)
}

/// Write the default config to `path`, failing if the file already exists.
pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(GameScoreError::config(format!(
            "{} already exists; edit it or remove it first",
            path.display()
        )));
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| GameScoreError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| GameScoreError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| GameScoreError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.sites.list_url = "https://games.example.com/games-list/".into();
        config.sites.entry_url = "https://games.example.com".into();
        config
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("gamelist.html"));
        assert!(toml_str.contains("scores.csv"));
    }

    #[test]
    fn config_roundtrip() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.scrape.wait_between_requests, [2, 10]);
        assert!(parsed.scrape.skip_rescraping);
        assert!(parsed.report.save_with_timestamp);
        assert!(!parsed.report.enable_link_symbol);
        assert_eq!(parsed.selectors, SelectorsConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
[sites]
list_url = "https://games.example.com/list/"

[scrape]
wait_between_requests = [0, 1]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.sites.list_url, "https://games.example.com/list/");
        assert_eq!(config.sites.entry_url, PLACEHOLDER_ENTRY_URL);
        assert_eq!(config.scrape.wait_between_requests, [0, 1]);
        assert_eq!(config.scrape.user_agent, "MyBot/1.0");
        assert_eq!(config.files.cache_file, "scores.csv");
    }

    #[test]
    fn placeholder_urls_are_rejected() {
        let err = RunConfig::try_from(&AppConfig::default()).unwrap_err();
        assert!(matches!(err, GameScoreError::Config { .. }));

        let mut config = configured();
        config.sites.entry_url = PLACEHOLDER_ENTRY_URL.into();
        assert!(RunConfig::try_from(&config).is_err());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = configured();
        config.scrape.wait_between_requests = [10, 2];
        assert!(RunConfig::try_from(&config).is_err());

        let mut config = configured();
        config.sites.critic_site_url = "not a url".into();
        assert!(RunConfig::try_from(&config).is_err());

        let mut config = configured();
        config.selectors.user_score = "  ".into();
        assert!(RunConfig::try_from(&config).is_err());
    }

    #[test]
    fn init_never_overwrites_existing_file() {
        let dir = std::env::temp_dir().join(format!("gs-config-test-{}", uuid::Uuid::now_v7()));
        let path = dir.join(CONFIG_FILE_NAME);

        write_default_config(&path).expect("first write");
        let defaults = load_config_from(&path).expect("load defaults");
        assert_eq!(defaults.sites.list_url, PLACEHOLDER_LIST_URL);

        let edited = "[sites]\nlist_url = \"https://games.example.com/list/\"\n";
        std::fs::write(&path, edited).unwrap();

        let err = write_default_config(&path).unwrap_err();
        assert!(matches!(err, GameScoreError::Config { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), edited);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_config_from_app_config() {
        let run = RunConfig::try_from(&configured()).expect("valid config");
        assert_eq!(run.list_url.as_str(), "https://games.example.com/games-list/");
        assert_eq!(run.entry_url, "https://games.example.com");
        assert_eq!(run.politeness, PolitenessWindow { min_secs: 2, max_secs: 10 });
        assert_eq!(run.cache_file, PathBuf::from("scores.csv"));
        assert_eq!(run.listing_snapshot, PathBuf::from("gamelist.html"));
    }
}
