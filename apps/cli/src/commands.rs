//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use gamescore_core::pipeline::{ProgressReporter, RunResult};
use gamescore_crawler::{SkipReason, derive_slug, detail_url};
use gamescore_shared::{AppConfig, RunConfig, ScoreRecord, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// GameScore: critic and user scores for a whole game catalog.
#[derive(Parser)]
#[command(
    name = "gamescore",
    version,
    about = "Scrape critic/user scores for every game on a listing page into a spreadsheet.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.gamescore/gamescore.toml).
    #[arg(short, long, global = true, env = "GAMESCORE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape every uncached game and write the spreadsheet report.
    Run(RunArgs),

    /// Print the detail-page slug and URL derived from a game name.
    Slug {
        /// Display name as it appears on the listing page.
        name: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for a single run; anything unset comes from the config file.
#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Listing page URL.
    #[arg(long)]
    pub list_url: Option<String>,

    /// Origin prepended to listing links.
    #[arg(long)]
    pub entry_url: Option<String>,

    /// Detail-site base the slug is appended to.
    #[arg(long)]
    pub critic_site_url: Option<String>,

    /// Ignore the score cache and scrape everything again.
    #[arg(long)]
    pub no_skip_rescraping: bool,

    /// Name the report output_<YYMMDD_HHMM>.xlsx.
    #[arg(long, overrides_with = "no_timestamp")]
    pub timestamp: bool,

    /// Name the report output.xlsx.
    #[arg(long)]
    pub no_timestamp: bool,

    /// Append a link symbol to every game name in the report.
    #[arg(long)]
    pub link_symbol: bool,

    /// Directory to write the report into.
    #[arg(short, long)]
    pub output_dir: Option<String>,
}

impl RunArgs {
    /// Apply flag overrides on top of the loaded config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(url) = &self.list_url {
            config.sites.list_url = url.clone();
        }
        if let Some(url) = &self.entry_url {
            config.sites.entry_url = url.clone();
        }
        if let Some(url) = &self.critic_site_url {
            config.sites.critic_site_url = url.clone();
        }
        if self.no_skip_rescraping {
            config.scrape.skip_rescraping = false;
        }
        if self.timestamp {
            config.report.save_with_timestamp = true;
        } else if self.no_timestamp {
            config.report.save_with_timestamp = false;
        }
        if self.link_symbol {
            config.report.enable_link_symbol = true;
        }
        if let Some(dir) = &self.output_dir {
            config.files.output_dir = dir.clone();
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "gamescore=info",
        1 => "gamescore=debug",
        _ => "gamescore=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Run(args) => cmd_run(config_path, &args).await,
        Command::Slug { name } => cmd_slug(config_path, &name),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    Ok(match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

async fn cmd_run(config_path: Option<&Path>, args: &RunArgs) -> Result<()> {
    let mut app_config = load(config_path)?;
    args.apply(&mut app_config);

    // Fails on placeholder URLs before any network activity.
    let config = RunConfig::try_from(&app_config)?;

    info!(
        list_url = %config.list_url,
        cache = %config.cache_file.display(),
        skip_rescraping = config.skip_rescraping,
        "starting run"
    );

    let reporter = CliProgress::new();
    let result = match gamescore_core::run(&config, &reporter).await {
        Ok(result) => result,
        Err(e) => {
            reporter.abandon();
            return Err(e.into());
        }
    };

    println!();
    println!("  Done!");
    println!("  Listed:   {}", result.summary.listed);
    println!("  Cached:   {}", result.summary.already_cached);
    println!("  Scraped:  {}", result.summary.scraped);
    println!("  Skipped:  {}", result.summary.skipped.len());
    println!("  Report:   {}", result.report_path.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_slug(config_path: Option<&Path>, name: &str) -> Result<()> {
    let config = load(config_path)?;
    if name.trim().is_empty() {
        return Err(eyre!("game name must not be empty"));
    }
    println!("slug: {}", derive_slug(name));
    println!("url:  {}", detail_url(&config.sites.critic_site_url, name));
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    fn abandon(&self) {
        self.spinner.abandon_with_message("Stopped.");
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(format!("{name}..."));
    }

    fn waiting(&self, name: &str, delay: Duration) {
        self.spinner.set_message(format!(
            "Waiting ({}s) before requesting {name}...",
            delay.as_secs()
        ));
    }

    fn item_cached(&self, name: &str, current: usize, total: usize) {
        self.spinner.set_message(format!("[{current}/{total}] {name} (cached)"));
    }

    fn item_scraped(&self, record: &ScoreRecord, current: usize, total: usize) {
        let (mark, verdict) = scraped_verdict(record);
        self.spinner.suspend(|| {
            println!(
                "[{current}/{total}] {} : {} | {} - {}{mark}",
                record.name, record.critic_score, record.user_score, record.release_year
            );
            println!("  {verdict}");
        });
    }

    fn item_skipped(&self, name: &str, reason: &SkipReason, current: usize, total: usize) {
        self.spinner.suspend(|| {
            println!("[{current}/{total}] {name} : N/A | N/A - N/A");
            println!("  ERROR: {reason}");
        });
    }

    fn done(&self, _result: &RunResult) {
        self.spinner.finish_and_clear();
    }
}

/// Trailing mark and outcome line for a scraped record.
fn scraped_verdict(record: &ScoreRecord) -> (&'static str, &'static str) {
    if record.is_complete() {
        (" ✓", "GREAT SUCCESS: Everything was found on page!")
    } else {
        ("", "SUCCESS: At least the page was found.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "gamescore",
            "-v",
            "run",
            "--no-skip-rescraping",
            "--no-timestamp",
            "--output-dir",
            "reports",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);

        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert!(!config.scrape.skip_rescraping);
        assert!(!config.report.save_with_timestamp);
        assert_eq!(config.files.output_dir, "reports");
    }

    #[test]
    fn run_flags_override_config() {
        let args = RunArgs {
            list_url: Some("https://games.example.com/list/".into()),
            entry_url: Some("https://games.example.com".into()),
            link_symbol: true,
            ..RunArgs::default()
        };
        let mut config = AppConfig::default();
        args.apply(&mut config);

        let run = RunConfig::try_from(&config).unwrap();
        assert!(run.enable_link_symbol);
        assert!(run.save_with_timestamp);
        assert_eq!(run.entry_url, "https://games.example.com");
    }

    #[test]
    fn verdict_depends_on_missing_fields() {
        let mut record = ScoreRecord {
            name: "Portal".into(),
            link: "https://games.example.com/portal".into(),
            critic_score: "90".into(),
            user_score: "8.8".into(),
            release_year: "2007".into(),
        };
        assert_eq!(
            scraped_verdict(&record),
            (" ✓", "GREAT SUCCESS: Everything was found on page!")
        );

        record.user_score = gamescore_shared::NOT_AVAILABLE.into();
        assert_eq!(scraped_verdict(&record).1, "SUCCESS: At least the page was found.");
    }

    #[test]
    fn placeholders_fail_without_overrides() {
        let mut config = AppConfig::default();
        RunArgs::default().apply(&mut config);
        assert!(RunConfig::try_from(&config).is_err());
    }
}
