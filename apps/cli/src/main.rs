//! GameScore CLI: build a spreadsheet of critic and user scores for every
//! game on a listing page.
//!
//! Scores are cached locally so each game is scraped at most once.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
