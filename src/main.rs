use anyhow::Result;
use clap::Parser;
use market_dashboard::chart;
use market_dashboard::cli::{self, Cli};
use market_dashboard::logging;
use market_dashboard::table;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let result = match Cli::parse().command() {
        cli::Command::Chart(args) => chart::run(args).await,
        cli::Command::Table(args) => table::run(args).await,
        cli::Command::Symbols(args) => table::run_symbols(args).await,
    };

    if let Err(err) = &result {
        logging::error(
            "command.failed",
            "Command aborted",
            json!({ "error": format!("{err:#}") }),
        );
    }
    result
}
