use clap::{Parser, Subcommand};

use crate::chart::ChartArgs;
use crate::table::{SymbolsArgs, TableArgs};

#[derive(Debug, Parser)]
#[command(author, version, about = "Historical price dashboard for a basket of tickers")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn command(self) -> Command {
        self.command
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, resample and chart the selected symbols
    Chart(ChartArgs),
    /// Print the resampled rows behind the chart
    Table(TableArgs),
    /// List the symbol book, including validated --add-ticker entries
    Symbols(SymbolsArgs),
}
