use anyhow::Result;
use clap::Args;

use crate::aggregator::AggregatorConfig;
use crate::chart::print_warnings;
use crate::session::{self, BookArgs, QueryArgs};

#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Stop after printing this many rows
    #[arg(short, long)]
    pub limit: Option<usize>,
}

pub async fn run(args: TableArgs) -> Result<()> {
    let mut session = session::open(&args.query).await?;
    let render = session.dashboard.render(&session.request).await;
    let book = session.dashboard.book();

    print_warnings(&render);
    println!("{}", render.header());
    println!("{:>12} | {:>10} | {:>18} | {:>12}", "date", "symbol", "name", "value");

    let limit = args.limit.unwrap_or(usize::MAX);
    for row in render.table.iter().take(limit) {
        println!(
            "{:>12} | {:>10} | {:>18} | {:>12.4}",
            row.date.format("%Y-%m-%d").to_string(),
            row.symbol,
            book.name_for(&row.symbol).unwrap_or("-"),
            row.value
        );
    }
    Ok(())
}

#[derive(Debug, Args, Clone)]
pub struct SymbolsArgs {
    #[command(flatten)]
    pub book: BookArgs,
}

pub async fn run_symbols(args: SymbolsArgs) -> Result<()> {
    let config = AggregatorConfig {
        cache_enabled: !args.book.no_cache,
        ..AggregatorConfig::default()
    };
    let (mut dashboard, _) = session::open_book(&args.book, config).await?;
    for warning in dashboard.take_warnings() {
        println!("warning: {warning}");
    }
    for (name, ticker) in dashboard.book().iter() {
        println!("{name:<18} {ticker}");
    }
    Ok(())
}
