use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use serde_json::json;

use crate::aggregator::AggregatorConfig;
use crate::constants::DEFAULT_HISTORY_DAYS;
use crate::dashboard::{Dashboard, RenderRequest, TickerValidation};
use crate::logging;
use crate::model::{DateRange, PriceField, ResamplePeriod, SelectionState};
use crate::source::{AnySource, SourceKind};

/// Inputs that decide which symbols exist and where their prices come from.
#[derive(Debug, Args, Clone)]
pub struct BookArgs {
    /// First day of the range (YYYY-MM-DD); defaults to 20 years before --end
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Extra ticker to validate and add to the symbol list (repeatable)
    #[arg(short = 't', long = "add-ticker", value_name = "TICKER")]
    pub add_ticker: Vec<String>,

    /// Where price history comes from
    #[arg(long, value_enum, default_value_t = SourceKind::Yahoo)]
    pub source: SourceKind,

    /// Fetch every series again instead of reusing identical requests
    #[arg(long)]
    pub no_cache: bool,
}

impl BookArgs {
    pub fn range(&self, today: NaiveDate) -> Result<DateRange> {
        let end = self.end.unwrap_or(today);
        let start = self
            .start
            .unwrap_or_else(|| DateRange::trailing(end, DEFAULT_HISTORY_DAYS).start());
        DateRange::new(start, end).context("invalid --start/--end combination")
    }
}

/// Inputs shared by every command that renders prices.
#[derive(Debug, Args, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub book: BookArgs,

    /// Resample daily prices to this period
    #[arg(long, value_enum, default_value_t = ResamplePeriod::Monthly)]
    pub period: ResamplePeriod,

    /// Price column to chart
    #[arg(long, value_enum, default_value_t = PriceField::AdjClose)]
    pub field: PriceField,

    /// Rebase every series to 100 at its first observation
    #[arg(short, long)]
    pub normalize: bool,

    /// Display name to chart (repeatable); all symbols when omitted
    #[arg(short, long = "select", value_name = "NAME")]
    pub select: Vec<String>,
}

impl QueryArgs {
    pub fn range(&self, today: NaiveDate) -> Result<DateRange> {
        self.book.range(today)
    }

    pub fn config(&self) -> AggregatorConfig {
        AggregatorConfig {
            period: self.period,
            field: self.field,
            cache_enabled: !self.book.no_cache,
        }
    }
}

pub struct Session {
    pub dashboard: Dashboard<AnySource>,
    pub request: RenderRequest,
}

/// Build the dashboard for `args`, validating any user tickers along the way.
pub async fn open(args: &QueryArgs) -> Result<Session> {
    let (dashboard, range) = open_book(&args.book, args.config()).await?;

    let selection = if args.select.is_empty() {
        SelectionState::all(dashboard.book())
    } else {
        args.select.iter().cloned().collect()
    };

    Ok(Session {
        dashboard,
        request: RenderRequest {
            range,
            selection,
            normalize: args.normalize,
        },
    })
}

/// Seed the symbol book and validate `--add-ticker` entries against the chosen source.
pub async fn open_book(
    args: &BookArgs,
    config: AggregatorConfig,
) -> Result<(Dashboard<AnySource>, DateRange)> {
    let range = args.range(Local::now().date_naive())?;
    let source =
        AnySource::from_kind(args.source).context("failed to set up market data source")?;
    logging::info(
        "session.open",
        "Dashboard session ready",
        logging::metadata_from_pairs(&[
            ("start", json!(range.start())),
            ("end", json!(range.end())),
            ("period", json!(config.period)),
            ("field", json!(config.field)),
        ]),
    );
    let mut dashboard = Dashboard::new(source, config);

    for ticker in &args.add_ticker {
        let outcome = dashboard.add_ticker(ticker, range).await;
        if outcome == TickerValidation::AlreadyPresent {
            logging::info(
                "ticker.duplicate",
                "Ticker already in symbol list",
                json!({ "ticker": ticker }),
            );
        }
    }

    Ok((dashboard, range))
}
