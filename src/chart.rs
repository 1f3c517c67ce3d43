use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rgb::RGB8;
use textplots::{Chart, ColorPlot, Shape};

use crate::constants::{CHART_HEIGHT, CHART_WIDTH, LINE_COLORS};
use crate::dashboard::Render;
use crate::logging;
use crate::model::{PriceField, SymbolBook};
use crate::pipeline::PlotSeries;
use crate::session::{self, QueryArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// ASCII line chart
    #[default]
    Text,
    /// Plot model as JSON
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Output as a terminal chart or as JSON for another renderer
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Chart width in characters
    #[arg(long, default_value_t = CHART_WIDTH)]
    pub width: u32,

    /// Chart height in characters
    #[arg(long, default_value_t = CHART_HEIGHT)]
    pub height: u32,
}

pub async fn run(args: ChartArgs) -> Result<()> {
    let mut session = session::open(&args.query).await?;
    let render = session.dashboard.render(&session.request).await;

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&render)?);
        return Ok(());
    }

    let y_label = if session.request.normalize {
        "Index (first observation = 100)".to_string()
    } else {
        price_label(session.dashboard.aggregator().config().field)
    };
    print_warnings(&render);
    println!("{}", render.header());
    render_chart(
        &render.plot,
        session.dashboard.book(),
        &y_label,
        args.width,
        args.height,
    );
    Ok(())
}

pub(crate) fn print_warnings(render: &Render) {
    for warning in &render.warnings {
        println!("warning: {warning}");
    }
}

fn price_label(field: PriceField) -> String {
    format!("{field} price")
}

/// Series converted to chart coordinates: x is days since the earliest plotted date.
#[derive(Debug, PartialEq)]
struct ChartSamples {
    origin: NaiveDate,
    max_x: f32,
    lines: Vec<(String, Vec<(f32, f32)>)>,
}

fn chart_samples(plot: &PlotSeries) -> Option<ChartSamples> {
    let origin = plot
        .values()
        .filter_map(|points| points.first().map(|(date, _)| *date))
        .min()?;

    let mut max_x: f32 = 0.0;
    let lines: Vec<(String, Vec<(f32, f32)>)> = plot
        .iter()
        .filter(|(_, points)| !points.is_empty())
        .map(|(symbol, points)| {
            let samples: Vec<(f32, f32)> = points
                .iter()
                .map(|(date, value)| {
                    let x = (*date - origin).num_days() as f32;
                    max_x = max_x.max(x);
                    (x, *value as f32)
                })
                .collect();
            (symbol.clone(), samples)
        })
        .collect();

    Some(ChartSamples {
        origin,
        max_x,
        lines,
    })
}

/// Legend name and RGB colour for the `idx`-th plotted line; the palette wraps around.
fn line_color(idx: usize) -> (&'static str, RGB8) {
    let (name, [r, g, b]) = LINE_COLORS[idx % LINE_COLORS.len()];
    (name, RGB8::new(r, g, b))
}

fn render_chart(plot: &PlotSeries, book: &SymbolBook, y_label: &str, width: u32, height: u32) {
    let Some(samples) = chart_samples(plot) else {
        logging::info_simple("chart.empty", "No series to draw for the current selection");
        println!("Nothing to chart: no data for the current selection.");
        return;
    };

    for (idx, (symbol, points)) in samples.lines.iter().enumerate() {
        let label = book.name_for(symbol).unwrap_or(symbol);
        let (color, _) = line_color(idx);
        let first = points.first().map(|(_, y)| *y).unwrap_or_default();
        let last = points.last().map(|(_, y)| *y).unwrap_or_default();
        println!(
            "  [{color}] {label} ({symbol}): {} points, {:.2} → {:.2}",
            points.len(),
            first,
            last
        );
    }
    println!(
        "x: days since {} | y: {}",
        samples.origin.format("%Y-%m-%d"),
        y_label
    );

    let shapes: Vec<Shape> = samples
        .lines
        .iter()
        .map(|(_, points)| Shape::Lines(points))
        .collect();

    let plot_width = width.max(40);
    let plot_height = height.max(10);
    let mut chart = Chart::new(plot_width, plot_height, 0.0, samples.max_x.max(1.0));
    let mut canvas = &mut chart;
    for (idx, shape) in shapes.iter().enumerate() {
        let (_, color) = line_color(idx);
        canvas = canvas.linecolorplot(shape, color);
    }
    canvas.display();
    println!();
}
