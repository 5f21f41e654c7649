use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use evdash_core::config::Config;
use evdash_core::loader::{CsvLoader, DatasetCache, LoadReport};
use evdash_core::{Dataset, NumericField, VehicleType};
use evdash_pipeline::aggregate::{self, ChartData};
use evdash_pipeline::page::{catalog, find as find_page};
use evdash_pipeline::{Action, ActionOutcome, PageConfig, RecordCounts, Session};
use evdash_sample::SampleSettings;
use evdash_select::SelectionEvent;

static DATASET: DatasetCache = DatasetCache::new();

/// Filter, sample and summarize Washington State EV registrations
#[derive(Parser)]
#[command(name = "evdash", version, propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// CSV export to load (overrides data.csv_path)
    #[arg(long, env = "EVDASH_CSV", global = true)]
    csv: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List the dashboard pages and the filters each one shows
    Pages,
    /// Run one page's pipeline and print its charts
    Run {
        /// Page id (see `evdash pages`)
        #[arg(long, default_value = "executive")]
        page: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print the manufacturer leaderboard
    TopMakes {
        /// How many makes to show
        #[arg(short, default_value = "10")]
        n: usize,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Keep only these makes (repeatable)
    #[arg(long = "make")]
    makes: Vec<String>,

    /// Keep only these counties (repeatable)
    #[arg(long = "county")]
    counties: Vec<String>,

    /// Keep only these vehicle types: BEV or PHEV (repeatable)
    #[arg(long = "type")]
    vehicle_types: Vec<VehicleType>,

    /// Model year span, e.g. 2018..2023
    #[arg(long)]
    year: Option<Span>,

    /// Base price span, e.g. 30000..60000
    #[arg(long)]
    price: Option<Span>,

    /// Electric range span in miles, e.g. 50..200
    #[arg(long)]
    range: Option<Span>,

    /// Simulate a chart click, e.g. county=King or electric-range=100..300
    #[arg(long)]
    select: Option<SelectionEvent>,

    /// Show every filtered record instead of a sample
    #[arg(long)]
    no_sample: bool,

    /// Sample size when sampling
    #[arg(long)]
    sample_size: Option<usize>,

    /// Sample seed
    #[arg(long)]
    seed: Option<u64>,
}

/// `lo..hi`, inclusive.
#[derive(Clone, Copy)]
struct Span {
    min: f64,
    max: f64,
}

impl FromStr for Span {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (lo, hi) = s.split_once("..").ok_or_else(|| format!("expected lo..hi, got {s:?}"))?;
        let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
        Ok(Span { min: parse(lo)?, max: parse(hi)? })
    }
}

impl FilterArgs {
    fn actions(&self, page: &PageConfig) -> Vec<Action> {
        let mut actions = vec![
            Action::SetMakes(self.makes.clone()),
            Action::SetCounties(self.counties.clone()),
            Action::SetVehicleTypes(self.vehicle_types.clone()),
        ];
        for (field, span) in [
            (NumericField::ModelYear, self.year),
            (NumericField::Price, self.price),
            (NumericField::ElectricRange, self.range),
        ] {
            if let Some(span) = span {
                actions.push(Action::SetRange { field, min: span.min, max: span.max });
            }
        }
        if let Some(event) = &self.select {
            match page.group() {
                Some(group) => actions.push(Action::Select { group: group.clone(), event: event.clone() }),
                None => warn!(page = page.id(), "page is standalone; --select has no effect"),
            }
        }
        actions
    }

    fn sampling(&self, configured: SampleSettings) -> Result<SampleSettings> {
        Ok(SampleSettings::new(
            configured.enabled() && !self.no_sample,
            self.sample_size.unwrap_or(configured.target_size()),
            self.seed.unwrap_or(configured.seed()),
        )?)
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    page: &'a str,
    load: Option<LoadReport>,
    counts: RecordCounts,
    summary: String,
    charts: Vec<ChartData>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;

    match &cli.command {
        Command::Pages => print_pages(cli.format),
        Command::Run { page, filters } => {
            let page = find_page(page)?;
            let session = open_session(&cli, &config, &page, filters)?;
            let output = session.run(&page);
            let report = RunReport {
                page: page.id(),
                load: DATASET.report(),
                counts: output.counts(),
                summary: output.summary(),
                charts: page.charts().iter().map(|kind| ChartData::compute(*kind, &output)).collect(),
            };
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => {
                    println!("{}\n{}", page.title(), report.summary);
                    if let Some(load) = report.load {
                        println!(
                            "Loaded {} of {} CSV rows ({} dropped)",
                            load.rows_kept, load.rows_read, load.rows_dropped
                        );
                    }
                    println!();
                    for chart in &report.charts {
                        print_chart(chart);
                    }
                }
            }
            Ok(())
        }
        Command::TopMakes { n, filters } => {
            let page = find_page("top-manufacturers")?;
            let session = open_session(&cli, &config, &page, filters)?;
            let output = session.run(&page);
            let rows: Vec<_> = output.filtered_records().collect();
            let leaders = aggregate::top_makes(&rows, *n);
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&leaders)?),
                OutputFormat::Table => {
                    println!("{}\n", output.summary());
                    print_chart(&ChartData::TopMakes(leaders));
                }
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();
}

fn load_dataset(cli: &Cli, config: &Config) -> Result<Arc<Dataset>> {
    let path = match &cli.csv {
        Some(path) => path.clone(),
        None => config.csv_path().context("reading data.csv_path")?,
    };
    let loader = CsvLoader::new(config.loader_options().context("reading [loader] config")?);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Loading {}", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let dataset = DATASET.get_or_load(&path, &loader).with_context(|| format!("loading {}", path.display()));
    spinner.finish_and_clear();
    if let Some(report) = DATASET.report() {
        info!(
            path = %path.display(),
            read = report.rows_read,
            kept = report.rows_kept,
            dropped = report.rows_dropped,
            "dataset ready"
        );
    }
    dataset
}

fn open_session(cli: &Cli, config: &Config, page: &PageConfig, filters: &FilterArgs) -> Result<Session> {
    let dataset = load_dataset(cli, config)?;
    let configured: SampleSettings = config.get_or_default("sample").context("reading [sample] config")?;
    let mut session = Session::new(dataset, filters.sampling(configured)?);
    for action in filters.actions(page) {
        match session.apply(action)? {
            ActionOutcome::RangeClamped { field, requested, applied } => {
                warn!(%field, %requested, %applied, "range clamped to the data");
            }
            ActionOutcome::RangeOutsideData { field, requested } => {
                warn!(%field, %requested, "range matches no records");
            }
            ActionOutcome::Applied | ActionOutcome::SelectionReplaced(_) => {}
        }
    }
    Ok(session)
}

fn print_pages(format: OutputFormat) -> Result<()> {
    let pages = catalog();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pages)?),
        OutputFormat::Table => {
            for page in &pages {
                let filters: Vec<String> = page.filters().map(|d| d.to_string()).collect();
                let linkage = page.group().map_or_else(|| "standalone".to_string(), |g| format!("linked ({g})"));
                println!("{:<20} {:<32} {:<18} {}", page.id(), page.title(), linkage, filters.join(", "));
            }
        }
    }
    Ok(())
}

fn print_chart(chart: &ChartData) {
    match chart {
        ChartData::TypeCounts(counts) => {
            println!("Vehicles by type");
            for (kind, count) in counts {
                println!("  {:<6} {:>10}", kind, count);
            }
        }
        ChartData::RangeScatter(points) => {
            println!("Range vs model year: {} points", points.len());
        }
        ChartData::RangeBoxPlot(summaries) => {
            println!("Electric range by type (min / q1 / median / q3 / max)");
            for s in summaries {
                println!(
                    "  {:<6} {:>7.1} {:>7.1} {:>7.1} {:>7.1} {:>7.1}  (n={})",
                    s.vehicle_type, s.min, s.q1, s.median, s.q3, s.max, s.count
                );
            }
        }
        ChartData::MakeYearHeatmap(cells) => {
            println!("Vehicles by make and model year");
            for cell in cells {
                println!("  {:<16} {} {:>8}", cell.make, cell.model_year, cell.count);
            }
        }
        ChartData::AverageRangeByType(averages) => {
            println!("Average electric range");
            for a in averages {
                println!("  {:<6} {:>8.2} mi  (n={})", a.vehicle_type, a.mean_range, a.count);
            }
        }
        ChartData::RangeTrend(series) => {
            println!("Electric range trend");
            for (kind, points) in series {
                let line: Vec<String> = points.iter().map(|p| format!("{}:{:.0}", p.model_year, p.mean_range)).collect();
                println!("  {:<6} {}", kind, line.join("  "));
            }
        }
        ChartData::TopMakes(leaders) => {
            println!("Top manufacturers");
            for (rank, (make, count)) in leaders.iter().enumerate() {
                println!("  {:>2}. {:<16} {:>8}", rank + 1, make, count);
            }
        }
    }
    println!();
}
