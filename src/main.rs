//! CLI entry point for the sales dashboard.
//!
//! Loads the sales dataset once, then serves one filter state per invocation:
//! a logged summary, the full view model as JSON, a CSV export of the filtered
//! rows, or the list of available filter choices.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sales_dashboard::cache::DatasetCache;
use sales_dashboard::config::AppConfig;
use sales_dashboard::filter::{FilterOptions, FilterParams};
use sales_dashboard::output::{export_records, log_summary, print_pretty, write_json};
use sales_dashboard::view::compute_view;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "sales_dashboard")]
#[command(about = "Filter and summarize a sales dataset", long_about = None)]
struct Cli {
    /// Preferred data file, usually gzip-compressed [env: SALES_DATA_PATH]
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// File to use when the preferred one does not exist [env: SALES_DATA_FALLBACK_PATH]
    #[arg(long, global = true, value_name = "PATH")]
    fallback: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log the key metrics and every summary table
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Emit the complete view model as JSON
    View {
        #[command(flatten)]
        filter: FilterArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export the filtered rows as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        /// CSV file to write
        #[arg(short, long, default_value = "filtered_sales.csv")]
        output: PathBuf,

        /// Gzip compress the output
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// List the dates and values the filters can select from
    Options {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// First day to include (DD-MM-YYYY or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    start: Option<NaiveDate>,

    /// Last day to include (DD-MM-YYYY or YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    end: Option<NaiveDate>,

    /// City to include; repeat for several. Default: all
    #[arg(long = "city", value_name = "CITY")]
    cities: Vec<String>,

    /// Manager to include; repeat for several. Default: all
    #[arg(long = "manager", value_name = "MANAGER")]
    managers: Vec<String>,

    /// Product to include; repeat for several. Default: all
    #[arg(long = "product", value_name = "PRODUCT")]
    products: Vec<String>,

    /// JSON filter document; command-line flags override its fields
    #[arg(long = "filter", value_name = "FILE")]
    filter_file: Option<PathBuf>,
}

impl FilterArgs {
    fn into_params(self) -> Result<FilterParams> {
        let base = match &self.filter_file {
            Some(path) => read_filter_file(path)?,
            None => FilterParams::default(),
        };

        let non_empty = |values: Vec<String>| -> Option<BTreeSet<String>> {
            (!values.is_empty()).then(|| {
                values
                    .iter()
                    .map(|v| v.trim().to_string())
                    .collect()
            })
        };
        let overrides = FilterParams {
            start: self.start,
            end: self.end,
            cities: non_empty(self.cities),
            managers: non_empty(self.managers),
            products: non_empty(self.products),
        };

        Ok(base.merged_with(overrides))
    }
}

fn read_filter_file(path: &Path) -> Result<FilterParams> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading filter file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing filter file {}", path.display()))
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| format!("'{value}' is not a date (expected DD-MM-YYYY or YYYY-MM-DD)"))
}

/// Filter built from the directives in `var`, falling back to `default` when
/// the variable is unset or holds no valid directive.
fn level_filter(var: &str, default: LevelFilter) -> EnvFilter {
    directives_filter(&std::env::var(var).unwrap_or_default(), default)
}

fn directives_filter(directives: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .parse_lossy(directives)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let config = AppConfig::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = config
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = config
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("sales_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(level_filter("RUST_LOG", LevelFilter::INFO));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(level_filter("RUST_LOG_JSON", LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let source = config.data_source(cli.data, cli.fallback);
    let mut cache = DatasetCache::new();
    let dataset = cache.get_or_load(&source)?;

    match cli.command {
        Commands::Summary { filter } => {
            let params = filter.into_params()?;
            let view = compute_view(&dataset, &params);
            print_pretty(&view);
            log_summary(&view);
        }
        Commands::View { filter, output } => {
            let params = filter.into_params()?;
            let view = compute_view(&dataset, &params);
            write_json(output.as_deref(), &view)?;
        }
        Commands::Export {
            filter,
            output,
            gzip,
        } => {
            let params = filter.into_params()?;
            let view = compute_view(&dataset, &params);
            export_records(&output, &view.records, dataset.extra_columns(), gzip)?;
        }
        Commands::Options { output } => {
            let options = FilterOptions::from_dataset(&dataset);
            info!(
                cities = options.cities.len(),
                managers = options.managers.len(),
                products = options.products.len(),
                "Filter options"
            );
            write_json(output.as_deref(), &options)?;
        }
    }

    Ok(())
}
