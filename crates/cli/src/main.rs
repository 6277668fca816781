//! # regstat-cli
//!
//! Command-line interface for regional statistics extraction.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use regstat_core::{
    period_key, EngineConfig, Extractor, MetricKind, MetricRecord, PeriodKey, RegionalReport,
    WorkbookCache,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// regstat - Regional indicators from statistical release workbooks
#[derive(Parser)]
#[command(name = "regstat")]
#[command(author, version, about = "Extract regional indicators from statistical workbooks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the sheets of a workbook
    Sheets {
        #[arg(value_name = "WORKBOOK")]
        workbook: PathBuf,

        /// Show which sheet a logical name resolves to
        #[arg(long, value_name = "NAME")]
        resolve: Option<String>,
    },

    /// Show the period columns recognized in a header row
    Header {
        #[arg(value_name = "WORKBOOK")]
        workbook: PathBuf,

        /// Logical sheet name
        #[arg(short, long)]
        sheet: String,

        /// Zero-based header row
        #[arg(short, long, default_value_t = 0)]
        row: usize,
    },

    /// Extract one indicator for one period
    Extract {
        #[arg(value_name = "WORKBOOK")]
        workbook: PathBuf,

        /// Indicator configuration (YAML)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Indicator name in the configuration
        #[arg(short, long)]
        indicator: String,

        #[arg(short, long)]
        year: i32,

        /// Quarter 1-4; annual figures when omitted
        #[arg(short, long)]
        quarter: Option<u8>,

        /// Number of regions in each ranking
        #[arg(long)]
        top: Option<usize>,

        /// Output format (json, table)
        #[arg(short = 'f', long = "format", default_value = "table")]
        format: OutputFormat,

        /// Fail instead of guessing columns by offset
        #[arg(long)]
        strict: bool,
    },
}

/// Output format for reports.
#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Pretty table output (default)
    #[default]
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    match cli.command {
        Command::Sheets { workbook, resolve } => list_sheets(&workbook, resolve.as_deref()),
        Command::Header {
            workbook,
            sheet,
            row,
        } => show_header(&workbook, &sheet, row),
        Command::Extract {
            workbook,
            config,
            indicator,
            year,
            quarter,
            top,
            format,
            strict,
        } => {
            let config = EngineConfig::from_path(&config)
                .with_context(|| format!("Failed to load config: {}", config.display()))?;
            let period = period_key(year, quarter)?;
            let report = run_extract(&config, &workbook, &indicator, period, top, strict)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => print!("{}", format_report(&report)),
            }
            Ok(())
        }
    }
}

fn list_sheets(workbook: &Path, resolve: Option<&str>) -> Result<()> {
    let cache = WorkbookCache::new();
    let names = cache
        .sheet_names(workbook)
        .with_context(|| format!("Failed to open workbook: {}", workbook.display()))?;

    println!("{}", format!("Sheets in {}", workbook.display()).cyan().bold());
    for name in &names {
        println!("  {name}");
    }

    if let Some(logical) = resolve {
        let matched = cache.resolve_sheet(workbook, logical)?;
        println!(
            "\n'{}' -> '{}' ({:?}, score {:.2})",
            logical.yellow(),
            matched.name.green(),
            matched.strategy,
            matched.score
        );
    }
    Ok(())
}

fn show_header(workbook: &Path, sheet: &str, row: usize) -> Result<()> {
    let cache = WorkbookCache::new();
    let table = cache
        .get_table(workbook, sheet)
        .with_context(|| format!("Failed to load sheet '{sheet}' from {}", workbook.display()))?;
    let index = table.period_index(row);

    println!(
        "{}",
        format!("Periods in '{}' row {row}", table.name()).cyan().bold()
    );
    if index.is_empty() {
        println!("  {}", "(no period labels recognized)".yellow());
    }
    for (year, col) in index.years() {
        println!("  {year:<10} col {col}");
    }
    for (key, col) in index.quarter_keys() {
        println!("  {key:<10} col {col}");
    }
    if let Some(col) = index.rightmost_column() {
        println!("  {:<10} col {col}", "rightmost".dimmed());
    }
    Ok(())
}

/// Extract an indicator and build its report.
fn run_extract(
    config: &EngineConfig,
    workbook: &Path,
    indicator: &str,
    period: PeriodKey,
    top: Option<usize>,
    strict: bool,
) -> Result<RegionalReport> {
    let extractor = Extractor::new(Arc::new(config.cache.build_cache()));
    let mut request = config.request(workbook, indicator, period)?;
    if strict {
        request = request.strict();
    }

    let extraction = extractor
        .extract(&request)
        .with_context(|| format!("Failed to extract '{indicator}' from {}", workbook.display()))?;
    Ok(extraction.report(
        &config.group_definition(),
        top.unwrap_or(config.ranking.top_n),
    ))
}

/// Format an optional figure; missing values print as `-`.
fn format_figure(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

fn format_change(record: &MetricRecord) -> String {
    match (record.derived, record.kind) {
        (None, _) => "-".to_string(),
        (Some(v), MetricKind::GrowthRate) => format!("{v:+.1}%"),
        (Some(v), MetricKind::Difference) => format!("{v:+.1}%p"),
        (Some(v), MetricKind::Contribution) => format!("{v:+.1}"),
    }
}

fn format_ranking(records: &[MetricRecord]) -> String {
    if records.is_empty() {
        return "-".to_string();
    }
    records
        .iter()
        .map(|r| format!("{} {}", r.region, format_change(r)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a report as a plain-text table.
fn format_report(report: &RegionalReport) -> String {
    let mut out = String::new();

    let mut title = format!(
        "{} ({}) {} vs {}",
        report.indicator, report.sheet, report.period, report.comparison_period
    )
    .cyan()
    .bold()
    .to_string();
    if report.approximate {
        title.push_str(&format!(" {}", "[approximate columns]".yellow()));
    }
    out.push_str(&title);
    out.push('\n');

    out.push_str(&format!(
        "{:<8}{:<6}{:>10}{:>10}{:>10}\n",
        "group", "region", "current", "previous", "change"
    ));
    for row in &report.table.rows {
        let group = row.group_name.as_deref().unwrap_or("");
        let (current, previous, change) = match row.metrics.first() {
            Some(record) => (
                format_figure(record.value),
                format_figure(record.comparison_value),
                format_change(record),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        let change = match row.metrics.first().and_then(|r| r.derived) {
            Some(v) if v > 0.0 => change.red().to_string(),
            Some(v) if v < 0.0 => change.blue().to_string(),
            _ => change,
        };
        out.push_str(&format!(
            "{group:<8}{:<6}{current:>10}{previous:>10}{change:>10}\n",
            row.display_name
        ));
    }

    out.push_str(&format!(
        "\n{} {}\n{} {}\n",
        "Top increase:".green().bold(),
        format_ranking(&report.top_increase),
        "Top decrease:".green().bold(),
        format_ranking(&report.top_decrease)
    ));
    out
}
