use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

use loglens::analytics::{
    categorical_distribution, summary_metrics, time_series, CategoricalField, SeriesMetric,
};
use loglens::dataset::{FilterSpec, LogDataset};
use loglens::models::AnalyticsError;
use loglens::parser::LineParser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyze HTTP access-log files", long_about = None)]
struct Args {
    /// Path to the access-log file
    #[arg(short, long)]
    log_file: PathBuf,

    /// Start of the date range (inclusive, YYYY-MM-DD); defaults to the
    /// earliest date in the file
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End of the date range (inclusive, YYYY-MM-DD); defaults to the latest
    /// date in the file
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Status codes to keep (repeatable); defaults to every status present
    #[arg(long)]
    status: Vec<u16>,

    /// Methods to keep (repeatable); defaults to every method present
    #[arg(long)]
    method: Vec<String>,

    /// Time-series bucket width in minutes
    #[arg(long, default_value = "60")]
    bucket_minutes: i64,

    /// Number of rows in the top-N tables
    #[arg(long, default_value = "10")]
    top: usize,

    /// Write the full report as JSON to this path instead of printing tables
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Loading log file: {:?}", args.log_file);
    let parser = LineParser::new();
    let dataset = LogDataset::from_path(&args.log_file, &parser)?;

    let total = dataset.len() + dataset.failures().len();
    info!("Parsed {} of {} lines", dataset.len(), total);
    if !dataset.failures().is_empty() {
        warn!("{} of {} lines unparsed", dataset.failures().len(), total);
    }

    let spec = build_filter(&args, &dataset);
    let filtered = dataset.filter(&spec);
    info!("{} records after filtering", filtered.len());

    let metrics = match summary_metrics(&filtered) {
        Ok(m) => Some(m),
        Err(AnalyticsError::EmptyDataset) => {
            warn!("no records match the filter; metrics are undefined");
            None
        }
    };

    let requests = time_series(
        &filtered,
        Duration::minutes(args.bucket_minutes),
        SeriesMetric::Count,
    );
    let response_times = time_series(
        &filtered,
        Duration::minutes(args.bucket_minutes),
        SeriesMetric::MeanResponseTime,
    );
    let top_paths = categorical_distribution(&filtered, CategoricalField::Path, Some(args.top));
    let statuses = categorical_distribution(&filtered, CategoricalField::Status, None);
    let methods = categorical_distribution(&filtered, CategoricalField::Method, None);
    let browsers = categorical_distribution(&filtered, CategoricalField::Browser, Some(args.top));

    if let Some(output_path) = args.output {
        info!("Writing report to {:?}", output_path);
        let report = serde_json::json!({
            "total_lines": total,
            "parsed_records": dataset.len(),
            "unparsed_lines": dataset.failures().len(),
            "filtered_records": filtered.len(),
            "summary": metrics,
            "requests_per_bucket": requests,
            "mean_response_time_per_bucket": response_times,
            "top_paths": top_paths,
            "status_distribution": statuses,
            "method_distribution": methods,
            "browser_distribution": browsers,
        });
        let output = serde_json::to_string_pretty(&report)?;
        std::fs::write(&output_path, output)
            .with_context(|| format!("Failed to write report: {:?}", output_path))?;
        return Ok(());
    }

    println!("\n=== Summary ===");
    println!("Lines read:        {}", total);
    println!("Parsed records:    {}", dataset.len());
    println!("Unparsed lines:    {}", dataset.failures().len());
    println!("After filtering:   {}", filtered.len());
    if let Some(m) = &metrics {
        println!("Avg response time: {:.2} ms", m.mean_response_time_ms);
        println!("Total requests:    {}", m.total_requests);
        println!("Success rate:      {:.1}%", m.success_rate_pct);
    } else {
        println!("No records matched the filter.");
    }

    println!("\n=== Requests per {}-minute bucket ===", args.bucket_minutes);
    for (bucket, count) in &requests {
        println!("{}  {}", bucket.format("%Y-%m-%d %H:%M"), *count as u64);
    }

    print_table("Top paths", &top_paths);
    print_table("Status codes", &statuses);
    print_table("Methods", &methods);
    print_table("Browsers", &browsers);

    Ok(())
}

/// Assemble the filter from CLI flags, defaulting each dimension to
/// "everything present in the file" the way a dashboard's multiselects start
/// out with every option selected.
fn build_filter(args: &Args, dataset: &LogDataset) -> FilterSpec {
    let dates: Vec<NaiveDate> = dataset
        .records()
        .iter()
        .map(|r| r.timestamp.date_naive())
        .collect();
    let min_date = dates.iter().min().copied();
    let max_date = dates.iter().max().copied();

    let fallback = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date");
    let start_date = args.from.or(min_date).unwrap_or(fallback);
    let end_date = args.to.or(max_date).unwrap_or(fallback);

    let statuses: HashSet<u16> = if args.status.is_empty() {
        dataset.records().iter().map(|r| r.status).collect()
    } else {
        args.status.iter().copied().collect()
    };
    let methods: HashSet<String> = if args.method.is_empty() {
        dataset.records().iter().map(|r| r.method.clone()).collect()
    } else {
        args.method.iter().cloned().collect()
    };

    FilterSpec {
        start_date,
        end_date,
        statuses,
        methods,
    }
}

fn print_table(title: &str, rows: &[(String, u64)]) {
    println!("\n=== {} ===", title);
    if rows.is_empty() {
        println!("(none)");
        return;
    }
    for (category, count) in rows {
        println!("{:<60} {}", category, count);
    }
}
