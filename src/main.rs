//! CLI entry point for the fleet metrics tool.
//!
//! Provides subcommands for aggregating exported JSON files, aggregating
//! data fetched from a Traccar server, and watching a live fleet.

mod infra;
mod services;

use crate::infra::traccar::{TraccarClient, TraccarSettings};
use crate::services::telemetry_api::{TelemetryApi, load_fleet_input};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fleet_metrics::signature::{QuerySignature, RefreshGuard};
use fleet_metrics::telemetry::parse_timestamp;
use fleet_metrics::{
    FleetInput, FleetReport, MetricsConfig, TimeWindow, active_devices, analyze, output, parser,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleet_metrics")]
#[command(about = "Engine, idle and fuel metrics for a GPS-tracked fleet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate exported devices, positions and trips JSON files
    Report {
        /// Devices JSON array
        #[arg(long)]
        devices: String,

        /// Positions JSON array
        #[arg(long)]
        positions: String,

        /// Trip summaries JSON array
        #[arg(long)]
        trips: Option<String>,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        metrics: MetricsArgs,
    },
    /// Fetch data for a window from the Traccar server and aggregate it
    Fetch {
        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        metrics: MetricsArgs,
    },
    /// Periodically aggregate today's data from the Traccar server
    Watch {
        /// Seconds between refresh checks
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,

        /// Window end is truncated to this many minutes; inputs are only
        /// refetched when the bucket or the device set changes
        #[arg(long, default_value_t = 5)]
        bucket_minutes: u32,

        #[command(flatten)]
        metrics: MetricsArgs,
    },
}

#[derive(Args)]
struct WindowArgs {
    /// Window start (RFC 3339, `YYYY-MM-DD HH:MM:SS` UTC, or epoch ms)
    #[arg(long, value_parser = parse_time_arg)]
    start: DateTime<Utc>,

    /// Window end, inclusive
    #[arg(long, value_parser = parse_time_arg)]
    end: DateTime<Utc>,
}

#[derive(Args)]
struct MetricsArgs {
    /// Only include devices whose name, unique id or plate contains this text
    #[arg(short, long)]
    search: Option<String>,

    /// Metrics config JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Fuel price per liter, overrides the config file
    #[arg(long)]
    fuel_price: Option<f64>,

    /// CSV file to append per-vehicle rows to
    #[arg(long)]
    csv: Option<String>,

    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

impl MetricsArgs {
    fn load_config(&self) -> Result<MetricsConfig> {
        let mut config = MetricsConfig::load_or_default(self.config.as_deref())?;
        if let Some(price) = self.fuel_price {
            config.fuel_price_per_liter = price;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fleet_metrics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fleet_metrics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            devices,
            positions,
            trips,
            window,
            metrics,
        } => {
            let config = metrics.load_config()?;
            let window = TimeWindow::new(window.start, window.end)?;

            let input = FleetInput {
                devices: parser::parse_devices(&read_file(&devices)?)?,
                positions: parser::parse_positions(&read_file(&positions)?)?,
                trips: match trips {
                    Some(path) => parser::parse_trips(&read_file(&path)?)?,
                    None => Vec::new(),
                },
            };
            info!(
                devices = input.devices.len(),
                positions = input.positions.len(),
                trips = input.trips.len(),
                "Input loaded"
            );

            let active = active_devices(&input.devices, metrics.search.as_deref());
            let report = analyze(&input, &active, &window, &config);
            emit(&report, &metrics)?;
        }
        Commands::Fetch { window, metrics } => {
            let config = metrics.load_config()?;
            let window = TimeWindow::new(window.start, window.end)?;
            let client = TraccarClient::new(&TraccarSettings::from_env()?)?;

            let devices = client.devices().await?;
            let active = active_devices(&devices, metrics.search.as_deref());
            info!(devices = devices.len(), active = active.len(), "Device list fetched");

            let load = load_fleet_input(&client, devices, &active, &window).await;
            if load.failed_requests > 0 {
                warn!(
                    failed = load.failed_requests,
                    "Some requests failed, report is incomplete"
                );
            }
            let report = analyze(&load.input, &active, &window, &config);
            emit(&report, &metrics)?;
        }
        Commands::Watch {
            interval_secs,
            bucket_minutes,
            metrics,
        } => {
            let config = metrics.load_config()?;
            let client = TraccarClient::new(&TraccarSettings::from_env()?)?;
            watch(&client, &config, &metrics, interval_secs, bucket_minutes).await?;
        }
    }

    Ok(())
}

fn parse_time_arg(s: &str) -> Result<DateTime<Utc>, String> {
    let value = match s.trim().parse::<i64>() {
        Ok(ms) => serde_json::Value::from(ms),
        Err(_) => serde_json::Value::from(s),
    };
    parse_timestamp(&value).ok_or_else(|| format!("unrecognized timestamp '{s}'"))
}

fn read_file(path: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read '{path}'"))
}

/// Prints the report to stdout and appends CSV rows when requested.
fn emit(report: &FleetReport, metrics: &MetricsArgs) -> Result<()> {
    match metrics.format {
        OutputFormat::Json => println!("{}", output::to_json(report)?),
        OutputFormat::Pretty => output::print_pretty(report),
    }

    if let Some(path) = &metrics.csv {
        output::append_records(path, &report.vehicles)?;
        info!(path = %path, rows = report.vehicles.len(), "CSV rows appended");
    }
    Ok(())
}

/// Window from UTC midnight of `now` to `now` truncated to the bucket.
fn bucketed_today_window(now: DateTime<Utc>, bucket_minutes: u32) -> Result<TimeWindow> {
    let bucket_secs = i64::from(bucket_minutes.max(1)) * 60;
    let end_secs = now.timestamp() - now.timestamp().rem_euclid(bucket_secs);
    let end = Utc
        .timestamp_opt(end_secs, 0)
        .single()
        .ok_or_else(|| anyhow!("window end out of range"))?;
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid midnight"))?
        .and_utc();

    TimeWindow::new(start, end.max(start))
}

#[tracing::instrument(skip(api, config, metrics))]
async fn watch<A: TelemetryApi>(
    api: &A,
    config: &MetricsConfig,
    metrics: &MetricsArgs,
    interval_secs: u64,
    bucket_minutes: u32,
) -> Result<()> {
    let mut guard = RefreshGuard::new();
    let mut ticker = tokio::time::interval(tokio::time::Duration::from_secs(interval_secs.max(1)));

    info!(interval_secs, bucket_minutes, "Watching fleet. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let devices = match api.devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "Device list fetch failed");
                continue;
            }
        };
        let active = active_devices(&devices, metrics.search.as_deref());
        let window = bucketed_today_window(Utc::now(), bucket_minutes)?;

        if !guard.should_refresh(&QuerySignature::new(&active, &window)) {
            debug!("Query unchanged, skipping refresh");
            continue;
        }

        let load = load_fleet_input(api, devices, &active, &window).await;
        if load.failed_requests > 0 {
            warn!(
                failed = load.failed_requests,
                "Some requests failed, retrying next tick"
            );
            guard.invalidate();
        }
        let report = analyze(&load.input, &active, &window, config);
        let t = &report.totals;
        info!(
            window_end = %window.end,
            vehicles = t.vehicles,
            distance_km = t.distance_km,
            trips = t.trips,
            engine_hours = t.engine_hours,
            driving_hours = t.driving_hours,
            idle_hours = t.idle_hours,
            fuel_liters = t.fuel_liters,
            idle_fuel_cost = t.idle_fuel_cost,
            "Fleet totals"
        );

        if let Some(path) = &metrics.csv {
            if let Err(e) = output::append_records(path, &report.vehicles) {
                warn!(error = %e, "Failed to append CSV rows");
            }
        }
    }
}
