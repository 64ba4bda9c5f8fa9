use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod classify;
mod comfort;
mod config;
mod models;
mod report;
mod series;
mod snapshot;
mod source;

use classify::TablePreset;
use config::{ClassificationConfig, DashboardConfig};
use models::{DataWindow, Metric};
use source::{ExportFile, RealtimeClient, Source};

#[derive(Parser)]
#[command(name = "air-quality-dashboard")]
#[command(about = "Live and historical air quality readings from a realtime database", long_about = None)]
struct Cli {
    /// Path to dashboard.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Read from a JSON export of the database instead of the live service
    #[arg(long, global = true)]
    export: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the latest reading with its status tiers
    Latest {
        #[arg(long, value_enum, default_value_t = DataWindow::Latest)]
        window: DataWindow,
        #[arg(long)]
        json: bool,
    },
    /// Chart one metric over the most recent days
    Chart {
        #[arg(long, value_enum)]
        metric: Metric,
        #[arg(long)]
        days: Option<usize>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        days: Option<usize>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Check that every averaged-data path is reachable
    Check {
        #[arg(long)]
        json: bool,
    },
    /// List the bands of a threshold table
    Tiers {
        #[arg(long, value_enum, default_value_t = TablePreset::Coarse)]
        preset: TablePreset,
    },
    /// Refetch the latest reading on a fixed interval
    Watch {
        #[arg(long, value_enum, default_value_t = DataWindow::Latest)]
        window: DataWindow,
        #[arg(long)]
        interval: Option<u64>,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_source(cli_export: Option<PathBuf>, config: &DashboardConfig) -> anyhow::Result<Source> {
    if let Some(path) = cli_export {
        tracing::info!(path = %path.display(), "reading from export file");
        return Ok(Source::Export(ExportFile::load(&path)?));
    }

    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL or database.url must point at the realtime database")?;
    let client = RealtimeClient::new(
        url,
        config.database.auth.clone(),
        Duration::from_secs(config.database.timeout_seconds),
    )?;
    Ok(Source::Remote(client))
}

/// Prints the latest reading every `period` until `shutdown` completes.
/// Shutdown also interrupts a fetch in flight. Returns the number of fetches
/// that finished.
async fn watch_readings<F: Future>(
    source: &Source,
    window: DataWindow,
    period: Duration,
    classification: &ClassificationConfig,
    shutdown: F,
) -> usize {
    let mut ticker = tokio::time::interval(period);
    tokio::pin!(shutdown);
    let mut refreshes = 0;

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        let fetched = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            fetched = source.fetch(window.path(), Some(1)) => fetched,
        };
        refreshes += 1;

        match fetched.and_then(|value| snapshot::latest_reading(window.path(), &value)) {
            Ok(reading) => print!("{}", report::describe_reading(&reading, classification)),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "failed to refresh reading");
            }
        }
    }

    tracing::info!("stopping");
    refreshes
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    init_logging(&config.logging.level);

    if let Commands::Tiers { preset } = cli.command {
        let table = preset.table();
        println!("{} table:", table.name);
        for band in table.bands {
            println!(
                "- up to {:>6.1}: {} {} ({})",
                band.upper_bound, band.tier.emoji, band.tier.status, band.tier.color
            );
        }
        println!(
            "- above:        {} {} ({})",
            table.worst.emoji, table.worst.status, table.worst.color
        );
        return Ok(());
    }

    let source = open_source(cli.export, &config)?;

    match cli.command {
        Commands::Latest { window, json } => {
            let value = source.fetch(window.path(), Some(1)).await?;
            let reading = snapshot::latest_reading(window.path(), &value)?;

            if json {
                let summary = report::summarize_reading(&reading, &config.classification);
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", report::describe_reading(&reading, &config.classification));
            }
        }
        Commands::Chart {
            metric,
            days,
            csv,
            json,
        } => {
            let days = days.unwrap_or(config.history.days);
            let path = DataWindow::Daily.path();
            let value = source.fetch(path, Some(days)).await?;
            let records = snapshot::daily_records(path, &value, days)?;
            let daily = series::build_daily_series(
                &records,
                |record| metric.select(record),
                &config.history.prior_range(),
            )?;

            if let Some(out) = csv {
                report::write_series_csv(&out, &daily)?;
                println!("Series written to {}.", out.display());
            } else if json {
                println!("{}", serde_json::to_string_pretty(&daily)?);
            } else {
                print!("{}", report::render_series(metric, &daily));
            }
        }
        Commands::Report { days, out } => {
            let days = days.unwrap_or(config.history.days);
            let latest_path = DataWindow::Latest.path();
            let latest = source.fetch(latest_path, Some(1)).await?;
            let reading = snapshot::latest_reading(latest_path, &latest)?;

            let daily_path = DataWindow::Daily.path();
            let history = source.fetch(daily_path, Some(days)).await?;
            let records = snapshot::daily_records(daily_path, &history, days)?;
            let all_series =
                series::build_metric_series(&records, &config.history.prior_range())?;

            let report =
                report::build_report(latest_path, &reading, &config.classification, &all_series);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Check { json } => {
            let checks = source::check_all(&source).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&checks)?);
                return Ok(());
            }
            for check in &checks {
                match (&check.error, check.exists) {
                    (Some(err), _) => println!("- {}: error: {}", check.path, err),
                    (None, true) => println!(
                        "- {}: {} dates, latest {}",
                        check.path,
                        check.date_count,
                        check.latest_date.as_deref().unwrap_or("none")
                    ),
                    (None, false) => println!("- {}: no data", check.path),
                }
            }
        }
        Commands::Watch { window, interval } => {
            let seconds = interval.unwrap_or(config.refresh.interval_seconds).max(1);
            tracing::info!(path = window.path(), seconds, "watching for new readings");
            watch_readings(
                &source,
                window,
                Duration::from_secs(seconds),
                &config.classification,
                tokio::signal::ctrl_c(),
            )
            .await;
        }
        // Printed above, before a source is needed.
        Commands::Tiers { .. } => {}
    }

    Ok(())
}
