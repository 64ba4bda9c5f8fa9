use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::classify::{classify, indicator_color};
use crate::comfort::{humidity_comfort, temperature_comfort, Comfort};
use crate::config::ClassificationConfig;
use crate::models::{DailySeries, Metric, Reading, StatusTier};

const BAR_WIDTH: usize = 30;

fn metric_value(reading: &Reading, metric: Metric) -> f64 {
    match metric {
        Metric::Pm0_1 => reading.pm0_1,
        Metric::Pm2_5 => reading.pm2_5,
        Metric::Temperature => reading.temperature,
        Metric::Humidity => reading.humidity,
    }
}

/// A reading with its tiers and comfort bands, as emitted by `latest --json`.
#[derive(Debug, Serialize)]
pub struct ReadingSummary<'a> {
    pub reading: &'a Reading,
    pub pm0_1: Option<StatusTier>,
    pub pm2_5: Option<StatusTier>,
    pub temperature: Comfort,
    pub humidity: Comfort,
}

pub fn summarize_reading<'a>(
    reading: &'a Reading,
    classification: &ClassificationConfig,
) -> ReadingSummary<'a> {
    let tier = |metric: Metric| {
        classification
            .table_for(metric)
            .map(|table| classify(table, metric_value(reading, metric)))
    };

    ReadingSummary {
        reading,
        pm0_1: tier(Metric::Pm0_1),
        pm2_5: tier(Metric::Pm2_5),
        temperature: temperature_comfort(reading.temperature),
        humidity: humidity_comfort(reading.humidity),
    }
}

/// Plain-text summary of one reading, as printed by `latest` and `watch`.
pub fn describe_reading(reading: &Reading, classification: &ClassificationConfig) -> String {
    let mut output = String::new();
    let timestamp = reading.timestamp.as_deref().unwrap_or("unknown time");
    let _ = writeln!(output, "Reading at {timestamp}");

    for metric in [Metric::Pm0_1, Metric::Pm2_5] {
        let value = metric_value(reading, metric);
        if let Some(table) = classification.table_for(metric) {
            let tier = classify(table, value);
            let _ = writeln!(
                output,
                "  {:<8} {:>8.2} {}  {} {} [{}]",
                metric.label(),
                value,
                metric.unit(),
                tier.emoji,
                tier.status,
                indicator_color(table, value)
            );
        }
    }

    let temperature = temperature_comfort(reading.temperature);
    let humidity = humidity_comfort(reading.humidity);
    let _ = writeln!(
        output,
        "  {:<8} {:>8.0} {}  {} {} [{}]",
        Metric::Temperature.label(),
        reading.temperature,
        Metric::Temperature.unit(),
        temperature.emoji,
        temperature.label,
        temperature.color
    );
    let _ = writeln!(
        output,
        "  {:<8} {:>8.0} {}  {} {} [{}]",
        Metric::Humidity.label(),
        reading.humidity,
        Metric::Humidity.unit(),
        humidity.emoji,
        humidity.label,
        humidity.color
    );

    if let Some(table) = classification.table_for(Metric::Pm2_5) {
        let _ = writeln!(output, "  {}", classify(table, reading.pm2_5).advice);
    }

    output
}

/// Text bar chart of one series with its min/max legend and date range.
pub fn render_series(metric: Metric, series: &DailySeries) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} ย้อนหลัง {} วัน ({})",
        metric.label(),
        series.values.len(),
        metric.unit()
    );

    if series.values.is_empty() {
        let _ = writeln!(output, "No data recorded for this window.");
    }

    for (label, value) in series.date_labels.iter().zip(&series.values) {
        let filled = ((value / series.max) * BAR_WIDTH as f64).round().max(0.0) as usize;
        let _ = writeln!(
            output,
            "{:>10} | {:<width$} {:.prec$}",
            label,
            "█".repeat(filled.min(BAR_WIDTH)),
            value,
            width = BAR_WIDTH,
            prec = metric.precision() as usize
        );
    }

    let _ = writeln!(output, "{} to {}", series.range_start, series.range_end);
    let _ = writeln!(output, "Min {:.1}  Max {:.1}", series.min, series.max);
    output
}

pub fn build_report(
    window_path: &str,
    reading: &Reading,
    classification: &ClassificationConfig,
    series: &[(Metric, DailySeries)],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Air Quality Report");
    let _ = writeln!(
        output,
        "Latest reading from {} at {}",
        window_path,
        reading.timestamp.as_deref().unwrap_or("unknown time")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Particulate Matter");

    for metric in [Metric::Pm0_1, Metric::Pm2_5] {
        let value = metric_value(reading, metric);
        if let Some(table) = classification.table_for(metric) {
            let tier = classify(table, value);
            let _ = writeln!(
                output,
                "- {}: {:.2} {} {} {} ({} table, color {})",
                metric.label(),
                value,
                metric.unit(),
                tier.emoji,
                tier.status,
                table.name,
                tier.color
            );
        }
    }

    if let Some(table) = classification.table_for(Metric::Pm2_5) {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Health Recommendation");
        let _ = writeln!(output, "{}", classify(table, reading.pm2_5).advice);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Comfort");
    let temperature = temperature_comfort(reading.temperature);
    let humidity = humidity_comfort(reading.humidity);
    let _ = writeln!(
        output,
        "- {}: {:.0} °C ({})",
        Metric::Temperature.label(),
        reading.temperature,
        temperature.label
    );
    let _ = writeln!(
        output,
        "- {}: {:.0} % ({})",
        Metric::Humidity.label(),
        reading.humidity,
        humidity.label
    );

    for (metric, daily) in series {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {} History", metric.label());

        if daily.values.is_empty() {
            let _ = writeln!(output, "No daily data recorded for this window.");
            continue;
        }

        let _ = writeln!(output, "| Date | Value |");
        let _ = writeln!(output, "| --- | --- |");
        for (label, value) in daily.date_labels.iter().zip(&daily.values) {
            let _ = writeln!(
                output,
                "| {} | {:.prec$} |",
                label,
                value,
                prec = metric.precision() as usize
            );
        }
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "{} to {}, Min {:.1}, Max {:.1}",
            daily.range_start, daily.range_end, daily.min, daily.max
        );
    }

    output
}

#[derive(Serialize)]
struct SeriesRow<'a> {
    date: &'a str,
    value: f64,
}

pub fn write_series_csv(path: &Path, series: &DailySeries) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for (label, value) in series.date_labels.iter().zip(&series.values) {
        writer.serialize(SeriesRow {
            date: label,
            value: *value,
        })?;
    }

    writer.flush()?;
    Ok(())
}
