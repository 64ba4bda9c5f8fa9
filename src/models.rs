use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub pm0_1: f64,
    pub pm2_5: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub timestamp: Option<String>,
}

impl Reading {
    pub fn from_record(record: &AggregateRecord, timestamp: Option<String>) -> Self {
        Self {
            pm0_1: Metric::Pm0_1.value_of(record),
            pm2_5: Metric::Pm2_5.value_of(record),
            temperature: Metric::Temperature.value_of(record),
            humidity: Metric::Humidity.value_of(record),
            timestamp,
        }
    }
}

/// One summarized sample as stored upstream. Every field is optional; readers
/// fall back to 0 through [`Metric::value_of`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AggregateRecord {
    #[serde(default, alias = "PM0_1", alias = "pm0_1")]
    pub pm0_1_predicted: Option<f64>,
    #[serde(default, alias = "PM2_5")]
    pub pm2_5: Option<f64>,
    #[serde(default, alias = "Temperature")]
    pub temperature: Option<f64>,
    #[serde(default, alias = "Humidity")]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTier {
    pub status: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub text_color: &'static str,
    pub background_color: &'static str,
    pub advice: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    pub date_labels: Vec<String>,
    pub values: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub range_start: String,
    pub range_end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    #[value(name = "pm0_1")]
    Pm0_1,
    #[value(name = "pm2_5")]
    Pm2_5,
    Temperature,
    Humidity,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Pm0_1,
        Metric::Pm2_5,
        Metric::Temperature,
        Metric::Humidity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Pm0_1 => "PM 0.1",
            Metric::Pm2_5 => "PM 2.5",
            Metric::Temperature => "อุณหภูมิ",
            Metric::Humidity => "ความชื้น",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Pm0_1 | Metric::Pm2_5 => "μg/m³",
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
        }
    }

    /// Decimal places kept when values are read from raw sensor entries.
    pub fn precision(self) -> u32 {
        match self {
            Metric::Pm0_1 | Metric::Pm2_5 => 2,
            Metric::Temperature | Metric::Humidity => 1,
        }
    }

    pub fn select(self, record: &AggregateRecord) -> Option<f64> {
        match self {
            Metric::Pm0_1 => record.pm0_1_predicted,
            Metric::Pm2_5 => record.pm2_5,
            Metric::Temperature => record.temperature,
            Metric::Humidity => record.humidity,
        }
    }

    pub fn value_of(self, record: &AggregateRecord) -> f64 {
        self.select(record).filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataWindow {
    /// One-minute averages
    Latest,
    /// One-hour averages
    Average,
    /// Twenty-four-hour averages
    Daily,
}

impl DataWindow {
    pub const ALL: [DataWindow; 3] = [DataWindow::Latest, DataWindow::Average, DataWindow::Daily];

    pub fn path(self) -> &'static str {
        match self {
            DataWindow::Latest => "data_averaged_1m",
            DataWindow::Average => "data_averaged_1h",
            DataWindow::Daily => "data_averaged_24h",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PathCheck {
    pub path: &'static str,
    pub exists: bool,
    pub date_count: usize,
    pub latest_date: Option<String>,
    pub error: Option<String>,
}
