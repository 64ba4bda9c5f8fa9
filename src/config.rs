//! Dashboard configuration, read from `dashboard.toml`.
//!
//! ```toml
//! [database]
//! url = "https://example-default-rtdb.asia-southeast1.firebasedatabase.app"
//! timeout_seconds = 10
//!
//! [history]
//! days = 7
//! range_start = "01-01-2024"
//! range_end = "07-01-2024"
//!
//! [classification]
//! pm0_1 = "coarse"
//! pm2_5 = "fine"
//!
//! [refresh]
//! interval_seconds = 60
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section is optional. `DATABASE_URL` overrides `database.url`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::classify::{TablePreset, ThresholdTable};
use crate::models::{DateRange, Metric};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DashboardConfig {
    pub database: DatabaseConfig,
    pub history: HistoryConfig,
    pub classification: ClassificationConfig,
    pub refresh: RefreshConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub auth: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            auth: None,
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub days: usize,
    /// Shown until at least two dates have been fetched.
    pub range_start: String,
    pub range_end: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            days: 7,
            range_start: "01-01-2024".to_string(),
            range_end: "07-01-2024".to_string(),
        }
    }
}

impl HistoryConfig {
    pub fn prior_range(&self) -> DateRange {
        DateRange {
            start: self.range_start.clone(),
            end: self.range_end.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ClassificationConfig {
    pub pm0_1: TablePreset,
    pub pm2_5: TablePreset,
}

impl ClassificationConfig {
    /// Temperature and humidity use comfort bands instead of a table.
    pub fn table_for(&self, metric: Metric) -> Option<&'static ThresholdTable> {
        match metric {
            Metric::Pm0_1 => Some(self.pm0_1.table()),
            Metric::Pm2_5 => Some(self.pm2_5.table()),
            Metric::Temperature | Metric::Humidity => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_seconds: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// An explicit path must load. Otherwise the usual locations are tried and
    /// defaults are used when none exists.
    pub fn load_or_default(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let candidates = [
                    PathBuf::from("dashboard.toml"),
                    PathBuf::from("config").join("dashboard.toml"),
                ];
                match candidates.iter().find(|path| path.exists()) {
                    Some(path) => Self::load(path)?,
                    None => Self::default(),
                }
            }
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = Some(url);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [database]
            url = "https://example.firebaseio.com"
            auth = "secret"
            timeout_seconds = 3

            [history]
            days = 14
            range_start = "2024-01-01"
            range_end = "2024-01-14"

            [classification]
            pm0_1 = "fine"
            pm2_5 = "coarse"

            [refresh]
            interval_seconds = 30

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url.as_deref(), Some("https://example.firebaseio.com"));
        assert_eq!(config.database.timeout_seconds, 3);
        assert_eq!(config.history.days, 14);
        assert_eq!(config.history.prior_range().end, "2024-01-14");
        assert_eq!(config.classification.pm0_1, TablePreset::Fine);
        assert_eq!(config.refresh.interval_seconds, 30);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn omitted_sections_fall_back_to_defaults() {
        let config: DashboardConfig = toml::from_str("[history]\ndays = 3\n").unwrap();
        assert_eq!(config.history.days, 3);
        assert_eq!(config.history.range_start, "01-01-2024");
        assert_eq!(config.database.timeout_seconds, 10);
        assert_eq!(config.refresh.interval_seconds, 60);
        assert_eq!(config.classification.pm2_5, TablePreset::Coarse);
        assert!(config.classification.table_for(Metric::Humidity).is_none());
        assert_eq!(
            config.classification.table_for(Metric::Pm0_1).map(|t| t.name),
            Some("coarse")
        );
    }

    #[test]
    fn rejects_unknown_presets() {
        assert!(toml::from_str::<DashboardConfig>("[classification]\npm2_5 = \"ultra\"\n").is_err());
    }

    #[test]
    fn explicit_path_must_exist_and_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        assert!(DashboardConfig::load(&path).is_err());

        std::fs::write(&path, "[refresh]\ninterval_seconds = 5\n").unwrap();
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.refresh.interval_seconds, 5);
    }
}
