use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::Client;
use serde_json::{Map, Value};

use crate::models::{DataWindow, PathCheck};

/// REST client for the realtime database. Built once in `main` and passed to
/// whatever needs to fetch.
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    client: Client,
    base_url: String,
    auth: Option<String>,
}

impl RealtimeClient {
    pub fn new(base_url: &str, auth: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub async fn fetch(&self, path: &str, limit_to_last: Option<usize>) -> anyhow::Result<Value> {
        let url = format!("{}/{}.json", self.base_url, path);
        let mut query: Vec<(&str, String)> = Vec::new();

        if let Some(limit) = limit_to_last {
            query.push(("orderBy", "\"$key\"".to_string()));
            query.push(("limitToLast", limit.to_string()));
        }
        if let Some(token) = &self.auth {
            query.push(("auth", token.clone()));
        }

        tracing::debug!(%url, ?limit_to_last, "fetching path");
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("database returned status {status} for {path}");
        }

        response
            .json()
            .await
            .with_context(|| format!("invalid JSON returned for {path}"))
    }
}

/// A JSON export of the whole database, served from memory.
#[derive(Debug, Clone)]
pub struct ExportFile {
    root: Value,
}

impl ExportFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read export {}", path.display()))?;
        let root = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse export {}", path.display()))?;
        Ok(Self::from_value(root))
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn fetch(&self, path: &str, limit_to_last: Option<usize>) -> Value {
        let pointer = format!("/{}", path.trim_matches('/'));
        let value = self.root.pointer(&pointer).cloned().unwrap_or(Value::Null);

        match (value, limit_to_last) {
            (Value::Object(object), Some(limit)) => {
                let mut entries: Vec<(String, Value)> = object.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                let skip = entries.len().saturating_sub(limit);
                Value::Object(entries.into_iter().skip(skip).collect::<Map<_, _>>())
            }
            (value, _) => value,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Source {
    Remote(RealtimeClient),
    Export(ExportFile),
}

impl Source {
    pub async fn fetch(&self, path: &str, limit_to_last: Option<usize>) -> anyhow::Result<Value> {
        match self {
            Source::Remote(client) => client.fetch(path, limit_to_last).await,
            Source::Export(export) => Ok(export.fetch(path, limit_to_last)),
        }
    }
}

/// Probes every window path. Failures are recorded per path rather than
/// returned.
pub async fn check_all(source: &Source) -> Vec<PathCheck> {
    let mut results = Vec::with_capacity(DataWindow::ALL.len());

    for window in DataWindow::ALL {
        let path = window.path();
        tracing::info!(path, "checking path");

        let check = match source.fetch(path, None).await {
            Ok(Value::Object(object)) => {
                let latest_date = object.keys().max().cloned();
                tracing::info!(path, dates = object.len(), ?latest_date, "path has data");
                PathCheck {
                    path,
                    exists: true,
                    date_count: object.len(),
                    latest_date,
                    error: None,
                }
            }
            Ok(_) => {
                tracing::warn!(path, "no data found");
                PathCheck {
                    path,
                    exists: false,
                    date_count: 0,
                    latest_date: None,
                    error: None,
                }
            }
            Err(err) => {
                tracing::error!(path, error = %format!("{err:#}"), "failed to access path");
                PathCheck {
                    path,
                    exists: false,
                    date_count: 0,
                    latest_date: None,
                    error: Some(format!("{err:#}")),
                }
            }
        };
        results.push(check);
    }

    results
}
