//! Decoding of the JSON trees stored under each averaged-data path.
//!
//! Entries come in two shapes. A flat entry is the aggregate record itself:
//!
//! ```json
//! { "2024-03-05": { "pm0_1_predicted": 0.42, "pm2_5": 18.1, ... } }
//! ```
//!
//! A nested entry holds the raw samples of one day keyed by time, each with
//! its measurements under `Data`:
//!
//! ```json
//! { "2024-03-05": { "23:59:00": { "Data": { "PM0_1": 0.4213, "PM2_5": 18.07 } } } }
//! ```

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::{AggregateRecord, Metric, Reading};

#[derive(Debug, Deserialize)]
struct TimeEntry {
    #[serde(rename = "Data")]
    data: Option<AggregateRecord>,
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

fn rounded(record: AggregateRecord) -> AggregateRecord {
    let round = |metric: Metric, value: Option<f64>| value.map(|v| round_to(v, metric.precision()));
    AggregateRecord {
        pm0_1_predicted: round(Metric::Pm0_1, record.pm0_1_predicted),
        pm2_5: round(Metric::Pm2_5, record.pm2_5),
        temperature: round(Metric::Temperature, record.temperature),
        humidity: round(Metric::Humidity, record.humidity),
    }
}

fn is_nested(entry: &Map<String, Value>) -> bool {
    entry.values().any(Value::is_object)
}

/// Decodes one date entry. For nested entries the last time key wins; a
/// latest sample without `Data` yields an empty record.
pub fn decode_entry(key: &str, entry: &Value) -> anyhow::Result<AggregateRecord> {
    let Some(object) = entry.as_object() else {
        bail!("entry {key} is not an object");
    };

    if !is_nested(object) {
        return AggregateRecord::deserialize(entry)
            .with_context(|| format!("invalid aggregate record at {key}"));
    }

    let Some((time, latest)) = object.iter().max_by(|a, b| a.0.cmp(b.0)) else {
        return Ok(AggregateRecord::default());
    };
    if !latest.is_object() {
        tracing::debug!(key, time = %time, "latest sample is not an object");
        return Ok(AggregateRecord::default());
    }
    let sample = TimeEntry::deserialize(latest)
        .with_context(|| format!("invalid sample at {key}/{time}"))?;

    Ok(sample.data.map(rounded).unwrap_or_default())
}

fn as_object<'a>(path: &str, value: &'a Value) -> anyhow::Result<Option<&'a Map<String, Value>>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(object) => Ok(Some(object)),
        _ => bail!("data at {path} is not keyed by date"),
    }
}

pub fn latest_reading(path: &str, value: &Value) -> anyhow::Result<Reading> {
    let Some(object) = as_object(path, value)? else {
        bail!("no data found in {path}");
    };
    let Some((key, entry)) = object.iter().max_by(|a, b| a.0.cmp(b.0)) else {
        bail!("no latest date found in {path}");
    };

    let record = decode_entry(key, entry)?;
    tracing::debug!(path, key = %key, ?record, "resolved latest entry");
    Ok(Reading::from_record(&record, Some(key.clone())))
}

/// Decodes the most recent `days` entries under `path`.
pub fn daily_records(
    path: &str,
    value: &Value,
    days: usize,
) -> anyhow::Result<BTreeMap<String, AggregateRecord>> {
    let Some(object) = as_object(path, value)? else {
        return Ok(BTreeMap::new());
    };

    let mut keys: Vec<&String> = object.keys().collect();
    keys.sort();
    let skip = keys.len().saturating_sub(days);

    keys.into_iter()
        .skip(skip)
        .map(|key| -> anyhow::Result<(String, AggregateRecord)> {
            Ok((key.clone(), decode_entry(key, &object[key])?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_entries_decode_directly() {
        let record = decode_entry(
            "2024-03-05",
            &json!({ "pm0_1_predicted": 0.4213, "pm2_5": 18.07, "temperature": 30.0 }),
        )
        .unwrap();
        assert_eq!(record.pm0_1_predicted, Some(0.4213));
        assert_eq!(record.pm2_5, Some(18.07));
        assert_eq!(record.humidity, None);
    }

    #[test]
    fn nested_entries_use_latest_sample_and_round() {
        let entry = json!({
            "08:00:00": { "Data": { "PM0_1": 9.0, "PM2_5": 90.0, "Temperature": 20.0, "Humidity": 50.0 } },
            "23:59:00": { "Data": { "PM0_1": 0.4267, "PM2_5": 18.074, "Temperature": 29.46, "Humidity": 61.04 } }
        });
        let record = decode_entry("2024-03-05", &entry).unwrap();
        assert_eq!(record.pm0_1_predicted, Some(0.43));
        assert_eq!(record.pm2_5, Some(18.07));
        assert_eq!(record.temperature, Some(29.5));
        assert_eq!(record.humidity, Some(61.0));
    }

    #[test]
    fn latest_sample_without_data_is_empty() {
        let entry = json!({
            "08:00:00": { "Data": { "PM0_1": 1.0 } },
            "09:00:00": { "status": "offline" }
        });
        assert_eq!(decode_entry("2024-03-05", &entry).unwrap(), AggregateRecord::default());
    }

    #[test]
    fn latest_non_object_sample_is_empty() {
        let entry = json!({
            "08:00:00": { "Data": { "PM0_1": 1.0, "PM2_5": 20.0 } },
            "count": 5
        });
        assert_eq!(decode_entry("2024-03-05", &entry).unwrap(), AggregateRecord::default());
    }

    #[test]
    fn latest_reading_picks_greatest_key() {
        let value = json!({
            "2024-03-05": { "pm0_1_predicted": 0.2, "pm2_5": 10.0 },
            "2024-03-07": { "pm0_1_predicted": 0.5, "pm2_5": 31.0, "humidity": 70.0 },
            "2024-03-06": { "pm0_1_predicted": 0.3, "pm2_5": 12.0 }
        });
        let reading = latest_reading("data_averaged_1m", &value).unwrap();
        assert_eq!(reading.timestamp.as_deref(), Some("2024-03-07"));
        assert_eq!(reading.pm2_5, 31.0);
        assert_eq!(reading.temperature, 0.0);
        assert_eq!(reading.humidity, 70.0);
    }

    #[test]
    fn latest_reading_rejects_missing_data() {
        let err = latest_reading("data_averaged_1h", &Value::Null).unwrap_err();
        assert!(err.to_string().contains("no data found in data_averaged_1h"));

        let err = latest_reading("data_averaged_1h", &json!({})).unwrap_err();
        assert!(err.to_string().contains("no latest date"));

        assert!(latest_reading("data_averaged_1h", &json!([1, 2])).is_err());
    }

    #[test]
    fn daily_records_keep_most_recent_days() {
        let value = json!({
            "2024-03-01": { "pm2_5": 1.0 },
            "2024-03-02": { "pm2_5": 2.0 },
            "2024-03-03": { "pm2_5": 3.0 }
        });
        let records = daily_records("data_averaged_24h", &value, 2).unwrap();
        let keys: Vec<&str> = records.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-03-02", "2024-03-03"]);
        assert!(daily_records("data_averaged_24h", &Value::Null, 7).unwrap().is_empty());
    }
}
