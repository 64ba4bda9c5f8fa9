use std::collections::BTreeMap;

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate};

use crate::models::{AggregateRecord, DailySeries, DateRange, Metric};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.",
    "ธ.ค.",
];

/// Keeps the chart axis non-degenerate when every value is zero.
const MAX_FLOOR: f64 = 0.1;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Keys must be zero padded so that string order matches date order.
pub fn parse_date_key(key: &str) -> anyhow::Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .with_context(|| format!("malformed date key {key:?}, expected YYYY-MM-DD"))?;
    if date.format(DATE_KEY_FORMAT).to_string() != key {
        bail!("malformed date key {key:?}, expected YYYY-MM-DD");
    }
    Ok(date)
}

pub fn format_date_label(key: &str) -> anyhow::Result<String> {
    let date = parse_date_key(key)?;
    Ok(format!(
        "{} {}",
        date.day(),
        MONTH_ABBREVIATIONS[date.month0() as usize]
    ))
}

/// Builds one chart series from date-keyed records.
///
/// `BTreeMap` iterates keys lexicographically, which is chronological for
/// `YYYY-MM-DD`. The date range is only replaced when at least two dates are
/// present; otherwise `prior` is carried through unchanged.
pub fn build_daily_series<F>(
    raw: &BTreeMap<String, AggregateRecord>,
    select: F,
    prior: &DateRange,
) -> anyhow::Result<DailySeries>
where
    F: Fn(&AggregateRecord) -> Option<f64>,
{
    let mut date_labels = Vec::with_capacity(raw.len());
    let mut values = Vec::with_capacity(raw.len());

    for (key, record) in raw {
        date_labels.push(format_date_label(key)?);
        values.push(select(record).filter(|v| v.is_finite()).unwrap_or(0.0));
    }

    let min = values
        .iter()
        .copied()
        .filter(|v| *v > 0.0)
        .reduce(f64::min)
        .unwrap_or(0.0);
    let max = values.iter().copied().fold(MAX_FLOOR, f64::max);

    let (range_start, range_end) = match (raw.keys().next(), raw.keys().next_back()) {
        (Some(first), Some(last)) if raw.len() >= 2 => (first.clone(), last.clone()),
        _ => (prior.start.clone(), prior.end.clone()),
    };

    Ok(DailySeries {
        date_labels,
        values,
        min,
        max,
        range_start,
        range_end,
    })
}

pub fn build_metric_series(
    raw: &BTreeMap<String, AggregateRecord>,
    prior: &DateRange,
) -> anyhow::Result<Vec<(Metric, DailySeries)>> {
    Metric::ALL
        .iter()
        .map(|metric| -> anyhow::Result<(Metric, DailySeries)> {
            let series = build_daily_series(raw, |record| metric.select(record), prior)?;
            Ok((*metric, series))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pm_record(value: Option<f64>) -> AggregateRecord {
        AggregateRecord {
            pm0_1_predicted: value,
            ..AggregateRecord::default()
        }
    }

    fn prior() -> DateRange {
        DateRange {
            start: "01-01-2024".to_string(),
            end: "07-01-2024".to_string(),
        }
    }

    fn pm_series(raw: &BTreeMap<String, AggregateRecord>) -> DailySeries {
        build_daily_series(raw, |record| Metric::Pm0_1.select(record), &prior()).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let series = pm_series(&BTreeMap::new());
        assert!(series.date_labels.is_empty());
        assert!(series.values.is_empty());
        assert_eq!(series.min, 0.0);
        assert_eq!(series.max, MAX_FLOOR);
        assert_eq!(series.range_start, "01-01-2024");
        assert_eq!(series.range_end, "07-01-2024");
    }

    #[test]
    fn zero_days_do_not_depress_the_minimum() {
        let raw = BTreeMap::from([
            ("2024-01-01".to_string(), pm_record(Some(5.0))),
            ("2024-01-02".to_string(), pm_record(Some(0.0))),
        ]);
        let series = pm_series(&raw);
        assert_eq!(series.min, 5.0);
        assert_eq!(series.max, 5.0);
        assert_eq!(series.range_start, "2024-01-01");
        assert_eq!(series.range_end, "2024-01-02");
    }

    #[test]
    fn week_of_values_keeps_order_and_extremes() {
        let values = [0.2, 0.4, 0.5, 0.6, 0.8, 1.0, 0.7];
        let raw: BTreeMap<String, AggregateRecord> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("2024-01-{:02}", i + 1), pm_record(Some(*v))))
            .collect();

        let series = pm_series(&raw);
        assert_eq!(series.date_labels.len(), 7);
        assert_eq!(series.values, values.to_vec());
        assert_eq!(series.max, 1.0);
        assert_eq!(series.min, 0.2);
        assert_eq!(series.date_labels[0], "1 ม.ค.");
        assert_eq!(series.date_labels[6], "7 ม.ค.");
    }

    #[test]
    fn keys_are_sorted_and_missing_values_become_zero() {
        let raw = BTreeMap::from([
            ("2024-02-10".to_string(), pm_record(Some(3.0))),
            ("2024-01-31".to_string(), pm_record(None)),
            ("2024-02-01".to_string(), pm_record(Some(f64::NAN))),
        ]);
        let series = pm_series(&raw);
        assert_eq!(series.date_labels, vec!["31 ม.ค.", "1 ก.พ.", "10 ก.พ."]);
        assert_eq!(series.values, vec![0.0, 0.0, 3.0]);
        assert_eq!(series.min, 3.0);
        assert_eq!(series.values.len(), series.date_labels.len());
    }

    #[test]
    fn single_date_keeps_the_prior_range() {
        let raw = BTreeMap::from([("2024-05-20".to_string(), pm_record(Some(2.0)))]);
        let series = pm_series(&raw);
        assert_eq!(series.date_labels, vec!["20 พ.ค."]);
        assert_eq!(series.range_start, "01-01-2024");
        assert_eq!(series.range_end, "07-01-2024");
    }

    #[test]
    fn labels_drop_leading_zeros_for_every_month() {
        assert_eq!(format_date_label("2024-03-05").unwrap(), "5 มี.ค.");
        for (index, abbreviation) in MONTH_ABBREVIATIONS.iter().enumerate() {
            let key = format!("2024-{:02}-09", index + 1);
            assert_eq!(format_date_label(&key).unwrap(), format!("9 {abbreviation}"));
        }
    }

    #[test]
    fn malformed_keys_fail_fast() {
        let raw = BTreeMap::from([("2024-13-01".to_string(), pm_record(Some(1.0)))]);
        let err = build_daily_series(&raw, |record| Metric::Pm0_1.select(record), &prior())
            .unwrap_err();
        assert!(err.to_string().contains("2024-13-01"));
        assert!(format_date_label("latest").is_err());
    }

    #[test]
    fn unpadded_keys_are_rejected() {
        let raw = BTreeMap::from([
            ("2024-3-5".to_string(), pm_record(Some(1.0))),
            ("2024-12-01".to_string(), pm_record(Some(2.0))),
        ]);
        let err = build_daily_series(&raw, |record| Metric::Pm0_1.select(record), &prior())
            .unwrap_err();
        assert!(err.to_string().contains("2024-3-5"));
        assert!(parse_date_key("2024-03-5").is_err());
        assert!(parse_date_key(" 2024-03-05").is_err());
        assert!(parse_date_key("2024-03-05").is_ok());
    }

    #[test]
    fn metric_series_cover_every_metric() {
        let raw = BTreeMap::from([(
            "2024-06-01".to_string(),
            AggregateRecord {
                pm0_1_predicted: Some(0.4),
                pm2_5: Some(12.0),
                temperature: Some(29.5),
                humidity: Some(71.0),
            },
        )]);
        let all = build_metric_series(&raw, &prior()).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[1].0, Metric::Pm2_5);
        assert_eq!(all[1].1.values, vec![12.0]);
        assert_eq!(all[3].1.max, 71.0);
    }
}
