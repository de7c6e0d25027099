use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::dataset::LogDataset;
use crate::models::{AnalyticsError, LogRecord};

/// What to aggregate per time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesMetric {
    /// Number of requests in the bucket.
    Count,
    /// Arithmetic mean of response time (ms) over the bucket.
    MeanResponseTime,
    /// Arithmetic mean of response size (bytes) over the bucket.
    MeanBytesSent,
}

/// Record fields usable as categorical axes. Numeric fields (status) are
/// stringified so they behave as labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalField {
    Ip,
    Method,
    Path,
    Protocol,
    Status,
    Referrer,
    Browser,
    Os,
    Device,
}

impl CategoricalField {
    fn value(&self, record: &LogRecord) -> String {
        match self {
            CategoricalField::Ip => record.ip.clone(),
            CategoricalField::Method => record.method.clone(),
            CategoricalField::Path => record.path.clone(),
            CategoricalField::Protocol => record.protocol.clone(),
            CategoricalField::Status => record.status.to_string(),
            CategoricalField::Referrer => record.referrer.clone(),
            CategoricalField::Browser => record.browser.clone(),
            CategoricalField::Os => record.os.clone(),
            CategoricalField::Device => record.device.clone(),
        }
    }
}

/// Headline numbers for the metrics row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub mean_response_time_ms: f64,
    pub total_requests: usize,
    /// Fraction of records with status < 400, as a percentage.
    pub success_rate_pct: f64,
}

/// Group records into fixed-width time buckets and aggregate each bucket.
///
/// Bucket start = record timestamp floored to `bucket_width`. Buckets with no
/// records are omitted; output is ordered ascending by bucket start. Build
/// order of the dataset does not matter since bucketing re-sorts by timestamp.
pub fn time_series(
    dataset: &LogDataset,
    bucket_width: Duration,
    metric: SeriesMetric,
) -> Vec<(DateTime<Utc>, f64)> {
    let width = bucket_width.num_seconds().max(1);

    let mut buckets: BTreeMap<i64, (u64, f64)> = BTreeMap::new();
    for record in dataset.records() {
        let secs = record.timestamp.timestamp();
        let floored = secs.div_euclid(width) * width;
        let entry = buckets.entry(floored).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += match metric {
            SeriesMetric::Count => 0.0,
            SeriesMetric::MeanResponseTime => record.response_time_ms as f64,
            SeriesMetric::MeanBytesSent => record.bytes_sent as f64,
        };
    }

    buckets
        .into_iter()
        .map(|(start, (count, sum))| {
            let value = match metric {
                SeriesMetric::Count => count as f64,
                _ => sum / count as f64,
            };
            (Utc.timestamp_opt(start, 0).unwrap(), value)
        })
        .collect()
}

/// Frequency table over one categorical field, sorted descending by count.
/// Ties keep first-encountered order; `top_n` truncates the result.
pub fn categorical_distribution(
    dataset: &LogDataset,
    field: CategoricalField,
    top_n: Option<usize>,
) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, (usize, u64)> = HashMap::new();
    let mut next_rank = 0usize;

    for record in dataset.records() {
        let key = field.value(record);
        let entry = counts.entry(key).or_insert_with(|| {
            let rank = next_rank;
            next_rank += 1;
            (rank, 0)
        });
        entry.1 += 1;
    }

    let mut table: Vec<(usize, String, u64)> = counts
        .into_iter()
        .map(|(key, (rank, count))| (rank, key, count))
        .collect();
    table.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    if let Some(n) = top_n {
        table.truncate(n);
    }
    table.into_iter().map(|(_, key, count)| (key, count)).collect()
}

/// Headline metrics over the dataset. An empty dataset has no defined mean or
/// rate, so it is reported as an error rather than 0 or NaN.
pub fn summary_metrics(dataset: &LogDataset) -> Result<SummaryMetrics, AnalyticsError> {
    let records = dataset.records();
    if records.is_empty() {
        return Err(AnalyticsError::EmptyDataset);
    }

    let total = records.len();
    // Summed in f64: response times up to u64::MAX are grammar-valid, so a
    // u64 accumulator could overflow.
    let response_sum: f64 = records.iter().map(|r| r.response_time_ms as f64).sum();
    let successes = records.iter().filter(|r| r.is_success()).count();

    Ok(SummaryMetrics {
        mean_response_time_ms: response_sum / total as f64,
        total_requests: total,
        success_rate_pct: successes as f64 / total as f64 * 100.0,
    })
}
