//! In-memory latency recording.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use promo_usage_repository::MetricsSink;

/// Latency statistics for one metric, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub name: String,
    pub samples: usize,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl LatencySummary {
    fn from_samples(name: &str, samples: &[Duration]) -> Self {
        let mut sorted: Vec<f64> = samples
            .iter()
            .map(|d| d.as_nanos() as f64 / 1_000_000.0)
            .collect();
        sorted.sort_by(f64::total_cmp);

        if sorted.is_empty() {
            return Self {
                name: name.to_string(),
                samples: 0,
                p50: 0.0,
                p90: 0.0,
                p99: 0.0,
                mean: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let sum: f64 = sorted.iter().sum();
        Self {
            name: name.to_string(),
            samples: sorted.len(),
            p50: percentile(&sorted, 0.5),
            p90: percentile(&sorted, 0.9),
            p99: percentile(&sorted, 0.99),
            mean: sum / sorted.len() as f64,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}

/// Nearest-rank percentile of an ascending slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((sorted.len() as f64 * p).ceil() as usize).max(1) - 1;
    sorted[index.min(sorted.len() - 1)]
}

/// Metrics sink that keeps every sample for the end-of-run summary.
///
/// Samples can also be forwarded to another sink, e.g. the tracing sink.
#[derive(Default)]
pub struct LatencyRecorder {
    samples: Mutex<BTreeMap<String, Vec<Duration>>>,
    counts: Mutex<BTreeMap<String, u64>>,
    forward: Option<Arc<dyn MetricsSink>>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward every sample to `sink` as well.
    pub fn with_forward(sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            forward: Some(sink),
            ..Self::default()
        }
    }

    /// Per-metric statistics, ordered by metric name.
    pub fn summaries(&self) -> Vec<LatencySummary> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, samples)| LatencySummary::from_samples(name, samples))
            .collect()
    }

    /// Counter values, ordered by metric name.
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MetricsSink for LatencyRecorder {
    fn histogram(&self, name: &str, elapsed: Duration, tags: &[String]) {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .push(elapsed);

        if let Some(forward) = &self.forward {
            forward.histogram(name, elapsed, tags);
        }
    }

    fn count(&self, name: &str, tags: &[String]) {
        *self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert(0) += 1;

        if let Some(forward) = &self.forward {
            forward.count(name, tags);
        }
    }
}
