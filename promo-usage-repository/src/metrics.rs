//! Metrics sinks and the operation timer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::interfaces::MetricsSink;

/// Sink that emits every metric as a `tracing` event.
///
/// Names are prefixed with `namespace` and every sample carries the
/// configured global tags (e.g. `env:staging`).
#[derive(Debug, Clone, Default)]
pub struct TracingMetrics {
    namespace: String,
    tags: Vec<String>,
}

impl TracingMetrics {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag sent with every metric.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    fn full_name(&self, name: &str) -> String {
        format!("{}{}", self.namespace, name)
    }

    fn all_tags(&self, tags: &[String]) -> Vec<String> {
        self.tags.iter().chain(tags.iter()).cloned().collect()
    }
}

impl MetricsSink for TracingMetrics {
    fn histogram(&self, name: &str, elapsed: Duration, tags: &[String]) {
        debug!(
            metric = %self.full_name(name),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            tags = ?self.all_tags(tags),
            "histogram"
        );
    }

    fn count(&self, name: &str, tags: &[String]) {
        debug!(
            metric = %self.full_name(name),
            tags = ?self.all_tags(tags),
            "count"
        );
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn histogram(&self, _name: &str, _elapsed: Duration, _tags: &[String]) {}

    fn count(&self, _name: &str, _tags: &[String]) {}
}

/// Records the time between its creation and drop as a histogram sample.
pub struct HistogramTimer {
    sink: Arc<dyn MetricsSink>,
    name: String,
    start: Instant,
}

impl HistogramTimer {
    pub fn start(sink: Arc<dyn MetricsSink>, name: impl Into<String>) -> Self {
        Self {
            sink,
            name: name.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.sink.histogram(&self.name, self.start.elapsed(), &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        samples: Mutex<Vec<(String, Duration)>>,
    }

    impl MetricsSink for Recorder {
        fn histogram(&self, name: &str, elapsed: Duration, _tags: &[String]) {
            self.samples
                .lock()
                .unwrap()
                .push((name.to_string(), elapsed));
        }

        fn count(&self, _name: &str, _tags: &[String]) {}
    }

    #[test]
    fn test_timer_records_on_drop() {
        let recorder = Arc::new(Recorder::default());

        {
            let _timer = HistogramTimer::start(recorder.clone(), "repository.proxy.get");
            assert!(recorder.samples.lock().unwrap().is_empty());
        }

        let samples = recorder.samples.lock().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].0, "repository.proxy.get");
    }

    #[test]
    fn test_tracing_metrics_names_and_tags() {
        let metrics = TracingMetrics::new("promo-usage-bench.").with_tag("env:staging");

        assert_eq!(
            metrics.full_name("repository.proxy.get"),
            "promo-usage-bench.repository.proxy.get"
        );
        assert_eq!(
            metrics.all_tags(&["op:get".to_string()]),
            vec!["env:staging".to_string(), "op:get".to_string()]
        );

        // Emitting must not panic without a subscriber
        metrics.histogram("x", Duration::from_millis(5), &[]);
        metrics.count("x", &[]);
    }
}
