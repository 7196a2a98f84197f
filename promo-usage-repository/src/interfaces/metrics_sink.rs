//! Metrics sink trait definition.

use std::time::Duration;

/// Destination for operation timings and counters.
///
/// The repository records one histogram sample per operation. What happens
/// to it (logging, aggregation, shipping to an agent) is up to the sink.
pub trait MetricsSink: Send + Sync {
    /// Record an elapsed duration under `name`.
    fn histogram(&self, name: &str, elapsed: Duration, tags: &[String]);

    /// Increment the counter `name`.
    fn count(&self, name: &str, tags: &[String]);
}
