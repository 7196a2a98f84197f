//! Dependency initialization and wiring for the benchmark.

use std::sync::Arc;
use tracing::info;

use crate::config::BenchConfig;
use crate::recorder::LatencyRecorder;
use crate::BenchError;
use promo_usage_repository::{
    IndexRouter, MetricsSink, OpenSearchTransport, PromoOrderUsageRepository, ProxyTransport,
    SearchTransport, TracingMetrics, TransportKind,
};

/// Container for all initialized dependencies.
///
/// Each transport is constructed exactly once here and shared by its
/// repository for the rest of the process.
pub struct Dependencies {
    /// One repository per requested transport, in request order.
    pub repositories: Vec<PromoOrderUsageRepository>,
    /// Sink receiving every metric, kept for the final report.
    pub recorder: Arc<LatencyRecorder>,
}

impl Dependencies {
    /// Build the repositories for `kinds`.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(BenchError)` - If a transport cannot be constructed
    pub fn new(config: &BenchConfig, kinds: &[TransportKind]) -> Result<Self, BenchError> {
        info!(
            elasticsearch_url = %config.elasticsearch_url,
            proxy_url = %config.proxy_url,
            environment = %config.environment,
            "Initializing dependencies"
        );

        let tracing_metrics = TracingMetrics::new(config.metrics_namespace.clone())
            .with_tag(format!("env:{}", config.environment));
        let recorder = Arc::new(LatencyRecorder::with_forward(Arc::new(tracing_metrics)));
        let router = IndexRouter::new(config.environment.clone());

        let mut repositories = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let transport = Self::transport(config, *kind)?;
            let metrics: Arc<dyn MetricsSink> = recorder.clone();
            repositories.push(PromoOrderUsageRepository::new(
                transport,
                router.clone(),
                metrics,
            ));
            info!(transport = %kind, "Transport created");
        }

        Ok(Self {
            repositories,
            recorder,
        })
    }

    fn transport(
        config: &BenchConfig,
        kind: TransportKind,
    ) -> Result<Arc<dyn SearchTransport>, BenchError> {
        let transport: Arc<dyn SearchTransport> = match kind {
            TransportKind::Proxy => Arc::new(
                ProxyTransport::new(&config.proxy_url, config.request_timeout).map_err(|e| {
                    BenchError::config(format!("Failed to create proxy transport: {}", e))
                })?,
            ),
            TransportKind::Official => Arc::new(
                OpenSearchTransport::new(&config.elasticsearch_url).map_err(|e| {
                    BenchError::config(format!("Failed to create OpenSearch transport: {}", e))
                })?,
            ),
        };
        Ok(transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_requested_transports_in_order() {
        let config = BenchConfig::default();
        let dependencies =
            Dependencies::new(&config, &[TransportKind::Official, TransportKind::Proxy]).unwrap();

        let kinds: Vec<TransportKind> = dependencies
            .repositories
            .iter()
            .map(|repository| repository.kind())
            .collect();
        assert_eq!(kinds, vec![TransportKind::Official, TransportKind::Proxy]);
        assert_eq!(
            dependencies.repositories[0].index_name(),
            "staging-promo-order-usage"
        );
    }

    #[test]
    fn test_invalid_url_aborts() {
        let config = BenchConfig {
            proxy_url: "not a url".to_string(),
            ..BenchConfig::default()
        };
        let result = Dependencies::new(&config, &[TransportKind::Proxy]);
        assert!(matches!(result, Err(BenchError::ConfigError(_))));
    }
}
