//! Benchmark settings read from the environment.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::BenchError;

/// Default cluster URL.
const DEFAULT_ELASTICSEARCH_URL: &str = "http://localhost:9200";

/// Default deployment environment. Resolves to the staging index.
const DEFAULT_DEPLOYMENT_ENV: &str = "development";

/// Default prefix for every metric name.
const DEFAULT_METRICS_NAMESPACE: &str = "promo_usage_bench.";

/// Settings shared by both transports.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Cluster URL used by the official client.
    pub elasticsearch_url: String,
    /// Base URL of the HTTP proxy.
    pub proxy_url: String,
    /// Deployment environment used for the index prefix.
    pub environment: String,
    /// Prefix for metric names.
    pub metrics_namespace: String,
    /// Per-request timeout for the proxy transport.
    pub request_timeout: Option<Duration>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            elasticsearch_url: DEFAULT_ELASTICSEARCH_URL.to_string(),
            proxy_url: DEFAULT_ELASTICSEARCH_URL.to_string(),
            environment: DEFAULT_DEPLOYMENT_ENV.to_string(),
            metrics_namespace: DEFAULT_METRICS_NAMESPACE.to_string(),
            request_timeout: None,
        }
    }
}

impl BenchConfig {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ELASTICSEARCH_URL`: cluster URL (default: http://localhost:9200)
    /// - `PROXY_URL`: proxy base URL (default: the cluster URL)
    /// - `DEPLOYMENT_ENV`: deployment environment (default: development)
    /// - `METRICS_NAMESPACE`: metric name prefix (default: promo_usage_bench.)
    /// - `REQUEST_TIMEOUT_MS`: proxy request timeout in milliseconds (default: none)
    pub fn from_env() -> Result<Self, BenchError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BenchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let elasticsearch_url = lookup("ELASTICSEARCH_URL").unwrap_or(defaults.elasticsearch_url);
        let proxy_url = lookup("PROXY_URL").unwrap_or_else(|| elasticsearch_url.clone());
        let environment = lookup("DEPLOYMENT_ENV").unwrap_or_else(|| {
            warn!(
                environment = %defaults.environment,
                "DEPLOYMENT_ENV is not set; falling back to the default environment"
            );
            defaults.environment
        });
        let metrics_namespace = lookup("METRICS_NAMESPACE").unwrap_or(defaults.metrics_namespace);

        let request_timeout = lookup("REQUEST_TIMEOUT_MS")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|e| {
                        BenchError::config(format!("Invalid REQUEST_TIMEOUT_MS {:?}: {}", raw, e))
                    })
            })
            .transpose()?;

        Ok(Self {
            elasticsearch_url,
            proxy_url,
            environment,
            metrics_namespace,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts warning events.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn warnings_while<T>(f: impl FnOnce() -> T) -> (T, usize) {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let value = tracing::subscriber::with_default(subscriber, f);
        (value, warnings.load(Ordering::SeqCst))
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = BenchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_proxy_url_follows_cluster_url() {
        let config =
            BenchConfig::from_lookup(lookup(&[("ELASTICSEARCH_URL", "http://es.internal:9200")]))
                .unwrap();
        assert_eq!(config.proxy_url, "http://es.internal:9200");

        let config = BenchConfig::from_lookup(lookup(&[
            ("ELASTICSEARCH_URL", "http://es.internal:9200"),
            ("PROXY_URL", "http://proxy.internal"),
            ("DEPLOYMENT_ENV", "production"),
            ("REQUEST_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();
        assert_eq!(config.proxy_url, "http://proxy.internal");
        assert_eq!(config.environment, "production");
        assert_eq!(config.request_timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_missing_environment_warns() {
        let (config, warnings) = warnings_while(|| BenchConfig::from_lookup(lookup(&[])).unwrap());
        assert_eq!(config.environment, "development");
        assert_eq!(warnings, 1);

        let (config, warnings) = warnings_while(|| {
            BenchConfig::from_lookup(lookup(&[("DEPLOYMENT_ENV", "production")])).unwrap()
        });
        assert_eq!(config.environment, "production");
        assert_eq!(warnings, 0);
    }

    #[test]
    fn test_invalid_timeout() {
        let result = BenchConfig::from_lookup(lookup(&[("REQUEST_TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(BenchError::ConfigError(_))));
    }
}
