//! # Promo Usage Bench
//!
//! Benchmark of the two ways of reaching the search cluster for promo order
//! usage records: the internal HTTP proxy and the official client.
//!
//! This crate provides the configuration, dependency wiring, latency
//! recording and the benchmark scenario run by the `promo-usage-bench`
//! binary.

pub mod config;
pub mod recorder;
pub mod report;
pub mod scenario;

pub use config::{BenchConfig, Dependencies};
pub use recorder::{LatencyRecorder, LatencySummary};
pub use scenario::{run_scenario, ScenarioOutcome, ScenarioPlan};

use thiserror::Error;

/// Errors that can occur during benchmark initialization or execution.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] promo_usage_repository::SearchError),
}

impl BenchError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
