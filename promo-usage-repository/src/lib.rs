//! # Promo Usage Repository
//!
//! This crate provides access to promo order usage records in the search
//! cluster. It builds query documents, resolves environment-prefixed index
//! names, decodes cluster responses, and exposes everything through
//! [`PromoOrderUsageRepository`]. Two transports are included: the official
//! OpenSearch client and the internal HTTP proxy.

pub mod bulk;
pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod metrics;
pub mod opensearch;
pub mod proxy;
pub mod queries;
pub mod responses;
pub mod routing;
pub mod types;

pub use bulk::BulkPayload;
pub use client::PromoOrderUsageRepository;
pub use config::RepositoryConfig;
pub use errors::SearchError;
pub use interfaces::{MetricsSink, RawResponse, SearchTransport, TransportKind};
pub use metrics::{HistogramTimer, NoopMetrics, TracingMetrics};
pub use self::opensearch::OpenSearchTransport;
pub use proxy::ProxyTransport;
pub use routing::IndexRouter;
pub use types::{BulkReport, ClusterInfo, DeleteStatus, SearchPage, WriteOutcome};
