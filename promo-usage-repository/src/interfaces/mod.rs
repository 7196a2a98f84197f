//! Interface definitions for the repository's collaborators.
//!
//! The search transport and the metrics sink are traits so the two cluster
//! clients can be swapped at construction time and tests can run without a
//! cluster.

mod metrics_sink;
mod search_transport;

pub use metrics_sink::MetricsSink;
pub use search_transport::{RawResponse, SearchTransport, TransportKind};
