//! Official cluster client transport.
//!
//! This module provides the `SearchTransport` implementation that talks to
//! the cluster through the OpenSearch client.

mod client;

pub use client::OpenSearchTransport;
