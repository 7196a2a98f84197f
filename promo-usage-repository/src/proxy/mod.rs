//! Proxy transport.
//!
//! This module provides the `SearchTransport` implementation that talks to
//! the cluster through the internal HTTP proxy.

mod client;

pub use client::ProxyTransport;
