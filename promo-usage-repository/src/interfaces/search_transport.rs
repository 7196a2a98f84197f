//! Search transport trait definition.
//!
//! This module defines the interface the repository needs from a cluster
//! client. Two implementations exist: the official wire client and the
//! internal HTTP proxy. Both return the raw status and body so decoding
//! happens in one place regardless of the backend.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::bulk::BulkPayload;
use crate::errors::SearchError;
use crate::queries::{QueryBody, SearchBody};

/// Which backend a transport talks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// The internal HTTP proxy in front of the cluster.
    Proxy,
    /// The official cluster client.
    Official,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
            Self::Official => "official",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of a cluster response, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstracts the client used to reach the search cluster.
///
/// Implementations only move bytes: they must not interpret cluster error
/// bodies. An `Err` means the request never produced a response.
///
/// All implementations must be `Send + Sync` so a single instance can be
/// shared by the repository for the life of the process.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// The backend this transport uses.
    fn kind(&self) -> TransportKind;

    /// Run a search against `index`, with an optional node preference.
    async fn search(
        &self,
        index: &str,
        body: &SearchBody,
        preference: Option<&str>,
    ) -> Result<RawResponse, SearchError>;

    /// Count documents in `index` matching the query.
    async fn count(
        &self,
        index: &str,
        body: &QueryBody,
        preference: Option<&str>,
    ) -> Result<RawResponse, SearchError>;

    /// Index a document under `id`, replacing any existing one.
    ///
    /// The write must be visible to searches issued right after it returns.
    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<RawResponse, SearchError>;

    /// Delete every document in `index` matching the query.
    async fn delete_by_query(
        &self,
        index: &str,
        body: &QueryBody,
    ) -> Result<RawResponse, SearchError>;

    /// Delete a single document by ID.
    async fn delete_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError>;

    /// Send a newline-delimited bulk payload.
    async fn bulk(&self, payload: &BulkPayload) -> Result<RawResponse, SearchError>;

    /// Fetch basic cluster information.
    async fn info(&self) -> Result<RawResponse, SearchError>;

    /// Check if the cluster reports green or yellow health.
    async fn health_check(&self) -> Result<bool, SearchError>;
}
