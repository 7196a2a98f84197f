//! Search error types.
//!
//! This module defines the error types that can occur while talking to the
//! search cluster. Cluster-side failures are reported per operation with a
//! generic message; the structured error type and reason are only logged.

use thiserror::Error;

/// Errors that can occur during search cluster operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The transport failed before a response arrived (connection, timeout, DNS).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A search or count request was rejected by the cluster.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to index (insert or update) a single document.
    #[error("Index error: {0}")]
    IndexError(String),

    /// A bulk request was rejected as a whole.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to delete documents.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A transport could not be constructed from its configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Bulk payload exceeds the configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create a delete error.
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Whether the failure happened in the transport rather than the cluster.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}
