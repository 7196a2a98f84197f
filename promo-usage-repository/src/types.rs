//! Result types produced by the response decoder.

use std::fmt;

/// One hit of a search response.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<T> {
    /// Physical index the document lives in.
    pub index: String,
    /// Document ID.
    pub id: String,
    /// Relevance score, absent when sorting by field.
    pub score: Option<f64>,
    /// The decoded document.
    pub source: T,
}

/// A decoded page of search results, in cluster order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<T> {
    /// Server-side time in milliseconds.
    pub took: u64,
    /// Whether the search timed out on some shards.
    pub timed_out: bool,
    /// Total number of matching documents.
    pub total: u64,
    /// Highest relevance score in the page.
    pub max_score: Option<f64>,
    /// Hits in the order the cluster returned them.
    pub hits: Vec<Hit<T>>,
}

impl<T> SearchPage<T> {
    /// Drop hit metadata and keep the documents, order preserved.
    pub fn into_sources(self) -> Vec<T> {
        self.hits.into_iter().map(|hit| hit.source).collect()
    }
}

/// Outcome of an index (insert or update) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// `created` or `updated`.
    pub result: String,
    /// Document version after the write.
    pub version: Option<i64>,
}

/// Outcome of a delete-by-ID request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    NotFound,
    Other(String),
}

impl DeleteStatus {
    /// Map the cluster's `result` token.
    pub fn from_token(token: &str) -> Self {
        match token {
            "deleted" => Self::Deleted,
            "not_found" => Self::NotFound,
            other => Self::Other(other.to_string()),
        }
    }

    /// The short status token.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Deleted => "deleted",
            Self::NotFound => "not_found",
            Self::Other(token) => token,
        }
    }
}

impl fmt::Display for DeleteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported for a single bulk item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemError {
    pub error_type: String,
    pub reason: String,
}

/// Result of a single item within a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemResult {
    /// Action name, e.g. `index`.
    pub action: String,
    /// Physical index of the document.
    pub index: String,
    /// Document ID.
    pub id: String,
    /// HTTP status of the item.
    pub status: u16,
    /// `created`, `updated`, ... when the item succeeded.
    pub result: Option<String>,
    /// Error details when the item failed.
    pub error: Option<BulkItemError>,
}

impl BulkItemResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }
}

/// Summary of a bulk request with per-item results.
///
/// A bulk request can succeed as a whole while individual items fail; those
/// items are available through [`BulkReport::failures`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport {
    /// Server-side time in milliseconds.
    pub took: u64,
    /// Whether any item failed.
    pub errors: bool,
    /// Creation acknowledgement.
    pub created: bool,
    /// Individual results, in request order.
    pub items: Vec<BulkItemResult>,
}

impl BulkReport {
    /// Total number of items in the request.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Number of items that succeeded.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.is_success()).count()
    }

    /// Items that failed.
    pub fn failures(&self) -> Vec<&BulkItemResult> {
        self.items.iter().filter(|item| !item.is_success()).collect()
    }
}

/// Basic cluster information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterInfo {
    pub name: String,
    pub cluster_name: String,
    pub version: String,
}
