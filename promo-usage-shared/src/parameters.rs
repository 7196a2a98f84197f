//! Search parameters accepted by the repository.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Offset of the canonical locale (UTC+7), in seconds.
pub const CANONICAL_OFFSET_SECONDS: i32 = 7 * 3600;

/// The fixed UTC+7 offset used for date bounds.
pub fn canonical_offset() -> FixedOffset {
    // 7h is always inside the valid +/-24h range
    FixedOffset::east_opt(CANONICAL_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Sort direction for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Inclusive creation-time window, at date granularity.
///
/// `gte <= lte` is the caller's responsibility; nothing checks it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateWindow {
    pub gte: DateTime<FixedOffset>,
    pub lte: DateTime<FixedOffset>,
}

impl DateWindow {
    pub fn new(gte: DateTime<FixedOffset>, lte: DateTime<FixedOffset>) -> Self {
        Self { gte, lte }
    }
}

/// Loose parameter set for a promo order usage search.
///
/// A time window applies only when `time_window` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParameters {
    /// Free-text query, passed to the cluster verbatim.
    pub query_string: String,
    /// Maximum number of hits; `None` or 0 means the system maximum.
    pub size: Option<u64>,
    /// Optional inclusive creation-time window.
    pub time_window: Option<DateWindow>,
    /// Caller label, only used for logging.
    pub source: Option<String>,
    /// Field to direction mapping.
    pub sort: Option<BTreeMap<String, SortOrder>>,
    /// Node preference hint forwarded to the cluster.
    pub prefer_node: Option<String>,
}

impl SearchParameters {
    pub fn new(query_string: impl Into<String>) -> Self {
        Self {
            query_string: query_string.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_time_window(
        mut self,
        gte: DateTime<FixedOffset>,
        lte: DateTime<FixedOffset>,
    ) -> Self {
        self.time_window = Some(DateWindow::new(gte, lte));
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), order);
        self
    }

    pub fn with_prefer_node(mut self, prefer_node: impl Into<String>) -> Self {
        self.prefer_node = Some(prefer_node.into());
        self
    }

    /// Whether a creation-time range applies.
    pub fn is_using_time(&self) -> bool {
        self.time_window.is_some()
    }
}
