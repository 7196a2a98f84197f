//! Action lines of the newline-delimited bulk format.

use serde::{Deserialize, Serialize};

/// Target of a bulk `index` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionMeta {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
}

/// A bulk action line, e.g. `{"index":{"_index":"..","_type":"..","_id":".."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Index(BulkActionMeta),
}

impl BulkAction {
    pub fn index(
        index: impl Into<String>,
        doc_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::Index(BulkActionMeta {
            index: index.into(),
            doc_type: doc_type.into(),
            id: id.into(),
        })
    }
}
