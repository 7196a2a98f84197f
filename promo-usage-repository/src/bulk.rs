//! Newline-delimited bulk payloads.
//!
//! A payload is a sequence of JSON lines: an action line followed by the
//! document line, for every document. Rendered, each line ends in `\n`,
//! including the last one.

use serde::Serialize;

use crate::errors::SearchError;
use promo_usage_shared::BulkAction;

/// A bulk request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkPayload {
    lines: Vec<String>,
}

impl BulkPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a caller-serialized newline-delimited body.
    ///
    /// Blank lines are dropped; the lines are otherwise kept verbatim.
    pub fn from_ndjson(body: &str) -> Self {
        Self {
            lines: body
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Append an `index` action and its document.
    pub fn push_index<T: Serialize>(
        &mut self,
        index: &str,
        doc_type: &str,
        id: &str,
        document: &T,
    ) -> Result<&mut Self, SearchError> {
        let action = serde_json::to_string(&BulkAction::index(index, doc_type, id))
            .map_err(|e| SearchError::serialization(e.to_string()))?;
        let body =
            serde_json::to_string(document).map_err(|e| SearchError::serialization(e.to_string()))?;

        self.lines.push(action);
        self.lines.push(body);
        Ok(self)
    }

    /// The JSON lines, without terminators.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of action/document pairs.
    pub fn len(&self) -> usize {
        self.lines.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render the body with a trailing newline after every line.
    pub fn to_ndjson(&self) -> String {
        let mut body = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            body.push_str(line);
            body.push('\n');
        }
        body
    }
}
