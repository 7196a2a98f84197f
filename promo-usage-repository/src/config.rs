//! Configuration types for the PromoOrderUsageRepository.

use crate::queries::MAX_PAGE_SIZE;
use crate::routing::{PROMO_ORDER_USAGE_INDEX, PROMO_ORDER_USAGE_TYPE};

/// Configuration for the PromoOrderUsageRepository.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Logical index name, before the environment prefix.
    pub index: String,
    /// Document type written into bulk action lines.
    pub document_type: String,
    /// Page size used when a search does not set one.
    pub max_page_size: u64,
    /// Whether the environment prefix is applied to the index name.
    pub use_environment_prefix: bool,
    /// Optional cap on documents per bulk request. `None` (the default)
    /// sends any payload as built.
    pub max_bulk_documents: Option<usize>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            index: PROMO_ORDER_USAGE_INDEX.to_string(),
            document_type: PROMO_ORDER_USAGE_TYPE.to_string(),
            max_page_size: MAX_PAGE_SIZE,
            use_environment_prefix: true,
            max_bulk_documents: None,
        }
    }
}

impl RepositoryConfig {
    /// Create a config with a custom bulk size limit.
    pub fn with_max_bulk_documents(max_bulk_documents: usize) -> Self {
        Self {
            max_bulk_documents: Some(max_bulk_documents),
            ..Self::default()
        }
    }

    /// Target a different logical index.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Skip the environment prefix.
    pub fn without_environment_prefix(mut self) -> Self {
        self.use_environment_prefix = false;
        self
    }
}
