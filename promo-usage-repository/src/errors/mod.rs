//! Error types for the promo usage repository.

mod search_error;

pub use search_error::SearchError;
