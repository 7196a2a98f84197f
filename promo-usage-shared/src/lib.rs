//! # Promo Usage Shared
//!
//! Data model shared by the promo order usage repository and the benchmark
//! binary: the indexed record, the search parameters, and bulk action lines.

pub mod bulk;
pub mod parameters;
pub mod promo;

pub use bulk::{BulkAction, BulkActionMeta};
pub use parameters::{canonical_offset, DateWindow, SearchParameters, SortOrder};
pub use promo::{Coverage, Promo, PromoData, PromoRule, UserData};
