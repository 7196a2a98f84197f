//! Environment-prefixed index routing.

use tracing::warn;

/// Logical name of the promo order usage index.
pub const PROMO_ORDER_USAGE_INDEX: &str = "promo-order-usage";

/// Document type used in bulk action lines.
pub const PROMO_ORDER_USAGE_TYPE: &str = "order";

const DEVELOPMENT: &str = "development";
const STAGING: &str = "staging";

/// Resolves logical index names to physical ones.
///
/// Physical names are `{environment}-{logical}`. Development reads and writes
/// the staging indices, so `development` is rewritten to `staging` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRouter {
    environment: String,
}

impl IndexRouter {
    /// Create a router for the given deployment environment.
    ///
    /// An empty environment is kept as is and yields names with a leading
    /// dash, e.g. `-promo-order-usage`.
    pub fn new(environment: impl Into<String>) -> Self {
        let environment = environment.into();
        if environment.is_empty() {
            warn!("Deployment environment is empty; index names will start with '-'");
        }
        Self { environment }
    }

    /// The configured environment, before any rewrite.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// The environment segment used in physical index names.
    pub fn resolved_environment(&self) -> &str {
        if self.environment == DEVELOPMENT {
            STAGING
        } else {
            &self.environment
        }
    }

    /// Resolve the physical index name.
    pub fn resolve(&self, logical_index: &str, prefixed: bool) -> String {
        if !prefixed {
            return logical_index.to_string();
        }
        format!("{}-{}", self.resolved_environment(), logical_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_routes_to_staging() {
        let router = IndexRouter::new("development");
        assert_eq!(
            router.resolve(PROMO_ORDER_USAGE_INDEX, true),
            "staging-promo-order-usage"
        );
        assert_eq!(router.environment(), "development");
    }

    #[test]
    fn test_production_prefix() {
        let router = IndexRouter::new("production");
        assert_eq!(router.resolve("x", true), "production-x");
    }

    #[test]
    fn test_unprefixed_is_unchanged() {
        let router = IndexRouter::new("production");
        assert_eq!(router.resolve("x", false), "x");
    }

    #[test]
    fn test_empty_environment_keeps_leading_dash() {
        let router = IndexRouter::new("");
        assert_eq!(
            router.resolve(PROMO_ORDER_USAGE_INDEX, true),
            "-promo-order-usage"
        );
    }
}
