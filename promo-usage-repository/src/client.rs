//! Promo order usage repository.
//!
//! This module provides the record access facade. Application code uses it to
//! search, count, write, delete and bulk-load promo order usage records
//! without knowing which transport reaches the cluster.

use std::sync::Arc;

use promo_usage_shared::{Promo, SearchParameters};
use tracing::{debug, error, info, instrument};

use crate::bulk::BulkPayload;
use crate::config::RepositoryConfig;
use crate::errors::SearchError;
use crate::interfaces::{MetricsSink, SearchTransport, TransportKind};
use crate::metrics::HistogramTimer;
use crate::queries::{build_count_body, build_delete_by_query_body, build_search_body};
use crate::responses::{
    decode_bulk, decode_count, decode_delete_by_id, decode_delete_by_query, decode_info,
    decode_search, decode_write,
};
use crate::routing::IndexRouter;
use crate::types::{BulkReport, ClusterInfo, DeleteStatus, SearchPage, WriteOutcome};

/// The main entry point for promo order usage records.
///
/// The transport is built once by the caller and shared for the life of the
/// repository. Every operation records its wall time through the metrics
/// sink as `repository.<transport>.<operation>.promo_order_usage`, whether it
/// succeeds or not.
pub struct PromoOrderUsageRepository {
    transport: Arc<dyn SearchTransport>,
    router: IndexRouter,
    metrics: Arc<dyn MetricsSink>,
    config: RepositoryConfig,
}

impl PromoOrderUsageRepository {
    /// Create a new repository with default configuration.
    pub fn new(
        transport: Arc<dyn SearchTransport>,
        router: IndexRouter,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self::with_config(transport, router, metrics, RepositoryConfig::default())
    }

    /// Create a new repository with custom configuration.
    pub fn with_config(
        transport: Arc<dyn SearchTransport>,
        router: IndexRouter,
        metrics: Arc<dyn MetricsSink>,
        config: RepositoryConfig,
    ) -> Self {
        Self {
            transport,
            router,
            metrics,
            config,
        }
    }

    /// The backend this repository talks through.
    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// The physical index every operation targets.
    pub fn index_name(&self) -> String {
        self.router
            .resolve(&self.config.index, self.config.use_environment_prefix)
    }

    fn timer(&self, operation: &str) -> HistogramTimer {
        HistogramTimer::start(
            self.metrics.clone(),
            format!(
                "repository.{}.{}.promo_order_usage",
                self.transport.kind(),
                operation
            ),
        )
    }

    fn failed(&self, operation: &str) {
        self.metrics.count(
            &format!(
                "repository.{}.{}.promo_order_usage.error",
                self.transport.kind(),
                operation
            ),
            &[],
        );
    }

    /// Check if the bulk size exceeds the configured limit.
    fn validate_bulk_size(&self, size: usize) -> Result<(), SearchError> {
        if let Some(max) = self.config.max_bulk_documents {
            if size > max {
                return Err(SearchError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Search and return the matching records in cluster order.
    ///
    /// An empty result is not an error.
    pub async fn get(&self, parameters: &SearchParameters) -> Result<Vec<Promo>, SearchError> {
        Ok(self.search(parameters).await?.into_sources())
    }

    /// Search and return the full page, hit metadata included.
    #[instrument(
        skip(self, parameters),
        fields(
            transport = %self.kind(),
            query = %parameters.query_string,
            source = ?parameters.source,
        )
    )]
    pub async fn search(
        &self,
        parameters: &SearchParameters,
    ) -> Result<SearchPage<Promo>, SearchError> {
        let _timer = self.timer("get");
        let index = self.index_name();
        let body = build_search_body(parameters, self.config.max_page_size);

        let page = async {
            let response = self
                .transport
                .search(&index, &body, parameters.prefer_node.as_deref())
                .await?;
            decode_search::<Promo>(&response)
        }
        .await
        .inspect_err(|e| {
            self.failed("get");
            error!(index = %index, error = %e, "Search failed");
        })?;

        debug!(index = %index, total = page.total, hits = page.hits.len(), "Search completed");
        Ok(page)
    }

    /// Count records matching a query-string filter.
    pub async fn count(&self, filter: &str) -> Result<u64, SearchError> {
        self.count_matching(&SearchParameters::new(filter)).await
    }

    /// Count records matching a full parameter set, time window included.
    #[instrument(
        skip(self, parameters),
        fields(transport = %self.kind(), query = %parameters.query_string)
    )]
    pub async fn count_matching(&self, parameters: &SearchParameters) -> Result<u64, SearchError> {
        let _timer = self.timer("count");
        let index = self.index_name();
        let body = build_count_body(parameters);

        let count = async {
            let response = self
                .transport
                .count(&index, &body, parameters.prefer_node.as_deref())
                .await?;
            decode_count(&response)
        }
        .await
        .inspect_err(|e| {
            self.failed("count");
            error!(index = %index, error = %e, "Count failed");
        })?;

        debug!(index = %index, count, "Count completed");
        Ok(count)
    }

    /// Insert a record, keyed by its order ID.
    pub async fn insert(&self, promo: &Promo) -> Result<WriteOutcome, SearchError> {
        self.write("insert", promo).await
    }

    /// Update a record, keyed by its order ID.
    ///
    /// The stored document is replaced as a whole, so repeating an update
    /// leaves the same state.
    pub async fn update(&self, promo: &Promo) -> Result<WriteOutcome, SearchError> {
        self.write("update", promo).await
    }

    /// Shared write path for insert and update.
    #[instrument(skip(self, promo), fields(transport = %self.kind(), order_id = promo.order_id))]
    async fn write(&self, operation: &str, promo: &Promo) -> Result<WriteOutcome, SearchError> {
        let _timer = self.timer(operation);
        let index = self.index_name();
        let id = promo.document_id();

        let outcome = async {
            let document = serde_json::to_value(promo)
                .map_err(|e| SearchError::serialization(e.to_string()))?;
            let response = self.transport.index_document(&index, &id, &document).await?;
            decode_write(&response)
        }
        .await
        .inspect_err(|e| {
            self.failed(operation);
            error!(index = %index, id = %id, operation, error = %e, "Write failed");
        })?;

        debug!(
            index = %index,
            id = %id,
            result = %outcome.result,
            version = ?outcome.version,
            "Write completed"
        );
        Ok(outcome)
    }

    /// Delete every record matching a query-string filter.
    ///
    /// Returns the number of removed documents; zero means nothing matched.
    #[instrument(skip(self), fields(transport = %self.kind()))]
    pub async fn delete_by_query(&self, filter: &str) -> Result<u64, SearchError> {
        let _timer = self.timer("delete");
        let index = self.index_name();
        let body = build_delete_by_query_body(filter);

        let deleted = async {
            let response = self.transport.delete_by_query(&index, &body).await?;
            decode_delete_by_query(&response)
        }
        .await
        .inspect_err(|e| {
            self.failed("delete");
            error!(index = %index, error = %e, "Delete by query failed");
        })?;

        info!(index = %index, deleted, "Delete by query completed");
        Ok(deleted)
    }

    /// Delete a single record by document ID.
    #[instrument(skip(self), fields(transport = %self.kind()))]
    pub async fn delete_by_id(&self, id: &str) -> Result<DeleteStatus, SearchError> {
        let _timer = self.timer("delete");
        let index = self.index_name();

        let status = async {
            let response = self.transport.delete_by_id(&index, id).await?;
            decode_delete_by_id(&response)
        }
        .await
        .inspect_err(|e| {
            self.failed("delete");
            error!(index = %index, id, error = %e, "Delete by id failed");
        })?;

        info!(index = %index, id, status = %status, "Delete by id completed");
        Ok(status)
    }

    /// Build a bulk payload indexing `promos` into this repository's index.
    pub fn bulk_payload(&self, promos: &[Promo]) -> Result<BulkPayload, SearchError> {
        let index = self.index_name();
        let mut payload = BulkPayload::new();
        for promo in promos {
            payload.push_index(
                &index,
                &self.config.document_type,
                &promo.document_id(),
                promo,
            )?;
        }
        Ok(payload)
    }

    /// Send a pre-built bulk payload.
    ///
    /// Any payload size is accepted unless `max_bulk_documents` is set.
    /// Individual item failures are reported in the returned report, not as
    /// an error.
    #[instrument(skip(self, payload), fields(transport = %self.kind(), documents = payload.len()))]
    pub async fn bulk(&self, payload: &BulkPayload) -> Result<BulkReport, SearchError> {
        let _timer = self.timer("bulk");

        if payload.is_empty() {
            return Ok(BulkReport {
                took: 0,
                errors: false,
                created: false,
                items: vec![],
            });
        }

        self.validate_bulk_size(payload.len())?;

        let report = async {
            let response = self.transport.bulk(payload).await?;
            decode_bulk(&response)
        }
        .await
        .inspect_err(|e| {
            self.failed("bulk");
            error!(error = %e, "Bulk request failed");
        })?;

        info!(
            total = report.total(),
            succeeded = report.succeeded(),
            created = report.created,
            "Bulk request completed"
        );
        Ok(report)
    }

    /// Fetch cluster name and version.
    #[instrument(skip(self), fields(transport = %self.kind()))]
    pub async fn info(&self) -> Result<ClusterInfo, SearchError> {
        let _timer = self.timer("info");

        let info = async {
            let response = self.transport.info().await?;
            decode_info(&response)
        }
        .await
        .inspect_err(|e| {
            self.failed("info");
            error!(error = %e, "Info request failed");
        })?;

        info!(
            cluster = %info.cluster_name,
            version = %info.version,
            "Cluster info"
        );
        Ok(info)
    }

    /// Check if the cluster reports green or yellow health.
    pub async fn health_check(&self) -> Result<bool, SearchError> {
        let _timer = self.timer("health");
        self.transport
            .health_check()
            .await
            .inspect_err(|e| {
                self.failed("health");
                error!(transport = %self.kind(), error = %e, "Health check failed");
            })
    }
}
