//! Official cluster client transport.
//!
//! This module provides the `SearchTransport` implementation backed by the
//! OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    params::Refresh,
    BulkParts, CountParts, DeleteByQueryParts, DeleteParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{error, info, instrument};
use url::Url;

use crate::bulk::BulkPayload;
use crate::errors::SearchError;
use crate::interfaces::{RawResponse, SearchTransport, TransportKind};
use crate::queries::{QueryBody, SearchBody};

/// Transport using the official OpenSearch client.
///
/// Build one per process and share it; the underlying connection pool is
/// reused across requests.
///
/// # Example
///
/// ```ignore
/// let transport = OpenSearchTransport::new("http://localhost:9200")?;
/// let repository = PromoOrderUsageRepository::new(
///     Arc::new(transport),
///     IndexRouter::new("staging"),
///     Arc::new(NoopMetrics),
/// );
/// ```
pub struct OpenSearchTransport {
    client: OpenSearch,
}

impl OpenSearchTransport {
    /// Create a new transport connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The cluster URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchTransport)` - A new transport instance
    /// * `Err(SearchError)` - If the URL is invalid or the transport cannot be built
    pub fn new(url: &str) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::configuration(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::configuration(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch transport");

        Ok(Self { client })
    }
}

/// Read status and body off a client response.
async fn into_raw(response: Response) -> Result<RawResponse, SearchError> {
    let status = response.status_code().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| SearchError::connection(e.to_string()))?;
    Ok(RawResponse::new(status, body))
}

fn transport_error(operation: &str, err: opensearch::Error) -> SearchError {
    error!(operation, error = %err, "OpenSearch request failed");
    SearchError::connection(err.to_string())
}

#[async_trait]
impl SearchTransport for OpenSearchTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Official
    }

    #[instrument(skip(self, body))]
    async fn search(
        &self,
        index: &str,
        body: &SearchBody,
        preference: Option<&str>,
    ) -> Result<RawResponse, SearchError> {
        let indices = [index];
        let mut request = self.client.search(SearchParts::Index(&indices)).body(body);
        if let Some(preference) = preference {
            request = request.preference(preference);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error("search", e))?;
        into_raw(response).await
    }

    #[instrument(skip(self, body))]
    async fn count(
        &self,
        index: &str,
        body: &QueryBody,
        preference: Option<&str>,
    ) -> Result<RawResponse, SearchError> {
        let indices = [index];
        let mut request = self.client.count(CountParts::Index(&indices)).body(body);
        if let Some(preference) = preference {
            request = request.preference(preference);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error("count", e))?;
        into_raw(response).await
    }

    #[instrument(skip(self, document))]
    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(document)
            .refresh(Refresh::True)
            .send()
            .await
            .map_err(|e| transport_error("index", e))?;
        into_raw(response).await
    }

    #[instrument(skip(self, body))]
    async fn delete_by_query(
        &self,
        index: &str,
        body: &QueryBody,
    ) -> Result<RawResponse, SearchError> {
        let indices = [index];
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&indices))
            .body(body)
            .refresh(true)
            .send()
            .await
            .map_err(|e| transport_error("delete_by_query", e))?;
        into_raw(response).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .refresh(Refresh::True)
            .send()
            .await
            .map_err(|e| transport_error("delete", e))?;
        into_raw(response).await
    }

    #[instrument(skip(self, payload), fields(documents = payload.len()))]
    async fn bulk(&self, payload: &BulkPayload) -> Result<RawResponse, SearchError> {
        // Each line already is serialized JSON; the client appends the newlines
        let lines: Vec<String> = payload.lines().to_vec();
        let response = self
            .client
            .bulk(BulkParts::None)
            .body(lines)
            .send()
            .await
            .map_err(|e| transport_error("bulk", e))?;
        into_raw(response).await
    }

    async fn info(&self) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .info()
            .send()
            .await
            .map_err(|e| transport_error("info", e))?;
        into_raw(response).await
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| transport_error("health", e))?;

        let health: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        let status = health
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");

        info!(status, "OpenSearch cluster status");
        Ok(status == "green" || status == "yellow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{build_count_body, build_delete_by_query_body, build_search_body};
    use promo_usage_shared::{Promo, SearchParameters};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX: &str = "staging-promo-order-usage";

    fn transport(server: &MockServer) -> OpenSearchTransport {
        OpenSearchTransport::new(&server.uri()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            OpenSearchTransport::new("not a url"),
            Err(SearchError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_search_sends_body_and_preference() {
        let server = MockServer::start().await;
        let parameters = SearchParameters::new("source:marketplace").with_prefer_node("_local");
        let body = build_search_body(&parameters, 10_000);

        Mock::given(method("POST"))
            .and(path(format!("/{}/_search", INDEX)))
            .and(query_param("preference", "_local"))
            .and(body_json(&body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": { "total": { "value": 0 }, "hits": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport(&server)
            .search(INDEX, &body, Some("_local"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert!(response.body.contains("hits"));
    }

    #[tokio::test]
    async fn test_count_passes_error_status_through() {
        let server = MockServer::start().await;
        let body = build_count_body(&SearchParameters::new("source:("));

        Mock::given(method("POST"))
            .and(path(format!("/{}/_count", INDEX)))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "type": "query_shard_exception", "reason": "bad query" },
                "status": 400
            })))
            .mount(&server)
            .await;

        let response = transport(&server).count(INDEX, &body, None).await.unwrap();
        assert_eq!(response.status, 400);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_index_document_forces_refresh() {
        let server = MockServer::start().await;
        let document = serde_json::to_value(Promo::with_order_id(96969696)).unwrap();

        Mock::given(path(format!("/{}/_doc/96969696", INDEX)))
            .and(query_param("refresh", "true"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "_id": "96969696", "_version": 1, "result": "created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport(&server)
            .index_document(INDEX, "96969696", &document)
            .await
            .unwrap();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_delete_forms() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path(format!("/{}/_doc/96969696", INDEX)))
            .and(query_param("refresh", "true"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "result": "deleted" })),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("/{}/_delete_by_query", INDEX)))
            .and(query_param("refresh", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": 1 })))
            .mount(&server)
            .await;

        let transport = transport(&server);
        let by_id = transport.delete_by_id(INDEX, "96969696").await.unwrap();
        assert!(by_id.body.contains("deleted"));

        let by_query = transport
            .delete_by_query(INDEX, &build_delete_by_query_body("order_id:69696969"))
            .await
            .unwrap();
        assert_eq!(by_query.status, 200);
    }

    #[tokio::test]
    async fn test_bulk_sends_ndjson() {
        let server = MockServer::start().await;
        let mut payload = BulkPayload::new();
        payload
            .push_index(INDEX, "order", "66666666", &Promo::with_order_id(66666666))
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/_bulk"))
            .and(body_string(payload.to_ndjson()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "took": 1,
                "errors": false,
                "items": [{ "index": { "_id": "66666666", "status": 201 } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport(&server).bulk(&payload).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/_cluster/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "yellow" })))
            .mount(&server)
            .await;

        assert!(transport(&server).health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_cluster_is_transport_error() {
        let transport = OpenSearchTransport::new("http://127.0.0.1:1").unwrap();
        let err = transport.info().await.unwrap_err();
        assert!(err.is_transport());
    }
}
