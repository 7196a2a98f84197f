//! HTTP proxy transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::bulk::BulkPayload;
use crate::errors::SearchError;
use crate::interfaces::{RawResponse, SearchTransport, TransportKind};
use crate::queries::{QueryBody, SearchBody};

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Transport that reaches the cluster through the internal HTTP proxy.
///
/// The proxy forwards the cluster REST API unchanged, so requests use the
/// cluster paths relative to `base_url`. Index names and document IDs are
/// percent-encoded as single path segments.
pub struct ProxyTransport {
    base_url: Url,
    client: Client,
}

impl ProxyTransport {
    /// Create a transport for the proxy at `base_url`.
    ///
    /// `timeout` bounds every request end to end; `None` keeps the client
    /// default (no timeout).
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, SearchError> {
        let parsed = Url::parse(base_url).map_err(|e| SearchError::configuration(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(SearchError::configuration(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SearchError::configuration(e.to_string()))?;

        info!(url = %base_url, timeout = ?timeout, "Created proxy transport");

        Ok(Self {
            base_url: parsed,
            client,
        })
    }

    /// Append `segments` to the base path, encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SearchError::configuration(format!(
                    "{} cannot be used as a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> Result<RawResponse, SearchError> {
        let response = request.send().await.map_err(|e| {
            error!(operation, error = %e, "Proxy request failed");
            SearchError::connection(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;
        Ok(RawResponse::new(status, body))
    }
}

#[async_trait]
impl SearchTransport for ProxyTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Proxy
    }

    #[instrument(skip(self, body))]
    async fn search(
        &self,
        index: &str,
        body: &SearchBody,
        preference: Option<&str>,
    ) -> Result<RawResponse, SearchError> {
        let mut request = self
            .client
            .post(self.url(&[index, "_search"])?)
            .json(body);
        if let Some(preference) = preference {
            request = request.query(&[("preference", preference)]);
        }
        self.send("search", request).await
    }

    #[instrument(skip(self, body))]
    async fn count(
        &self,
        index: &str,
        body: &QueryBody,
        preference: Option<&str>,
    ) -> Result<RawResponse, SearchError> {
        let mut request = self
            .client
            .post(self.url(&[index, "_count"])?)
            .json(body);
        if let Some(preference) = preference {
            request = request.query(&[("preference", preference)]);
        }
        self.send("count", request).await
    }

    #[instrument(skip(self, document))]
    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<RawResponse, SearchError> {
        let request = self
            .client
            .put(self.url(&[index, "_doc", id])?)
            .query(&[("refresh", "true")])
            .json(document);
        self.send("index", request).await
    }

    #[instrument(skip(self, body))]
    async fn delete_by_query(
        &self,
        index: &str,
        body: &QueryBody,
    ) -> Result<RawResponse, SearchError> {
        let request = self
            .client
            .post(self.url(&[index, "_delete_by_query"])?)
            .query(&[("refresh", "true")])
            .json(body);
        self.send("delete_by_query", request).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError> {
        let request = self
            .client
            .delete(self.url(&[index, "_doc", id])?)
            .query(&[("refresh", "true")]);
        self.send("delete", request).await
    }

    #[instrument(skip(self, payload), fields(documents = payload.len()))]
    async fn bulk(&self, payload: &BulkPayload) -> Result<RawResponse, SearchError> {
        let request = self
            .client
            .post(self.url(&["_bulk"])?)
            .header(CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .body(payload.to_ndjson());
        self.send("bulk", request).await
    }

    async fn info(&self) -> Result<RawResponse, SearchError> {
        self.send("info", self.client.get(self.url(&[])?)).await
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .send("health", self.client.get(self.url(&["_cluster", "health"])?))
            .await?;

        if !response.is_success() {
            warn!(status = response.status, "Proxy health check failed");
            return Ok(false);
        }

        let health: Value = serde_json::from_str(&response.body)
            .map_err(|e| SearchError::parse(e.to_string()))?;
        let status = health
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");

        info!(status, "Cluster status through proxy");
        Ok(status == "green" || status == "yellow")
    }
}
