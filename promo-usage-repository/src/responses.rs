//! Response decoding.
//!
//! Every transport hands back a [`RawResponse`]. The functions here classify
//! it as success or cluster failure and decode the body into the typed
//! results in [`crate::types`]. Cluster error details are logged here and
//! never reach the caller; the caller gets a per-operation error carrying the
//! HTTP status.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::errors::SearchError;
use crate::interfaces::RawResponse;
use crate::types::{
    BulkItemError, BulkItemResult, BulkReport, ClusterInfo, DeleteStatus, Hit, SearchPage,
    WriteOutcome,
};

/// Longest body excerpt written to the log on a decode failure.
const BODY_EXCERPT_LEN: usize = 512;

/// The cluster operation a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Search,
    Count,
    Write,
    DeleteByQuery,
    DeleteById,
    Bulk,
    Info,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Count => "count",
            Self::Write => "write",
            Self::DeleteByQuery => "delete_by_query",
            Self::DeleteById => "delete_by_id",
            Self::Bulk => "bulk",
            Self::Info => "info",
        }
    }

    fn failure(&self, msg: String) -> SearchError {
        match self {
            Self::Search | Self::Count | Self::Info => SearchError::query(msg),
            Self::Write => SearchError::index(msg),
            Self::DeleteByQuery | Self::DeleteById => SearchError::delete(msg),
            Self::Bulk => SearchError::bulk_index(msg),
        }
    }
}

/// Error reported by the cluster, either structured or as a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ClusterError {
    Detailed {
        #[serde(rename = "type")]
        error_type: String,
        #[serde(default)]
        reason: Option<String>,
    },
    Message(String),
}

impl ClusterError {
    fn error_type(&self) -> &str {
        match self {
            Self::Detailed { error_type, .. } => error_type,
            Self::Message(_) => "error",
        }
    }

    fn reason(&self) -> &str {
        match self {
            Self::Detailed { reason, .. } => reason.as_deref().unwrap_or_default(),
            Self::Message(message) => message,
        }
    }
}

impl From<ClusterError> for BulkItemError {
    fn from(err: ClusterError) -> Self {
        Self {
            error_type: err.error_type().to_string(),
            reason: err.reason().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ClusterError>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default)]
    took: u64,
    #[serde(default)]
    timed_out: bool,
    hits: HitsEnvelope<T>,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope<T> {
    #[serde(default)]
    total: Option<TotalHits>,
    #[serde(default)]
    max_score: Option<f64>,
    #[serde(default = "Vec::new")]
    hits: Vec<RawHit<T>>,
}

/// `hits.total` is an object on recent clusters and a plain number on old ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Count(u64),
    Object { value: u64 },
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            Self::Count(value) | Self::Object { value } => *value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHit<T> {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(rename = "_score", default)]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: T,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: f64,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(default)]
    result: String,
    #[serde(rename = "_version", default)]
    version: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DeleteByQueryResponse {
    #[serde(default)]
    deleted: u64,
}

#[derive(Debug, Deserialize)]
struct DeleteByIdResponse {
    #[serde(default)]
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    took: u64,
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    created: Option<bool>,
    #[serde(default)]
    items: Vec<BTreeMap<String, RawBulkItem>>,
}

#[derive(Debug, Deserialize)]
struct RawBulkItem {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_id", default)]
    id: String,
    #[serde(default)]
    status: u16,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<ClusterError>,
}

#[derive(Debug, Default, Deserialize)]
struct InfoResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cluster_name: String,
    #[serde(default)]
    version: VersionInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VersionInfo {
    #[serde(default)]
    number: String,
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// Fail when the status is not 2xx or the body carries an `error` member.
///
/// The structured type/reason are logged; the returned error only names the
/// operation and status.
fn ensure_success(operation: Operation, response: &RawResponse) -> Result<(), SearchError> {
    let cluster_error = serde_json::from_str::<ErrorEnvelope>(&response.body)
        .ok()
        .and_then(|envelope| envelope.error);

    if response.is_success() && cluster_error.is_none() {
        return Ok(());
    }

    match &cluster_error {
        Some(err) => error!(
            operation = operation.as_str(),
            status = response.status,
            error_type = err.error_type(),
            reason = err.reason(),
            "Cluster rejected request"
        ),
        None => error!(
            operation = operation.as_str(),
            status = response.status,
            body = excerpt(&response.body),
            "Cluster request failed"
        ),
    }

    Err(operation.failure(format!(
        "{} failed with status {}",
        operation.as_str(),
        response.status
    )))
}

fn parse_body<T: DeserializeOwned>(
    operation: Operation,
    response: &RawResponse,
) -> Result<T, SearchError> {
    serde_json::from_str(&response.body).map_err(|e| {
        error!(
            operation = operation.as_str(),
            error = %e,
            body = excerpt(&response.body),
            "Failed to decode response"
        );
        SearchError::parse(format!("{} response: {}", operation.as_str(), e))
    })
}

/// Decode a search response into a page of typed hits, in cluster order.
pub fn decode_search<T: DeserializeOwned>(
    response: &RawResponse,
) -> Result<SearchPage<T>, SearchError> {
    ensure_success(Operation::Search, response)?;
    let parsed: SearchResponse<T> = parse_body(Operation::Search, response)?;

    let hits: Vec<Hit<T>> = parsed
        .hits
        .hits
        .into_iter()
        .map(|hit| Hit {
            index: hit.index,
            id: hit.id,
            score: hit.score,
            source: hit.source,
        })
        .collect();

    let total = parsed
        .hits
        .total
        .map(|total| total.value())
        .unwrap_or(hits.len() as u64);

    if parsed.timed_out {
        warn!(took = parsed.took, "Search timed out on some shards");
    }

    Ok(SearchPage {
        took: parsed.took,
        timed_out: parsed.timed_out,
        total,
        max_score: parsed.hits.max_score,
        hits,
    })
}

/// Decode a count response. Fractional totals are truncated.
pub fn decode_count(response: &RawResponse) -> Result<u64, SearchError> {
    ensure_success(Operation::Count, response)?;
    let parsed: CountResponse = parse_body(Operation::Count, response)?;

    // `as` saturates: negatives and NaN become 0
    Ok(parsed.count.trunc() as u64)
}

/// Decode an index (insert or update) response.
pub fn decode_write(response: &RawResponse) -> Result<WriteOutcome, SearchError> {
    ensure_success(Operation::Write, response)?;
    let parsed: WriteResponse = parse_body(Operation::Write, response)?;

    debug!(
        result = %parsed.result,
        version = ?parsed.version,
        "Document written"
    );

    Ok(WriteOutcome {
        result: parsed.result,
        version: parsed.version,
    })
}

/// Decode a delete-by-query response into the number of removed documents.
pub fn decode_delete_by_query(response: &RawResponse) -> Result<u64, SearchError> {
    ensure_success(Operation::DeleteByQuery, response)?;
    let parsed: DeleteByQueryResponse = parse_body(Operation::DeleteByQuery, response)?;
    Ok(parsed.deleted)
}

/// Decode a delete-by-ID response into the cluster's status token.
///
/// A 404 whose body reports `"result":"not_found"` is a status, not a
/// failure. A 404 for a missing index carries an `error` member instead and
/// is still a failure.
pub fn decode_delete_by_id(response: &RawResponse) -> Result<DeleteStatus, SearchError> {
    if response.status == 404 {
        if let Ok(DeleteByIdResponse {
            result: Some(token),
        }) = serde_json::from_str::<DeleteByIdResponse>(&response.body)
        {
            if token == "not_found" {
                debug!("Document to delete was not found");
                return Ok(DeleteStatus::NotFound);
            }
        }
    }

    ensure_success(Operation::DeleteById, response)?;
    let parsed: DeleteByIdResponse = parse_body(Operation::DeleteById, response)?;

    Ok(parsed
        .result
        .map(|token| DeleteStatus::from_token(&token))
        .unwrap_or_else(|| DeleteStatus::Other(String::new())))
}

/// Decode a bulk response, keeping every item's outcome.
///
/// `created` is the cluster's top-level flag when sent; otherwise it is
/// true when every item was created (status 201).
pub fn decode_bulk(response: &RawResponse) -> Result<BulkReport, SearchError> {
    ensure_success(Operation::Bulk, response)?;
    let parsed: BulkResponse = parse_body(Operation::Bulk, response)?;

    let items: Vec<BulkItemResult> = parsed
        .items
        .into_iter()
        .flat_map(|entry| entry.into_iter())
        .map(|(action, item)| BulkItemResult {
            action,
            index: item.index,
            id: item.id,
            status: item.status,
            result: item.result,
            error: item.error.map(BulkItemError::from),
        })
        .collect();

    let created = parsed.created.unwrap_or_else(|| {
        !items.is_empty() && items.iter().all(|item| item.is_success() && item.status == 201)
    });

    let report = BulkReport {
        took: parsed.took,
        errors: parsed.errors || items.iter().any(|item| !item.is_success()),
        created,
        items,
    };

    for failure in report.failures() {
        warn!(
            index = %failure.index,
            id = %failure.id,
            status = failure.status,
            error_type = failure.error.as_ref().map(|e| e.error_type.as_str()).unwrap_or_default(),
            reason = failure.error.as_ref().map(|e| e.reason.as_str()).unwrap_or_default(),
            "Bulk item failed"
        );
    }

    Ok(report)
}

/// Decode the cluster root info response.
pub fn decode_info(response: &RawResponse) -> Result<ClusterInfo, SearchError> {
    ensure_success(Operation::Info, response)?;
    let parsed: InfoResponse = parse_body(Operation::Info, response)?;

    Ok(ClusterInfo {
        name: parsed.name,
        cluster_name: parsed.cluster_name,
        version: parsed.version.number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_usage_shared::Promo;
    use serde_json::json;

    fn ok(body: serde_json::Value) -> RawResponse {
        RawResponse::new(200, body.to_string())
    }

    #[test]
    fn test_search_preserves_hit_order() {
        let response = ok(json!({
            "took": 4,
            "timed_out": false,
            "hits": {
                "total": { "value": 3, "relation": "eq" },
                "max_score": null,
                "hits": [
                    { "_index": "staging-promo-order-usage", "_id": "3", "_score": null, "_source": { "order_id": 3 } },
                    { "_index": "staging-promo-order-usage", "_id": "1", "_score": null, "_source": { "order_id": 1 } },
                    { "_index": "staging-promo-order-usage", "_id": "2", "_score": null, "_source": { "order_id": 2 } }
                ]
            }
        }));

        let page: SearchPage<Promo> = decode_search(&response).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.hits[0].id, "3");

        let ids: Vec<i64> = page.into_sources().iter().map(|p| p.order_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_search_accepts_numeric_total() {
        let response = ok(json!({
            "hits": { "total": 7, "hits": [] }
        }));

        let page: SearchPage<Promo> = decode_search(&response).unwrap();
        assert_eq!(page.total, 7);
        assert!(page.hits.is_empty());
    }

    #[test]
    fn test_search_round_trips_record() {
        let mut promo = Promo::with_order_id(66666666);
        promo.source = "marketplace".to_string();
        promo.amount = 15000.5;
        promo.promo_detail.voucher_code = Some("CASHBACK".to_string());

        let response = ok(json!({
            "hits": {
                "total": { "value": 1 },
                "hits": [{ "_id": "66666666", "_source": promo }]
            }
        }));

        let page: SearchPage<Promo> = decode_search(&response).unwrap();
        assert_eq!(page.into_sources(), vec![promo]);
    }

    #[test]
    fn test_search_cluster_error_is_generic() {
        let response = RawResponse::new(
            400,
            json!({
                "error": {
                    "type": "query_shard_exception",
                    "reason": "Failed to parse query [source:(]"
                },
                "status": 400
            })
            .to_string(),
        );

        let err = decode_search::<Promo>(&response).unwrap_err();
        assert_eq!(err, SearchError::query("search failed with status 400"));
    }

    #[test]
    fn test_error_member_on_success_status_fails() {
        let response = ok(json!({ "error": "index closed" }));
        assert!(matches!(
            decode_count(&response),
            Err(SearchError::QueryError(_))
        ));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let response = RawResponse::new(200, "not json");
        assert!(matches!(
            decode_search::<Promo>(&response),
            Err(SearchError::ParseError(_))
        ));
    }

    #[test]
    fn test_count_truncates_float() {
        assert_eq!(decode_count(&ok(json!({ "count": 42.9 }))).unwrap(), 42);
        assert_eq!(decode_count(&ok(json!({ "count": 0 }))).unwrap(), 0);
    }

    #[test]
    fn test_write_outcome() {
        let response = RawResponse::new(
            201,
            json!({ "_id": "1", "_version": 2, "result": "updated" }).to_string(),
        );
        let outcome = decode_write(&response).unwrap();
        assert_eq!(outcome.result, "updated");
        assert_eq!(outcome.version, Some(2));
    }

    #[test]
    fn test_delete_by_query_count() {
        let response = ok(json!({ "took": 10, "deleted": 1, "failures": [] }));
        assert_eq!(decode_delete_by_query(&response).unwrap(), 1);

        let response = ok(json!({ "took": 3, "deleted": 0, "failures": [] }));
        assert_eq!(decode_delete_by_query(&response).unwrap(), 0);
    }

    #[test]
    fn test_delete_by_id_statuses() {
        let deleted = ok(json!({ "_id": "96969696", "result": "deleted" }));
        assert_eq!(decode_delete_by_id(&deleted).unwrap(), DeleteStatus::Deleted);

        let missing = RawResponse::new(
            404,
            json!({ "_id": "96969696", "result": "not_found" }).to_string(),
        );
        assert_eq!(
            decode_delete_by_id(&missing).unwrap(),
            DeleteStatus::NotFound
        );

        let no_index = RawResponse::new(
            404,
            json!({
                "error": { "type": "index_not_found_exception", "reason": "no such index" },
                "status": 404
            })
            .to_string(),
        );
        assert_eq!(
            decode_delete_by_id(&no_index).unwrap_err(),
            SearchError::delete("delete_by_id failed with status 404")
        );
    }

    #[test]
    fn test_bulk_report_with_partial_failure() {
        let response = ok(json!({
            "took": 30,
            "errors": true,
            "items": [
                { "index": { "_index": "staging-promo-order-usage", "_id": "66666666", "status": 201, "result": "created" } },
                { "index": {
                    "_index": "staging-promo-order-usage",
                    "_id": "99999999",
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "failed to parse field [amount]" }
                } }
            ]
        }));

        let report = decode_bulk(&response).unwrap();
        assert_eq!(report.total(), 2);
        assert_eq!(report.succeeded(), 1);
        assert!(report.errors);
        assert!(!report.created);

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, "99999999");
        assert_eq!(
            failures[0].error.as_ref().unwrap().error_type,
            "mapper_parsing_exception"
        );
    }

    #[test]
    fn test_bulk_created_flag() {
        let all_created = ok(json!({
            "took": 5,
            "errors": false,
            "items": [
                { "index": { "_id": "1", "status": 201, "result": "created" } },
                { "index": { "_id": "2", "status": 201, "result": "created" } }
            ]
        }));
        assert!(decode_bulk(&all_created).unwrap().created);

        let overwritten = ok(json!({
            "items": [{ "index": { "_id": "1", "status": 200, "result": "updated" } }]
        }));
        assert!(!decode_bulk(&overwritten).unwrap().created);

        let acknowledged = ok(json!({ "created": true }));
        let report = decode_bulk(&acknowledged).unwrap();
        assert!(report.created);
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_info() {
        let response = ok(json!({
            "name": "node-1",
            "cluster_name": "promo",
            "version": { "number": "7.10.2" }
        }));
        let info = decode_info(&response).unwrap();
        assert_eq!(info.cluster_name, "promo");
        assert_eq!(info.version, "7.10.2");
    }

    #[test]
    fn test_info_rejection_is_cluster_error() {
        let response = RawResponse::new(
            503,
            json!({
                "error": {
                    "type": "cluster_block_exception",
                    "reason": "blocked by: [SERVICE_UNAVAILABLE/1/state not recovered]"
                },
                "status": 503
            })
            .to_string(),
        );

        let err = decode_info(&response).unwrap_err();
        assert!(!err.is_transport());
        assert_eq!(err, SearchError::query("info failed with status 503"));
    }
}
