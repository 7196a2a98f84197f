//! Query builders.
//!
//! This module turns loose [`SearchParameters`] into the query documents sent
//! to the cluster. Building never fails: the query string is forwarded
//! verbatim and malformed syntax only surfaces when the cluster rejects it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use promo_usage_shared::{canonical_offset, DateWindow, SearchParameters, SortOrder};

/// Field holding the record creation time.
pub const CREATE_TIME_FIELD: &str = "create_time";

/// Date pattern declared on range bounds.
pub const RANGE_DATE_FORMAT: &str = "yyyy-MM-dd";

/// Time zone annotation declared on range bounds.
pub const RANGE_TIME_ZONE: &str = "+07:00";

/// Page size used when the caller does not ask for one.
pub const MAX_PAGE_SIZE: u64 = 10_000;

/// A query document.
///
/// Serializes to the cluster DSL, e.g. `{"bool":{"must":[...]}}` or
/// `{"query_string":{"query":"..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Bool(BoolQuery),
    QueryString(QueryString),
    Range(BTreeMap<String, DateRange>),
}

impl Query {
    /// The boolean composite, if this is one.
    pub fn as_bool(&self) -> Option<&BoolQuery> {
        match self {
            Query::Bool(bool_query) => Some(bool_query),
            _ => None,
        }
    }
}

/// Boolean composite of required and optional clauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
}

/// Free-text clause in the cluster's query-string syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryString {
    pub query: String,
}

/// Inclusive date bounds on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub gte: String,
    pub lte: String,
    pub format: String,
    pub time_zone: String,
}

/// Body of a search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchBody {
    pub from: u64,
    pub size: u64,
    pub query: Query,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<BTreeMap<String, SortOrder>>,
}

/// Body carrying only a query, used for count and delete-by-query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryBody {
    pub query: Query,
}

fn query_string(query: &str) -> Query {
    Query::QueryString(QueryString {
        query: query.to_string(),
    })
}

/// Build the creation-time range clause.
///
/// Bounds are rendered as dates in the canonical UTC+7 offset, whatever
/// offset the caller's timestamps carry.
fn date_range(window: &DateWindow) -> Query {
    let offset = canonical_offset();
    let bounds = DateRange {
        gte: window
            .gte
            .with_timezone(&offset)
            .format("%Y-%m-%d")
            .to_string(),
        lte: window
            .lte
            .with_timezone(&offset)
            .format("%Y-%m-%d")
            .to_string(),
        format: RANGE_DATE_FORMAT.to_string(),
        time_zone: RANGE_TIME_ZONE.to_string(),
    };

    let mut range = BTreeMap::new();
    range.insert(CREATE_TIME_FIELD.to_string(), bounds);
    Query::Range(range)
}

/// Build the filter query for a parameter set.
///
/// The free-text clause is always the first required clause; the range
/// clause follows it only when a time window is set.
pub fn build_query(parameters: &SearchParameters) -> Query {
    let mut must = vec![query_string(&parameters.query_string)];

    if let Some(window) = &parameters.time_window {
        must.push(date_range(window));
    }

    Query::Bool(BoolQuery {
        must,
        should: Vec::new(),
    })
}

/// Build a paged search body.
///
/// A missing or zero size falls back to `max_page_size`.
pub fn build_search_body(parameters: &SearchParameters, max_page_size: u64) -> SearchBody {
    let size = match parameters.size {
        Some(size) if size > 0 => size,
        _ => max_page_size,
    };

    SearchBody {
        from: 0,
        size,
        query: build_query(parameters),
        sort: parameters.sort.clone(),
    }
}

/// Build a count body.
pub fn build_count_body(parameters: &SearchParameters) -> QueryBody {
    QueryBody {
        query: build_query(parameters),
    }
}

/// Build a delete-by-query body.
///
/// The free-text clause sits inside a `should` composite holding one `must`
/// composite. This matches the request bodies already sent to the cluster.
pub fn build_delete_by_query_body(filter: &str) -> QueryBody {
    let inner = Query::Bool(BoolQuery {
        must: vec![query_string(filter)],
        should: Vec::new(),
    });

    QueryBody {
        query: Query::Bool(BoolQuery {
            must: Vec::new(),
            should: vec![inner],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use serde_json::json;

    fn time_window(gte: (i32, u32, u32), lte: (i32, u32, u32)) -> (SearchParameters, DateWindow) {
        let tz = canonical_offset();
        let gte = tz.with_ymd_and_hms(gte.0, gte.1, gte.2, 0, 0, 0).unwrap();
        let lte = tz.with_ymd_and_hms(lte.0, lte.1, lte.2, 23, 59, 59).unwrap();
        let params = SearchParameters::new("source:marketplace").with_time_window(gte, lte);
        (params, DateWindow::new(gte, lte))
    }

    #[test]
    fn test_build_query_without_time() {
        let params = SearchParameters::new("source:marketplace");
        let query = build_query(&params);

        let bool_query = query.as_bool().unwrap();
        assert_eq!(bool_query.must.len(), 1);
        assert!(bool_query.should.is_empty());
        assert_eq!(
            bool_query.must[0],
            Query::QueryString(QueryString {
                query: "source:marketplace".to_string()
            })
        );
    }

    #[test]
    fn test_build_query_with_time() {
        let (params, _) = time_window((2024, 1, 1), (2024, 1, 31));
        let query = build_query(&params);

        let bool_query = query.as_bool().unwrap();
        assert_eq!(bool_query.must.len(), 2);

        let value = serde_json::to_value(&bool_query.must[1]).unwrap();
        assert_eq!(
            value,
            json!({
                "range": {
                    "create_time": {
                        "gte": "2024-01-01",
                        "lte": "2024-01-31",
                        "format": "yyyy-MM-dd",
                        "time_zone": "+07:00"
                    }
                }
            })
        );
    }

    #[test]
    fn test_range_bounds_use_canonical_offset() {
        // 20:00 UTC on Jan 1st is already Jan 2nd at UTC+7
        let utc = FixedOffset::east_opt(0).unwrap();
        let gte = utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        let lte = utc.with_ymd_and_hms(2024, 1, 3, 1, 0, 0).unwrap();
        let params = SearchParameters::new("*").with_time_window(gte, lte);

        let value = serde_json::to_value(build_query(&params)).unwrap();
        let range = &value["bool"]["must"][1]["range"]["create_time"];

        assert_eq!(range["gte"], "2024-01-02");
        assert_eq!(range["lte"], "2024-01-03");
        assert_eq!(range["time_zone"], "+07:00");
    }

    #[test]
    fn test_query_string_is_not_escaped() {
        let params = SearchParameters::new("order_id:(1 OR 2) AND \"quoted\"");
        let value = serde_json::to_value(build_query(&params)).unwrap();

        assert_eq!(
            value["bool"]["must"][0]["query_string"]["query"],
            "order_id:(1 OR 2) AND \"quoted\""
        );
    }

    #[test]
    fn test_build_search_body_defaults_size() {
        let params = SearchParameters::new("source:marketplace");
        let body = build_search_body(&params, MAX_PAGE_SIZE);

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["from"], 0);
        assert_eq!(value["size"], 10_000);
        assert!(value.get("sort").is_none());

        let zero = build_search_body(&params.clone().with_size(0), 50);
        assert_eq!(zero.size, 50);
    }

    #[test]
    fn test_build_search_body_with_size_and_sort() {
        let params = SearchParameters::new("source:marketplace")
            .with_size(20)
            .with_sort("create_time", SortOrder::Desc);
        let value = serde_json::to_value(build_search_body(&params, MAX_PAGE_SIZE)).unwrap();

        assert_eq!(value["size"], 20);
        assert_eq!(value["sort"], json!({ "create_time": "desc" }));
    }

    #[test]
    fn test_build_count_body() {
        let (params, _) = time_window((2024, 2, 1), (2024, 2, 2));
        let value = serde_json::to_value(build_count_body(&params)).unwrap();

        assert_eq!(value.as_object().unwrap().len(), 1);
        assert_eq!(value["query"]["bool"]["must"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_build_delete_by_query_body_nesting() {
        let value = serde_json::to_value(build_delete_by_query_body("order_id:69696969")).unwrap();

        assert_eq!(
            value,
            json!({
                "query": {
                    "bool": {
                        "should": [
                            {
                                "bool": {
                                    "must": [
                                        { "query_string": { "query": "order_id:69696969" } }
                                    ]
                                }
                            }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_query_document_decodes() {
        let (params, window) = time_window((2024, 5, 1), (2024, 5, 7));
        let encoded = serde_json::to_string(&build_query(&params)).unwrap();
        let decoded: Query = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded, build_query(&params));
        assert_eq!(decoded.as_bool().unwrap().must[1], date_range(&window));
    }
}
