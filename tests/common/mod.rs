#![allow(dead_code)]

use facetcheck::request::{FacetQuery, RequestBody};
use serde_json::{json, Value};
use wiremock::{Request, Respond, ResponseTemplate};

pub const SMALL: &str = "content.size:[0 TO 102400]";
pub const MEDIUM: &str = "content.size:[102400 TO 1048576]";
pub const LARGE: &str = "content.size:[1048576 TO 16777216]";
pub const HUGE: &str = "content.size:[16777216 TO 134217728]";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("facetcheck=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Legacy `facetQueries`: one bucket per entry, bare counts.
pub fn legacy_query_facets() -> Value {
    json!({
        "list": {
            "entries": [{"entry": {"name": "big.pdf"}}],
            "pagination": {"count": 1, "hasMoreItems": false, "totalItems": 1, "skipCount": 0, "maxItems": 100}
        },
        "context": {
            "consistency": {"lastTxId": 1024},
            "facetQueries": [
                {"label": "small", "filterQuery": SMALL, "count": 61},
                {"label": "medium", "filterQuery": MEDIUM, "count": 61},
                {"label": "large", "filterQuery": LARGE, "count": 0}
            ]
        }
    })
}

/// Classic `facetsFields` with a numeric display value on one bucket.
pub fn field_facets() -> Value {
    json!({
        "context": {
            "facetsFields": [
                {"label": "creator", "buckets": [
                    {"label": "user-1", "filterQuery": "creator:\"user-1\"", "count": 3, "display": "FN-1 LN-1"},
                    {"label": "user-2", "filterQuery": "creator:\"user-2\"", "count": 1, "display": 1}
                ]}
            ]
        }
    })
}

/// Grouped query facets reported under `facets` with no `type` hint.
pub fn grouped_facets() -> Value {
    json!({
        "context": {
            "facets": [
                {"label": "foo", "buckets": [
                    {"label": "small", "filterQuery": SMALL, "metrics": [{"type": "count", "value": {"count": 61}}]},
                    {"label": "medium", "filterQuery": MEDIUM, "metrics": [{"type": "count", "value": {"count": 61}}]},
                    {"label": "large", "filterQuery": LARGE, "metrics": [{"type": "count", "value": {"count": 0}}]}
                ]}
            ]
        }
    })
}

/// v2 generic facets for a multi-valued field.
pub fn generic_v2_facets() -> Value {
    json!({
        "context": {
            "facets": [
                {"type": "field", "label": "cm:addressees", "buckets": [
                    {"label": "{en}first", "filterQuery": "cm:addressees:\"{en}first\"",
                     "metrics": [{"type": "count", "value": {"count": 1}}]},
                    {"label": "{en}second", "filterQuery": "cm:addressees:\"{en}second\"",
                     "metrics": [{"type": "count", "value": {"count": 1}}]}
                ]}
            ]
        }
    })
}

/// Deterministic per-bucket count; every fifth bucket is empty.
fn count_for(i: usize) -> u64 {
    ((i * 7) % 5) as u64
}

fn query_bucket(i: usize, fq: &FacetQuery, v2: bool) -> Value {
    if v2 {
        json!({"label": fq.label, "filterQuery": fq.query,
               "metrics": [{"type": "count", "value": {"count": count_for(i)}}]})
    } else {
        json!({"label": fq.label, "filterQuery": fq.query, "count": count_for(i)})
    }
}

fn field_buckets(field: &str, v2: bool) -> Vec<Value> {
    (0..2)
        .map(|i| {
            let value = format!("{}-v{}", field.trim_matches('\''), i);
            let fq = format!("{}:\"{}\"", field, value);
            if v2 {
                json!({"label": value, "filterQuery": fq,
                       "metrics": [{"type": "count", "value": {"count": count_for(i)}}]})
            } else {
                json!({"label": value, "filterQuery": fq, "count": count_for(i)})
            }
        })
        .collect()
}

/// What a well-behaved search service answers for `body`.
///
/// Exactly one facet key is populated:
/// - `V2`: everything under `facets` with explicit `type` hints
/// - legacy, plain queries only: `facetQueries`
/// - legacy, fields only: `facetsFields`
/// - legacy, anything else: untyped `facets` entries (groups and fields)
pub fn echo_response(body: &RequestBody) -> Value {
    let v2 = body.facet_format.is_some();
    let fields = body.field_names();
    let grouped = body.facet_queries.iter().any(|q| q.group.is_some());

    let mut context = serde_json::Map::new();
    context.insert("consistency".to_string(), json!({"lastTxId": 1}));

    if v2 || grouped || (!body.facet_queries.is_empty() && !fields.is_empty()) {
        let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
        for (i, fq) in body.facet_queries.iter().enumerate() {
            let name = fq.group.clone().unwrap_or_else(|| fq.label.clone());
            let bucket = query_bucket(i, fq, v2);
            match groups.iter_mut().find(|(g, _)| *g == name) {
                Some((_, buckets)) => buckets.push(bucket),
                None => groups.push((name, vec![bucket])),
            }
        }
        let mut facets: Vec<Value> = groups
            .into_iter()
            .map(|(label, buckets)| {
                if v2 {
                    json!({"type": "query", "label": label, "buckets": buckets})
                } else {
                    json!({"label": label, "buckets": buckets})
                }
            })
            .collect();
        facets.extend(fields.iter().map(|f| {
            if v2 {
                json!({"type": "field", "label": f, "buckets": field_buckets(f, true)})
            } else {
                json!({"label": f, "buckets": field_buckets(f, false)})
            }
        }));
        if !facets.is_empty() {
            context.insert("facets".to_string(), Value::Array(facets));
        }
    } else if !body.facet_queries.is_empty() {
        let entries: Vec<Value> = body
            .facet_queries
            .iter()
            .enumerate()
            .map(|(i, fq)| query_bucket(i, fq, false))
            .collect();
        context.insert("facetQueries".to_string(), Value::Array(entries));
    } else if !fields.is_empty() {
        let entries: Vec<Value> = fields
            .iter()
            .map(|f| json!({"label": f, "buckets": field_buckets(f, false)}))
            .collect();
        context.insert("facetsFields".to_string(), Value::Array(entries));
    }

    if body.include_request {
        context.insert("request".to_string(), body.to_json());
    }

    let paging = body.paging.unwrap_or_default();
    json!({
        "list": {
            "entries": [],
            "pagination": {
                "count": 0,
                "hasMoreItems": false,
                "totalItems": 0,
                "skipCount": paging.skip_count.unwrap_or(0),
                "maxItems": paging.max_items.unwrap_or(100)
            }
        },
        "context": Value::Object(context)
    })
}

/// wiremock responder that answers every search POST with [`echo_response`].
pub struct EchoResponder;

impl Respond for EchoResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match serde_json::from_slice::<RequestBody>(&request.body) {
            Ok(body) => ResponseTemplate::new(200).set_body_json(echo_response(&body)),
            Err(e) => ResponseTemplate::new(400).set_body_json(json!({
                "error": {"statusCode": 400, "briefSummary": e.to_string()}
            })),
        }
    }
}
