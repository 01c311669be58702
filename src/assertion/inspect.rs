use crate::types::{Bucket, Facet, Metric, SearchResponse, SearchResponseContext};
use serde::Serialize;
use serde_json::Value;

/// Named-field access for the assertion engine.
///
/// Every entity kind exposes a fixed lookup table. `field_value` returns
/// `None` for names outside the table (a typo in the test) and
/// `Some(Value::Null)` for a known field the response left out.
pub trait Inspect {
    /// Entity name used in messages, e.g. `"bucket"`.
    fn entity(&self) -> &'static str;

    fn field_names(&self) -> Vec<String>;

    fn field_value(&self, name: &str) -> Option<Value>;

    /// Full structural dump attached to failures.
    fn dump(&self) -> String;
}

pub(crate) fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn names(table: &[&str]) -> Vec<String> {
    table.iter().map(|s| s.to_string()).collect()
}

/// Closest known field name, for "did you mean" hints.
pub(crate) fn suggest(name: &str, candidates: &[String]) -> Option<String> {
    let lower = name.to_lowercase();
    candidates
        .iter()
        .map(|c| (strsim::damerau_levenshtein(&lower, &c.to_lowercase()), c))
        .filter(|(distance, c)| *distance <= 2.max(c.len() / 3))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, c)| c.clone())
}

const BUCKET_FIELDS: &[&str] = &["label", "filterQuery", "display", "count", "metrics"];

impl Inspect for Bucket {
    fn entity(&self) -> &'static str {
        "bucket"
    }

    fn field_names(&self) -> Vec<String> {
        names(BUCKET_FIELDS)
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "label" => Some(Value::from(self.label.as_str())),
            "filterQuery" => Some(Value::from(self.filter_query.as_str())),
            "display" => Some(self.display.clone().unwrap_or(Value::Null)),
            "count" => Some(self.count().map(Value::from).unwrap_or(Value::Null)),
            "metrics" => Some(to_json(&self.metrics)),
            _ => None,
        }
    }

    fn dump(&self) -> String {
        pretty(self)
    }
}

const METRIC_FIELDS: &[&str] = &["type", "value", "count"];

impl Inspect for Metric {
    fn entity(&self) -> &'static str {
        "metric"
    }

    fn field_names(&self) -> Vec<String> {
        names(METRIC_FIELDS)
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "type" => Some(Value::from(self.kind.as_str())),
            "value" => Some(to_json(&self.value)),
            "count" => Some(self.count_value().map(Value::from).unwrap_or(Value::Null)),
            _ => None,
        }
    }

    fn dump(&self) -> String {
        pretty(self)
    }
}

const FACET_FIELDS: &[&str] = &["label", "type", "variant", "buckets"];

impl Inspect for Facet {
    fn entity(&self) -> &'static str {
        "facet"
    }

    fn field_names(&self) -> Vec<String> {
        names(FACET_FIELDS)
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "label" => Some(Value::from(self.label.as_str())),
            "type" => Some(
                self.facet_type
                    .as_deref()
                    .map(Value::from)
                    .unwrap_or(Value::Null),
            ),
            "variant" => Some(Value::from(self.variant.as_str())),
            "buckets" => Some(to_json(&self.buckets)),
            _ => None,
        }
    }

    fn dump(&self) -> String {
        pretty(self)
    }
}

// Wire names and model names are both accepted.
const CONTEXT_FIELDS: &[&str] = &[
    "facetQueries",
    "queryFacets",
    "facetsFields",
    "fieldFacets",
    "facets",
    "groupedOrGenericFacets",
    "consistency",
    "warnings",
];

fn optional<T: Serialize>(value: &Option<T>) -> Value {
    value.as_ref().map(to_json).unwrap_or(Value::Null)
}

impl Inspect for SearchResponseContext {
    fn entity(&self) -> &'static str {
        "context"
    }

    fn field_names(&self) -> Vec<String> {
        let mut all = names(CONTEXT_FIELDS);
        all.extend(self.extra.keys().cloned());
        all
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "facetQueries" | "queryFacets" => Some(optional(&self.query_facets)),
            "facetsFields" | "fieldFacets" => Some(optional(&self.field_facets)),
            "facets" | "groupedOrGenericFacets" => Some(optional(&self.grouped_or_generic_facets)),
            "consistency" => Some(self.consistency.clone().unwrap_or(Value::Null)),
            "warnings" => Some(to_json(&self.warnings)),
            other => self.extra.get(other).cloned(),
        }
    }

    fn dump(&self) -> String {
        pretty(self)
    }
}

const RESPONSE_FIELDS: &[&str] = &["entries", "pagination", "context"];

impl Inspect for SearchResponse {
    fn entity(&self) -> &'static str {
        "response"
    }

    fn field_names(&self) -> Vec<String> {
        let mut all = names(RESPONSE_FIELDS);
        all.extend(self.extra.keys().cloned());
        all
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        match name {
            "entries" => Some(Value::Array(self.entries.clone())),
            "pagination" => Some(optional(&self.pagination)),
            "context" => Some(to_json(&self.context)),
            other => self.extra.get(other).cloned(),
        }
    }

    fn dump(&self) -> String {
        pretty(self)
    }
}

/// Raw JSON entries (tags, members, site containers, ...). Names are the
/// object's own keys; dotted paths (`entry.tag`, `buckets.0.label`) walk
/// nested objects and arrays.
impl Inspect for Value {
    fn entity(&self) -> &'static str {
        "entry"
    }

    fn field_names(&self) -> Vec<String> {
        match self {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn field_value(&self, name: &str) -> Option<Value> {
        let mut current = self;
        for segment in name.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current.clone())
    }

    fn dump(&self) -> String {
        pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FacetVariant;
    use serde_json::json;

    #[test]
    fn test_bucket_table() {
        let bucket = Bucket::new("admin", "modifier:\"admin\"").with_count(1);
        assert_eq!(bucket.field_value("label"), Some(json!("admin")));
        assert_eq!(bucket.field_value("count"), Some(json!(1)));
        assert_eq!(bucket.field_value("display"), Some(Value::Null));
        assert_eq!(
            bucket.field_value("metrics"),
            Some(json!([{"type": "count", "value": {"count": 1}}]))
        );
        assert_eq!(bucket.field_value("lable"), None);
    }

    #[test]
    fn test_context_falls_back_to_passthrough() {
        let mut ctx = SearchResponseContext::default();
        ctx.extra.insert("spellCheck".to_string(), json!({"type": "didYouMean"}));
        assert_eq!(ctx.field_value("facetQueries"), Some(Value::Null));
        assert_eq!(
            ctx.field_value("spellCheck"),
            Some(json!({"type": "didYouMean"}))
        );
        assert!(ctx.field_names().contains(&"spellCheck".to_string()));
        assert_eq!(ctx.field_value("spelCheck"), None);
    }

    #[test]
    fn test_facet_table() {
        let facet = Facet::new(FacetVariant::GenericFacet, "modifier", vec![]);
        assert_eq!(facet.field_value("variant"), Some(json!("genericFacet")));
        assert_eq!(facet.field_value("type"), Some(Value::Null));
        assert_eq!(facet.field_value("buckets"), Some(json!([])));
    }

    #[test]
    fn test_value_dotted_paths() {
        let entry = json!({"entry": {"tag": "alpha", "ids": ["x", "y"]}});
        assert_eq!(entry.field_value("entry.tag"), Some(json!("alpha")));
        assert_eq!(entry.field_value("entry.ids.1"), Some(json!("y")));
        assert_eq!(entry.field_value("entry.nope"), None);
        assert_eq!(entry.field_names(), vec!["entry".to_string()]);
    }

    #[test]
    fn test_suggest() {
        let candidates = names(BUCKET_FIELDS);
        assert_eq!(
            suggest("filterQeury", &candidates),
            Some("filterQuery".to_string())
        );
        assert_eq!(suggest("lable", &candidates), Some("label".to_string()));
        assert_eq!(suggest("zzzzzzzzzz", &candidates), None);
    }
}
