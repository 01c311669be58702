use super::bucket::{parse_bucket, scalar_label, BucketScope};
use super::sniff::{classify, EntryShape, Signature, SniffHints};
use super::{CONTEXT_KEY, FACETS_FIELDS_KEY, FACETS_KEY, FACET_QUERIES_KEY, LIST_KEY};
use crate::error::{FacetCheckError, Result};
use crate::request::{FacetFormat, RequestBody};
use crate::settings::Settings;
use crate::types::{
    Facet, FacetVariant, NormalizeWarning, Pagination, SearchResponse, SearchResponseContext,
};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Turns raw search responses into [`SearchResponseContext`] / [`SearchResponse`].
///
/// A bare `Normalizer::new()` knows nothing about the request and relies on
/// structural signals alone; [`Normalizer::for_request`] also uses the
/// requested fields, query labels and format to classify `facets` entries.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    settings: Settings,
    format: Option<FacetFormat>,
    requested_fields: Vec<String>,
    query_labels: Vec<String>,
    query_groups: Vec<String>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Normalizer {
            settings,
            ..Self::default()
        }
    }

    pub fn for_request(body: &RequestBody) -> Self {
        Self::new().request(body)
    }

    /// Take classification hints from the request that produced the response.
    pub fn request(mut self, body: &RequestBody) -> Self {
        self.format = Some(body.format());
        self.requested_fields = body.field_names().into_iter().map(str::to_string).collect();
        self.query_labels = body.facet_queries.iter().map(|q| q.label.clone()).collect();
        self.query_groups = body
            .facet_queries
            .iter()
            .filter_map(|q| q.group.clone())
            .collect();
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn format(mut self, format: FacetFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn requested_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Normalize the `context` of a full response document.
    ///
    /// A document without `context` yields an empty context.
    pub fn normalize(&self, raw: &Value) -> Result<SearchResponseContext> {
        let doc = raw.as_object().ok_or_else(|| {
            FacetCheckError::MalformedJson(format!(
                "Search response must be a JSON object, got {}",
                json_kind(raw)
            ))
        })?;
        match doc.get(CONTEXT_KEY) {
            None | Some(Value::Null) => Ok(SearchResponseContext::default()),
            Some(ctx) => self.normalize_context(ctx),
        }
    }

    /// Normalize a bare `context` object.
    pub fn normalize_context(&self, raw: &Value) -> Result<SearchResponseContext> {
        let obj = raw.as_object().ok_or_else(|| {
            FacetCheckError::MalformedJson(format!(
                "context must be a JSON object, got {}",
                json_kind(raw)
            ))
        })?;

        let query_entries = facet_list(obj, FACET_QUERIES_KEY)?;
        let field_entries = facet_list(obj, FACETS_FIELDS_KEY)?;
        let generic_entries = facet_list(obj, FACETS_KEY)?;

        let populated: Vec<String> = [
            (FACET_QUERIES_KEY, query_entries),
            (FACETS_FIELDS_KEY, field_entries),
            (FACETS_KEY, generic_entries),
        ]
        .iter()
        .filter(|(_, entries)| entries.is_some_and(|e| !e.is_empty()))
        .map(|(key, _)| key.to_string())
        .collect();
        if populated.len() > 1 {
            return Err(FacetCheckError::AmbiguousFacetShape { keys: populated });
        }

        let mut warnings = Vec::new();
        let query_facets = query_entries
            .map(|entries| self.parse_query_facets(entries, &mut warnings))
            .transpose()?;
        let field_facets = field_entries
            .map(|entries| self.parse_field_facets(entries, &mut warnings))
            .transpose()?;
        let grouped_or_generic_facets = generic_entries
            .map(|entries| self.parse_generic_facets(entries, &mut warnings))
            .transpose()?;

        let mut consistency = None;
        let mut extra = IndexMap::new();
        for (key, value) in obj {
            match key.as_str() {
                FACET_QUERIES_KEY | FACETS_FIELDS_KEY | FACETS_KEY => {}
                "consistency" => consistency = Some(value.clone()).filter(|v| !v.is_null()),
                _ => {
                    extra.insert(key.clone(), value.clone());
                }
            }
        }

        tracing::debug!(
            "[NORMALIZE] shape={:?} query_facets={} field_facets={} facets={} extra_keys={} warnings={}",
            populated.first(),
            query_facets.as_ref().map_or(0, Vec::len),
            field_facets.as_ref().map_or(0, Vec::len),
            grouped_or_generic_facets.as_ref().map_or(0, Vec::len),
            extra.len(),
            warnings.len()
        );

        Ok(SearchResponseContext {
            query_facets,
            field_facets,
            grouped_or_generic_facets,
            consistency,
            extra,
            warnings,
        })
    }

    /// Parse the full envelope: `list.entries`, `list.pagination` and `context`.
    pub fn parse_response(&self, raw: &Value) -> Result<SearchResponse> {
        let doc = raw.as_object().ok_or_else(|| {
            FacetCheckError::MalformedJson(format!(
                "Search response must be a JSON object, got {}",
                json_kind(raw)
            ))
        })?;

        let (entries, pagination) = match doc.get(LIST_KEY) {
            None | Some(Value::Null) => (Vec::new(), None),
            Some(Value::Object(list)) => parse_list(list)?,
            Some(other) => {
                return Err(FacetCheckError::MalformedJson(format!(
                    "list must be a JSON object, got {}",
                    json_kind(other)
                )))
            }
        };

        let context = self.normalize(raw)?;
        let extra = doc
            .iter()
            .filter(|(k, _)| k.as_str() != LIST_KEY && k.as_str() != CONTEXT_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(SearchResponse {
            entries,
            pagination,
            context,
            extra,
        })
    }

    fn parse_query_facets(
        &self,
        entries: &[Value],
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Vec<Facet>> {
        // Each legacy facetQueries entry is a single bucket; it becomes a
        // one-bucket facet named after the query label.
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let label = scalar_label(entry.get("label")).ok_or_else(|| {
                    FacetCheckError::MalformedJson(format!(
                        "{} entry #{} has no label",
                        FACET_QUERIES_KEY, i
                    ))
                })?;
                let scope = BucketScope {
                    facet: &label,
                    settings: &self.settings,
                };
                let bucket = parse_bucket(entry, 0, &scope, warnings)?;
                Ok(Facet::new(FacetVariant::QueryFacet, label, vec![bucket]))
            })
            .collect()
    }

    fn parse_field_facets(
        &self,
        entries: &[Value],
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Vec<Facet>> {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                self.parse_bucketed_facet(entry, i, FACETS_FIELDS_KEY, warnings)
                    .map(|mut facet| {
                        facet.variant = FacetVariant::FieldFacet;
                        facet
                    })
            })
            .collect()
    }

    fn parse_generic_facets(
        &self,
        entries: &[Value],
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Vec<Facet>> {
        let hints = SniffHints {
            format: self.format,
            requested_fields: &self.requested_fields,
            query_labels: &self.query_labels,
            query_groups: &self.query_groups,
        };
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let mut facet = self.parse_bucketed_facet(entry, i, FACETS_KEY, warnings)?;
                let shape = EntryShape {
                    facet_type: facet.facet_type.as_deref(),
                    label: &facet.label,
                    buckets: &facet.buckets,
                    bare_counts: has_bare_counts(entry),
                };
                let (variant, signature) = classify(&shape, &hints);
                if signature == Signature::Unrecognized {
                    tracing::warn!(
                        "[NORMALIZE] facet '{}' matches no grouped/generic signature, treating as generic",
                        facet.label
                    );
                    warnings.push(NormalizeWarning::UnrecognizedFacetSignature {
                        facet: facet.label.clone(),
                    });
                } else {
                    tracing::debug!(
                        "[NORMALIZE] facet '{}' classified {:?} via {:?}",
                        facet.label,
                        variant,
                        signature
                    );
                }
                facet.variant = variant;
                Ok(facet)
            })
            .collect()
    }

    /// Shared reader for `{label, type?, buckets: [...]}` entries. The
    /// variant is fixed up by the caller.
    fn parse_bucketed_facet(
        &self,
        entry: &Value,
        index: usize,
        key: &str,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Facet> {
        let obj = entry.as_object().ok_or_else(|| {
            FacetCheckError::MalformedJson(format!("{} entry #{} is not an object", key, index))
        })?;
        let label = scalar_label(obj.get("label")).ok_or_else(|| {
            FacetCheckError::MalformedJson(format!("{} entry #{} has no label", key, index))
        })?;
        let facet_type = obj.get("type").and_then(Value::as_str).map(str::to_string);

        let scope = BucketScope {
            facet: &label,
            settings: &self.settings,
        };
        let buckets = match obj.get("buckets") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, b)| parse_bucket(b, i, &scope, warnings))
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(FacetCheckError::MalformedJson(format!(
                    "buckets of facet '{}' must be an array, got {}",
                    label,
                    json_kind(other)
                )))
            }
        };

        Ok(Facet {
            variant: FacetVariant::GenericFacet,
            label,
            facet_type,
            buckets,
        })
    }
}

/// True when every raw bucket reports a bare `count` and no `metrics`,
/// the way the legacy format reports query groups.
fn has_bare_counts(entry: &Value) -> bool {
    match entry.get("buckets") {
        Some(Value::Array(buckets)) if !buckets.is_empty() => buckets.iter().all(|b| {
            b.get("count").is_some_and(|c| !c.is_null())
                && b.get("metrics").map_or(true, Value::is_null)
        }),
        _ => false,
    }
}

fn facet_list<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Vec<Value>>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(FacetCheckError::MalformedJson(format!(
            "context.{} must be an array, got {}",
            key,
            json_kind(other)
        ))),
    }
}

fn parse_list(list: &Map<String, Value>) -> Result<(Vec<Value>, Option<Pagination>)> {
    let entries = match list.get("entries") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(unwrap_entry).collect(),
        Some(other) => {
            return Err(FacetCheckError::MalformedJson(format!(
                "list.entries must be an array, got {}",
                json_kind(other)
            )))
        }
    };
    let pagination = match list.get("pagination") {
        None | Some(Value::Null) => None,
        Some(p) => Some(
            serde_json::from_value::<Pagination>(p.clone())
                .map_err(|e| FacetCheckError::MalformedJson(format!("list.pagination: {}", e)))?,
        ),
    };
    Ok((entries, pagination))
}

fn unwrap_entry(item: &Value) -> Value {
    match item.get("entry") {
        Some(inner @ Value::Object(_)) => inner.clone(),
        _ => item.clone(),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SearchRequestBuilder;
    use serde_json::json;

    #[test]
    fn test_for_request_collects_hints() {
        let body = SearchRequestBuilder::new("cars")
            .grouped_facet_query("content.size:[0 TO 102400]", "small", "foo")
            .facet_field("modifier")
            .facet_format("V2")
            .build()
            .unwrap();
        let normalizer = Normalizer::for_request(&body);
        assert_eq!(normalizer.format, Some(FacetFormat::V2));
        assert_eq!(normalizer.requested_fields, vec!["modifier".to_string()]);
        assert_eq!(normalizer.query_labels, vec!["small".to_string()]);
        assert_eq!(normalizer.query_groups, vec!["foo".to_string()]);
    }

    #[test]
    fn test_non_object_document_is_malformed() {
        let err = Normalizer::new().normalize(&json!([1, 2])).unwrap_err();
        assert_eq!(err.code(), "malformed_json");
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_missing_context_is_empty() {
        let ctx = Normalizer::new()
            .normalize(&json!({"list": {"entries": []}}))
            .unwrap();
        assert_eq!(ctx, SearchResponseContext::default());
    }

    #[test]
    fn test_facet_collection_must_be_array() {
        let err = Normalizer::new()
            .normalize(&json!({"context": {"facets": {"label": "x"}}}))
            .unwrap_err();
        assert!(err.to_string().contains("context.facets must be an array"));
    }

    #[test]
    fn test_has_bare_counts() {
        assert!(has_bare_counts(&json!({"buckets": [
            {"label": "small", "filterQuery": "content.size:[0 TO 102400]", "count": 61}
        ]})));
        assert!(!has_bare_counts(&json!({"buckets": [
            {"label": "small", "filterQuery": "q", "count": 1,
             "metrics": [{"type": "count", "value": {"count": 1}}]}
        ]})));
        assert!(!has_bare_counts(&json!({"buckets": []})));
    }

    #[test]
    fn test_untyped_legacy_group_is_grouped_without_hints() {
        let ctx = Normalizer::new()
            .normalize(&json!({"context": {"facets": [
                {"label": "foo", "buckets": [
                    {"label": "cars", "filterQuery": "cars AND blue", "count": 3},
                    {"label": "boats", "filterQuery": "boats", "count": 0}
                ]}
            ]}}))
            .unwrap();
        let foo = ctx.facet("foo").unwrap();
        assert_eq!(foo.variant, FacetVariant::GroupedFacet);
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn test_unwrap_entry() {
        assert_eq!(unwrap_entry(&json!({"entry": {"tag": "a"}})), json!({"tag": "a"}));
        assert_eq!(unwrap_entry(&json!({"tag": "a"})), json!({"tag": "a"}));
    }
}
