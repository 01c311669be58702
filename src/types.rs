use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Discriminator of a [`Metric`].
///
/// Only `count` is produced by the search service today. Anything else is
/// kept verbatim in [`MetricKind::Other`] so that newer servers do not lose
/// data when read by an older normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricKind {
    Count,
    Other(String),
}

impl MetricKind {
    pub fn as_str(&self) -> &str {
        match self {
            MetricKind::Count => "count",
            MetricKind::Other(name) => name,
        }
    }
}

impl From<String> for MetricKind {
    fn from(s: String) -> Self {
        if s == "count" {
            MetricKind::Count
        } else {
            MetricKind::Other(s)
        }
    }
}

impl From<&str> for MetricKind {
    fn from(s: &str) -> Self {
        MetricKind::from(s.to_string())
    }
}

impl From<MetricKind> for String {
    fn from(kind: MetricKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed measurement attached to a [`Bucket`], e.g. `{"type": "count", "value": {"count": 3}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type")]
    pub kind: MetricKind,
    pub value: IndexMap<String, Value>,
}

impl Metric {
    /// The synthetic metric a legacy bare `count` is lifted into.
    pub fn count(n: u64) -> Self {
        let mut value = IndexMap::new();
        value.insert("count".to_string(), Value::from(n));
        Metric {
            kind: MetricKind::Count,
            value,
        }
    }

    /// `value.count` for count metrics, `None` for every other kind.
    pub fn count_value(&self) -> Option<u64> {
        match self.kind {
            MetricKind::Count => self.value.get("count").and_then(Value::as_u64),
            MetricKind::Other(_) => None,
        }
    }
}

/// One facet value bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub label: String,
    pub filter_query: String,
    /// Human-readable alternate label. Kept as raw JSON because the service
    /// sometimes reports a number here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Value>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl Bucket {
    pub fn new(label: impl Into<String>, filter_query: impl Into<String>) -> Self {
        Bucket {
            label: label.into(),
            filter_query: filter_query.into(),
            display: None,
            metrics: Vec::new(),
        }
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.metrics.push(Metric::count(count));
        self
    }

    pub fn with_display(mut self, display: impl Into<Value>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Document count of this bucket, derived from the first count metric.
    ///
    /// Legacy buckets expose the same number because their bare `count` is
    /// lifted into a metric during normalization.
    pub fn count(&self) -> Option<u64> {
        self.metrics.iter().find_map(Metric::count_value)
    }

    pub fn metric(&self, kind: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.kind.as_str() == kind)
    }

    pub fn display_text(&self) -> Option<String> {
        match &self.display {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Which response shape a [`Facet`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetVariant {
    /// One entry of the legacy `facetQueries` list.
    QueryFacet,
    /// One entry of the classic `facetsFields` list.
    FieldFacet,
    /// Query facets sharing a `group` label, reported under `facets`.
    GroupedFacet,
    /// The v2 generic format, reported under `facets`.
    GenericFacet,
}

impl FacetVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetVariant::QueryFacet => "queryFacet",
            FacetVariant::FieldFacet => "fieldFacet",
            FacetVariant::GroupedFacet => "groupedFacet",
            FacetVariant::GenericFacet => "genericFacet",
        }
    }
}

/// One facet group of a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    pub variant: FacetVariant,
    pub label: String,
    /// The `type` the server attached to the entry, if any (`"query"`, `"field"`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub facet_type: Option<String>,
    pub buckets: Vec<Bucket>,
}

impl Facet {
    pub fn new(variant: FacetVariant, label: impl Into<String>, buckets: Vec<Bucket>) -> Self {
        Facet {
            variant,
            label: label.into(),
            facet_type: None,
            buckets,
        }
    }

    pub fn bucket(&self, label: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.label == label)
    }

    pub fn bucket_labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }
}

/// Non-fatal findings recorded while normalizing a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NormalizeWarning {
    UnknownMetricType {
        facet: String,
        bucket: String,
        metric_type: String,
    },
    UnrecognizedFacetSignature {
        facet: String,
    },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeWarning::UnknownMetricType {
                facet,
                bucket,
                metric_type,
            } => write!(
                f,
                "unknown metric type '{}' on bucket '{}' of facet '{}'",
                metric_type, bucket, facet
            ),
            NormalizeWarning::UnrecognizedFacetSignature { facet } => write!(
                f,
                "facet '{}' matches no known grouped/generic signature",
                facet
            ),
        }
    }
}

/// The normalized `context` object of a search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponseContext {
    /// Read from `facetQueries`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_facets: Option<Vec<Facet>>,
    /// Read from `facetsFields`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_facets: Option<Vec<Facet>>,
    /// Read from `facets`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouped_or_generic_facets: Option<Vec<Facet>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<Value>,
    /// Every other context key, in server order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<NormalizeWarning>,
}

impl SearchResponseContext {
    /// All facets regardless of the shape they came from.
    pub fn facets(&self) -> impl Iterator<Item = &Facet> {
        self.query_facets
            .iter()
            .chain(self.field_facets.iter())
            .chain(self.grouped_or_generic_facets.iter())
            .flatten()
    }

    pub fn facet(&self, label: &str) -> Option<&Facet> {
        self.facets().find(|f| f.label == label)
    }

    /// Wire names of the facet collections that hold at least one facet.
    pub fn populated_shapes(&self) -> Vec<&'static str> {
        let mut shapes = Vec::new();
        if self.query_facets.as_ref().is_some_and(|v| !v.is_empty()) {
            shapes.push("facetQueries");
        }
        if self.field_facets.as_ref().is_some_and(|v| !v.is_empty()) {
            shapes.push("facetsFields");
        }
        if self
            .grouped_or_generic_facets
            .as_ref()
            .is_some_and(|v| !v.is_empty())
        {
            shapes.push("facets");
        }
        shapes
    }
}

/// `list.pagination` of a collection response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
}

/// The full response envelope: `list.entries`, `list.pagination` and `context`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Entries unwrapped from their `{"entry": ...}` wrapper.
    pub entries: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub context: SearchResponseContext,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, Value>,
}
