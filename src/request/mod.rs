//! Outbound search request bodies.
//!
//! [`build`] turns a [`FacetRequestSpec`] into the JSON body POSTed to the
//! `search` endpoint. Sending it is the caller's business. The fluent
//! [`SearchRequestBuilder`] produces the same body.

pub mod builder;

pub use builder::SearchRequestBuilder;

use crate::error::{FacetCheckError, Result};
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Response shape requested from the server. Only affects the response;
/// request semantics are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacetFormat {
    #[default]
    Legacy,
    V2,
}

impl FacetFormat {
    /// Value of the `facetFormat` request key. Legacy is expressed by omitting it.
    pub fn wire_value(&self) -> Option<&'static str> {
        match self {
            FacetFormat::Legacy => None,
            FacetFormat::V2 => Some("V2"),
        }
    }
}

impl FromStr for FacetFormat {
    type Err = FacetCheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "v1" => Ok(FacetFormat::Legacy),
            "v2" => Ok(FacetFormat::V2),
            other => Err(FacetCheckError::InvalidSpec(format!(
                "Unknown facet format '{}': expected 'legacy' or 'V2'",
                other
            ))),
        }
    }
}

/// One facet-query definition: a filter expression reported back as a
/// bucket named `label`, optionally merged with its siblings under `group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetQuery {
    pub query: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl FacetQuery {
    pub fn new(query: impl Into<String>, label: impl Into<String>) -> Self {
        FacetQuery {
            query: query.into(),
            label: label.into(),
            group: None,
        }
    }

    pub fn grouped(
        query: impl Into<String>,
        label: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        FacetQuery {
            query: query.into(),
            label: label.into(),
            group: Some(group.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_count: Option<u32>,
}

/// Caller-side description of a faceted search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetRequestSpec {
    pub query_text: String,
    /// Falls back to [`Settings::default_language`].
    pub language: Option<String>,
    pub facet_queries: Vec<FacetQuery>,
    pub facet_fields: Vec<String>,
    /// Format as the caller wrote it (`"V2"`, `"legacy"`, ...). `None` means legacy.
    pub facet_format: Option<String>,
    pub include_request: bool,
    pub paging: Option<Paging>,
}

impl FacetRequestSpec {
    pub fn format(&self) -> Result<FacetFormat> {
        match &self.facet_format {
            Some(f) => f.parse(),
            None => Ok(FacetFormat::Legacy),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClause {
    pub query: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFieldClause {
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetFieldsClause {
    pub facets: Vec<FacetFieldClause>,
}

/// The JSON body of a `search` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub query: QueryClause,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facet_queries: Vec<FacetQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_fields: Option<FacetFieldsClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_format: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_request: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl RequestBody {
    pub fn to_json(&self) -> serde_json::Value {
        // Plain strings, bools and integers only: serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn format(&self) -> FacetFormat {
        self.facet_format
            .as_deref()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.facet_fields
            .iter()
            .flat_map(|ff| ff.facets.iter().map(|f| f.field.as_str()))
            .collect()
    }
}

/// Build the request body for `spec` using default [`Settings`].
pub fn build(spec: &FacetRequestSpec) -> Result<RequestBody> {
    build_with_settings(spec, &Settings::default())
}

pub fn build_with_settings(spec: &FacetRequestSpec, settings: &Settings) -> Result<RequestBody> {
    let format = spec.format()?;

    for (i, fq) in spec.facet_queries.iter().enumerate() {
        if fq.query.trim().is_empty() {
            return Err(FacetCheckError::InvalidSpec(format!(
                "Facet query #{} (label '{}') has an empty query expression",
                i, fq.label
            )));
        }
    }
    if let Some(i) = spec.facet_fields.iter().position(|f| f.trim().is_empty()) {
        return Err(FacetCheckError::InvalidSpec(format!(
            "Facet field #{} has an empty name",
            i
        )));
    }

    let facet_fields = if spec.facet_fields.is_empty() {
        None
    } else {
        Some(FacetFieldsClause {
            facets: spec
                .facet_fields
                .iter()
                .map(|f| FacetFieldClause { field: f.clone() })
                .collect(),
        })
    };

    let language = spec
        .language
        .clone()
        .unwrap_or_else(|| settings.default_language.clone());

    tracing::debug!(
        "[REQUEST] facet_queries={} facet_fields={} format={:?}",
        spec.facet_queries.len(),
        spec.facet_fields.len(),
        format
    );

    Ok(RequestBody {
        query: QueryClause {
            query: spec.query_text.clone(),
            language,
        },
        facet_queries: spec.facet_queries.clone(),
        facet_fields,
        facet_format: format.wire_value().map(str::to_string),
        include_request: spec.include_request,
        paging: spec.paging.filter(|p| p.max_items.is_some() || p.skip_count.is_some()),
    })
}
