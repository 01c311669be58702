//! Response normalization.
//!
//! The search service reports facets in one of three mutually exclusive
//! `context` keys:
//!
//! - `facetQueries`: legacy query facets, one bucket per entry
//! - `facetsFields`: classic field facets with bare `count` buckets
//! - `facets`: grouped query facets, or the v2 generic format
//!
//! [`normalize`] reads whichever is present into the single
//! [`Facet`](crate::types::Facet) model and fails with
//! [`AmbiguousFacetShape`](crate::FacetCheckError::AmbiguousFacetShape) when
//! more than one is populated.

mod bucket;
pub mod normalizer;
pub mod sniff;

pub use normalizer::Normalizer;
pub use sniff::Signature;

use crate::error::{FacetCheckError, Result};
use crate::types::{SearchResponse, SearchResponseContext};
use serde_json::Value;

pub const LIST_KEY: &str = "list";
pub const CONTEXT_KEY: &str = "context";
pub const FACET_QUERIES_KEY: &str = "facetQueries";
pub const FACETS_FIELDS_KEY: &str = "facetsFields";
pub const FACETS_KEY: &str = "facets";

/// Normalize the `context` of a parsed response with no request hints.
pub fn normalize(raw: &Value) -> Result<SearchResponseContext> {
    Normalizer::new().normalize(raw)
}

/// Like [`normalize`], starting from the response body text.
pub fn normalize_str(body: &str) -> Result<SearchResponseContext> {
    normalize(&parse_json(body)?)
}

/// Parse the full response envelope with no request hints.
pub fn parse_response(raw: &Value) -> Result<SearchResponse> {
    Normalizer::new().parse_response(raw)
}

pub fn parse_response_str(body: &str) -> Result<SearchResponse> {
    parse_response(&parse_json(body)?)
}

fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| FacetCheckError::MalformedJson(e.to_string()))
}
