//! # facetcheck
//!
//! Faceted-search response model and test helpers for a content
//! repository's `search` endpoint.
//!
//! The server reports facets in four shapes (legacy query facets, field
//! facets, grouped query facets and the v2 generic format) spread over three
//! `context` keys. This crate builds the outbound request, normalizes
//! whichever shape comes back into one [`Facet`] / [`Bucket`] / [`Metric`]
//! model, and offers field-level assertions with self-explaining failures.
//!
//! ## Quick start
//!
//! ```rust
//! use facetcheck::{assert_that, Normalizer, SearchRequestBuilder};
//! use serde_json::json;
//!
//! # fn main() -> facetcheck::Result<()> {
//! let body = SearchRequestBuilder::new("cars")
//!     .facet_query("content.size:[0 TO 102400]", "small")
//!     .build()?;
//!
//! // POST `body.to_json()` to the search endpoint, then:
//! let raw = json!({
//!     "context": {
//!         "facetQueries": [
//!             {"label": "small", "filterQuery": "content.size:[0 TO 102400]", "count": 61}
//!         ]
//!     }
//! });
//! let ctx = Normalizer::for_request(&body).normalize(&raw)?;
//! let small = &ctx.facet("small").unwrap().buckets[0];
//! assert_that(small)
//!     .field("count")?
//!     .is(61)
//!     .and()
//!     .field("filterQuery")?
//!     .contains("content.size")
//!     .verify()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Exhaustive bucket checks
//!
//! [`LabelDispatch`] requires a handler for every bucket label present, so a
//! bucket the test did not anticipate is a failure rather than a skip.
//!
//! ## Configuration
//!
//! [`Settings`] carries the default query language, the metric types the
//! normalizer accepts silently and the size limit for failure dumps. It can
//! be loaded from a JSON file with [`Settings::load`].

pub mod assertion;
pub mod error;
pub mod query;
pub mod request;
pub mod response;
pub mod settings;
pub mod types;

pub use assertion::{assert_that, assert_that_all, entries_list_contains, LabelDispatch, Verdict};
pub use error::{FacetCheckError, Result};
pub use request::{build, FacetFormat, FacetQuery, FacetRequestSpec, RequestBody, SearchRequestBuilder};
pub use response::{normalize, normalize_str, parse_response, parse_response_str, Normalizer};
pub use settings::Settings;
pub use types::*;
