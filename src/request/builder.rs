use super::{build_with_settings, FacetQuery, FacetRequestSpec, Paging, RequestBody};
use crate::error::Result;
use crate::settings::Settings;

/// Fluent front end for [`FacetRequestSpec`].
///
/// ```
/// use facetcheck::request::SearchRequestBuilder;
///
/// let body = SearchRequestBuilder::new("cars")
///     .facet_query("content.size:[0 TO 102400]", "small")
///     .facet_field("'content.size'")
///     .include_request(true)
///     .build()
///     .unwrap();
/// assert_eq!(body.facet_queries.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchRequestBuilder {
    spec: FacetRequestSpec,
    settings: Option<Settings>,
}

impl SearchRequestBuilder {
    pub fn new(query: impl Into<String>) -> Self {
        SearchRequestBuilder {
            spec: FacetRequestSpec {
                query_text: query.into(),
                ..Default::default()
            },
            settings: None,
        }
    }

    pub fn from_spec(spec: FacetRequestSpec) -> Self {
        SearchRequestBuilder {
            spec,
            settings: None,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.spec.query_text = query.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.spec.language = Some(language.into());
        self
    }

    pub fn facet_query(mut self, query: impl Into<String>, label: impl Into<String>) -> Self {
        self.spec.facet_queries.push(FacetQuery::new(query, label));
        self
    }

    pub fn grouped_facet_query(
        mut self,
        query: impl Into<String>,
        label: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        self.spec
            .facet_queries
            .push(FacetQuery::grouped(query, label, group));
        self
    }

    pub fn facet_field(mut self, field: impl Into<String>) -> Self {
        self.spec.facet_fields.push(field.into());
        self
    }

    /// Recorded as given; an unknown value surfaces as `InvalidSpec` from [`build`](Self::build).
    pub fn facet_format(mut self, format: impl Into<String>) -> Self {
        self.spec.facet_format = Some(format.into());
        self
    }

    pub fn include_request(mut self, include: bool) -> Self {
        self.spec.include_request = include;
        self
    }

    pub fn paging(mut self, max_items: u32, skip_count: u32) -> Self {
        self.spec.paging = Some(Paging {
            max_items: Some(max_items),
            skip_count: Some(skip_count),
        });
        self
    }

    pub fn spec(&self) -> &FacetRequestSpec {
        &self.spec
    }

    pub fn into_spec(self) -> FacetRequestSpec {
        self.spec
    }

    pub fn build(&self) -> Result<RequestBody> {
        match &self.settings {
            Some(settings) => build_with_settings(&self.spec, settings),
            None => build_with_settings(&self.spec, &Settings::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::FacetFormat;
    use serde_json::json;

    #[test]
    fn test_builder_matches_spec_build() {
        let builder = SearchRequestBuilder::new("cars")
            .facet_query("content.size:[0 TO 102400]", "small")
            .facet_query("content.size:[102400 TO 1048576]", "medium")
            .facet_field("'content.size'");
        let via_builder = builder.build().unwrap();
        let via_spec = crate::request::build(builder.spec()).unwrap();
        assert_eq!(via_builder, via_spec);
        assert_eq!(via_builder.facet_queries[1].label, "medium");
    }

    #[test]
    fn test_builder_uses_settings_language() {
        let settings = Settings {
            default_language: "lucene".to_string(),
            ..Default::default()
        };
        let body = SearchRequestBuilder::new("*")
            .settings(settings)
            .build()
            .unwrap();
        assert_eq!(body.query.language, "lucene");

        let body = SearchRequestBuilder::new("*").language("cmis").build().unwrap();
        assert_eq!(body.query.language, "cmis");
    }

    #[test]
    fn test_grouped_queries_and_v2() {
        let body = SearchRequestBuilder::new("cars")
            .grouped_facet_query("content.size:[0 TO 102400]", "small", "foo")
            .facet_format("V2")
            .paging(10, 5)
            .build()
            .unwrap();
        assert_eq!(body.format(), FacetFormat::V2);
        assert_eq!(
            body.to_json()["facetQueries"],
            json!([{"query": "content.size:[0 TO 102400]", "label": "small", "group": "foo"}])
        );
        assert_eq!(body.to_json()["paging"], json!({"maxItems": 10, "skipCount": 5}));
    }

    #[test]
    fn test_bad_format_fails_at_build() {
        let builder = SearchRequestBuilder::new("*").facet_format("v9");
        assert_eq!(builder.build().unwrap_err().code(), "invalid_spec");
    }
}
