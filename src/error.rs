use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum FacetCheckError {
    #[error("Invalid request spec: {0}")]
    InvalidSpec(String),

    #[error("Malformed response JSON: {0}")]
    MalformedJson(String),

    #[error("Ambiguous facet shape: context populates {}", .keys.join(", "))]
    AmbiguousFacetShape { keys: Vec<String> },

    #[error("Unexpected bucket label '{label}' (expected one of: {})\n{dump}", .expected.join(", "))]
    UnexpectedBucketLabel {
        label: String,
        expected: Vec<String>,
        dump: String,
    },

    #[error("Unknown field '{field}' on {entity}{}", .suggestion.as_ref().map(|s| format!(" (did you mean '{}'?)", s)).unwrap_or_default())]
    UnknownField {
        entity: String,
        field: String,
        suggestion: Option<String>,
    },

    #[error("Assertion failed on {entity}: {description}\nexpected: {expected}\n{dump}")]
    AssertionFailed {
        entity: String,
        description: String,
        expected: String,
        dump: String,
    },

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

pub type Result<T> = std::result::Result<T, FacetCheckError>;

impl From<std::io::Error> for FacetCheckError {
    fn from(e: std::io::Error) -> Self {
        FacetCheckError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FacetCheckError {
    fn from(e: serde_json::Error) -> Self {
        FacetCheckError::Json(e.to_string())
    }
}

impl FacetCheckError {
    /// Stable snake_case code for the error kind, handy for matching in
    /// test reports without depending on message text.
    pub fn code(&self) -> &'static str {
        match self {
            FacetCheckError::InvalidSpec(_) => "invalid_spec",
            FacetCheckError::MalformedJson(_) => "malformed_json",
            FacetCheckError::AmbiguousFacetShape { .. } => "ambiguous_facet_shape",
            FacetCheckError::UnexpectedBucketLabel { .. } => "unexpected_bucket_label",
            FacetCheckError::UnknownField { .. } => "unknown_field",
            FacetCheckError::AssertionFailed { .. } => "assertion_failed",
            FacetCheckError::Io(_) => "io_error",
            FacetCheckError::Json(_) => "json_error",
        }
    }

    /// Contract violations between what the test expects and what the server
    /// returned, as opposed to caller bugs.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            FacetCheckError::AmbiguousFacetShape { .. }
                | FacetCheckError::UnexpectedBucketLabel { .. }
                | FacetCheckError::AssertionFailed { .. }
        )
    }
}
