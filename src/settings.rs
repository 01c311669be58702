use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_language() -> String {
    "afts".to_string()
}

fn default_known_metric_types() -> Vec<String> {
    vec!["count".to_string()]
}

fn default_max_dump_chars() -> usize {
    4000
}

/// Defaults shared by the request builder, the normalizer and the
/// assertion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Query language sent when a request does not name one.
    #[serde(rename = "defaultLanguage")]
    pub default_language: String,

    /// Metric discriminators the normalizer accepts without a warning.
    #[serde(rename = "knownMetricTypes")]
    pub known_metric_types: Vec<String>,

    /// Entity dumps attached to assertion failures are cut at this many characters.
    #[serde(rename = "maxDumpChars")]
    pub max_dump_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_language: default_language(),
            known_metric_types: default_known_metric_types(),
            max_dump_chars: default_max_dump_chars(),
        }
    }
}

impl Settings {
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_known_metric_type(&self, kind: &str) -> bool {
        self.known_metric_types.iter().any(|k| k == kind)
    }

    /// Truncate an entity dump to `max_dump_chars`, on a char boundary.
    pub fn clip_dump(&self, dump: String) -> String {
        if dump.chars().count() <= self.max_dump_chars {
            return dump;
        }
        let mut clipped: String = dump.chars().take(self.max_dump_chars).collect();
        clipped.push_str("\n... (truncated)");
        clipped
    }
}
