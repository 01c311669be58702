use super::inspect::Inspect;
use crate::error::{FacetCheckError, Result};
use crate::settings::Settings;
use crate::types::{Bucket, Facet};
use indexmap::IndexMap;

/// Anything dispatched on its label.
pub trait Labeled: Inspect {
    fn label(&self) -> &str;
}

impl Labeled for Bucket {
    fn label(&self) -> &str {
        &self.label
    }
}

impl Labeled for Facet {
    fn label(&self) -> &str {
        &self.label
    }
}

type Handler<'a, T> = Box<dyn FnMut(&T) -> Result<()> + 'a>;

/// Exhaustive per-label dispatch.
///
/// Every item must carry a label with a registered handler; anything else
/// fails with `UnexpectedBucketLabel` instead of being skipped.
///
/// ```
/// use facetcheck::assertion::{assert_that, LabelDispatch};
/// use facetcheck::types::Bucket;
///
/// let buckets = vec![
///     Bucket::new("small", "content.size:[0 TO 102400]").with_count(61),
///     Bucket::new("huge", "content.size:[16777216 TO 134217728]").with_count(0),
/// ];
/// let err = LabelDispatch::new()
///     .on("small", |b: &Bucket| assert_that(b).field("count")?.is(61).verify())
///     .run(&buckets)
///     .unwrap_err();
/// assert_eq!(err.code(), "unexpected_bucket_label");
/// ```
pub struct LabelDispatch<'a, T> {
    handlers: IndexMap<String, Handler<'a, T>>,
    settings: Settings,
}

impl<T> Default for LabelDispatch<'_, T> {
    fn default() -> Self {
        LabelDispatch {
            handlers: IndexMap::new(),
            settings: Settings::default(),
        }
    }
}

impl<'a, T: Labeled> LabelDispatch<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: &Settings) -> Self {
        self.settings = settings.clone();
        self
    }

    /// Register the handler for `label`; a later registration replaces an earlier one.
    pub fn on<F>(mut self, label: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&T) -> Result<()> + 'a,
    {
        self.handlers.insert(label.into(), Box::new(handler));
        self
    }

    pub fn expected_labels(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Dispatch every item in order. Returns how many items were handled.
    pub fn run(&mut self, items: &[T]) -> Result<usize> {
        let expected = self.expected_labels();
        for item in items {
            match self.handlers.get_mut(item.label()) {
                Some(handler) => handler(item)?,
                None => {
                    tracing::debug!(
                        "[DISPATCH] unexpected label '{}' (expected {:?})",
                        item.label(),
                        expected
                    );
                    return Err(FacetCheckError::UnexpectedBucketLabel {
                        label: item.label().to_string(),
                        expected,
                        dump: self.settings.clip_dump(item.dump()),
                    });
                }
            }
        }
        Ok(items.len())
    }
}
