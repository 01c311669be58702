//! Fluent matchers over [`Inspect`] entities.
//!
//! ```
//! use facetcheck::assertion::assert_that;
//! use facetcheck::types::Bucket;
//!
//! # fn main() -> facetcheck::Result<()> {
//! let bucket = Bucket::new("small", "content.size:[0 TO 102400]").with_count(61);
//! assert_that(&bucket)
//!     .field("label")?
//!     .is("small")
//!     .and()
//!     .field("count")?
//!     .is_greater_than(0)
//!     .verify()?;
//! # Ok(())
//! # }
//! ```

use super::inspect::{suggest, Inspect};
use super::predicate::{Predicate, Verdict};
use crate::error::{FacetCheckError, Result};
use crate::settings::Settings;
use serde_json::Value;

struct Check {
    field: String,
    actual: Value,
    predicate: Predicate,
    negated: bool,
}

impl Check {
    fn verdict(&self) -> Verdict {
        self.predicate.evaluate(&self.field, &self.actual, self.negated)
    }
}

fn unknown_field<T: Inspect + ?Sized>(target: &T, name: &str) -> FacetCheckError {
    FacetCheckError::UnknownField {
        entity: target.entity().to_string(),
        field: name.to_string(),
        suggestion: suggest(name, &target.field_names()),
    }
}

/// Start an assertion chain over one entity.
pub fn assert_that<T: Inspect + ?Sized>(target: &T) -> Assertion<'_, T> {
    Assertion {
        target,
        settings: Settings::default(),
        checks: Vec::new(),
    }
}

/// Ordered list of pending checks against one entity.
///
/// Field names are resolved as soon as [`field`](Assertion::field) is
/// called; predicates run only in [`evaluate`](Assertion::evaluate) or
/// [`verify`](Assertion::verify).
pub struct Assertion<'a, T: Inspect + ?Sized> {
    target: &'a T,
    settings: Settings,
    checks: Vec<Check>,
}

impl<'a, T: Inspect + ?Sized> Assertion<'a, T> {
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.settings = settings.clone();
        self
    }

    pub fn and(self) -> Self {
        self
    }

    pub fn field(self, name: &str) -> Result<FieldAssertion<'a, T>> {
        match self.target.field_value(name) {
            Some(actual) => Ok(FieldAssertion {
                parent: self,
                field: name.to_string(),
                actual,
                negated: false,
            }),
            None => Err(unknown_field(self.target, name)),
        }
    }

    /// Number of comparators queued so far.
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    fn first_failure(&self) -> Option<(usize, &Check, Verdict)> {
        self.checks.iter().enumerate().find_map(|(i, check)| {
            let verdict = check.verdict();
            (!verdict.passed).then_some((i, check, verdict))
        })
    }

    pub fn evaluate(&self) -> Verdict {
        let total = self.checks.len();
        match self.first_failure() {
            Some((i, _, verdict)) => {
                Verdict::fail(format!("check {}/{}: {}", i + 1, total, verdict.description))
            }
            None => Verdict::pass(format!(
                "all {} checks passed on {}",
                total,
                self.target.entity()
            )),
        }
    }

    /// Run the checks in order and stop at the first failure.
    pub fn verify(&self) -> Result<()> {
        let Some((i, check, verdict)) = self.first_failure() else {
            return Ok(());
        };
        tracing::debug!(
            "[ASSERT] {} check {}/{} failed: {}",
            self.target.entity(),
            i + 1,
            self.checks.len(),
            verdict.description
        );
        Err(FacetCheckError::AssertionFailed {
            entity: self.target.entity().to_string(),
            description: verdict.description,
            expected: check.predicate.expected(check.negated),
            dump: self.settings.clip_dump(self.target.dump()),
        })
    }
}

/// A resolved field waiting for its comparator.
pub struct FieldAssertion<'a, T: Inspect + ?Sized> {
    parent: Assertion<'a, T>,
    field: String,
    actual: Value,
    negated: bool,
}

impl<'a, T: Inspect + ?Sized> FieldAssertion<'a, T> {
    /// Negate the next comparator.
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// The resolved value, `Value::Null` for a known field the response left out.
    pub fn actual(&self) -> &Value {
        &self.actual
    }

    fn push(self, predicate: Predicate) -> Assertion<'a, T> {
        let FieldAssertion {
            mut parent,
            field,
            actual,
            negated,
        } = self;
        parent.checks.push(Check {
            field,
            actual,
            predicate,
            negated,
        });
        parent
    }

    pub fn is(self, expected: impl Into<Value>) -> Assertion<'a, T> {
        self.push(Predicate::Is(expected.into()))
    }

    pub fn contains(self, needle: impl Into<String>) -> Assertion<'a, T> {
        self.push(Predicate::Contains(needle.into()))
    }

    pub fn is_greater_than(self, n: impl Into<f64>) -> Assertion<'a, T> {
        self.push(Predicate::GreaterThan(n.into()))
    }

    pub fn is_not_empty(self) -> Assertion<'a, T> {
        self.push(Predicate::NotEmpty)
    }

    pub fn is_empty(self) -> Assertion<'a, T> {
        self.push(Predicate::Empty)
    }
}

enum CollectionCheck {
    Contains { field: String, expected: Value },
    NotEmpty,
    Empty,
    HasSize(usize),
}

/// Start an assertion chain over a list of entities.
pub fn assert_that_all<T: Inspect>(items: &[T]) -> CollectionAssertion<'_, T> {
    CollectionAssertion {
        items,
        settings: Settings::default(),
        checks: Vec::new(),
    }
}

/// True when any item's `field` equals `expected`, regardless of order.
///
/// Fails with `UnknownField` when the list is non-empty and no item knows
/// the field at all.
pub fn entries_list_contains<T: Inspect>(
    items: &[T],
    field: &str,
    expected: impl Into<Value>,
) -> Result<bool> {
    check_known(items, field)?;
    Ok(list_contains(items, field, &expected.into()))
}

fn check_known<T: Inspect>(items: &[T], field: &str) -> Result<()> {
    match items.first() {
        Some(first) if items.iter().all(|item| item.field_value(field).is_none()) => {
            Err(unknown_field(first, field))
        }
        _ => Ok(()),
    }
}

fn list_contains<T: Inspect>(items: &[T], field: &str, expected: &Value) -> bool {
    let predicate = Predicate::Is(expected.clone());
    items.iter().any(|item| {
        item.field_value(field)
            .is_some_and(|actual| predicate.evaluate(field, &actual, false).passed)
    })
}

pub struct CollectionAssertion<'a, T: Inspect> {
    items: &'a [T],
    settings: Settings,
    checks: Vec<CollectionCheck>,
}

impl<'a, T: Inspect> CollectionAssertion<'a, T> {
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.settings = settings.clone();
        self
    }

    pub fn and(self) -> Self {
        self
    }

    pub fn entries_list_contains(mut self, field: &str, expected: impl Into<Value>) -> Result<Self> {
        check_known(self.items, field)?;
        self.checks.push(CollectionCheck::Contains {
            field: field.to_string(),
            expected: expected.into(),
        });
        Ok(self)
    }

    pub fn entries_list_is_not_empty(mut self) -> Self {
        self.checks.push(CollectionCheck::NotEmpty);
        self
    }

    pub fn entries_list_is_empty(mut self) -> Self {
        self.checks.push(CollectionCheck::Empty);
        self
    }

    pub fn has_size(mut self, size: usize) -> Self {
        self.checks.push(CollectionCheck::HasSize(size));
        self
    }

    fn entity(&self) -> String {
        let item = self.items.first().map(|i| i.entity()).unwrap_or("entry");
        format!("{} list", item)
    }

    fn run(&self, check: &CollectionCheck) -> (Verdict, String) {
        let len = self.items.len();
        match check {
            CollectionCheck::Contains { field, expected } => {
                let wanted = format!("some entry with '{}' = {}", field, expected);
                let verdict = if list_contains(self.items, field, expected) {
                    Verdict::pass(format!("list contains {}", wanted))
                } else {
                    Verdict::fail(format!("none of {} entries has '{}' = {}", len, field, expected))
                };
                (verdict, wanted)
            }
            CollectionCheck::NotEmpty => {
                let verdict = if len > 0 {
                    Verdict::pass(format!("list has {} entries", len))
                } else {
                    Verdict::fail("list expected to be non-empty but was empty")
                };
                (verdict, "a non-empty list".to_string())
            }
            CollectionCheck::Empty => {
                let verdict = if len == 0 {
                    Verdict::pass("list is empty")
                } else {
                    Verdict::fail(format!("list expected to be empty but has {} entries", len))
                };
                (verdict, "an empty list".to_string())
            }
            CollectionCheck::HasSize(size) => {
                let verdict = if len == *size {
                    Verdict::pass(format!("list has {} entries", len))
                } else {
                    Verdict::fail(format!("list expected to have {} entries but has {}", size, len))
                };
                (verdict, format!("{} entries", size))
            }
        }
    }

    fn first_failure(&self) -> Option<(usize, Verdict, String)> {
        self.checks.iter().enumerate().find_map(|(i, check)| {
            let (verdict, expected) = self.run(check);
            (!verdict.passed).then_some((i, verdict, expected))
        })
    }

    pub fn evaluate(&self) -> Verdict {
        let total = self.checks.len();
        match self.first_failure() {
            Some((i, verdict, _)) => {
                Verdict::fail(format!("check {}/{}: {}", i + 1, total, verdict.description))
            }
            None => Verdict::pass(format!("all {} checks passed on {}", total, self.entity())),
        }
    }

    pub fn verify(&self) -> Result<()> {
        let Some((i, verdict, expected)) = self.first_failure() else {
            return Ok(());
        };
        tracing::debug!(
            "[ASSERT] {} check {}/{} failed: {}",
            self.entity(),
            i + 1,
            self.checks.len(),
            verdict.description
        );
        let dumps: Vec<String> = self.items.iter().map(|item| item.dump()).collect();
        Err(FacetCheckError::AssertionFailed {
            entity: self.entity(),
            description: verdict.description,
            expected,
            dump: self.settings.clip_dump(format!("[\n{}\n]", dumps.join(",\n"))),
        })
    }
}
