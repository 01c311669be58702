//! Field-level assertions over normalized responses.
//!
//! Field names resolve through a fixed table per entity kind ([`Inspect`]),
//! so a misspelled name fails with `UnknownField` rather than passing
//! silently. Failures carry the entity's full JSON dump.

pub mod chain;
pub mod dispatch;
pub mod inspect;
pub mod predicate;

pub use chain::{
    assert_that, assert_that_all, entries_list_contains, Assertion, CollectionAssertion,
    FieldAssertion,
};
pub use dispatch::{LabelDispatch, Labeled};
pub use inspect::Inspect;
pub use predicate::{Predicate, Verdict};
