//! Grouped vs generic classification of `context.facets` entries.
//!
//! Both shapes share one wire layout, so the variant is decided by an
//! ordered decision table; the first matching row wins:
//!
//! | #  | signal                                                              | variant |
//! |----|---------------------------------------------------------------------|---------|
//! | 1  | entry `type` is `"query"`                                           | Grouped |
//! | 2  | entry `type` is any other string                                    | Generic |
//! | 3  | label is a requested facet field                                    | Generic |
//! | 4  | label is a requested query group, or all bucket labels are requested query labels | Grouped |
//! | 5  | every bucket `filterQuery` filters on the field named by the label  | Generic |
//! | 6  | every bucket `filterQuery` parses and filters on a field other than the label | Grouped |
//! | 7  | every bucket carries a bare `count` and no `metrics`                | Grouped |
//! | 8  | request format known: V2                                            | Generic |
//! | 9  | request format known: legacy (legacy only reports groups here)      | Grouped |
//! | 10 | nothing matched                                                     | Generic, flagged |

use crate::query::{parse_filter_query, FilterQuery};
use crate::request::FacetFormat;
use crate::types::{Bucket, FacetVariant};

/// The decision-table row that classified an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    ExplicitQueryType,
    ExplicitFieldType,
    RequestedField,
    RequestedQueryGroup,
    FieldScopedFilters,
    ForeignFieldFilters,
    LegacyBareCounts,
    RequestedV2Format,
    RequestedLegacyFormat,
    Unrecognized,
}

/// What the normalizer knows about the request that produced the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct SniffHints<'a> {
    pub format: Option<FacetFormat>,
    pub requested_fields: &'a [String],
    pub query_labels: &'a [String],
    pub query_groups: &'a [String],
}

/// Structural facts about one raw `facets` entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryShape<'a> {
    pub facet_type: Option<&'a str>,
    pub label: &'a str,
    pub buckets: &'a [Bucket],
    /// Every raw bucket had a bare `count` and no `metrics` array.
    pub bare_counts: bool,
}

fn same_field(a: &str, b: &str) -> bool {
    a.trim_matches('\'') == b.trim_matches('\'')
}

fn parsed_filters(buckets: &[Bucket]) -> Option<Vec<FilterQuery>> {
    if buckets.is_empty() {
        return None;
    }
    buckets
        .iter()
        .map(|b| parse_filter_query(&b.filter_query).ok())
        .collect()
}

pub fn classify(entry: &EntryShape<'_>, hints: &SniffHints<'_>) -> (FacetVariant, Signature) {
    let (label, buckets) = (entry.label, entry.buckets);
    match entry.facet_type {
        Some("query") => return (FacetVariant::GroupedFacet, Signature::ExplicitQueryType),
        Some(_) => return (FacetVariant::GenericFacet, Signature::ExplicitFieldType),
        None => {}
    }

    if hints.requested_fields.iter().any(|f| same_field(f, label)) {
        return (FacetVariant::GenericFacet, Signature::RequestedField);
    }

    let labels_are_queries = !buckets.is_empty()
        && !hints.query_labels.is_empty()
        && buckets
            .iter()
            .all(|b| hints.query_labels.iter().any(|q| q == &b.label));
    if labels_are_queries || hints.query_groups.iter().any(|g| g == label) {
        return (FacetVariant::GroupedFacet, Signature::RequestedQueryGroup);
    }

    if let Some(filters) = parsed_filters(buckets) {
        if filters.iter().all(|fq| fq.targets_field(label)) {
            return (FacetVariant::GenericFacet, Signature::FieldScopedFilters);
        }
        if filters.iter().all(|fq| !fq.targets_field(label)) {
            return (FacetVariant::GroupedFacet, Signature::ForeignFieldFilters);
        }
    }

    if entry.bare_counts && !buckets.is_empty() {
        return (FacetVariant::GroupedFacet, Signature::LegacyBareCounts);
    }

    match hints.format {
        Some(FacetFormat::V2) => (FacetVariant::GenericFacet, Signature::RequestedV2Format),
        Some(FacetFormat::Legacy) => (FacetVariant::GroupedFacet, Signature::RequestedLegacyFormat),
        None => (FacetVariant::GenericFacet, Signature::Unrecognized),
    }
}
