mod common;

use common::*;
use facetcheck::{
    assert_that, assert_that_all, entries_list_contains, normalize, parse_response,
    FacetCheckError, Settings,
};
use serde_json::json;

#[test]
fn test_bucket_chain_on_normalized_response() {
    init_tracing();
    let ctx = normalize(&legacy_query_facets()).unwrap();
    let small = &ctx.facet("small").unwrap().buckets[0];

    assert_that(small)
        .field("label")
        .unwrap()
        .is("small")
        .and()
        .field("filterQuery")
        .unwrap()
        .is(SMALL)
        .and()
        .field("count")
        .unwrap()
        .is_greater_than(0)
        .and()
        .field("display")
        .unwrap()
        .is_empty()
        .verify()
        .unwrap();
}

#[test]
fn test_context_chain() {
    let ctx = normalize(&grouped_facets()).unwrap();
    assert_that(&ctx)
        .field("facetQueries")
        .unwrap()
        .is_empty()
        .and()
        .field("facets")
        .unwrap()
        .is_not_empty()
        .and()
        .field("consistency")
        .unwrap()
        .is_empty()
        .verify()
        .unwrap();
}

#[test]
fn test_failure_reports_entity_dump() {
    let ctx = normalize(&field_facets()).unwrap();
    let creator = ctx.facet("creator").unwrap();
    let err = assert_that(&creator.buckets[1])
        .field("count")
        .unwrap()
        .is(5)
        .verify()
        .unwrap_err();

    assert!(err.is_contract_violation());
    let msg = err.to_string();
    assert!(msg.starts_with("Assertion failed on bucket: field 'count'"));
    assert!(msg.contains("expected: is 5"));
    assert!(msg.contains("\"filterQuery\": \"creator:\\\"user-2\\\"\""));
}

#[test]
fn test_typo_is_an_error_not_a_pass() {
    let ctx = normalize(&legacy_query_facets()).unwrap();
    let small = &ctx.facet("small").unwrap().buckets[0];
    let err = assert_that(small).field("lable").err().unwrap();
    match &err {
        FacetCheckError::UnknownField {
            field, suggestion, ..
        } => {
            assert_eq!(field, "lable");
            assert_eq!(suggestion.as_deref(), Some("label"));
        }
        other => panic!("Expected UnknownField, got {:?}", other),
    }
    assert!(!err.is_contract_violation());
}

#[test]
fn test_tag_entries_contain_in_any_order() {
    let resp = parse_response(&json!({
        "list": {
            "entries": [
                {"entry": {"tag": "tag-b", "id": "2"}},
                {"entry": {"tag": "tag-a", "id": "1"}}
            ],
            "pagination": {"count": 2, "hasMoreItems": false, "skipCount": 0, "maxItems": 100}
        }
    }))
    .unwrap();

    assert!(entries_list_contains(&resp.entries, "tag", "tag-a").unwrap());
    assert_that_all(&resp.entries)
        .entries_list_contains("tag", "tag-a")
        .unwrap()
        .and()
        .entries_list_contains("tag", "tag-b")
        .unwrap()
        .and()
        .has_size(2)
        .verify()
        .unwrap();

    let verdict = assert_that_all(&resp.entries)
        .entries_list_contains("tag", "tag-c")
        .unwrap()
        .evaluate();
    assert!(!verdict.passed);
    assert_eq!(
        verdict.description,
        "check 1/1: none of 2 entries has 'tag' = \"tag-c\""
    );
}

#[test]
fn test_buckets_as_collection() {
    let ctx = normalize(&generic_v2_facets()).unwrap();
    let addressees = ctx.facet("cm:addressees").unwrap();
    assert_that_all(&addressees.buckets)
        .entries_list_contains("label", "{en}second")
        .unwrap()
        .and()
        .entries_list_contains("filterQuery", "cm:addressees:\"{en}first\"")
        .unwrap()
        .and()
        .entries_list_is_not_empty()
        .verify()
        .unwrap();
}

#[test]
fn test_dump_limit_from_settings_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("facetcheck.json");
    std::fs::write(&path, r#"{"maxDumpChars": 32}"#).unwrap();
    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.default_language, "afts");

    let ctx = normalize(&grouped_facets()).unwrap();
    let foo = ctx.facet("foo").unwrap();
    let err = assert_that(foo)
        .settings(&settings)
        .field("buckets")
        .unwrap()
        .is_empty()
        .verify()
        .unwrap_err();
    match err {
        FacetCheckError::AssertionFailed { dump, .. } => {
            assert!(dump.ends_with("\n... (truncated)"));
            assert_eq!(dump.chars().count(), 32 + "\n... (truncated)".chars().count());
        }
        other => panic!("Expected AssertionFailed, got {:?}", other),
    }
}
