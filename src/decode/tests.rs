//! Tests for the decode module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

#[test]
fn test_default_path_is_root() {
    assert_eq!(JsonDecoder::new().records_path(), "$");
}

#[test]
fn test_root_object_is_single_record() {
    let decoder = JsonDecoder::with_path("$");
    let records = decoder.decode(r#"{"id": "d1", "name": "Detail"}"#).unwrap();
    assert_eq!(records, vec![json!({"id": "d1", "name": "Detail"})]);
}

#[test]
fn test_root_array_yields_elements() {
    let decoder = JsonDecoder::new();
    let records = decoder.decode(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_evaluations_wildcard_path() {
    let decoder = JsonDecoder::with_path("$.evaluations[*]");
    let body = json!({
        "evaluations": [{"eid": "e1"}, {"eid": "e2"}],
        "total": 2
    });

    let records = decoder.extract(&body).unwrap();
    assert_eq!(records, vec![json!({"eid": "e1"}), json!({"eid": "e2"})]);
}

#[test_case("$.missing[*]" ; "missing wildcard")]
#[test_case("$.data.items" ; "missing nested")]
#[test_case("$.evaluations[5]" ; "index out of range")]
fn test_missing_path_yields_no_records(path: &str) {
    let decoder = JsonDecoder::with_path(path);
    let records = decoder.extract(&json!({"evaluations": []})).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_null_body_yields_no_records() {
    let decoder = JsonDecoder::with_path("$");
    assert!(decoder.decode("null").unwrap().is_empty());
}

#[test]
fn test_index_paths() {
    let body = json!({"data": {"items": [{"n": 1}, {"n": 2}, {"n": 3}]}});

    let first = JsonDecoder::with_path("$.data.items[0]").extract(&body).unwrap();
    assert_eq!(first, vec![json!({"n": 1})]);

    let last = JsonDecoder::with_path("data.items[-1]").extract(&body).unwrap();
    assert_eq!(last, vec![json!({"n": 3})]);
}

#[test]
fn test_complex_path_uses_jsonpath() {
    let decoder = JsonDecoder::with_path("$.users[*].userId");
    let body = json!({"users": [{"userId": 1}, {"userId": 2}]});

    let records = decoder.extract(&body).unwrap();
    assert_eq!(records, vec![json!(1), json!(2)]);
}

#[test]
fn test_invalid_json_is_decode_error() {
    let decoder = JsonDecoder::with_path("$.evaluations[*]");
    let err = decoder.decode("{not json").unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}
