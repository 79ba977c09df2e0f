//! Tests for accessor module

use super::*;
use crate::error::{Error, Result};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::json;
use std::cmp::Ordering;
use test_case::test_case;

// ============================================================================
// Scalar Tests
// ============================================================================

#[test]
fn test_scalar_from_json() {
    assert_eq!(Scalar::from_json(&json!(null)), Scalar::Null);
    assert_eq!(Scalar::from_json(&json!(true)), Scalar::Bool(true));
    assert_eq!(Scalar::from_json(&json!(42)), Scalar::Int(42));
    assert_eq!(Scalar::from_json(&json!(1.5)), Scalar::Float(1.5));
    assert_eq!(
        Scalar::from_json(&json!("abc")),
        Scalar::Text("abc".to_string())
    );
    assert_eq!(
        Scalar::from_json(&json!([1, 2])),
        Scalar::Text("[1,2]".to_string())
    );
}

#[test]
fn test_scalar_string_form() {
    assert_eq!(Scalar::Null.to_string(), "");
    assert_eq!(Scalar::Int(-7).to_string(), "-7");
    assert_eq!(Scalar::Float(2.5).to_string(), "2.5");
    assert_eq!(Scalar::Bool(false).to_string(), "false");

    let dt = Utc.with_ymd_and_hms(1991, 11, 24, 2, 0, 0).unwrap();
    assert_eq!(Scalar::DateTime(dt).to_string(), "690948000");
}

#[test_case(Scalar::Int(9), Scalar::Int(10), Ordering::Less ; "ints numerically")]
#[test_case(Scalar::from("9"), Scalar::from("10"), Ordering::Less ; "numeric text numerically")]
#[test_case(Scalar::from("10"), Scalar::Int(10), Ordering::Equal ; "numeric text equals int")]
#[test_case(Scalar::from("1.5"), Scalar::Float(1.5), Ordering::Equal ; "float text equals float")]
#[test_case(Scalar::from("b"), Scalar::from("a"), Ordering::Greater ; "text lexically")]
#[test_case(Scalar::from("191a54d8"), Scalar::from("84810e2e"), Ordering::Less ; "uuid prefixes lexically")]
#[test_case(Scalar::Null, Scalar::from("a"), Ordering::Less ; "null sorts first")]
fn test_scalar_compare(a: Scalar, b: Scalar, expected: Ordering) {
    assert_eq!(a.compare(&b), expected);
    assert_eq!(b.compare(&a), expected.reverse());
}

#[test]
fn test_scalar_normalized() {
    let dt = Utc.with_ymd_and_hms(1970, 1, 1, 0, 1, 0).unwrap();
    assert_eq!(Scalar::DateTime(dt).normalized(), Scalar::Int(60));
    assert_eq!(Scalar::from("x").normalized(), Scalar::from("x"));
}

#[test]
fn test_scalar_serialize() {
    let dt = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 5).unwrap();
    assert_eq!(serde_json::to_value(Scalar::DateTime(dt)).unwrap(), json!(5));
    assert_eq!(serde_json::to_value(Scalar::Null).unwrap(), json!(null));
    assert_eq!(serde_json::to_value(Scalar::from("id")).unwrap(), json!("id"));
}

// ============================================================================
// JSON Accessor Tests
// ============================================================================

#[test]
fn test_lookup_path_nested() {
    let record = json!({
        "id": 1,
        "author": {"name": "Ada", "tags": ["x", "y"]}
    });

    assert_eq!(lookup_path(&record, "author.name"), Some(&json!("Ada")));
    assert_eq!(lookup_path(&record, "$.author.tags.1"), Some(&json!("y")));
    assert_eq!(lookup_path(&record, "author.missing"), None);
    assert_eq!(lookup_path(&record, "id.deeper"), None);
}

#[test]
fn test_json_accessor() {
    let record = json!({"id": "abc", "meta": {"rank": 3}});

    assert_eq!(
        JsonAccessor.get_value(&record, "id").unwrap(),
        Scalar::from("abc")
    );
    assert_eq!(
        JsonAccessor.get_value(&record, "meta.rank").unwrap(),
        Scalar::Int(3)
    );
    assert_eq!(
        JsonAccessor.get_value(&record, "nope").unwrap(),
        Scalar::Null
    );
}

#[derive(Serialize)]
struct Post {
    id: String,
    published: chrono::DateTime<Utc>,
}

#[test]
fn test_serialize_accessor_with_datetime() {
    let post = Post {
        id: "p1".to_string(),
        published: Utc.with_ymd_and_hms(1991, 11, 24, 2, 0, 0).unwrap(),
    };

    let raw = SerializeAccessor.get_value(&post, "published").unwrap();
    assert_eq!(raw, Scalar::from("1991-11-24T02:00:00Z"));

    let accessor = DateTimeAccessor::new(SerializeAccessor);
    assert_eq!(
        accessor.get_value(&post, "published").unwrap(),
        Scalar::Int(690_948_000)
    );
    assert_eq!(accessor.get_value(&post, "id").unwrap(), Scalar::from("p1"));
}

#[test]
fn test_closure_accessor() {
    let accessor = |record: &(i64, String), path: &str| -> Result<Scalar> {
        match path {
            "rank" => Ok(Scalar::Int(record.0)),
            "name" => Ok(Scalar::from(record.1.clone())),
            other => Err(Error::field_access(other, "unknown field")),
        }
    };

    let record = (4_i64, "d".to_string());
    assert_eq!(accessor.get_value(&record, "rank").unwrap(), Scalar::Int(4));
    assert_eq!(accessor.get_value(&record, "name").unwrap(), Scalar::from("d"));
    assert!(matches!(
        accessor.get_value(&record, "size"),
        Err(Error::FieldAccess { .. })
    ));
}

// ============================================================================
// DateTime Normalization Tests
// ============================================================================

#[test_case("1991-11-24T02:00:00Z", Some(690_948_000) ; "rfc3339 utc")]
#[test_case("1991-11-24T03:00:00+01:00", Some(690_948_000) ; "rfc3339 offset")]
#[test_case("1991-11-24 02:00:00", Some(690_948_000) ; "sql naive")]
#[test_case("1991-11-24 02:00:00.250", Some(690_948_000) ; "sql naive fractional")]
#[test_case("1991-11-24 02:00:00+00", Some(690_948_000) ; "sql with short offset")]
#[test_case("1991-11-24", Some(690_940_800) ; "date only")]
#[test_case("b4902bde-28d2-4ff9-8971-8bfeb3e943c1", None ; "uuid")]
#[test_case("hello", None ; "plain text")]
#[test_case("2024-13-45", None ; "invalid date")]
fn test_parse_datetime(raw: &str, expected: Option<i64>) {
    assert_eq!(parse_datetime(raw), expected);
}

#[test]
fn test_normalize_temporal() {
    let dt = Utc.with_ymd_and_hms(1991, 11, 24, 0, 0, 0).unwrap();
    assert_eq!(normalize_temporal(Scalar::DateTime(dt)), Scalar::Int(690_940_800));
    assert_eq!(
        normalize_temporal(Scalar::from("1991-11-24T00:00:00Z")),
        Scalar::Int(690_940_800)
    );
    assert_eq!(normalize_temporal(Scalar::Int(5)), Scalar::Int(5));
    assert_eq!(normalize_temporal(Scalar::from("id-1")), Scalar::from("id-1"));
}

#[test]
fn test_datetime_accessor_over_json() {
    let accessor = DateTimeAccessor::new(JsonAccessor);
    let record = json!({"ts": "1991-11-24 01:00:00", "id": "x"});

    assert_eq!(
        accessor.get_value(&record, "ts").unwrap(),
        Scalar::Int(690_944_400)
    );
    assert_eq!(accessor.get_value(&record, "id").unwrap(), Scalar::from("x"));
}
