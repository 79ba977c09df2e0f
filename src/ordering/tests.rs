//! Tests for ordering module

use super::*;
use pretty_assertions::assert_eq;
use std::cmp::Ordering;
use test_case::test_case;

// ============================================================================
// Direction Tests
// ============================================================================

#[test_case("asc", Direction::Asc ; "lowercase asc")]
#[test_case("ASC", Direction::Asc ; "uppercase asc")]
#[test_case("Desc", Direction::Desc ; "mixed case desc")]
#[test_case("descending", Direction::Desc ; "substring desc")]
#[test_case("ascending", Direction::Asc ; "substring asc")]
fn test_direction_parse(raw: &str, expected: Direction) {
    assert_eq!(Direction::parse(raw).unwrap(), expected);
}

#[test_case("up")]
#[test_case("")]
#[test_case("random")]
fn test_direction_parse_rejects(raw: &str) {
    let err = Direction::parse(raw).unwrap_err();
    assert!(matches!(err, crate::Error::InvalidArgument { .. }));
    assert!(err.to_string().contains("Invalid ordering direction"));
}

#[test]
fn test_direction_apply() {
    assert_eq!(Direction::Asc.apply(Ordering::Less), Ordering::Less);
    assert_eq!(Direction::Desc.apply(Ordering::Less), Ordering::Greater);
    assert_eq!(Direction::Desc.apply(Ordering::Equal), Ordering::Equal);
}

#[test]
fn test_direction_keywords() {
    assert_eq!(Direction::Asc.as_sql(), "ASC");
    assert_eq!(Direction::Desc.as_sql(), "DESC");
    assert_eq!(Direction::Desc.to_string(), "desc");
}

// ============================================================================
// OrderingSpec Construction Tests
// ============================================================================

#[test]
fn test_bare_field_is_ascending() {
    let spec = OrderingSpec::field("id");
    assert_eq!(spec.len(), 1);
    assert_eq!(spec.primary(), Some(&OrderBy::asc("id")));
    assert!(spec.tie_break().is_none());
    assert!(!spec.supports_tokens());
}

#[test]
fn test_from_pairs_preserves_order() {
    let spec = OrderingSpec::from_pairs([("timestamp", "DESC"), ("id", "asc")]).unwrap();
    assert_eq!(
        spec.iter().cloned().collect::<Vec<_>>(),
        vec![OrderBy::desc("timestamp"), OrderBy::asc("id")]
    );
    assert!(spec.supports_tokens());
}

#[test]
fn test_from_pairs_rejects_bad_direction() {
    let result = OrderingSpec::from_pairs([("timestamp", "sideways")]);
    assert!(matches!(result, Err(crate::Error::InvalidArgument { .. })));
}

#[test]
fn test_token_fields_requires_two_entries() {
    let err = OrderingSpec::field("id").token_fields().unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));

    let err = OrderingSpec::empty().token_fields().unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));

    let spec = OrderingSpec::from_fields(["timestamp", "id"]);
    let (primary, tie_break) = spec.token_fields().unwrap();
    assert_eq!(primary.field, "timestamp");
    assert_eq!(tie_break.field, "id");
}

#[test]
fn test_from_str() {
    let spec: OrderingSpec = "timestamp:desc, id".parse().unwrap();
    assert_eq!(
        spec,
        OrderingSpec::new(vec![OrderBy::desc("timestamp"), OrderBy::asc("id")])
    );
    assert_eq!(spec.to_string(), "timestamp:desc,id:asc");

    assert!(":asc".parse::<OrderBy>().is_err());
    assert!("id:up".parse::<OrderBy>().is_err());
}

// ============================================================================
// Serde Tests
// ============================================================================

#[test]
fn test_deserialize_bare_string() {
    let spec: OrderingSpec = serde_yaml::from_str("id").unwrap();
    assert_eq!(spec, OrderingSpec::field("id"));
}

#[test]
fn test_deserialize_map_keeps_entry_order() {
    let spec: OrderingSpec = serde_yaml::from_str("timestamp: DESC\nid: asc\n").unwrap();
    assert_eq!(
        spec,
        OrderingSpec::new(vec![OrderBy::desc("timestamp"), OrderBy::asc("id")])
    );

    let spec: OrderingSpec = serde_json::from_str(r#"{"zeta": "asc", "alpha": "desc"}"#).unwrap();
    assert_eq!(spec.primary().unwrap().field, "zeta");
    assert_eq!(spec.tie_break().unwrap().field, "alpha");
}

#[test]
fn test_deserialize_mixed_list() {
    let yaml = r"
- [created_at, desc]
- id
- author.name: asc
";
    let spec: OrderingSpec = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        spec,
        OrderingSpec::new(vec![
            OrderBy::desc("created_at"),
            OrderBy::asc("id"),
            OrderBy::asc("author.name"),
        ])
    );
}

#[test]
fn test_deserialize_rejects_bad_direction() {
    let result: std::result::Result<OrderingSpec, _> = serde_yaml::from_str("id: sideways");
    assert!(result.is_err());

    let result: std::result::Result<OrderingSpec, _> =
        serde_yaml::from_str("- {a: asc, b: desc}");
    assert!(result.is_err());
}

#[test]
fn test_serialize_as_pairs() {
    let spec = OrderingSpec::new(vec![OrderBy::desc("timestamp"), OrderBy::asc("id")]);
    let json = serde_json::to_value(&spec).unwrap();
    assert_eq!(json, serde_json::json!([["timestamp", "desc"], ["id", "asc"]]));

    let back: OrderingSpec = serde_json::from_value(json).unwrap();
    assert_eq!(back, spec);
}
