//! Integration tests for single-path document patching (`couch_export::document::patch`).
//!
//! No server needed: pure function tests on JSON documents.

mod common;

use common::fixtures::doc;
use couch_export::document::{Document, PatchError, PatchPolicy, PatchSpec, PatchValue, resolve};
use serde_json::{Value, json};

fn apply(target: Value, patch: Value) -> Value {
    let mut target = doc(target);
    let spec = PatchSpec::from_value(&patch).expect("valid patch");
    resolve(&mut target, &spec).expect("patch applies");
    Value::Object(target)
}

// =============================================================================
// resolve: terminal and nested segments
// =============================================================================

#[test]
fn test_terminal_creates_key() {
    assert_eq!(apply(json!({}), json!({ "a": "x" })), json!({ "a": "x" }));
}

#[test]
fn test_descend_and_overwrite_terminal() {
    assert_eq!(
        apply(json!({ "a": { "b": "old" } }), json!({ "a": { "b": "new" } })),
        json!({ "a": { "b": "new" } })
    );
}

#[test]
fn test_new_key_under_existing_object() {
    assert_eq!(
        apply(json!({ "a": {} }), json!({ "a": { "c": "new" } })),
        json!({ "a": { "c": "new" } })
    );
}

#[test]
fn test_missing_top_level_key_created_verbatim() {
    assert_eq!(apply(json!({}), json!({ "a": { "b": "new" } })), json!({ "a": { "b": "new" } }));
}

#[test]
fn test_missing_intermediate_key_created_verbatim() {
    // "a" exists, "b" does not: the rest of the patch becomes the new value of "b".
    assert_eq!(
        apply(json!({ "a": { "keep": 1 } }), json!({ "a": { "b": { "c": "deep" } } })),
        json!({ "a": { "keep": 1, "b": { "c": "deep" } } })
    );
}

#[test]
fn test_siblings_are_untouched() {
    let patched = apply(
        json!({ "_id": "x", "profile": { "name": "Ana", "city": "GDL" }, "score": 7 }),
        json!({ "profile": { "city": "CDMX" } }),
    );
    assert_eq!(
        patched,
        json!({ "_id": "x", "profile": { "name": "Ana", "city": "CDMX" }, "score": 7 })
    );
}

#[test]
fn test_terminal_replaces_whole_object() {
    assert_eq!(
        apply(json!({ "a": { "b": "old" } }), json!({ "a": "flat" })),
        json!({ "a": "flat" })
    );
}

#[test]
fn test_resolve_returns_same_document_for_chaining() {
    let mut target = Document::new();
    let first = PatchSpec::terminal("a", "1");
    let second = PatchSpec::nested("b", PatchSpec::terminal("c", "2"));

    resolve(resolve(&mut target, &first).unwrap(), &second).unwrap();

    assert_eq!(Value::Object(target), json!({ "a": "1", "b": { "c": "2" } }));
}

#[test]
fn test_cannot_descend_into_scalar() {
    let mut target = doc(json!({ "a": "scalar" }));
    let spec = PatchSpec::from_value(&json!({ "a": { "b": "x" } })).unwrap();

    let err = resolve(&mut target, &spec).unwrap_err();
    assert_eq!(err, PatchError::PatchTargetNotObject { key: "a".to_string(), kind: "a string" });
    // Document left as it was.
    assert_eq!(target.get("a"), Some(&json!("scalar")));
}

// =============================================================================
// PatchSpec parsing
// =============================================================================

#[test]
fn test_parse_nested_structure() {
    let spec = PatchSpec::from_value(&json!({ "a": { "b": "x" } })).unwrap();
    assert_eq!(spec, PatchSpec::nested("a", PatchSpec::terminal("b", "x")));
    assert_eq!(spec.to_value(), json!({ "a": { "b": "x" } }));
}

#[test]
fn test_parse_rejects_malformed_specs() {
    for raw in [json!({}), json!("a"), json!(["a"]), json!(null), json!({ "a": {} })] {
        let err = PatchSpec::from_value(&raw).unwrap_err();
        assert!(matches!(err, PatchError::InvalidPatchSpec(_)), "{raw} should be rejected");
    }
}

#[test]
fn test_parse_rejects_multiple_keys_at_any_level() {
    let top = PatchSpec::from_value(&json!({ "a": "x", "b": "y" })).unwrap_err();
    assert!(matches!(top, PatchError::InvalidPatchSpec(_)));

    let nested = PatchSpec::from_value(&json!({ "a": { "b": "x", "c": "y" } })).unwrap_err();
    assert!(matches!(nested, PatchError::InvalidPatchSpec(_)));
}

#[test]
fn test_lenient_policy_accepts_non_string_terminals() {
    for value in [json!(42), json!(true), json!(null), json!([1, 2])] {
        let spec = PatchSpec::from_value(&json!({ "a": { "b": value.clone() } })).unwrap();
        let PatchValue::Nested(inner) = &spec.next else {
            panic!("expected nested segment");
        };
        assert_eq!(inner.next, PatchValue::Terminal(value));
    }

    assert_eq!(apply(json!({ "n": 1 }), json!({ "n": 2 })), json!({ "n": 2 }));
}

#[test]
fn test_strict_policy_rejects_non_string_terminals() {
    let err = PatchSpec::from_value_with(&json!({ "a": { "b": 42 } }), PatchPolicy::Strict)
        .unwrap_err();
    assert_eq!(err, PatchError::UnsupportedPatchValue { key: "b".to_string(), kind: "a number" });

    let ok = PatchSpec::from_value_with(&json!({ "a": { "b": "x" } }), PatchPolicy::Strict);
    assert!(ok.is_ok());
}

#[test]
fn test_try_from_value() {
    let raw = json!({ "status": "closed" });
    let spec = PatchSpec::try_from(&raw).unwrap();
    assert_eq!(spec.path(), "status");
}
