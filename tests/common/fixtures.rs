//! Test fixtures for integration tests.

#![allow(dead_code)]

use couch_export::document::Document;
use serde_json::{Value, json};

/// Unwrap a `json!` object literal into a `Document`.
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

/// Generate assessment-like documents with ids `d1..=dN`.
pub fn generate_test_documents(count: usize) -> Vec<Document> {
    (1..=count)
        .map(|i| {
            doc(json!({
                "_id": format!("d{i}"),
                "_rev": format!("1-{i:04}"),
                "parentid": "root",
                "name": format!("Assessment {i}"),
                "score": i * 10,
                "passed": i % 2 == 0,
                "owner": { "name": format!("user_{i}"), "team": "qa" },
            }))
        })
        .collect()
}
