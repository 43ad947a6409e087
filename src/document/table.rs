//! Flattening documents into rows and columns for spreadsheet output.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use super::Document;

/// A single rendered cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => Cell::Number(f),
                None => Cell::Text(n.to_string()),
            },
            Value::String(s) => Cell::Text(s.clone()),
            // Arrays and leftover objects render as compact JSON text.
            other => Cell::Text(serde_json::to_string(other).unwrap_or_default()),
        }
    }

    /// Plain text form used for CSV output.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s),
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Bool(b) => Cow::Owned(b.to_string()),
        }
    }
}

/// Flatten a document into a map of dot-notation keys to leaf values.
/// Nested objects use dot notation (e.g., "address.city").
/// Arrays are kept whole as a single leaf.
pub fn flatten_document(doc: &Document) -> BTreeMap<String, Value> {
    let mut result = BTreeMap::new();
    flatten_into(doc, "", &mut result);
    result
}

fn flatten_into(doc: &Document, prefix: &str, result: &mut BTreeMap<String, Value>) {
    for (key, value) in doc {
        let full_key: Cow<str> = if prefix.is_empty() {
            Cow::Borrowed(key)
        } else {
            Cow::Owned(format!("{prefix}.{key}"))
        };

        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(nested, &full_key, result),
            _ => {
                result.insert(full_key.into_owned(), value.clone());
            }
        }
    }
}

/// Collect flattened column names in first-seen order.
///
/// A column is dropped when it equals one of `drop` or sits underneath it
/// (dropping `meta` also drops `meta.created`).
pub fn collect_columns(docs: &[Document], drop: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();

    for doc in docs {
        collect_keys(doc, "", &mut seen, &mut order);
    }

    order.retain(|column| !is_dropped(column, drop));
    order
}

fn collect_keys(doc: &Document, prefix: &str, seen: &mut HashSet<String>, order: &mut Vec<String>) {
    for (key, value) in doc {
        let full_key = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };

        match value {
            Value::Object(nested) if !nested.is_empty() => {
                collect_keys(nested, &full_key, seen, order)
            }
            _ => {
                if seen.insert(full_key.clone()) {
                    order.push(full_key);
                }
            }
        }
    }
}

fn is_dropped(column: &str, drop: &[String]) -> bool {
    drop.iter().any(|name| {
        column == name
            || column.strip_prefix(name.as_str()).is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Documents shaped as a header row plus value rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn from_documents(docs: &[Document], drop: &[String]) -> Self {
        let columns = collect_columns(docs, drop);
        let rows = docs
            .iter()
            .map(|doc| {
                let flat = flatten_document(doc);
                columns
                    .iter()
                    .map(|column| flat.get(column).map(Cell::from_value).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
