//! Single-path nested updates for schema-less documents.
//!
//! A patch names one field path and the value to put at its end, written in
//! raw form as nested single-key objects: `{"profile": {"city": "Lyon"}}`.
//! The raw form is parsed once into a [`PatchSpec`] so the shape of every
//! level is decided up front instead of while patching.

use serde_json::{Map, Value};
use thiserror::Error;

use super::Document;

/// Errors raised while parsing or applying a patch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("Invalid patch spec: {0}")]
    InvalidPatchSpec(String),

    #[error("Unsupported patch value at '{key}': {kind}")]
    UnsupportedPatchValue { key: String, kind: &'static str },

    #[error("Cannot descend into '{key}': existing value is {kind}, not an object")]
    PatchTargetNotObject { key: String, kind: &'static str },
}

/// Which terminal payloads a patch may carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PatchPolicy {
    /// Any non-object JSON value is a terminal assignment.
    #[default]
    Lenient,
    /// Only strings are terminal; numbers, booleans, null and arrays are rejected.
    Strict,
}

/// One path segment of a patch and what follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct PatchSpec {
    pub key: String,
    pub next: PatchValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatchValue {
    /// Assign this value to the key.
    Terminal(Value),
    /// Descend into the key and keep patching.
    Nested(Box<PatchSpec>),
}

impl PatchSpec {
    pub fn terminal(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { key: key.into(), next: PatchValue::Terminal(value.into()) }
    }

    pub fn nested(key: impl Into<String>, inner: PatchSpec) -> Self {
        Self { key: key.into(), next: PatchValue::Nested(Box::new(inner)) }
    }

    /// Parse the raw `{key: value}` form with the default (lenient) policy.
    pub fn from_value(raw: &Value) -> Result<Self, PatchError> {
        Self::from_value_with(raw, PatchPolicy::default())
    }

    /// Parse the raw `{key: value}` form.
    ///
    /// Every level must be an object with exactly one key.
    pub fn from_value_with(raw: &Value, policy: PatchPolicy) -> Result<Self, PatchError> {
        let Value::Object(map) = raw else {
            return Err(PatchError::InvalidPatchSpec(format!(
                "expected an object, found {}",
                value_kind(raw)
            )));
        };

        let mut entries = map.iter();
        let (key, value) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => {
                return Err(PatchError::InvalidPatchSpec("empty object".to_string()));
            }
            (Some(_), Some(_)) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                return Err(PatchError::InvalidPatchSpec(format!(
                    "expected exactly one key per level, found {}",
                    keys.join(", ")
                )));
            }
        };

        let next = match value {
            Value::Object(_) => PatchValue::Nested(Box::new(Self::from_value_with(value, policy)?)),
            Value::String(_) => PatchValue::Terminal(value.clone()),
            other => match policy {
                PatchPolicy::Lenient => PatchValue::Terminal(other.clone()),
                PatchPolicy::Strict => {
                    return Err(PatchError::UnsupportedPatchValue {
                        key: key.clone(),
                        kind: value_kind(other),
                    });
                }
            },
        };

        Ok(Self { key: key.clone(), next })
    }

    /// The raw `{key: value}` form of this spec.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(1);
        map.insert(self.key.clone(), self.next.to_value());
        Value::Object(map)
    }

    /// Dot-separated path this spec writes to, e.g. `profile.address.city`.
    pub fn path(&self) -> String {
        let mut path = self.key.clone();
        let mut current = &self.next;
        while let PatchValue::Nested(inner) = current {
            path.push('.');
            path.push_str(&inner.key);
            current = &inner.next;
        }
        path
    }
}

impl PatchValue {
    pub fn to_value(&self) -> Value {
        match self {
            PatchValue::Terminal(value) => value.clone(),
            PatchValue::Nested(inner) => inner.to_value(),
        }
    }
}

impl TryFrom<&Value> for PatchSpec {
    type Error = PatchError;

    fn try_from(raw: &Value) -> Result<Self, Self::Error> {
        Self::from_value(raw)
    }
}

/// Apply `spec` to `doc` in place and hand the document back for chaining.
///
/// A missing key on a nested segment is created from the rest of the patch
/// as-is; existing objects are descended into; terminals always overwrite.
pub fn resolve<'a>(doc: &'a mut Document, spec: &PatchSpec) -> Result<&'a mut Document, PatchError> {
    match &spec.next {
        PatchValue::Terminal(value) => {
            doc.insert(spec.key.clone(), value.clone());
        }
        PatchValue::Nested(inner) => match doc.get_mut(&spec.key) {
            Some(Value::Object(child)) => {
                resolve(child, inner)?;
            }
            Some(other) => {
                return Err(PatchError::PatchTargetNotObject {
                    key: spec.key.clone(),
                    kind: value_kind(other),
                });
            }
            None => {
                doc.insert(spec.key.clone(), inner.to_value());
            }
        },
    }
    Ok(doc)
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
