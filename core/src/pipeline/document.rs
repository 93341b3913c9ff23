//! Document model and dotted-path access.
//!
//! A document is a JSON object. Paths are dot separated
//! (`skills.skillId`). `get_path` follows objects only; `values_at`
//! also fans out through arrays, the way joins and equality filters
//! need.

use crate::error::WorkforceResult;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub type Document = Map<String, Value>;

/// Serialize typed records into documents. Records that do not
/// serialize to a JSON object are rejected.
pub fn to_documents<T: Serialize>(items: &[T]) -> WorkforceResult<Vec<Document>> {
    items.iter().map(to_document).collect()
}

pub fn to_document<T: Serialize>(item: &T) -> WorkforceResult<Document> {
    match serde_json::to_value(item)? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow::anyhow!("expected a JSON object, got {other}").into()),
    }
}

pub fn from_documents<T: DeserializeOwned>(docs: Vec<Document>) -> WorkforceResult<Vec<T>> {
    docs.into_iter()
        .map(|doc| serde_json::from_value(Value::Object(doc)).map_err(Into::into))
        .collect()
}

/// Value at `path`, following nested objects only.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Every value reachable at `path`, fanning out through arrays.
/// A terminal array contributes its elements.
pub fn values_at<'a>(doc: &'a Document, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    if let Some((head, rest)) = segments.split_first() {
        if let Some(value) = doc.get(*head) {
            collect_values(value, rest, &mut out);
        }
    }
    out
}

fn collect_values<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    match segments.split_first() {
        None => match value {
            Value::Array(items) => out.extend(items.iter()),
            other => out.push(other),
        },
        Some((head, rest)) => match value {
            Value::Object(map) => {
                if let Some(next) = map.get(*head) {
                    collect_values(next, rest, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    collect_values(item, segments, out);
                }
            }
            _ => {}
        },
    }
}

/// Set `path`, creating intermediate objects. A non-object found on the
/// way is replaced.
pub fn set_path(doc: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            doc.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(child) = slot {
                set_path(child, rest, value);
            }
        }
    }
}

pub fn remove_path(doc: &mut Document, path: &str) -> Option<Value> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head) {
            Some(Value::Object(child)) => remove_path(child, rest),
            _ => None,
        },
    }
}

/// Hashable identity for scalar values. Nulls never join or group
/// with anything but other nulls, so callers decide whether to skip them.
pub(crate) fn index_key(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("n:{}", f as i64),
            _ => format!("n:{n}"),
        },
        other => other.to_string(),
    }
}
