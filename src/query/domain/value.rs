//! Total ordering and field lookup over JSON document values.

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A stored record rendered as a JSON object.
pub type Document = Map<String, Value>;

/// Resolves a dot-separated field path inside a document.
///
/// Returns `None` when any segment is missing or traverses a non-object.
#[must_use]
pub fn lookup<'doc>(document: &'doc Document, path: &str) -> Option<&'doc Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Rank of each JSON type in the cross-type ordering.
const fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Compares two optional values using a fixed cross-type order.
///
/// Missing and `null` sort first, then numbers, strings, objects, arrays and
/// booleans. Values of the same type compare naturally; objects and arrays
/// compare element-wise.
#[must_use]
pub fn compare(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let by_rank = type_rank(left).cmp(&type_rank(right));
    if by_rank != Ordering::Equal {
        return by_rank;
    }
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => compare_numbers(a, b),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Array(a)), Some(Value::Array(b))) => compare_sequences(
            a.iter().map(Some),
            b.iter().map(Some),
        ),
        (Some(Value::Object(a)), Some(Value::Object(b))) => {
            for ((key_a, value_a), (key_b, value_b)) in a.iter().zip(b.iter()) {
                let ordering = key_a
                    .cmp(key_b)
                    .then_with(|| compare(Some(value_a), Some(value_b)));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.len().cmp(&b.len())
        }
        _ => Ordering::Equal,
    }
}

fn compare_sequences<'a>(
    mut left: impl Iterator<Item = Option<&'a Value>>,
    mut right: impl Iterator<Item = Option<&'a Value>>,
) -> Ordering {
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => {
                let ordering = compare(a, b);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_numbers(a: &serde_json::Number, b: &serde_json::Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Returns `true` when both values are equal under [`compare`].
#[must_use]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    compare(Some(left), Some(right)) == Ordering::Equal
}
