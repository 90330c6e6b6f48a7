//! Typed filter-expression tree parsed from the `where` parameter.

use super::{
    QueryError,
    value::{Document, compare, lookup, values_equal},
};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Comparison applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value (or, for arrays, contains it).
    Eq(Value),
    /// Field does not equal the value; missing fields match.
    Ne(Value),
    /// Field is strictly greater than the value.
    Gt(Value),
    /// Field is greater than or equal to the value.
    Gte(Value),
    /// Field is strictly less than the value.
    Lt(Value),
    /// Field is less than or equal to the value.
    Lte(Value),
    /// Field equals any of the values.
    In(Vec<Value>),
    /// Field equals none of the values.
    Nin(Vec<Value>),
    /// Field presence must match the flag.
    Exists(bool),
}

/// Filter expression tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Matches every record.
    #[default]
    All,
    /// Matches when every child matches.
    And(Vec<Filter>),
    /// Matches when at least one child matches.
    Or(Vec<Filter>),
    /// Matches when no child matches.
    Nor(Vec<Filter>),
    /// Matches when the field satisfies the condition.
    Field {
        /// Dot-separated field path.
        path: String,
        /// Condition evaluated against the field value.
        condition: Condition,
    },
}

impl Filter {
    /// Builds an equality filter on a single field.
    #[must_use]
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field {
            path: path.into(),
            condition: Condition::Eq(value.into()),
        }
    }

    /// Parses a filter from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the value is not an object, uses an
    /// unsupported operator, or supplies an operand of the wrong shape.
    pub fn parse(value: &Value) -> Result<Self, QueryError> {
        let object = value.as_object().ok_or(QueryError::NotAnObject("where"))?;
        parse_object(object)
    }

    /// Evaluates the filter against a document.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Self::All => true,
            Self::And(children) => children.iter().all(|child| child.matches(document)),
            Self::Or(children) => children.iter().any(|child| child.matches(document)),
            Self::Nor(children) => !children.iter().any(|child| child.matches(document)),
            Self::Field { path, condition } => condition.matches(lookup(document, path)),
        }
    }
}

impl Condition {
    fn matches(&self, field: Option<&Value>) -> bool {
        match self {
            Self::Eq(expected) => field_equals(field, expected),
            Self::Ne(expected) => !field_equals(field, expected),
            Self::Gt(bound) => field_compares(field, bound, |ord| ord == Ordering::Greater),
            Self::Gte(bound) => field_compares(field, bound, |ord| ord != Ordering::Less),
            Self::Lt(bound) => field_compares(field, bound, |ord| ord == Ordering::Less),
            Self::Lte(bound) => field_compares(field, bound, |ord| ord != Ordering::Greater),
            Self::In(candidates) => candidates.iter().any(|c| field_equals(field, c)),
            Self::Nin(candidates) => !candidates.iter().any(|c| field_equals(field, c)),
            Self::Exists(expected) => field.is_some() == *expected,
        }
    }
}

fn field_equals(field: Option<&Value>, expected: &Value) -> bool {
    match field {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(actual) => values_equal(actual, expected),
    }
}

/// Range comparisons only match values of the same JSON type.
fn field_compares(field: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    let same_type = |value: &Value| std::mem::discriminant(value) == std::mem::discriminant(bound);
    match field {
        Some(Value::Array(items)) if !bound.is_array() => items
            .iter()
            .any(|item| same_type(item) && accept(compare(Some(item), Some(bound)))),
        Some(actual) if same_type(actual) => accept(compare(Some(actual), Some(bound))),
        _ => false,
    }
}

fn parse_object(object: &Map<String, Value>) -> Result<Filter, QueryError> {
    let mut clauses = object
        .iter()
        .map(|(key, value)| parse_clause(key, value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match clauses.len() {
        0 => Filter::All,
        1 => clauses.pop().unwrap_or_default(),
        _ => Filter::And(clauses),
    })
}

fn parse_clause(key: &str, value: &Value) -> Result<Filter, QueryError> {
    match key {
        "$and" => Ok(Filter::And(parse_children(key, value)?)),
        "$or" => Ok(Filter::Or(parse_children(key, value)?)),
        "$nor" => Ok(Filter::Nor(parse_children(key, value)?)),
        operator if operator.starts_with('$') => {
            Err(QueryError::UnsupportedOperator(operator.to_owned()))
        }
        path => parse_field(path, value),
    }
}

fn parse_children(operator: &str, value: &Value) -> Result<Vec<Filter>, QueryError> {
    let items = value
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| QueryError::InvalidOperand {
            operator: operator.to_owned(),
            reason: "expected a non-empty array of filters",
        })?;
    items
        .iter()
        .map(|item| {
            item.as_object()
                .ok_or_else(|| QueryError::InvalidOperand {
                    operator: operator.to_owned(),
                    reason: "each entry must be a filter object",
                })
                .and_then(parse_object)
        })
        .collect()
}

fn is_operator_object(value: &Value) -> Option<&Map<String, Value>> {
    value
        .as_object()
        .filter(|object| !object.is_empty() && object.keys().all(|key| key.starts_with('$')))
}

fn parse_field(path: &str, value: &Value) -> Result<Filter, QueryError> {
    let Some(operators) = is_operator_object(value) else {
        return Ok(Filter::eq(path, value.clone()));
    };

    let mut conditions = operators
        .iter()
        .map(|(operator, operand)| {
            parse_condition(operator, operand).map(|condition| Filter::Field {
                path: path.to_owned(),
                condition,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(if conditions.len() == 1 {
        conditions.pop().unwrap_or_default()
    } else {
        Filter::And(conditions)
    })
}

fn parse_condition(operator: &str, operand: &Value) -> Result<Condition, QueryError> {
    let list = || {
        operand
            .as_array()
            .cloned()
            .ok_or_else(|| QueryError::InvalidOperand {
                operator: operator.to_owned(),
                reason: "expected an array",
            })
    };
    match operator {
        "$eq" => Ok(Condition::Eq(operand.clone())),
        "$ne" => Ok(Condition::Ne(operand.clone())),
        "$gt" => Ok(Condition::Gt(operand.clone())),
        "$gte" => Ok(Condition::Gte(operand.clone())),
        "$lt" => Ok(Condition::Lt(operand.clone())),
        "$lte" => Ok(Condition::Lte(operand.clone())),
        "$in" => list().map(Condition::In),
        "$nin" => list().map(Condition::Nin),
        "$exists" => truthy(operand)
            .map(Condition::Exists)
            .ok_or_else(|| QueryError::InvalidOperand {
                operator: operator.to_owned(),
                reason: "expected a boolean or number",
            }),
        other => Err(QueryError::UnsupportedOperator(other.to_owned())),
    }
}

fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        _ => None,
    }
}
