//! Sort specification parsed from the `sort` parameter.

use super::{
    QueryError,
    value::{Document, compare, lookup},
};
use serde_json::Value;
use std::cmp::Ordering;

/// Direction of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest values first.
    Ascending,
    /// Largest values first.
    Descending,
}

impl SortDirection {
    /// Returns the SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }

    fn parse(field: &str, value: &Value) -> Result<Self, QueryError> {
        let direction = match value {
            Value::Number(number) => match number.as_i64() {
                Some(1) => Some(Self::Ascending),
                Some(-1) => Some(Self::Descending),
                _ => None,
            },
            Value::String(text) => match text.to_ascii_lowercase().as_str() {
                "asc" | "ascending" | "1" => Some(Self::Ascending),
                "desc" | "descending" | "-1" => Some(Self::Descending),
                _ => None,
            },
            _ => None,
        };
        direction.ok_or_else(|| QueryError::InvalidSortDirection(field.to_owned()))
    }
}

/// One field of a compound sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Dot-separated field path.
    pub field: String,
    /// Sort direction for the field.
    pub direction: SortDirection,
}

/// Ordered list of sort keys; earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
    /// Creates a sort specification from keys.
    #[must_use]
    pub const fn new(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }

    /// Parses a sort specification from a JSON object, preserving key order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the value is not an object or a direction
    /// is not recognised.
    pub fn parse(value: &Value) -> Result<Self, QueryError> {
        let object = value.as_object().ok_or(QueryError::NotAnObject("sort"))?;
        object
            .iter()
            .map(|(field, direction)| {
                SortDirection::parse(field, direction).map(|parsed| SortKey {
                    field: field.clone(),
                    direction: parsed,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Returns the sort keys in precedence order.
    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    /// Returns `true` when no ordering is requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares two documents under this specification.
    #[must_use]
    pub fn compare(&self, left: &Document, right: &Document) -> Ordering {
        for key in &self.0 {
            let natural = compare(lookup(left, &key.field), lookup(right, &key.field));
            let ordering = match key.direction {
                SortDirection::Ascending => natural,
                SortDirection::Descending => natural.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
