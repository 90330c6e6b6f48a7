//! Field projection parsed from the `select` parameter.

use super::{QueryError, value::Document};
use serde_json::Value;

/// Identifier field that inclusion projections keep unless excluded.
pub const ID_FIELD: &str = "_id";

/// Whether the listed fields are kept or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Only the listed fields (plus `_id`) are returned.
    Include,
    /// The listed fields are removed.
    Exclude,
}

/// Restricts the top-level fields returned for each record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    mode: ProjectionMode,
    fields: Vec<String>,
    keep_id: bool,
}

impl Projection {
    /// Parses a projection from a JSON object of `field: 1 | 0` entries.
    ///
    /// Returns `Ok(None)` for an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when the value is not an object, a flag is not
    /// boolean-like, or inclusion and exclusion are mixed.
    pub fn parse(value: &Value) -> Result<Option<Self>, QueryError> {
        let object = value.as_object().ok_or(QueryError::NotAnObject("select"))?;

        let mut keep_id = true;
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for (field, flag) in object {
            let include = flag_value(flag)
                .ok_or_else(|| QueryError::InvalidProjectionValue(field.clone()))?;
            if field == ID_FIELD {
                keep_id = include;
            } else if include {
                included.push(field.clone());
            } else {
                excluded.push(field.clone());
            }
        }

        let projection = match (included.is_empty(), excluded.is_empty()) {
            (false, false) => return Err(QueryError::MixedProjection),
            (false, true) => Self {
                mode: ProjectionMode::Include,
                fields: included,
                keep_id,
            },
            (true, false) => Self {
                mode: ProjectionMode::Exclude,
                fields: excluded,
                keep_id,
            },
            (true, true) if keep_id => return Ok(None),
            (true, true) => Self {
                mode: ProjectionMode::Exclude,
                fields: Vec::new(),
                keep_id: false,
            },
        };
        Ok(Some(projection))
    }

    /// Returns the projection mode.
    #[must_use]
    pub const fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// Applies the projection to a document.
    #[must_use]
    pub fn apply(&self, mut document: Document) -> Document {
        match self.mode {
            ProjectionMode::Include => {
                document.retain(|key, _| {
                    (key == ID_FIELD && self.keep_id) || self.fields.iter().any(|f| f == key)
                });
            }
            ProjectionMode::Exclude => {
                document.retain(|key, _| {
                    if key == ID_FIELD {
                        self.keep_id
                    } else {
                        !self.fields.iter().any(|f| f == key)
                    }
                });
            }
        }
        document
    }
}

fn flag_value(flag: &Value) -> Option<bool> {
    match flag {
        Value::Bool(value) => Some(*value),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        _ => None,
    }
}
