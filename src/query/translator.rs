//! Translation of raw list parameters into store queries.

use super::domain::{Document, Filter, Projection, QueryError, RecordQuery, SortSpec};
use serde::Deserialize;
use serde_json::Value;

/// Raw, optional string parameters accepted by collection list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    /// JSON filter expression.
    #[serde(rename = "where")]
    pub filter: Option<String>,
    /// JSON sort specification.
    pub sort: Option<String>,
    /// JSON projection specification.
    pub select: Option<String>,
    /// Number of records to skip.
    pub skip: Option<String>,
    /// Maximum number of records to return.
    pub limit: Option<String>,
    /// `"true"` requests a count instead of records.
    pub count: Option<String>,
}

impl ListParams {
    /// Sets the `where` parameter.
    #[must_use]
    pub fn with_where(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets the `sort` parameter.
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Sets the `select` parameter.
    #[must_use]
    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    /// Sets the `skip` parameter.
    #[must_use]
    pub fn with_skip(mut self, skip: impl Into<String>) -> Self {
        self.skip = Some(skip.into());
        self
    }

    /// Sets the `limit` parameter.
    #[must_use]
    pub fn with_limit(mut self, limit: impl Into<String>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Sets the `count` parameter.
    #[must_use]
    pub fn with_count(mut self, count: impl Into<String>) -> Self {
        self.count = Some(count.into());
        self
    }
}

/// Outcome of translating list parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ListRequest {
    /// Count the records matching the filter.
    Count(Filter),
    /// Fetch the records selected by the query.
    Fetch(RecordQuery),
}

/// Result of executing a [`ListRequest`] against a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    /// Number of records matching the filter.
    Count(u64),
    /// Selected (and possibly projected) record documents.
    Records(Vec<Document>),
}

/// Translates [`ListParams`] into a [`ListRequest`] for one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTranslator {
    default_limit: Option<u64>,
}

impl QueryTranslator {
    /// Default page size for the task collection.
    pub const TASK_DEFAULT_LIMIT: u64 = 100;

    /// Creates a translator that applies `default_limit` when `limit` is absent.
    #[must_use]
    pub const fn new(default_limit: Option<u64>) -> Self {
        Self { default_limit }
    }

    /// Translator for the task collection (limit defaults to 100).
    #[must_use]
    pub const fn for_tasks() -> Self {
        Self::new(Some(Self::TASK_DEFAULT_LIMIT))
    }

    /// Translator for the user collection (no default limit).
    #[must_use]
    pub const fn for_users() -> Self {
        Self::new(None)
    }

    /// Translates parameters, composing `where`, `sort`, `select`, `skip` and
    /// `limit` before evaluating `count`.
    ///
    /// A `limit` of zero means no cap.
    ///
    /// # Errors
    ///
    /// Returns the first [`QueryError`] encountered; no partial query is
    /// produced.
    pub fn translate(&self, params: &ListParams) -> Result<ListRequest, QueryError> {
        let filter = parse_json(params.filter.as_deref(), "where")?
            .map(|value| Filter::parse(&value))
            .transpose()?
            .unwrap_or_default();
        let sort = parse_json(params.sort.as_deref(), "sort")?
            .map(|value| SortSpec::parse(&value))
            .transpose()?
            .unwrap_or_default();
        let projection = parse_json(params.select.as_deref(), "select")?
            .map(|value| Projection::parse(&value))
            .transpose()?
            .flatten();
        let skip = parse_count(params.skip.as_deref(), "skip")?.unwrap_or(0);
        let limit = match parse_count(params.limit.as_deref(), "limit")? {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => self.default_limit,
        };

        if params.count.as_deref() == Some("true") {
            return Ok(ListRequest::Count(filter));
        }

        Ok(ListRequest::Fetch(RecordQuery {
            filter,
            sort,
            projection,
            skip,
            limit,
        }))
    }
}

fn parse_json(raw: Option<&str>, param: &'static str) -> Result<Option<Value>, QueryError> {
    raw.map(|text| {
        serde_json::from_str(text).map_err(|err| QueryError::InvalidJson {
            param,
            reason: err.to_string(),
        })
    })
    .transpose()
}

fn parse_count(raw: Option<&str>, param: &'static str) -> Result<Option<u64>, QueryError> {
    raw.map(|text| {
        text.trim()
            .parse::<u64>()
            .map_err(|_| QueryError::InvalidInteger {
                param,
                value: text.to_owned(),
            })
    })
    .transpose()
}
