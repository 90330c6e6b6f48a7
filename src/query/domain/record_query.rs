//! Composed store query and its in-memory evaluation.

use super::{Filter, Projection, SortSpec, value::Document};

/// A fully composed read query against one record collection.
///
/// Stages apply in a fixed order: filter, sort, projection, skip, limit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordQuery {
    /// Narrows the result set.
    pub filter: Filter,
    /// Orders the result set.
    pub sort: SortSpec,
    /// Restricts returned fields.
    pub projection: Option<Projection>,
    /// Number of matching records to skip.
    pub skip: u64,
    /// Maximum number of records to return; `None` is unbounded.
    pub limit: Option<u64>,
}

impl RecordQuery {
    /// Creates a query matching records with the given filter.
    #[must_use]
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Evaluates the query over documents in their natural (insertion) order.
    #[must_use]
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut matching: Vec<Document> = documents
            .into_iter()
            .filter(|document| self.filter.matches(document))
            .collect();
        if !self.sort.is_empty() {
            // Stable sort keeps insertion order between equal keys.
            matching.sort_by(|left, right| self.sort.compare(left, right));
        }

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = self
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|document| self.project(document))
            .collect()
    }

    /// Applies only the projection stage to one document.
    ///
    /// Stores that filter, sort and paginate natively call this on the rows
    /// they return.
    #[must_use]
    pub fn project(&self, document: Document) -> Document {
        let Some(projection) = &self.projection else {
            return document;
        };
        projection.apply(document)
    }
}
