//! # Data Source Layer
//!
//! Filters never touch records directly. They ask a [`DataSource`] to narrow a
//! collection handle or to enumerate the distinct values of a field, so the
//! same filter set runs against a database query builder, a search index, or
//! the in-memory [`memory::MemorySource`].
//!
//! ## Collections
//!
//! `DataSource::Collection` is an immutable handle (a query, an id set, ...).
//! Narrowing returns a new handle and leaves the input untouched, which lets
//! the filter set narrow the same base collection along different paths when
//! it rebases each filter's choices.
//!
//! ## Failures
//!
//! Every call returns [`crate::error::Result`]. Failures are reported as
//! [`crate::error::FacetError::DataSource`] and propagate to the caller of
//! `apply_all` / `render_all` unchanged; the engine never retries and never
//! returns partial choice lists.

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::value::{FieldValue, RecordId};

pub mod memory;

/// Operations the filter engine needs from the storage layer.
pub trait DataSource {
    /// Immutable handle to a set of records.
    type Collection: Clone;

    /// Records whose `field` holds `value`.
    ///
    /// For many-valued fields: records whose set of values contains `value`.
    fn narrow(
        &self,
        collection: &Self::Collection,
        field: &str,
        value: &FieldValue,
    ) -> Result<Self::Collection>;

    /// Records whose temporal `field` lies in `[lower, upper)`.
    fn narrow_range(
        &self,
        collection: &Self::Collection,
        field: &str,
        lower: NaiveDateTime,
        upper: NaiveDateTime,
    ) -> Result<Self::Collection>;

    /// Distinct values of `field` with the number of records holding each.
    ///
    /// A record is counted once per distinct value it holds, so counts of a
    /// many-valued field can add up to more than the collection size.
    fn distinct_with_counts(
        &self,
        collection: &Self::Collection,
        field: &str,
    ) -> Result<Vec<(FieldValue, usize)>>;

    /// Human-readable label of record `id` of `model`, if the source knows it.
    fn related_label(&self, model: &str, id: RecordId) -> Result<Option<String>>;

    /// Number of records in the collection.
    fn count(&self, collection: &Self::Collection) -> Result<usize>;
}
