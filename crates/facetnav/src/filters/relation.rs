//! Filtering on a single related record.

use tracing::trace;

use super::{parse_selected, unselected_choices, Bucket, FieldFilter, FilterCore};
use crate::choice::Choice;
use crate::error::Result;
use crate::params::Params;
use crate::schema::ValueType;
use crate::source::DataSource;
use crate::value::{FieldValue, RecordId};

/// Label of a related record, falling back to its id when the source has none.
pub(crate) fn related_label<S: DataSource>(
    source: &S,
    model: &str,
    id: RecordId,
) -> Result<String> {
    Ok(source
        .related_label(model, id)?
        .unwrap_or_else(|| id.to_string()))
}

/// Filter for foreign-key style fields.
///
/// Values are grouped by related record id and labelled through
/// [`DataSource::related_label`]. An id no record points to still narrows,
/// like a [`super::ValuesFilter`] value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationFilter {
    core: FilterCore,
    model: String,
}

impl RelationFilter {
    pub fn new(core: FilterCore, model: impl Into<String>) -> Self {
        Self {
            core,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn selected(&self, params: &Params) -> Option<RecordId> {
        parse_selected(params, &self.core.param, ValueType::Ref).and_then(|v| v.as_ref_id())
    }
}

impl FieldFilter for RelationFilter {
    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn apply<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<S::Collection> {
        match self.selected(params) {
            Some(id) => {
                trace!(field = %self.core.field, %id, "narrowing on related record");
                source.narrow(collection, &self.core.field, &FieldValue::Ref(id))
            }
            None => Ok(collection.clone()),
        }
    }

    fn choices<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<Vec<Choice>> {
        if let Some(id) = self.selected(params) {
            return Ok(vec![Choice::remove(
                related_label(source, &self.model, id)?,
                params.without(&self.core.param),
            )]);
        }

        let mut buckets = Vec::new();
        for (value, count) in source.distinct_with_counts(collection, &self.core.field)? {
            let Some(id) = value.as_ref_id() else {
                continue;
            };
            buckets.push(Bucket {
                key: id,
                label: related_label(source, &self.model, id)?,
                count,
                params: params.with_set(&self.core.param, id.to_string()),
            });
        }
        let distinct = buckets.len();
        Ok(unselected_choices(buckets, distinct, self.core.order, params))
    }
}
