//! Filtering on a set of related records.

use tracing::trace;

use super::relation::related_label;
use super::{unselected_choices, Bucket, FieldFilter, FilterCore};
use crate::choice::Choice;
use crate::error::{DecodeWarning, Result};
use crate::params::Params;
use crate::schema::ValueType;
use crate::source::DataSource;
use crate::value::{FieldValue, RecordId};

/// Filter for many-to-many style fields.
///
/// Each active value is one repeated parameter (`tags=1&tags=4`). Selections
/// are conjunctive: every additional value narrows further. Candidate counts
/// are independent per value, so a record tagged twice counts under both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiRelationFilter {
    core: FilterCore,
    model: String,
}

fn parse_id(raw: &str) -> Option<RecordId> {
    FieldValue::parse(raw, ValueType::Ref).and_then(|v| v.as_ref_id())
}

impl MultiRelationFilter {
    pub fn new(core: FilterCore, model: impl Into<String>) -> Self {
        Self {
            core,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Active related ids, in parameter order, without duplicates.
    pub fn selected(&self, params: &Params) -> Vec<RecordId> {
        let mut ids = Vec::new();
        for raw in params.get(&self.core.param) {
            match parse_id(raw) {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => DecodeWarning::Unparseable {
                    param: self.core.param.clone(),
                    value: raw.to_string(),
                }
                .log(),
            }
        }
        ids
    }

    /// `params` without any spelling of `id` under this filter's key.
    fn without_id(&self, params: &Params, id: RecordId) -> Params {
        params
            .iter()
            .filter(|(k, v)| !(*k == self.core.param && parse_id(v) == Some(id)))
            .collect()
    }
}

impl FieldFilter for MultiRelationFilter {
    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn apply<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<S::Collection> {
        let mut narrowed = collection.clone();
        for id in self.selected(params) {
            trace!(field = %self.core.field, %id, "narrowing on related record");
            narrowed = source.narrow(&narrowed, &self.core.field, &FieldValue::Ref(id))?;
        }
        Ok(narrowed)
    }

    fn choices<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<Vec<Choice>> {
        let selected = self.selected(params);
        let mut choices = Vec::with_capacity(selected.len());
        for &id in &selected {
            choices.push(Choice::remove(
                related_label(source, &self.model, id)?,
                self.without_id(params, id),
            ));
        }

        let mut distinct = 0;
        let mut buckets = Vec::new();
        for (value, count) in source.distinct_with_counts(collection, &self.core.field)? {
            let Some(id) = value.as_ref_id() else {
                continue;
            };
            distinct += 1;
            if selected.contains(&id) {
                continue;
            }
            buckets.push(Bucket {
                key: id,
                label: related_label(source, &self.model, id)?,
                count,
                params: params.with_added(&self.core.param, id.to_string()),
            });
        }
        choices.extend(unselected_choices(buckets, distinct, self.core.order, params));
        Ok(choices)
    }
}
