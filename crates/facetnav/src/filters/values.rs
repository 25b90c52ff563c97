//! Filtering on plain scalar values.

use tracing::trace;

use super::{parse_selected, unselected_choices, Bucket, FieldFilter, FilterCore};
use crate::choice::Choice;
use crate::error::Result;
use crate::params::Params;
use crate::schema::ValueType;
use crate::source::DataSource;
use crate::value::FieldValue;

/// Filter for ordinary text, number and boolean fields.
///
/// Choices are the distinct values present; the label is the value itself.
/// A stored value that parses is a selection even when no record holds it:
/// the collection narrows to nothing and the REMOVE link leads back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuesFilter {
    core: FilterCore,
    value_type: ValueType,
}

impl ValuesFilter {
    pub fn new(core: FilterCore, value_type: ValueType) -> Self {
        Self { core, value_type }
    }

    /// The selected value, if one is stored and parses.
    pub fn selected(&self, params: &Params) -> Option<FieldValue> {
        parse_selected(params, &self.core.param, self.value_type)
    }
}

impl FieldFilter for ValuesFilter {
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
            Some(value) => {
                trace!(field = %self.core.field, %value, "narrowing on value");
                source.narrow(collection, &self.core.field, &value)
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
        if let Some(value) = self.selected(params) {
            return Ok(vec![Choice::remove(
                value.to_string(),
                params.without(&self.core.param),
            )]);
        }

        let values = source.distinct_with_counts(collection, &self.core.field)?;
        let distinct = values.len();
        let buckets = values
            .into_iter()
            .map(|(value, count)| Bucket {
                label: value.to_string(),
                params: params.with_set(&self.core.param, value.to_param()),
                key: value,
                count,
            })
            .collect();
        Ok(unselected_choices(buckets, distinct, self.core.order, params))
    }
}
