//! Filtering on fields with an enumerated domain.

use tracing::trace;

use super::{parse_selected, unselected_choices, Bucket, FieldFilter, FilterCore};
use crate::choice::Choice;
use crate::error::{DecodeWarning, Result};
use crate::params::Params;
use crate::schema::ValueType;
use crate::source::DataSource;
use crate::value::FieldValue;

/// Filter for fields whose values come from a fixed `(value, label)` list.
///
/// Only domain members present in the collection are offered, labelled with
/// the human label. Count ties keep the declared domain order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoicesFilter {
    core: FilterCore,
    value_type: ValueType,
    domain: Vec<(FieldValue, String)>,
}

impl ChoicesFilter {
    pub fn new(core: FilterCore, value_type: ValueType, domain: Vec<(FieldValue, String)>) -> Self {
        Self {
            core,
            value_type,
            domain,
        }
    }

    fn position(&self, value: &FieldValue) -> Option<usize> {
        self.domain.iter().position(|(v, _)| v == value)
    }

    /// The selected domain member, as its position in the domain.
    pub fn selected(&self, params: &Params) -> Option<usize> {
        let value = parse_selected(params, &self.core.param, self.value_type)?;
        let position = self.position(&value);
        if position.is_none() {
            DecodeWarning::OutOfDomain {
                param: self.core.param.clone(),
                value: value.to_param(),
            }
            .log();
        }
        position
    }
}

impl FieldFilter for ChoicesFilter {
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
            Some(position) => {
                let (value, label) = &self.domain[position];
                trace!(field = %self.core.field, choice = %label, "narrowing on choice");
                source.narrow(collection, &self.core.field, value)
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
        if let Some(position) = self.selected(params) {
            let (_, label) = &self.domain[position];
            return Ok(vec![Choice::remove(
                label.clone(),
                params.without(&self.core.param),
            )]);
        }

        let buckets: Vec<_> = source
            .distinct_with_counts(collection, &self.core.field)?
            .into_iter()
            .filter_map(|(value, count)| {
                let position = self.position(&value)?;
                let (_, label) = &self.domain[position];
                Some(Bucket {
                    key: position,
                    label: label.clone(),
                    count,
                    params: params.with_set(&self.core.param, value.to_param()),
                })
            })
            .collect();
        let distinct = buckets.len();
        Ok(unselected_choices(buckets, distinct, self.core.order, params))
    }
}
