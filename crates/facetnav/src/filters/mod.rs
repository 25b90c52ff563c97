//! # Filters
//!
//! A filter owns one field of the model. It does two things:
//!
//! - **apply**: narrow a collection to the records matching the selection
//!   stored in the [`Params`] (or return it unchanged when nothing valid is
//!   selected). Applying only ever narrows.
//! - **choices**: enumerate the field's distinct values over a collection and
//!   turn each into a [`Choice`]:
//!
//! | Situation | Link type | Count |
//! |-----------|-----------|-------|
//! | value is selected | `Remove` | none |
//! | not selected, two or more distinct values present | `Add` | records with the value |
//! | not selected, the only distinct value present | `OnlyChoice` | none |
//!
//! ## Kinds
//!
//! | Kind | Field | Narrowing |
//! |------|-------|-----------|
//! | [`ValuesFilter`] | plain scalar | equality |
//! | [`ChoicesFilter`] | enumerated domain | equality, domain labels |
//! | [`RelationFilter`] | one related record | related id |
//! | [`MultiRelationFilter`] | set of related records | every active id (AND) |
//! | [`TemporalFilter`] | date / datetime | year → month → day ranges |
//!
//! Single-valued kinds show exactly one `Remove` choice while a value is
//! selected. The kind is picked once, when the filter set is built (see
//! [`crate::resolve`]); [`Filter`] is the enum the filter set stores.
//!
//! ## Ordering
//!
//! Choices are ordered by descending count, ties broken by the natural order
//! of the value (declared order for enumerated domains). With
//! [`ChoiceOrder::Value`] the natural order alone is used.

use serde::{Deserialize, Serialize};

use crate::choice::Choice;
use crate::error::{DecodeWarning, Result};
use crate::params::Params;
use crate::schema::ValueType;
use crate::source::DataSource;
use crate::value::FieldValue;

pub mod choices;
pub mod multi_relation;
pub mod relation;
pub mod temporal;
pub mod values;

pub use choices::ChoicesFilter;
pub use multi_relation::MultiRelationFilter;
pub use relation::RelationFilter;
pub use temporal::{Granularity, TemporalFilter};
pub use values::ValuesFilter;

/// The family a filter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Values,
    Choices,
    Relation,
    MultiRelation,
    Temporal,
}

/// How choices of one filter are sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceOrder {
    /// Descending count, ties by natural value order.
    #[default]
    Count,
    /// Natural value order only.
    Value,
}

/// Per-field options. Unset options fall back to [`crate::config::FacetConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Parameter key; defaults to the field name.
    pub param: Option<String>,
    /// Display label; defaults to the field's capitalised verbose name.
    pub label: Option<String>,
    pub order: Option<ChoiceOrder>,
    /// Finest granularity offered by temporal filters.
    pub max_depth: Option<Granularity>,
}

/// State every filter kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCore {
    pub field: String,
    pub param: String,
    pub label: String,
    pub order: ChoiceOrder,
}

/// The capability shared by all filter kinds.
pub trait FieldFilter {
    fn core(&self) -> &FilterCore;

    /// Narrow `collection` to the records matching the selection in `params`.
    fn apply<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<S::Collection>;

    /// Choices for this filter over `collection`.
    fn choices<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<Vec<Choice>>;
}

/// A filter of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Values(ValuesFilter),
    Choices(ChoicesFilter),
    Relation(RelationFilter),
    MultiRelation(MultiRelationFilter),
    Temporal(TemporalFilter),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            Filter::Values($f) => $body,
            Filter::Choices($f) => $body,
            Filter::Relation($f) => $body,
            Filter::MultiRelation($f) => $body,
            Filter::Temporal($f) => $body,
        }
    };
}

impl Filter {
    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::Values(_) => FilterKind::Values,
            Filter::Choices(_) => FilterKind::Choices,
            Filter::Relation(_) => FilterKind::Relation,
            Filter::MultiRelation(_) => FilterKind::MultiRelation,
            Filter::Temporal(_) => FilterKind::Temporal,
        }
    }

    pub fn field(&self) -> &str {
        &self.core().field
    }

    pub fn param(&self) -> &str {
        &self.core().param
    }

    pub fn label(&self) -> &str {
        &self.core().label
    }

    /// Every parameter key this filter reads.
    pub fn param_keys(&self) -> Vec<String> {
        match self {
            Filter::Temporal(f) => f.param_keys(),
            _ => vec![self.param().to_string()],
        }
    }
}

impl FieldFilter for Filter {
    fn core(&self) -> &FilterCore {
        dispatch!(self, f => f.core())
    }

    fn apply<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<S::Collection> {
        dispatch!(self, f => f.apply(source, collection, params))
    }

    fn choices<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<Vec<Choice>> {
        dispatch!(self, f => f.choices(source, collection, params))
    }
}

/// Parse the first value stored under `param`; unparseable values count as unset.
pub(crate) fn parse_selected(
    params: &Params,
    param: &str,
    value_type: ValueType,
) -> Option<FieldValue> {
    let raw = params.first(param)?;
    let parsed = FieldValue::parse(raw, value_type);
    if parsed.is_none() {
        DecodeWarning::Unparseable {
            param: param.to_string(),
            value: raw.to_string(),
        }
        .log();
    }
    parsed
}

/// One candidate value of a facet, before classification.
#[derive(Debug, Clone)]
pub(crate) struct Bucket<K> {
    /// Natural sort key
    pub key: K,
    pub label: String,
    pub count: usize,
    /// Parameter store selecting this value
    pub params: Params,
}

pub(crate) fn sort_buckets<K: Ord>(buckets: &mut [Bucket<K>], order: ChoiceOrder) {
    match order {
        ChoiceOrder::Count => {
            buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)))
        }
        ChoiceOrder::Value => buckets.sort_by(|a, b| a.key.cmp(&b.key)),
    }
}

/// Turn unselected candidates into `Add` choices, or a single `OnlyChoice`.
///
/// `distinct` is the number of distinct values present in the evaluated
/// collection, selected ones included.
pub(crate) fn unselected_choices<K: Ord>(
    mut buckets: Vec<Bucket<K>>,
    distinct: usize,
    order: ChoiceOrder,
    current: &Params,
) -> Vec<Choice> {
    sort_buckets(&mut buckets, order);
    buckets
        .into_iter()
        .map(|b| {
            if distinct > 1 {
                Choice::add(b.label, b.count, b.params)
            } else {
                Choice::only(b.label, current.clone())
            }
        })
        .collect()
}
