//! Field-kind resolution: which filter kind handles a field.

use crate::error::{FacetError, Result};
use crate::filters::FilterKind;
use crate::schema::FieldMeta;

/// Pick the filter kind for a field from its metadata.
///
/// Relations win over everything, then enumerated choices, then temporal
/// types; anything else is filtered by plain values.
pub fn resolve_kind(meta: &FieldMeta) -> FilterKind {
    if let Some(relation) = &meta.relation {
        if relation.many {
            FilterKind::MultiRelation
        } else {
            FilterKind::Relation
        }
    } else if meta.has_choices() {
        FilterKind::Choices
    } else if meta.value_type.is_temporal() {
        FilterKind::Temporal
    } else {
        FilterKind::Values
    }
}

/// Check that an explicitly requested kind can work with the field.
pub fn check_kind(meta: &FieldMeta, kind: FilterKind) -> Result<()> {
    let supported = match kind {
        FilterKind::Values => meta.relation.is_none(),
        FilterKind::Choices => meta.relation.is_none() && meta.has_choices(),
        FilterKind::Relation => meta.relation.as_ref().is_some_and(|r| !r.many),
        FilterKind::MultiRelation => meta.relation.as_ref().is_some_and(|r| r.many),
        FilterKind::Temporal => meta.relation.is_none() && meta.value_type.is_temporal(),
    };
    if supported {
        Ok(())
    } else {
        Err(FacetError::Configuration(format!(
            "field `{}` cannot be filtered as {:?}",
            meta.name, kind
        )))
    }
}
