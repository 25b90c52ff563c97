//! # Filter Set
//!
//! A [`FilterSet`] is the ordered list of filters declared for a model. It is
//! built once from field specs and model metadata and can then serve any
//! number of requests: it only holds owned configuration, and every request
//! brings its own [`Params`] and collection.
//!
//! ## Pipeline
//!
//! 1. **Build**: each [`FieldFilterSpec`] is resolved to a filter kind
//!    ([`crate::resolve`]) and turned into a [`Filter`], in declaration order.
//! 2. **Apply**: [`FilterSet::apply_all`] folds every filter's `apply` over the
//!    collection, in declaration order.
//! 3. **Render**: [`FilterSet::render_all`] computes each filter's choices on
//!    its rebased collection and returns them in declaration order.
//!
//! ## Rebasing
//!
//! Facet counts answer "what would I get if I changed only this field". With
//! the default [`RebaseMode::ExcludeSelf`] a filter's choices are counted on
//! the base collection narrowed by every *other* filter. The alternatives,
//! selected through [`FacetConfig::rebase`], count on the collection narrowed
//! by the filters declared before this one ([`RebaseMode::Preceding`]) or by
//! all filters ([`RebaseMode::Cumulative`]).
//!
//! Narrowings are shared between filters: the prefix of filters `0..i` is
//! applied once and extended for each filter.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::choice::{Choice, LinkType};
use crate::config::{FacetConfig, RebaseMode};
use crate::error::{FacetError, Result};
use crate::filters::{
    ChoicesFilter, FieldFilter, Filter, FilterCore, FilterKind, FilterOptions, MultiRelationFilter,
    RelationFilter, TemporalFilter, ValuesFilter,
};
use crate::params::Params;
use crate::resolve::{check_kind, resolve_kind};
use crate::schema::{FieldMeta, ModelMeta};
use crate::source::DataSource;

/// Declaration of one filtered field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilterSpec {
    pub field: String,
    /// Explicit kind; resolved from metadata when absent.
    #[serde(default)]
    pub kind: Option<FilterKind>,
    #[serde(default)]
    pub options: FilterOptions,
}

impl FieldFilterSpec {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: None,
            options: FilterOptions::default(),
        }
    }

    pub fn kind(mut self, kind: FilterKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }
}

impl From<&str> for FieldFilterSpec {
    fn from(field: &str) -> Self {
        Self::new(field)
    }
}

/// The choices of one filter, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFilter {
    pub field: String,
    pub param: String,
    pub label: String,
    pub kind: FilterKind,
    pub choices: Vec<Choice>,
}

impl RenderedFilter {
    fn of_type(&self, link_type: LinkType) -> impl Iterator<Item = &Choice> {
        self.choices.iter().filter(move |c| c.link_type == link_type)
    }

    pub fn remove_choices(&self) -> impl Iterator<Item = &Choice> {
        self.of_type(LinkType::Remove)
    }

    pub fn add_choices(&self) -> impl Iterator<Item = &Choice> {
        self.of_type(LinkType::Add)
    }

    pub fn only_choices(&self) -> impl Iterator<Item = &Choice> {
        self.of_type(LinkType::OnlyChoice)
    }
}

/// The narrowed collection together with every filter's choices.
#[derive(Debug, Clone)]
pub struct Evaluation<C> {
    pub collection: C,
    /// Records in `collection`, as reported by the data source.
    pub total: usize,
    pub filters: Vec<RenderedFilter>,
}

/// Ordered filters over one model.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    filters: Vec<Filter>,
    rebase: RebaseMode,
}

impl FilterSet {
    /// Build with the default configuration.
    pub fn build(specs: &[FieldFilterSpec], model: &ModelMeta) -> Result<Self> {
        Self::build_with_config(specs, model, &FacetConfig::default())
    }

    pub fn build_with_config(
        specs: &[FieldFilterSpec],
        model: &ModelMeta,
        config: &FacetConfig,
    ) -> Result<Self> {
        let mut filters = Vec::with_capacity(specs.len());
        let mut keys = HashSet::new();
        for spec in specs {
            let meta = model.get_field(&spec.field).ok_or_else(|| {
                FacetError::UnknownField(format!("{}.{}", model.name, spec.field))
            })?;
            let kind = match spec.kind {
                Some(kind) => {
                    check_kind(meta, kind)?;
                    kind
                }
                None => resolve_kind(meta),
            };
            let filter = build_filter(spec, meta, kind, config);
            for key in filter.param_keys() {
                if !keys.insert(key.clone()) {
                    return Err(FacetError::Configuration(format!(
                        "parameter `{key}` is used by more than one filter"
                    )));
                }
            }
            debug!(field = %spec.field, ?kind, param = %filter.param(), "built filter");
            filters.push(filter);
        }
        Ok(Self {
            filters,
            rebase: config.rebase,
        })
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn rebase(&self) -> RebaseMode {
        self.rebase
    }

    /// Apply every filter in declaration order.
    pub fn apply_all<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<S::Collection> {
        self.apply_range(source, collection.clone(), params, 0..self.filters.len())
    }

    fn apply_range<S: DataSource>(
        &self,
        source: &S,
        collection: S::Collection,
        params: &Params,
        range: std::ops::Range<usize>,
    ) -> Result<S::Collection> {
        self.filters[range]
            .iter()
            .try_fold(collection, |acc, f| f.apply(source, &acc, params))
    }

    /// Choices of every filter, in declaration order.
    pub fn render_all<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<Vec<RenderedFilter>> {
        Ok(self.evaluate(source, collection, params)?.filters)
    }

    /// Narrow the collection and render every filter in one pass.
    pub fn evaluate<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<Evaluation<S::Collection>> {
        let n = self.filters.len();
        let mut prefix = collection.clone();
        let mut rebased = Vec::with_capacity(n);
        for (i, filter) in self.filters.iter().enumerate() {
            match self.rebase {
                RebaseMode::ExcludeSelf => {
                    rebased.push(self.apply_range(source, prefix.clone(), params, i + 1..n)?)
                }
                RebaseMode::Preceding => rebased.push(prefix.clone()),
                RebaseMode::Cumulative => {}
            }
            prefix = filter.apply(source, &prefix, params)?;
        }
        if self.rebase == RebaseMode::Cumulative {
            rebased = vec![prefix.clone(); n];
        }

        let mut filters = Vec::with_capacity(n);
        for (filter, base) in self.filters.iter().zip(&rebased) {
            filters.push(RenderedFilter {
                field: filter.field().to_string(),
                param: filter.param().to_string(),
                label: filter.label().to_string(),
                kind: filter.kind(),
                choices: filter.choices(source, base, params)?,
            });
        }
        let total = source.count(&prefix)?;
        debug!(total, filters = n, "evaluated filter set");
        Ok(Evaluation {
            collection: prefix,
            total,
            filters,
        })
    }
}

fn build_filter(
    spec: &FieldFilterSpec,
    meta: &FieldMeta,
    kind: FilterKind,
    config: &FacetConfig,
) -> Filter {
    let options = &spec.options;
    let core = FilterCore {
        field: meta.name.clone(),
        param: options.param.clone().unwrap_or_else(|| meta.name.clone()),
        label: options
            .label
            .clone()
            .unwrap_or_else(|| meta.display_label()),
        order: options.order.unwrap_or(config.order),
    };
    let model = || {
        meta.relation
            .as_ref()
            .map(|r| r.model.clone())
            .unwrap_or_default()
    };
    match kind {
        FilterKind::Values => Filter::Values(ValuesFilter::new(core, meta.value_type)),
        FilterKind::Choices => Filter::Choices(ChoicesFilter::new(
            core,
            meta.value_type,
            meta.choices.clone(),
        )),
        FilterKind::Relation => Filter::Relation(RelationFilter::new(core, model())),
        FilterKind::MultiRelation => {
            Filter::MultiRelation(MultiRelationFilter::new(core, model()))
        }
        FilterKind::Temporal => Filter::Temporal(TemporalFilter::new(
            core,
            options.max_depth.unwrap_or(config.temporal_depth),
        )),
    }
}
