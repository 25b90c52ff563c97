//! # Facetnav
//!
//! Facetnav is a **faceted navigation engine**. Given a collection of records, a
//! model description and the parameters of the current request, it narrows the
//! collection and tells a renderer which links to draw for every filtered field:
//! select this value (with how many records it leaves), clear that one, or just
//! show the only value left.
//!
//! It owns no storage and no HTML. Records are reached through a [`DataSource`]
//! and choices come back as plain serializable data.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  FilterSet (filterset.rs)                                   │
//! │  - Builds filters from field specs + model metadata         │
//! │  - apply_all / render_all / evaluate, with rebasing         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Filters (filters/*.rs)                                     │
//! │  - One kind per field shape: values, choices, relation,     │
//! │    multi-relation, temporal                                 │
//! │  - apply narrows, choices enumerates                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  DataSource (source/)                                       │
//! │  - narrow, narrow_range, distinct_with_counts, labels       │
//! │  - MemorySource for tests and small datasets                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Request State
//!
//! The whole navigation state lives in a [`Params`] store, which encodes to and
//! decodes from a URL query string. Every [`Choice`] carries the store a click
//! would lead to, so links are stateless.
//!
//! Malformed or stale parameters never fail a request: the offending filter
//! behaves as if nothing were selected and logs the reason at `debug` level.
//!
//! ## Example
//!
//! ```
//! use facetnav::{FieldFilterSpec, FilterSet, FieldMeta, ModelMeta, Params, ValueType};
//! use facetnav::source::memory::{MemorySource, Record};
//!
//! let model = ModelMeta::new("Book")
//!     .field(FieldMeta::new("language", ValueType::Text))
//!     .field(FieldMeta::new("published", ValueType::Date));
//! let source = MemorySource::new(vec![
//!     Record::new(1).with("language", "en"),
//!     Record::new(2).with("language", "fr"),
//!     Record::new(3).with("language", "en"),
//! ]);
//!
//! let filters = FilterSet::build(&["language".into()], &model)?;
//! let eval = filters.evaluate(&source, &source.all(), &Params::decode("language=en"))?;
//! assert_eq!(eval.total, 2);
//! assert_eq!(eval.filters[0].choices[0].query_string(), "?");
//! # Ok::<(), facetnav::FacetError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`params`]: the request's parameter store and its query-string codec
//! - [`choice`]: link types and choices
//! - [`filters`]: the five filter kinds behind [`Filter`]
//! - [`filterset`]: building and evaluating an ordered set of filters
//! - [`resolve`]: picking a filter kind from field metadata
//! - [`schema`] / [`value`]: model metadata and field values
//! - [`source`]: the storage abstraction
//! - [`config`]: file-backed defaults

pub mod choice;
pub mod config;
pub mod error;
pub mod filters;
pub mod filterset;
pub mod params;
pub mod resolve;
pub mod schema;
pub mod source;
pub mod value;

pub use choice::{Choice, LinkType};
pub use config::{FacetConfig, RebaseMode};
pub use error::{DecodeWarning, FacetError, Result};
pub use filters::{ChoiceOrder, FieldFilter, Filter, FilterKind, FilterOptions, Granularity};
pub use filterset::{Evaluation, FieldFilterSpec, FilterSet, RenderedFilter};
pub use params::Params;
pub use schema::{FieldMeta, ModelMeta, ValueType};
pub use source::DataSource;
pub use value::{FieldValue, RecordId};
