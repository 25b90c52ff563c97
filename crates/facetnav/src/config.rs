//! # Configuration
//!
//! Defaults shared by every filter of a filter set, loaded with [`confique`]
//! from a TOML file layered over compiled defaults. Per-field
//! [`crate::filters::FilterOptions`] override them.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `rebase` | `exclude_self` | Collection each filter's choices are counted on |
//! | `order` | `count` | Choice ordering: `count` (descending) or `value` |
//! | `temporal_depth` | `day` | Finest granularity of date filters: `year`, `month`, `day` |
//!
//! ```toml
//! rebase = "preceding"
//! order = "value"
//! temporal_depth = "month"
//! ```

use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::filters::temporal::Granularity;
use crate::filters::ChoiceOrder;

/// Which collection a filter's choices are computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebaseMode {
    /// The base collection narrowed by every other filter's selection.
    #[default]
    ExcludeSelf,
    /// The base collection narrowed by the filters declared before this one.
    Preceding,
    /// The fully narrowed collection, every filter applied.
    Cumulative,
}

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FacetConfig {
    #[config(default = "exclude_self")]
    pub rebase: RebaseMode,

    #[config(default = "count")]
    pub order: ChoiceOrder,

    #[config(default = "day")]
    pub temporal_depth: Granularity,
}

impl Default for FacetConfig {
    fn default() -> Self {
        Self {
            rebase: RebaseMode::ExcludeSelf,
            order: ChoiceOrder::Count,
            temporal_depth: Granularity::Day,
        }
    }
}

impl FacetConfig {
    /// Load settings from a TOML file, falling back to defaults for missing keys.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::builder().file(path.as_ref()).load()?)
    }
}
