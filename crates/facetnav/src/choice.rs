//! Choices: the presentable options of a facet.

use serde::Serialize;

use crate::params::Params;

/// What following a choice does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Activates an available value.
    Add,
    /// Deactivates a current selection.
    Remove,
    /// The single value left in the collection; shown, not linked.
    OnlyChoice,
}

/// One option of a facet, with the parameter store that results from following it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub label: String,
    pub link_type: LinkType,
    /// Records left after following an ADD link. Absent for the other link types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub params: Params,
}

impl Choice {
    pub fn add(label: impl Into<String>, count: usize, params: Params) -> Self {
        Self {
            label: label.into(),
            link_type: LinkType::Add,
            count: Some(count),
            params,
        }
    }

    pub fn remove(label: impl Into<String>, params: Params) -> Self {
        Self {
            label: label.into(),
            link_type: LinkType::Remove,
            count: None,
            params,
        }
    }

    /// `params` should be the current store: there is nothing to toggle.
    pub fn only(label: impl Into<String>, params: Params) -> Self {
        Self {
            label: label.into(),
            link_type: LinkType::OnlyChoice,
            count: None,
            params,
        }
    }

    pub fn is_link(&self) -> bool {
        self.link_type != LinkType::OnlyChoice
    }

    /// Link target for this choice, e.g. `?status=open&tags=2`.
    pub fn query_string(&self) -> String {
        format!("?{}", self.params.encode())
    }
}
