use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A GitHub Project (v2) as returned by `list_org_projects`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub url: String,
    pub closed: bool,
    pub number: i64,
    /// `items.totalCount` at query time.
    pub item_count: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectItemType {
    Issue,
}

/// Sparse view of a project item; only fields relevant to the producing
/// tool are set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ProjectItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

/// `state` filter of `list_org_projects`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectState {
    Open,
    Closed,
    #[default]
    All,
}

impl ProjectState {
    pub fn matches(self, closed: bool) -> bool {
        match self {
            ProjectState::All => true,
            ProjectState::Closed => closed,
            ProjectState::Open => !closed,
        }
    }
}

impl FromStr for ProjectState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ProjectState::Open),
            "closed" => Ok(ProjectState::Closed),
            "all" => Ok(ProjectState::All),
            other => Err(format!(
                "parameter state must be one of open, closed, all (got {})",
                other
            )),
        }
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectState::Open => "open",
            ProjectState::Closed => "closed",
            ProjectState::All => "all",
        })
    }
}
