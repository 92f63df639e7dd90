//! GitHub Projects (v2) tools.
//!
//! Parameter problems come back as tool-level error results (`Ok` with
//! `isError`). Everything that goes wrong after input validation is a hard
//! failure wrapped with the operation that failed.

use crate::context::CallContext;
use crate::github::GitHub;
use crate::mcp::{mcp_wrap, tool_error, tool_json};
use crate::params::{optional_pagination, optional_str, required_int, required_str, ParamError};
use crate::types::{Project, ProjectItem, ProjectItemType, ProjectState};
use anyhow::Context;
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectsError {
    #[error("failed to get issue: {0}")]
    IssueLookup(String),
    #[error("issue node ID is nil")]
    MissingNodeId,
}

pub const LIST_PROJECTS_QUERY: &str = r#"
query ListOrgProjects($org: String!, $first: Int, $after: String) {
  organization(login: $org) {
    projectsV2(first: $first, after: $after) {
      nodes {
        id
        title
        shortDescription
        url
        closed
        number
        items { totalCount }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}
"#;

pub const ADD_ITEM_TO_PROJECT_MUTATION: &str = r#"
mutation AddItemToProject($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: {projectId: $projectId, contentId: $contentId}) {
    item { id }
  }
}
"#;

pub const UPDATE_ITEM_FIELD_VALUE_MUTATION: &str = r#"
mutation UpdateItemFieldValue($projectId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(
    input: {projectId: $projectId, itemId: $itemId, fieldId: $fieldId, value: $value}
  ) {
    projectV2Item { id }
  }
}
"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectNode {
    id: String,
    title: String,
    short_description: Option<String>,
    url: String,
    closed: bool,
    number: i64,
    items: ItemCount,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemCount {
    total_count: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectsConnection {
    nodes: Vec<ProjectNode>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Organization {
    projects_v2: ProjectsConnection,
}

#[derive(Deserialize)]
struct ListProjectsData {
    organization: Organization,
}

impl From<ProjectNode> for Project {
    fn from(n: ProjectNode) -> Self {
        Project {
            id: n.id,
            title: n.title,
            short_description: n.short_description.unwrap_or_default(),
            url: n.url,
            closed: n.closed,
            number: n.number,
            item_count: n.items.total_count,
        }
    }
}

struct ListProjectsInput {
    org: String,
    state: ProjectState,
    first: i64,
    after: Option<String>,
}

fn parse_list_input(args: &Value) -> Result<ListProjectsInput, String> {
    let org = required_str(args, "org").map_err(|e| e.to_string())?;
    let state = match optional_str(args, "state").map_err(|e| e.to_string())? {
        None => ProjectState::All,
        Some(s) if s.is_empty() => ProjectState::All,
        Some(s) => s.parse::<ProjectState>()?,
    };
    let pagination = optional_pagination(args).map_err(|e| e.to_string())?;
    let after = optional_str(args, "after")
        .map_err(|e| e.to_string())?
        .filter(|s| !s.is_empty());
    Ok(ListProjectsInput {
        org,
        state,
        first: pagination.per_page,
        after,
    })
}

/// `list_org_projects`: one page of an organization's projects, filtered
/// by `state` after the fetch. Later pages are never requested here; the
/// caller continues with `after` from `meta.next_cursor`.
pub async fn list_org_projects(
    github: &GitHub,
    ctx: &CallContext,
    args: &Value,
) -> anyhow::Result<Value> {
    let input = match parse_list_input(args) {
        Ok(i) => i,
        Err(msg) => return Ok(tool_error(msg)),
    };

    let mut variables = json!({ "org": input.org, "first": input.first });
    if let Some(after) = &input.after {
        variables["after"] = json!(after);
    }

    let data: ListProjectsData = github
        .graphql
        .execute(ctx, LIST_PROJECTS_QUERY, &variables)
        .await
        .context("failed to list organization projects")?;

    let connection = data.organization.projects_v2;
    let fetched = connection.nodes.len();
    let projects: Vec<Project> = connection
        .nodes
        .into_iter()
        .filter(|n| input.state.matches(n.closed))
        .map(Project::from)
        .collect();
    debug!(
        "list_org_projects org={} state={} kept {}/{}",
        input.org,
        input.state,
        projects.len(),
        fetched
    );

    let text = serde_json::to_string(&projects).context("failed to marshal response")?;
    let structured = json!({
        "projects": projects,
        "meta": {
            "has_more": connection.page_info.has_next_page,
            "next_cursor": connection.page_info.end_cursor,
        }
    });
    Ok(mcp_wrap(structured, Some(text), false))
}

#[derive(Deserialize)]
struct AddedItem {
    id: String,
}

#[derive(Deserialize)]
struct AddItemPayload {
    item: AddedItem,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemData {
    add_project_v2_item_by_id: AddItemPayload,
}

/// `add_issue_to_project`: resolves the issue's node ID over REST, then adds
/// it to the project. Calling twice is not deduplicated.
pub async fn add_issue_to_project(
    github: &GitHub,
    ctx: &CallContext,
    args: &Value,
) -> anyhow::Result<Value> {
    let parsed = (|| -> Result<_, ParamError> {
        Ok((
            required_str(args, "project_id")?,
            required_str(args, "owner")?,
            required_str(args, "repo")?,
            required_int(args, "issue_number")?,
        ))
    })();
    let (project_id, owner, repo, issue_number) = match parsed {
        Ok(p) => p,
        Err(e) => return Ok(tool_error(e.to_string())),
    };

    let issue = github
        .rest
        .get_issue(ctx, &owner, &repo, issue_number)
        .await
        .into_result()
        .map_err(|e| ProjectsError::IssueLookup(e.message))?;
    let node_id = issue.node_id.ok_or(ProjectsError::MissingNodeId)?;

    let variables = json!({ "projectId": project_id, "contentId": node_id });
    let data: AddItemData = github
        .graphql
        .execute(ctx, ADD_ITEM_TO_PROJECT_MUTATION, &variables)
        .await
        .context("failed to add issue to project")?;

    let item = ProjectItem {
        id: data.add_project_v2_item_by_id.item.id,
        item_type: Some(ProjectItemType::Issue),
        field_id: None,
        column_id: None,
        content_id: Some(node_id),
    };
    tool_json(&item).context("failed to marshal response")
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePayload {
    project_v2_item: AddedItem,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateItemData {
    update_project_v2_item_field_value: UpdatePayload,
}

/// `update_project_item_state`: sets a single-select field on a project
/// item. Text, number, date and iteration fields need a different value
/// shape and are not handled.
pub async fn update_project_item_state(
    github: &GitHub,
    ctx: &CallContext,
    args: &Value,
) -> anyhow::Result<Value> {
    let parsed = (|| -> Result<_, ParamError> {
        Ok((
            required_str(args, "project_id")?,
            required_str(args, "item_id")?,
            required_str(args, "field_id")?,
            required_str(args, "value")?,
        ))
    })();
    let (project_id, item_id, field_id, value) = match parsed {
        Ok(p) => p,
        Err(e) => return Ok(tool_error(e.to_string())),
    };

    let variables = json!({
        "projectId": project_id,
        "itemId": item_id,
        "fieldId": field_id,
        "value": { "singleSelectOptionId": value },
    });
    let data: UpdateItemData = github
        .graphql
        .execute(ctx, UPDATE_ITEM_FIELD_VALUE_MUTATION, &variables)
        .await
        .context("failed to update project item state")?;

    let item = ProjectItem {
        id: data.update_project_v2_item_field_value.project_v2_item.id,
        item_type: None,
        field_id: Some(field_id),
        column_id: None,
        content_id: None,
    };
    tool_json(&item).context("failed to marshal response")
}
