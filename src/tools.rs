use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnnotations {
    pub title: String,
    pub read_only_hint: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
    pub annotations: ToolAnnotations,
}

pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    let list_org_projects = ToolDescriptor {
        name: "list_org_projects".into(),
        description: "List projects in a GitHub organization using the GraphQL API.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "org": {"type": "string", "description": "Organization name"},
                "state": {
                    "type": "string",
                    "description": "Filter projects by state",
                    "enum": ["open", "closed", "all"]
                },
                "page": {"type": "number", "description": "Page number for pagination (min 1)", "minimum": 1},
                "perPage": {
                    "type": "number",
                    "description": "Results per page for pagination (min 1, max 100)",
                    "minimum": 1,
                    "maximum": 100
                },
                "after": {"type": "string", "description": "Cursor from a previous call's meta.next_cursor"}
            },
            "required": ["org"]
        }),
        annotations: ToolAnnotations {
            title: "List organization projects".into(),
            read_only_hint: true,
        },
    };

    let add_issue_to_project = ToolDescriptor {
        name: "add_issue_to_project".into(),
        description: "Add an issue to a GitHub project using GraphQL API.".into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "owner": {"type": "string", "description": "Repository owner"},
                "repo": {"type": "string", "description": "Repository name"},
                "issue_number": {"type": "number", "description": "Issue number to add to project"},
                "project_id": {"type": "string", "description": "Project ID (GraphQL node ID) to add the issue to"}
            },
            "required": ["owner", "repo", "issue_number", "project_id"]
        }),
        annotations: ToolAnnotations {
            title: "Add issue to project".into(),
            read_only_hint: false,
        },
    };

    let update_project_item_state = ToolDescriptor {
        name: "update_project_item_state".into(),
        description: "Update a project item's single-select field (e.g. Status) using GraphQL API."
            .into(),
        input_schema: serde_json::json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "project_id": {"type": "string", "description": "Project ID (GraphQL node ID)"},
                "item_id": {"type": "string", "description": "Project item ID to update"},
                "field_id": {"type": "string", "description": "Field ID (status/state field) to update"},
                "value": {"type": "string", "description": "Single-select option ID to set"}
            },
            "required": ["project_id", "item_id", "field_id", "value"]
        }),
        annotations: ToolAnnotations {
            title: "Update project item state".into(),
            read_only_hint: false,
        },
    };

    vec![
        list_org_projects,
        add_issue_to_project,
        update_project_item_state,
    ]
}
