use crate::config::Config;
use crate::context::CallContext;
use crate::github::GitHub;
use crate::projects;
use crate::tools::{tool_descriptors, PROTOCOL_VERSION};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

// Minimal JSON-RPC 2.0 types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Str(String),
    Num(i64),
}

#[derive(Debug, Serialize, Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: Option<Id>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

fn rpc_error(id: Option<Id>, code: i64, message: &str, data: Option<Value>) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.into(),
            data,
        }),
        id,
    }
}

fn rpc_ok(id: Option<Id>, result: Value) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: Some(result),
        error: None,
        id,
    }
}

struct Connected {
    github: GitHub,
    timeout_secs: u64,
}

/// Dispatches JSON-RPC messages. The GitHub client is built on the first
/// `tools/call` and shared by every call after it.
#[derive(Default)]
pub struct Server {
    connected: Option<Connected>,
}

pub async fn run_stdio_server() -> anyhow::Result<()> {
    info!(
        "Starting github-projects-mcp stdio server; protocol={}",
        PROTOCOL_VERSION
    );
    let mut server = Server::default();
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut out = io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(resp) = server.handle_line(&line).await {
            let payload = serde_json::to_string(&resp)?;
            out.write_all(payload.as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await?;
        }
    }
    debug!("stdin closed; shutting down");
    Ok(())
}

impl Server {
    /// Handles one newline-delimited message. Notifications yield `None`.
    pub async fn handle_line(&mut self, line: &str) -> Option<Response> {
        let req: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => return Some(rpc_error(None, -32700, &format!("Parse error: {}", e), None)),
        };
        debug!("Received method={}", req.method);
        if req.id.is_none() {
            return None;
        }
        Some(self.dispatch(req).await)
    }

    async fn dispatch(&mut self, req: Request) -> Response {
        match req.method.as_str() {
            "initialize" => handle_initialize(req.id),
            "ping" => rpc_ok(req.id, serde_json::json!({})),
            "tools/list" => rpc_ok(req.id, serde_json::json!({ "tools": tool_descriptors() })),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            other => rpc_error(req.id, -32601, &format!("Method not found: {}", other), None),
        }
    }

    fn connect(&mut self) -> anyhow::Result<&Connected> {
        if self.connected.is_none() {
            let cfg = Config::from_env()?;
            let github = GitHub::from_config(&cfg)?;
            self.connected = Some(Connected {
                github,
                timeout_secs: cfg.timeout_secs,
            });
        }
        self.connected
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("GitHub client unavailable"))
    }

    async fn handle_tools_call(&mut self, id: Option<Id>, params: Value) -> Response {
        let parsed: Result<ToolCallParams, _> = serde_json::from_value(params);
        let Ok(call) = parsed else {
            return rpc_error(id, -32602, "Invalid params", None);
        };
        if !tool_descriptors().iter().any(|t| t.name == call.name) {
            return rpc_error(id, -32601, &format!("Tool not found: {}", call.name), None);
        }

        let conn = match self.connect() {
            Ok(c) => c,
            Err(e) => return rpc_error(id, -32603, &format!("{:#}", e), None),
        };
        let ctx = CallContext::from_timeout_secs(conn.timeout_secs);
        let github = &conn.github;
        github.refresh_credentials().await;
        let args = &call.arguments;
        let result = match call.name.as_str() {
            "list_org_projects" => projects::list_org_projects(github, &ctx, args).await,
            "add_issue_to_project" => projects::add_issue_to_project(github, &ctx, args).await,
            "update_project_item_state" => {
                projects::update_project_item_state(github, &ctx, args).await
            }
            other => return rpc_error(id, -32601, &format!("Tool not found: {}", other), None),
        };
        match result {
            Ok(v) => rpc_ok(id, v),
            Err(e) => {
                warn!("tool {} failed: {:#}", call.name, e);
                rpc_error(id, -32603, &format!("{:#}", e), None)
            }
        }
    }
}

fn handle_initialize(id: Option<Id>) -> Response {
    rpc_ok(
        id,
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": "github-projects-mcp",
                "version": env!("CARGO_PKG_VERSION"),
            }
        }),
    )
}

#[derive(Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_value(resp: Response) -> Value {
        serde_json::to_value(resp).unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_server_info() {
        let mut server = Server::default();
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"initialize","id":1}"#)
            .await
            .unwrap();
        let v = to_value(resp);
        assert_eq!(v["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(v["result"]["serverInfo"]["name"], "github-projects-mcp");
        assert_eq!(v["id"], 1);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let mut server = Server::default();
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn parse_errors_and_unknown_methods() {
        let mut server = Server::default();
        let v = to_value(server.handle_line("{nope").await.unwrap());
        assert_eq!(v["error"]["code"], -32700);

        let v = to_value(
            server
                .handle_line(r#"{"jsonrpc":"2.0","method":"resources/list","id":"a"}"#)
                .await
                .unwrap(),
        );
        assert_eq!(v["error"]["code"], -32601);
        assert_eq!(v["id"], "a");
    }

    #[tokio::test]
    async fn unknown_tool_and_bad_params_are_rpc_errors() {
        let mut server = Server::default();
        let v = to_value(
            server
                .handle_line(
                    r#"{"jsonrpc":"2.0","method":"tools/call","id":2,"params":{"name":"delete_org"}}"#,
                )
                .await
                .unwrap(),
        );
        assert_eq!(v["error"]["code"], -32601);

        let v = to_value(
            server
                .handle_line(r#"{"jsonrpc":"2.0","method":"tools/call","id":3,"params":[1]}"#)
                .await
                .unwrap(),
        );
        assert_eq!(v["error"]["code"], -32602);
    }
}
