use assert_cmd::Command;
use httpmock::{Method::POST, MockServer};
use predicates::prelude::*;
use std::io::Write;

fn lines(reqs: &[serde_json::Value]) -> Vec<u8> {
    let mut b = Vec::new();
    for r in reqs {
        writeln!(b, "{}", serde_json::to_string(r).unwrap()).unwrap();
    }
    b
}

fn run_with_env(reqs: &[serde_json::Value], envs: &[(&str, &str)]) -> anyhow::Result<Vec<serde_json::Value>> {
    let mut cmd = Command::cargo_bin("github-projects-mcp")?;
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .env_remove("GITHUB_TOKEN_FILE")
        .env_remove("GITHUB_API_URL")
        .env_remove("GITHUB_GRAPHQL_URL");
    for (k, v) in envs {
        cmd.env(k, v);
    }
    let assert = cmd
        .arg("--log-level")
        .arg("warn")
        .write_stdin(lines(reqs))
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    Ok(stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?)
}

#[test]
fn version_flag_prints_version() {
    Command::cargo_bin("github-projects-mcp")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("github-projects-mcp "));
}

#[test]
fn initialize_then_tools_list_in_one_session() -> anyhow::Result<()> {
    let out = run_with_env(
        &[
            serde_json::json!({"jsonrpc":"2.0","method":"initialize","id":1}),
            serde_json::json!({"jsonrpc":"2.0","method":"notifications/initialized"}),
            serde_json::json!({"jsonrpc":"2.0","method":"tools/list","id":2}),
        ],
        &[],
    )?;
    // The notification gets no response line.
    assert_eq!(out.len(), 2);
    assert!(out[0]["result"]["protocolVersion"].is_string());
    let names: Vec<&str> = out[1]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(
        names,
        ["list_org_projects", "add_issue_to_project", "update_project_item_state"]
    );
    Ok(())
}

#[test]
fn tools_call_list_org_projects_happy_path() -> anyhow::Result<()> {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/graphql")
            .header("authorization", "Bearer t");
        then.status(200).json_body(serde_json::json!({
          "data": {"organization": {"projectsV2": {
            "nodes": [
              {"id":"PVT_5","title":"Roadmap","shortDescription":"","url":"u5","closed":true,"number":5,"items":{"totalCount":2}},
              {"id":"PVT_6","title":"Triage","shortDescription":"","url":"u6","closed":false,"number":6,"items":{"totalCount":0}}
            ],
            "pageInfo": {"hasNextPage": false, "endCursor": null}
          }}}
        }));
    });

    let out = run_with_env(
        &[serde_json::json!({
            "jsonrpc":"2.0","method":"tools/call","id":1,
            "params":{"name":"list_org_projects","arguments":{"org":"octo","state":"closed"}}
        })],
        &[
            ("GITHUB_TOKEN", "t"),
            ("GITHUB_API_URL", server.base_url().as_str()),
        ],
    )?;
    m.assert();
    let result = &out[0]["result"];
    assert!(result.get("isError").is_none());
    let text = result["content"][0]["text"].as_str().unwrap();
    let projects: serde_json::Value = serde_json::from_str(text)?;
    assert_eq!(projects.as_array().map(Vec::len), Some(1));
    assert_eq!(projects[0]["number"], 5);
    assert_eq!(projects[0]["closed"], true);
    Ok(())
}

#[test]
fn tools_call_parameter_error_is_an_error_result() -> anyhow::Result<()> {
    let out = run_with_env(
        &[serde_json::json!({
            "jsonrpc":"2.0","method":"tools/call","id":7,
            "params":{"name":"update_project_item_state","arguments":{"project_id":"PID"}}
        })],
        &[("GITHUB_TOKEN", "t"), ("GITHUB_API_URL", "http://127.0.0.1:1")],
    )?;
    assert!(out[0].get("error").is_none());
    assert_eq!(out[0]["result"]["isError"], true);
    assert_eq!(
        out[0]["result"]["content"][0]["text"],
        "missing required parameter: item_id"
    );
    Ok(())
}

#[test]
fn tools_call_upstream_failure_is_an_rpc_error() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/graphql");
        then.status(502).body("bad gateway");
    });

    let out = run_with_env(
        &[serde_json::json!({
            "jsonrpc":"2.0","method":"tools/call","id":3,
            "params":{"name":"list_org_projects","arguments":{"org":"octo"}}
        })],
        &[
            ("GITHUB_TOKEN", "t"),
            ("GITHUB_API_URL", server.base_url().as_str()),
        ],
    )?;
    assert_eq!(out[0]["error"]["code"], -32603);
    let msg = out[0]["error"]["message"].as_str().unwrap();
    assert!(msg.contains("failed to list organization projects"));
    assert!(msg.contains("502"));
    Ok(())
}

#[test]
fn tools_call_without_token_is_an_rpc_error() -> anyhow::Result<()> {
    let out = run_with_env(
        &[serde_json::json!({
            "jsonrpc":"2.0","method":"tools/call","id":4,
            "params":{"name":"list_org_projects","arguments":{"org":"octo"}}
        })],
        &[],
    )?;
    assert_eq!(out[0]["error"]["code"], -32603);
    assert!(out[0]["error"]["message"]
        .as_str()
        .unwrap()
        .contains("GITHUB_TOKEN"));
    Ok(())
}
