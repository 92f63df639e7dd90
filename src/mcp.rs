use serde::Serialize;
use serde_json::Value;

// Prune list meta: when has_more is false/missing drop has_more and
// next_cursor, then drop meta entirely if it becomes empty.
fn prune_meta(structured: &mut Value) {
    let Some(obj) = structured.as_object_mut() else {
        return;
    };
    let Some(meta_obj) = obj.get_mut("meta").and_then(Value::as_object_mut) else {
        return;
    };

    let has_more = meta_obj
        .get("has_more")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if !has_more {
        meta_obj.remove("has_more");
        meta_obj.remove("next_cursor");
    }

    if meta_obj.is_empty() {
        obj.remove("meta");
    }
}

// Build an MCP-compliant result envelope for tools/call outputs.
// - content: always a single text block so clients can render something.
// - structuredContent: the structured JSON shape of the result.
// - isError: included only when true to keep payloads small.
pub fn mcp_wrap(mut structured: Value, text_opt: Option<String>, is_error: bool) -> Value {
    prune_meta(&mut structured);
    let text = match text_opt {
        Some(s) => s,
        None => serde_json::to_string(&structured).unwrap_or_else(|_| "{}".to_string()),
    };
    let mut obj = serde_json::json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured,
    });
    if is_error {
        if let Some(map) = obj.as_object_mut() {
            map.insert("isError".to_string(), Value::Bool(true));
        }
    }
    obj
}

/// Successful result whose text is the JSON serialization of `record`.
/// The text is written from `record` itself so keys keep declaration order.
pub fn tool_json<T: Serialize>(record: &T) -> serde_json::Result<Value> {
    let text = serde_json::to_string(record)?;
    let structured = serde_json::to_value(record)?;
    Ok(mcp_wrap(structured, Some(text), false))
}

/// Tool-level failure the caller can correct and retry.
pub fn tool_error(message: impl Into<String>) -> Value {
    let message = message.into();
    let structured = serde_json::json!({
        "error": { "code": "invalid_params", "message": message, "retriable": false }
    });
    mcp_wrap(structured, Some(message), true)
}

/// Text of the first content block, if any.
pub fn result_text(result: &Value) -> Option<&str> {
    result.get("content")?.get(0)?.get("text")?.as_str()
}

pub fn is_error(result: &Value) -> bool {
    result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
