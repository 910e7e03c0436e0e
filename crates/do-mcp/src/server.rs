//! JSON-RPC 2.0 handling for the MCP stdio transport.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::arguments::Arguments;
use crate::dispatch::Dispatcher;
use crate::tools::get_tool_schemas;

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported by `initialize`.
pub const SERVER_NAME: &str = "digitalocean-mcp";

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC request structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC response structure
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// MCP server state
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Handle one decoded request. `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.method.starts_with("notifications/") {
            debug!(method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);

        if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
            return Some(JsonRpcResponse::failure(
                id,
                INVALID_REQUEST,
                "Invalid Request: unsupported jsonrpc version",
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            ),
            "tools/list" => JsonRpcResponse::success(id, get_tool_schemas()),
            "tools/call" => self.handle_tool_call(id, request.params.as_ref()).await,
            "ping" => JsonRpcResponse::success(id, json!({})),
            other => {
                debug!(method = %other, "Unknown method");
                JsonRpcResponse::failure(id, METHOD_NOT_FOUND, "Method not found")
            }
        };

        Some(response)
    }

    async fn handle_tool_call(&self, id: Value, params: Option<&Value>) -> JsonRpcResponse {
        let Some(name) = params.and_then(|p| p.get("name")).and_then(Value::as_str) else {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, "Missing tool name");
        };

        let arguments = Arguments::from_value(params.and_then(|p| p.get("arguments")));
        let output = self.dispatcher.call(name, &arguments).await;

        JsonRpcResponse::success(id, output.to_call_result())
    }

    /// Handle one raw line as read from the transport. Bytes that are not
    /// UTF-8 get a parse error like any other malformed request.
    pub async fn handle_bytes(&self, line: &[u8]) -> Option<JsonRpcResponse> {
        match std::str::from_utf8(line) {
            Ok(text) => self.handle_line(text).await,
            Err(e) => {
                warn!(error = %e, "Request line is not valid UTF-8");
                Some(JsonRpcResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        }
    }

    /// Handle one decoded line. Blank lines and notifications produce nothing.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!(error = %e, "Invalid JSON-RPC request");
                Some(JsonRpcResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        }
    }
}

/// Serve newline-delimited JSON-RPC until `reader` reaches EOF.
///
/// A malformed line is answered with an error response and the loop keeps
/// going; only stream I/O failures end it early.
///
/// # Errors
/// Returns I/O errors from the underlying streams.
pub async fn rpc_loop<R, W>(
    server: &McpServer,
    mut reader: R,
    mut writer: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }

        let Some(response) = server.handle_bytes(&line).await else {
            continue;
        };

        let mut payload = serde_json::to_string(&response)?;
        payload.push('\n');
        writer.write_all(payload.as_bytes()).await?;
        writer.flush().await?;
    }

    info!("Stdin closed, exiting RPC loop");
    Ok(())
}
