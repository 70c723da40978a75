//! MCP (Model Context Protocol) server over stdio
//!
//! One JSON-RPC 2.0 message per line. Fetch failures and malformed tool
//! arguments are ordinary tool results; only unparseable lines, unknown
//! methods and unknown tools produce JSON-RPC errors.

use docscout::{Tool, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;

/// Incoming JSON-RPC message; `id` is absent on notifications
#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Parameters of `tools/call`; a missing name is an unknown tool
#[derive(Debug, Default, Deserialize)]
struct CallParams {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct Reply {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Result(Value),
    Error(RpcError),
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

impl Reply {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            outcome: Outcome::Result(result),
        }
    }

    fn err(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            outcome: Outcome::Error(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Dispatches MCP methods onto the documentation tools
struct McpServer {
    tool: Tool,
}

impl McpServer {
    fn new(tool: Tool) -> Self {
        Self { tool }
    }

    /// Handle one message; notifications get no reply
    async fn dispatch(&self, message: Message) -> Option<Reply> {
        if message.id.is_none() && message.method.starts_with("notifications/") {
            debug!(method = %message.method, "Notification");
            return None;
        }

        let Message { id, method, params } = message;
        let reply = match method.as_str() {
            "initialize" => Reply::ok(id, self.initialize()),
            "tools/list" => Reply::ok(id, json!({ "tools": self.tool.definitions() })),
            "tools/call" => self.call_tool(id, params).await,
            other => Reply::err(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        };
        Some(reply)
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": "docscout",
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn call_tool(&self, id: Option<Value>, params: Value) -> Reply {
        let params: CallParams = serde_json::from_value(params).unwrap_or_else(|e| {
            debug!(error = %e, "Unreadable tools/call params");
            CallParams::default()
        });

        match self.tool.call(&params.name, params.arguments).await {
            Ok(text) => Reply::ok(
                id,
                json!({ "content": [{ "type": "text", "text": text }] }),
            ),
            Err(err @ ToolError::UnknownTool(_)) => {
                Reply::err(id, METHOD_NOT_FOUND, err.to_string())
            }
        }
    }
}

fn write_reply(out: &mut impl Write, reply: &Reply) {
    match serde_json::to_string(reply) {
        Ok(line) => {
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
        Err(e) => warn!(error = %e, "Failed to serialize reply"),
    }
}

/// Serve MCP requests from stdin until it closes
pub async fn run_server(tool: Tool) {
    let server = McpServer::new(tool);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    info!("docscout MCP server listening on stdio");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Error reading stdin");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Message>(&line) {
            Ok(message) => server.dispatch(message).await,
            Err(e) => Some(Reply::err(None, PARSE_ERROR, format!("Parse error: {e}"))),
        };
        if let Some(reply) = reply {
            write_reply(&mut stdout, &reply);
        }
    }
}
