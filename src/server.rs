//! Tool-calling server: newline-delimited JSON-RPC 2.0 over a byte stream.
//! stdout carries the protocol, so everything else goes through `log`.

use crate::error::{CanvasError, Result};
use crate::ir::Archetype;
use crate::llm::TextGenerator;
use crate::notes::TaskNote;
use crate::service::{CanvasRequest, CanvasService};
use crate::store::Vault;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::{self, BufRead, Write};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "vault-canvas";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub struct ToolServer<'a, V: Vault> {
    service: &'a CanvasService<V>,
    generator: Option<&'a dyn TextGenerator>,
}

impl<'a, V: Vault> ToolServer<'a, V> {
    /// Without a generator, `create_canvas` always uses text extraction.
    pub fn new(service: &'a CanvasService<V>, generator: Option<&'a dyn TextGenerator>) -> Self {
        Self { service, generator }
    }

    /// Reads requests line by line until EOF, writing one response line per request.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> io::Result<()> {
        info!("tool server ready");
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line) {
                writeln!(output, "{response}")?;
                output.flush()?;
            }
        }
        info!("input closed, shutting down");
        Ok(())
    }

    /// One request in, at most one response out. Notifications get no reply.
    pub fn handle_line(&self, line: &str) -> Option<Value> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(err) => return Some(error_response(Value::Null, RpcError::new(PARSE_ERROR, err.to_string()))),
        };
        let id = message.get("id").cloned();
        let Some(method) = message.get("method").and_then(Value::as_str) else {
            return Some(error_response(
                id.unwrap_or(Value::Null),
                RpcError::new(INVALID_REQUEST, "missing method"),
            ));
        };
        let params = message.get("params").cloned().unwrap_or(Value::Null);
        debug!("<- {method}");

        let result = self.dispatch(method, params);
        let id = id?;
        Some(match result {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err(err) => error_response(id, err),
        })
    }

    fn dispatch(&self, method: &str, params: Value) -> std::result::Result<Value, RpcError> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
            })),
            "notifications/initialized" | "initialized" => Ok(Value::Null),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({"tools": tool_definitions()})),
            "tools/call" => {
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RpcError::new(INVALID_PARAMS, "tools/call needs a tool name"))?;
                let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                if !TOOL_NAMES.contains(&name) {
                    return Err(RpcError::new(INVALID_PARAMS, format!("unknown tool: {name}")));
                }
                info!("tool call {name}");
                Ok(match self.call_tool(name, arguments) {
                    Ok(payload) => tool_result(&payload, false),
                    Err(err) => {
                        warn!("tool {name} failed: {err}");
                        tool_result(&Value::String(err.to_string()), true)
                    }
                })
            }
            other => Err(RpcError::new(METHOD_NOT_FOUND, format!("method not found: {other}"))),
        }
    }

    fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        match name {
            "create_canvas" => {
                let args: CreateCanvasArgs = from_arguments(arguments)?;
                let request = CanvasRequest {
                    archetype: parse_archetype(args.archetype.as_deref())?,
                    name: args.name,
                    folder: args.folder,
                    description: args.description,
                };
                let outcome = match self.generator {
                    Some(generator) if args.use_model => self.service.generate_canvas(generator, &request)?,
                    _ => self.service.create_canvas(&request)?,
                };
                Ok(serde_json::to_value(outcome)?)
            }
            "create_task_note" => {
                let args: TaskNoteArgs = from_arguments(arguments)?;
                let saved = self.service.create_task_note(&args.note, args.overwrite)?;
                Ok(serde_json::to_value(saved)?)
            }
            "list_notes" => {
                let args: FolderArgs = from_arguments(arguments)?;
                let entries = self.service.list_notes(args.folder.as_deref())?;
                Ok(serde_json::to_value(entries)?)
            }
            "read_note" => {
                let args: PathArgs = from_arguments(arguments)?;
                Ok(Value::String(self.service.read_note(&args.path)?))
            }
            "preview_layout" => {
                let args: PreviewArgs = from_arguments(arguments)?;
                let archetype = parse_archetype(args.archetype.as_deref())?
                    .unwrap_or_else(|| Archetype::detect(&args.description));
                Ok(serde_json::to_value(self.service.layout_from_text(archetype, &args.description))?)
            }
            other => Err(CanvasError::InvalidRequest(format!("unknown tool: {other}"))),
        }
    }
}

const TOOL_NAMES: [&str; 5] = ["create_canvas", "create_task_note", "list_notes", "read_note", "preview_layout"];

pub fn tool_definitions() -> Value {
    let archetype = json!({
        "type": "string",
        "enum": ["taskboard", "riskmatrix", "mindmap", "personnel"],
        "description": "Diagram shape; detected from the description when omitted"
    });
    json!([
        {
            "name": "create_canvas",
            "description": "Create or update a canvas diagram from a free-text description",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "description": {"type": "string"},
                    "name": {"type": "string"},
                    "archetype": archetype,
                    "folder": {"type": "string"},
                    "useModel": {"type": "boolean", "description": "Ask the language model for content (default true)"}
                },
                "required": ["description"]
            }
        },
        {
            "name": "create_task_note",
            "description": "Write a markdown task note with frontmatter",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "description": {"type": "string"},
                    "status": {"type": "string"},
                    "priority": {"type": "string", "enum": ["low", "medium", "high"]},
                    "due": {"type": "string"},
                    "overwrite": {"type": "boolean"}
                },
                "required": ["title"]
            }
        },
        {
            "name": "list_notes",
            "description": "List markdown notes in a vault folder",
            "inputSchema": {"type": "object", "properties": {"folder": {"type": "string"}}}
        },
        {
            "name": "read_note",
            "description": "Read a note by vault-relative path",
            "inputSchema": {
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }
        },
        {
            "name": "preview_layout",
            "description": "Lay out a description without saving and return the canvas JSON",
            "inputSchema": {
                "type": "object",
                "properties": {"description": {"type": "string"}, "archetype": archetype},
                "required": ["description"]
            }
        }
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCanvasArgs {
    description: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    archetype: Option<String>,
    #[serde(default)]
    folder: Option<String>,
    #[serde(default = "default_true")]
    use_model: bool,
}

#[derive(Debug, Deserialize)]
struct TaskNoteArgs {
    #[serde(flatten)]
    note: TaskNote,
    #[serde(default)]
    overwrite: bool,
}

#[derive(Debug, Deserialize)]
struct FolderArgs {
    #[serde(default)]
    folder: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PathArgs {
    path: String,
}

#[derive(Debug, Deserialize)]
struct PreviewArgs {
    description: String,
    #[serde(default)]
    archetype: Option<String>,
}

fn default_true() -> bool {
    true
}

fn from_arguments<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|err| CanvasError::InvalidRequest(err.to_string()))
}

fn parse_archetype(raw: Option<&str>) -> Result<Option<Archetype>> {
    raw.map(|name| name.parse().map_err(CanvasError::InvalidRequest))
        .transpose()
}

fn tool_result(payload: &Value, is_error: bool) -> Value {
    let text = match payload {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    };
    json!({"content": [{"type": "text", "text": text}], "isError": is_error})
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": error.code, "message": error.message},
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::MemoryVault;

    fn service() -> CanvasService<MemoryVault> {
        CanvasService::new(Config::default(), MemoryVault::new())
    }

    fn call(server: &ToolServer<'_, MemoryVault>, id: u64, tool: &str, arguments: Value) -> Value {
        let request = json!({
            "jsonrpc": "2.0", "id": id, "method": "tools/call",
            "params": {"name": tool, "arguments": arguments}
        });
        server.handle_line(&request.to_string()).unwrap()
    }

    fn text_of(response: &Value) -> &str {
        response["result"]["content"][0]["text"].as_str().unwrap()
    }

    #[test]
    fn handshake_and_listing() {
        let service = service();
        let server = ToolServer::new(&service, None);
        let init = server
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .unwrap();
        assert_eq!(init["result"]["serverInfo"]["name"], SERVER_NAME);
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none());

        let tools = server.handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).unwrap();
        let names: Vec<&str> = tools["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, TOOL_NAMES);
    }

    #[test]
    fn protocol_errors() {
        let service = service();
        let server = ToolServer::new(&service, None);
        let garbage = server.handle_line("{not json").unwrap();
        assert_eq!(garbage["error"]["code"], PARSE_ERROR);
        assert_eq!(garbage["id"], Value::Null);

        let unknown = server.handle_line(r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#).unwrap();
        assert_eq!(unknown["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(unknown["id"], "a");

        let no_tool = call(&server, 3, "delete_vault", json!({}));
        assert_eq!(no_tool["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn tool_failures_are_results() {
        let service = service();
        let server = ToolServer::new(&service, None);
        let escaped = call(&server, 1, "read_note", json!({"path": "../../etc/passwd"}));
        assert_eq!(escaped["result"]["isError"], true);
        assert!(text_of(&escaped).contains("escapes the vault root"));

        let missing_arg = call(&server, 2, "read_note", json!({}));
        assert_eq!(missing_arg["result"]["isError"], true);

        let bad_shape = call(&server, 3, "preview_layout", json!({"description": "x", "archetype": "pie"}));
        assert!(text_of(&bad_shape).contains("unknown archetype"));
    }

    #[test]
    fn notes_round_trip_through_tools() {
        let service = service();
        let server = ToolServer::new(&service, None);
        let created = call(&server, 1, "create_task_note", json!({"title": "Call vendor", "priority": "high"}));
        assert_eq!(created["result"]["isError"], false);
        let again = call(&server, 2, "create_task_note", json!({"title": "Call vendor"}));
        assert_eq!(again["result"]["isError"], true);

        let listed = call(&server, 3, "list_notes", json!({}));
        let entries: Value = serde_json::from_str(text_of(&listed)).unwrap();
        assert_eq!(entries[0]["path"], "Tasks/Call-vendor.md");

        let read = call(&server, 4, "read_note", json!({"path": "Tasks/Call-vendor.md"}));
        assert!(text_of(&read).contains("priority: high"));
    }

    #[test]
    fn create_canvas_without_model_uses_extraction() {
        let service = service();
        let server = ToolServer::new(&service, None);
        let response = call(
            &server,
            1,
            "create_canvas",
            json!({"description": "Server outage - high impact, likely", "archetype": "risk", "name": "Risks"}),
        );
        let outcome: Value = serde_json::from_str(text_of(&response)).unwrap();
        assert_eq!(outcome["path"], "Canvases/Risks.canvas");
        assert_eq!(outcome["archetype"], "riskmatrix");
        assert_eq!(outcome["nodeCount"], 10);
    }

    #[test]
    fn create_canvas_prefers_the_model() {
        let service = service();
        let generator = |_: &str, _: &str| -> Result<String> {
            Ok(r#"{"nodes": [{"id": "n", "text": "From model"}], "edges": []}"#.to_string())
        };
        let server = ToolServer::new(&service, Some(&generator));
        let response = call(&server, 1, "create_canvas", json!({"description": "Ideas", "archetype": "mindmap"}));
        let outcome: Value = serde_json::from_str(text_of(&response)).unwrap();
        assert_eq!(outcome["nodeCount"], 1);

        let skipped = call(
            &server,
            2,
            "create_canvas",
            json!({"description": "Ideas\nOne", "archetype": "mindmap", "useModel": false, "name": "Local"}),
        );
        let outcome: Value = serde_json::from_str(text_of(&skipped)).unwrap();
        assert_eq!(outcome["nodeCount"], 2);
    }

    #[test]
    fn serve_writes_one_line_per_request() {
        let service = service();
        let server = ToolServer::new(&service, None);
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"preview_layout","arguments":{"description":"Root\nAlpha\n  Alpha one"}}}"#,
            "\n"
        );
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).unwrap();
        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        let graph: Value = serde_json::from_str(text_of(&lines[1])).unwrap();
        assert_eq!(graph["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(graph["edges"].as_array().unwrap().len(), 2);
    }
}
