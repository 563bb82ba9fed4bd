//! MCP method handling and the newline-delimited stdio loop.

use std::io;

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::dispatch::ToolDispatcher;
use super::protocol::{
    self, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JsonRpcRequest, METHOD_NOT_FOUND,
    PARSE_ERROR,
};
use super::tools::catalogue;

/// Protocol revision advertised when the client does not name one.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name reported during `initialize`.
pub const SERVER_NAME: &str = "mcp-bitbucket";

/// An MCP server exposing Bitbucket tools.
pub struct McpServer {
    dispatcher: ToolDispatcher,
}

impl McpServer {
    /// Wraps a dispatcher.
    #[must_use]
    pub const fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Handles one decoded request, returning the response to send, if any.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<Value> {
        let notification = request.is_notification();
        let JsonRpcRequest { method, id, params } = request;
        match method.as_str() {
            "initialize" => {
                let version = params
                    .as_ref()
                    .and_then(|value| value.get("protocolVersion"))
                    .and_then(Value::as_str)
                    .unwrap_or(PROTOCOL_VERSION);
                Some(protocol::response(
                    id,
                    json!({
                        "protocolVersion": version,
                        "serverInfo": {
                            "name": SERVER_NAME,
                            "version": env!("CARGO_PKG_VERSION"),
                        },
                        "capabilities": { "tools": {} },
                    }),
                ))
            }
            "notifications/initialized" | "initialized" => None,
            "ping" => Some(protocol::response(id, json!({}))),
            "tools/list" => Some(protocol::response(id, json!({ "tools": catalogue() }))),
            "tools/call" => Some(self.call_tool(id, params.as_ref()).await),
            _ if notification => None,
            other => Some(protocol::error(
                id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {other}"),
            )),
        }
    }

    async fn call_tool(&self, id: Option<Value>, params: Option<&Value>) -> Value {
        let Some(params) = params.and_then(Value::as_object) else {
            return protocol::error(id, INVALID_PARAMS, "params must be an object");
        };
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return protocol::error(id, INVALID_PARAMS, "params.name must be a string");
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        tracing::debug!(tool = name, "tools/call");
        let outcome = self.dispatcher.call(name, &arguments).await;
        match serde_json::to_value(&outcome) {
            Ok(result) => protocol::response(id, result),
            Err(error) => protocol::error(
                id,
                INTERNAL_ERROR,
                &format!("failed to encode tool result: {error}"),
            ),
        }
    }

    /// Handles one raw frame.
    pub async fn handle_frame(&self, frame: &str) -> Option<Value> {
        let document: Value = match serde_json::from_str(frame) {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!("discarding malformed frame: {error}");
                return Some(protocol::error(None, PARSE_ERROR, "Parse error"));
            }
        };
        let id = document.get("id").cloned();
        match serde_json::from_value::<JsonRpcRequest>(document) {
            Ok(request) => self.handle(request).await,
            Err(error) => Some(protocol::error(
                id,
                INVALID_REQUEST,
                &format!("Invalid request: {error}"),
            )),
        }
    }

    /// Reads newline-delimited frames from `reader` until end of input,
    /// writing one response line per request to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any I/O failure on either stream.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let Some(reply) = self.handle_frame(&line).await else {
                continue;
            };
            let mut encoded = serde_json::to_vec(&reply)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Serves on the process's stdin and stdout.
    ///
    /// # Errors
    ///
    /// Returns any I/O failure on stdin or stdout.
    pub async fn run_stdio(&self) -> io::Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }
}
