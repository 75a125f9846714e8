use super::connection::{ServerConnector, ServerToolInfo, ToolOutput, ToolServerConnection};
use super::error::ToolInvokeError;
use crate::config::ServerConfig;
use crate::constants::{DEFAULT_HANDSHAKE_TIMEOUT_SECS, PROTOCOL_VERSION};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

type Responder = oneshot::Sender<Result<Value, ToolInvokeError>>;

/// Spawns each configured server as a child process speaking JSON-RPC over stdio.
#[derive(Debug, Clone, Copy)]
pub struct StdioConnector {
    handshake_timeout: Duration,
}

impl StdioConnector {
    pub fn with_handshake_timeout(handshake_timeout: Duration) -> Self {
        Self { handshake_timeout }
    }
}

impl Default for StdioConnector {
    fn default() -> Self {
        Self::with_handshake_timeout(Duration::from_secs(DEFAULT_HANDSHAKE_TIMEOUT_SECS))
    }
}

#[async_trait]
impl ServerConnector for StdioConnector {
    async fn connect(
        &self,
        config: &ServerConfig,
    ) -> Result<Arc<dyn ToolServerConnection>, ToolInvokeError> {
        let process = McpProcess::spawn_with_timeout(config.clone(), self.handshake_timeout).await?;
        Ok(Arc::new(process))
    }
}

/// A running tool-server child process. Returned only after the `initialize`
/// handshake has completed.
#[derive(Clone)]
pub struct McpProcess {
    inner: Arc<McpProcessInner>,
}

struct McpProcessInner {
    server: ServerConfig,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: AsyncMutex<PendingRequests>,
    id_counter: AtomicU64,
}

#[derive(Default)]
struct PendingRequests {
    closed: bool,
    responders: HashMap<String, Responder>,
}

impl McpProcess {
    pub async fn spawn(server: ServerConfig) -> Result<Self, ToolInvokeError> {
        Self::spawn_with_timeout(server, Duration::from_secs(DEFAULT_HANDSHAKE_TIMEOUT_SECS)).await
    }

    /// Spawn the server and wait at most `handshake_timeout` for `initialize`.
    /// A server that never answers is killed and reported as a transport failure.
    pub async fn spawn_with_timeout(
        server: ServerConfig,
        handshake_timeout: Duration,
    ) -> Result<Self, ToolInvokeError> {
        let mut command = Command::new(&server.command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &server.workdir {
            command.current_dir(dir);
        }
        if !server.args.is_empty() {
            command.args(&server.args);
        }
        for (key, value) in &server.env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: server.name.clone(),
            source,
        })?;

        let stdin = child.stdin.take().ok_or_else(|| ToolInvokeError::Transport {
            server: server.name.clone(),
            message: "failed to capture server stdin".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| ToolInvokeError::Transport {
            server: server.name.clone(),
            message: "failed to capture server stdout".to_string(),
        })?;

        let inner = Arc::new(McpProcessInner {
            server,
            child: AsyncMutex::new(Some(child)),
            writer: AsyncMutex::new(Some(BufWriter::new(stdin))),
            pending: AsyncMutex::new(PendingRequests::default()),
            id_counter: AtomicU64::new(1),
        });

        let reader = Arc::clone(&inner);
        tokio::spawn(async move {
            reader.reader_loop(stdout).await;
        });

        let handshake = timeout(handshake_timeout, inner.initialize_sequence())
            .await
            .unwrap_or_else(|_| {
                Err(ToolInvokeError::Transport {
                    server: inner.server.name.clone(),
                    message: format!("no initialize response within {handshake_timeout:?}"),
                })
            });
        if let Err(err) = handshake {
            inner.shutdown().await;
            return Err(err);
        }
        info!(server = %inner.server.name, "MCP server initialised");

        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.server.name
    }
}

#[async_trait]
impl ToolServerConnection for McpProcess {
    async fn list_tools(&self) -> Result<Vec<ServerToolInfo>, ToolInvokeError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let params = match &cursor {
                Some(cursor) => json!({ "cursor": cursor }),
                None => json!({}),
            };
            let result = self.inner.send_request("tools/list", params).await?;
            tools.extend(self.inner.parse_tool_list(&result)?);
            cursor = result
                .get("nextCursor")
                .and_then(Value::as_str)
                .map(str::to_string);
            if cursor.is_none() {
                break;
            }
        }
        Ok(tools)
    }

    async fn call_tool(
        &self,
        tool: &str,
        arguments: Value,
    ) -> Result<ToolOutput, ToolInvokeError> {
        let params = json!({
            "name": tool,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        let result = self.inner.send_request("tools/call", params).await?;
        if result.get("isError").and_then(Value::as_bool) == Some(true) {
            debug!(server = %self.name(), tool, "Tool reported an error result");
        }
        Ok(ToolOutput::from_call_result(result))
    }

    async fn close(&self) -> Result<(), ToolInvokeError> {
        self.inner.shutdown().await;
        Ok(())
    }
}

impl McpProcessInner {
    async fn initialize_sequence(&self) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {}
        });
        let init_result = self.send_request("initialize", params).await?;
        if let Some(version) = init_result.get("protocolVersion").and_then(Value::as_str) {
            debug!(server = %self.server.name, version, "Negotiated protocol version");
        }
        self.send_notification("notifications/initialized", json!({}))
            .await
    }

    async fn reader_loop(self: Arc<Self>, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(raw)) = lines.next_line().await {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => {
                    if let Err(err) = self.process_inbound_message(value).await {
                        warn!(
                            server = %self.server.name,
                            %err,
                            "failed to process message from MCP server"
                        );
                    }
                }
                Err(source) => {
                    debug!(
                        server = %self.server.name,
                        line = trimmed,
                        %source,
                        "skipping non-JSON line from MCP server"
                    );
                }
            }
        }

        debug!(server = %self.server.name, "MCP server stdout closed");
        self.fail_all_pending().await;
        self.writer.lock().await.take();
    }

    async fn process_inbound_message(&self, value: Value) -> Result<(), ToolInvokeError> {
        match (value.get("id").cloned(), value.get("method").is_some()) {
            (Some(id), true) => self.handle_server_request(id, &value).await,
            (Some(id), false) => {
                self.handle_response(&id, value).await;
                Ok(())
            }
            (None, true) => {
                if let Some(method) = value.get("method").and_then(Value::as_str) {
                    debug!(server = %self.server.name, method, "received notification from server");
                }
                Ok(())
            }
            (None, false) => Ok(()),
        }
    }

    async fn handle_response(&self, id: &Value, value: Value) {
        let Some(key) = response_key(id) else {
            return;
        };

        let responder = self.pending.lock().await.responders.remove(&key);
        let Some(sender) = responder else {
            debug!(
                server = %self.server.name,
                response_id = key,
                "received response for unknown request"
            );
            return;
        };

        let outcome = match value.get("error") {
            Some(error) => Err(self.rpc_error(error)),
            None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
        };
        if sender.send(outcome).is_err() {
            debug!(server = %self.server.name, response_id = key, "requester went away");
        }
    }

    fn rpc_error(&self, error: &Value) -> ToolInvokeError {
        let Some(object) = error.as_object() else {
            return ToolInvokeError::Protocol {
                server: self.server.name.clone(),
                message: "missing error payload in response".to_string(),
            };
        };
        ToolInvokeError::Rpc {
            server: self.server.name.clone(),
            code: object.get("code").and_then(Value::as_i64).unwrap_or(-32000),
            message: object
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        }
    }

    async fn handle_server_request(&self, id: Value, value: &Value) -> Result<(), ToolInvokeError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if method == "ping" {
            return self
                .write_message(&json!({ "jsonrpc": "2.0", "id": id, "result": {} }))
                .await;
        }

        warn!(
            server = %self.server.name,
            method,
            "server sent unsupported request"
        );
        self.write_message(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {
                "code": -32601,
                "message": format!("client does not implement method '{method}'"),
            }
        }))
        .await
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if pending.closed {
                return Err(ToolInvokeError::Terminated {
                    server: self.server.name.clone(),
                });
            }
            pending.responders.insert(id.clone(), tx);
        }

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        if let Err(err) = self.write_message(&payload).await {
            self.pending.lock().await.responders.remove(&id);
            return Err(err);
        }

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolInvokeError::Cancelled {
                server: self.server.name.clone(),
            }),
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolInvokeError> {
        self.write_message(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        }))
        .await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolInvokeError> {
        let encoded =
            serde_json::to_string(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.server.name.clone(),
                source,
            })?;

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or_else(|| self.transport_error("connection closed"))?;
        stream
            .write_all(encoded.as_bytes())
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        stream
            .write_all(b"\n")
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|source| self.transport_error(source.to_string()))
    }

    async fn shutdown(&self) {
        self.writer.lock().await.take();

        let mut child = self.child.lock().await;
        if let Some(mut running) = child.take() {
            if let Err(err) = running.kill().await {
                debug!(
                    server = %self.server.name,
                    %err,
                    "failed to kill MCP server process (may have already exited)"
                );
            }
        }
        drop(child);

        self.fail_all_pending().await;
    }

    async fn fail_all_pending(&self) {
        let mut pending = self.pending.lock().await;
        pending.closed = true;
        for (_, sender) in pending.responders.drain() {
            let _ = sender.send(Err(ToolInvokeError::Terminated {
                server: self.server.name.clone(),
            }));
        }
    }

    fn parse_tool_list(&self, result: &Value) -> Result<Vec<ServerToolInfo>, ToolInvokeError> {
        let array = result
            .get("tools")
            .and_then(Value::as_array)
            .ok_or_else(|| ToolInvokeError::Protocol {
                server: self.server.name.clone(),
                message: "tools/list result has no 'tools' array".to_string(),
            })?;
        Ok(array.iter().filter_map(parse_tool_info).collect())
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.server.name.clone(),
            message: message.into(),
        }
    }
}

fn parse_tool_info(tool: &Value) -> Option<ServerToolInfo> {
    let name = tool.get("name").and_then(Value::as_str)?;
    let description = tool
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);
    let input_schema = tool
        .get("inputSchema")
        .filter(|schema| schema.is_object())
        .cloned()
        .unwrap_or_else(|| json!({ "type": "object", "properties": {} }));
    Some(ServerToolInfo {
        name: name.to_string(),
        description,
        input_schema,
    })
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}
