use super::error::ToolInvokeError;
use super::interface::{ServerToolInfo, ToolProvider};
use crate::config::ServerConfig;
use crate::constants::MCP_PROTOCOL_VERSION;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

type Responder = oneshot::Sender<Result<Value, ToolInvokeError>>;

/// A child process speaking MCP JSON-RPC over newline-delimited stdio.
///
/// One instance is one session-scoped channel. Requests are matched to
/// responses by id in a background reader task.
#[derive(Clone)]
pub struct McpProcess {
    inner: Arc<McpProcessInner>,
}

struct McpProcessInner {
    server: String,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: Mutex<HashMap<String, Responder>>,
    id_counter: AtomicU64,
}

/// An id registered in the pending map. Dropping it before the response
/// arrives (a caller-side timeout) forgets the id and, once the request was
/// written, tells the server to stop working on it.
struct PendingRequest<'a> {
    inner: &'a Arc<McpProcessInner>,
    id: String,
    written: bool,
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        let abandoned = self.inner.pending().remove(&self.id).is_some();
        if !(abandoned && self.written) {
            return;
        }
        debug!(server = %self.inner.server, request_id = %self.id, "Abandoning request");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let inner = Arc::clone(self.inner);
            let id = std::mem::take(&mut self.id);
            handle.spawn(async move { inner.notify_cancelled(&id).await });
        }
    }
}

impl McpProcess {
    /// Spawns the server and completes the `initialize` handshake.
    pub async fn start(config: &ServerConfig) -> Result<Self, ToolInvokeError> {
        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &config.workdir {
            command.current_dir(dir);
        }

        info!(server = %config.name, command = %config.command.display(), "Spawning MCP server");
        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: config.name.clone(),
            source,
        })?;

        let inner = Arc::new(McpProcessInner {
            server: config.name.clone(),
            child: AsyncMutex::new(None),
            writer: AsyncMutex::new(None),
            pending: Mutex::new(HashMap::new()),
            id_counter: AtomicU64::new(1),
        });

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| inner.transport_error("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| inner.transport_error("failed to capture server stdout"))?;

        *inner.writer.lock().await = Some(BufWriter::new(stdin));
        *inner.child.lock().await = Some(child);

        let reader = Arc::clone(&inner);
        tokio::spawn(async move {
            reader.reader_loop(stdout).await;
        });

        let process = Self { inner };
        if let Err(err) = process.inner.initialize().await {
            process.shutdown().await;
            return Err(err);
        }
        Ok(process)
    }

    pub fn name(&self) -> &str {
        &self.inner.server
    }

    /// Kills the child and fails anything still waiting on it.
    pub async fn shutdown(&self) {
        self.inner.writer.lock().await.take();

        if let Some(mut child) = self.inner.child.lock().await.take() {
            if let Err(err) = child.kill().await {
                debug!(
                    server = %self.inner.server,
                    %err,
                    "failed to kill MCP server process (may have already exited)"
                );
            }
        }

        self.inner.fail_all_pending().await;
    }
}

#[async_trait]
impl ToolProvider for McpProcess {
    async fn list_tools(&self) -> Result<Vec<ServerToolInfo>, ToolInvokeError> {
        let mut tools = Vec::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = match &cursor {
                Some(cursor) => json!({ "cursor": cursor }),
                None => json!({}),
            };
            let result = self.inner.send_request("tools/list", params).await?;
            let page = result
                .get("tools")
                .and_then(Value::as_array)
                .ok_or_else(|| self.inner.malformed("missing 'tools' array"))?;
            for entry in page {
                tools.push(self.inner.parse_tool_entry(entry)?);
            }

            cursor = result
                .get("nextCursor")
                .and_then(Value::as_str)
                .filter(|next| !next.is_empty())
                .map(str::to_string);
            match &cursor {
                None => break,
                Some(next) if !seen_cursors.insert(next.clone()) => {
                    return Err(self.inner.malformed("pagination cursor repeated"));
                }
                Some(_) => {}
            }
        }

        debug!(server = %self.inner.server, count = tools.len(), "Listed MCP tools");
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        let params = json!({
            "name": name,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        self.inner.send_request("tools/call", params).await
    }
}

impl McpProcessInner {
    async fn initialize(self: &Arc<Self>) -> Result<(), ToolInvokeError> {
        let params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {}
        });
        let init_result = self.send_request("initialize", params).await?;
        if let Some(version) = init_result.get("protocolVersion").and_then(Value::as_str) {
            debug!(server = %self.server, version, "MCP server negotiated protocol");
        }
        if let Some(text) = init_result.get("instructions").and_then(Value::as_str) {
            debug!(server = %self.server, instructions = text, "MCP server instructions");
        }
        self.send_notification("notifications/initialized", json!({}))
            .await
    }

    async fn reader_loop(self: Arc<Self>, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(item) = lines.next_line().await {
            let Some(raw) = item else {
                break;
            };
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => {
                    if let Err(err) = self.process_inbound_message(value).await {
                        warn!(
                            server = %self.server,
                            %err,
                            "failed to process message from MCP server"
                        );
                    }
                }
                Err(source) => {
                    debug!(
                        server = %self.server,
                        line = trimmed,
                        %source,
                        "skipping non-JSON line from MCP server"
                    );
                }
            }
        }

        debug!(server = %self.server, "MCP server stdout closed");
        self.writer.lock().await.take();
        self.fail_all_pending().await;
    }

    async fn process_inbound_message(&self, value: Value) -> Result<(), ToolInvokeError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_string);
        match (value.get("id").cloned(), method) {
            (Some(id), Some(method)) => self.handle_server_request(id, &method).await,
            (Some(id), None) => {
                self.handle_response(&id, value).await;
                Ok(())
            }
            (None, Some(method)) => {
                self.handle_notification(&method);
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    async fn handle_response(&self, id: &Value, value: Value) {
        let Some(key) = response_key(id) else {
            return;
        };

        let responder = self.pending().remove(&key);
        let Some(sender) = responder else {
            debug!(
                server = %self.server,
                response_id = key,
                "received response for unknown request"
            );
            return;
        };

        let outcome = match value.get("error") {
            Some(error) => Err(ToolInvokeError::Rpc {
                server: self.server.clone(),
                code: error.get("code").and_then(Value::as_i64).unwrap_or(-32000),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            }),
            None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
        };
        let _ = sender.send(outcome);
    }

    async fn handle_server_request(&self, id: Value, method: &str) -> Result<(), ToolInvokeError> {
        if method == "ping" {
            return self.write_message(&json!({ "jsonrpc": "2.0", "id": id, "result": {} })).await;
        }

        warn!(
            server = %self.server,
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

    fn handle_notification(&self, method: &str) {
        if method == "notifications/tools/list_changed" {
            warn!(
                server = %self.server,
                "tool list changed mid-session; keeping the catalogue discovered at start"
            );
        } else {
            debug!(server = %self.server, method, "received notification from server");
        }
    }

    async fn send_request(
        self: &Arc<Self>,
        method: &str,
        params: Value,
    ) -> Result<Value, ToolInvokeError> {
        let id = self.next_id();
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id.clone(), tx);
        let mut request = PendingRequest {
            inner: self,
            id,
            written: false,
        };

        let payload = json!({
            "jsonrpc": "2.0",
            "id": request.id,
            "method": method,
            "params": params
        });
        self.write_message(&payload).await?;
        request.written = true;

        rx.await.unwrap_or_else(|_| {
            Err(ToolInvokeError::Cancelled {
                server: self.server.clone(),
            })
        })
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
        let mut encoded =
            serde_json::to_string(message).map_err(|source| ToolInvokeError::InvalidJson {
                server: self.server.clone(),
                source,
            })?;
        encoded.push('\n');

        let mut writer = self.writer.lock().await;
        let stream = writer.as_mut().ok_or_else(|| ToolInvokeError::Terminated {
            server: self.server.clone(),
        })?;
        stream
            .write_all(encoded.as_bytes())
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|source| self.transport_error(source.to_string()))
    }

    async fn notify_cancelled(&self, id: &str) {
        let params = json!({ "requestId": id, "reason": "client stopped waiting" });
        if let Err(err) = self.send_notification("notifications/cancelled", params).await {
            debug!(server = %self.server, %err, "failed to send cancellation notice");
        }
    }

    async fn fail_all_pending(&self) {
        let drained: Vec<_> = self.pending().drain().collect();
        for (_, sender) in drained {
            let _ = sender.send(Err(ToolInvokeError::Terminated {
                server: self.server.clone(),
            }));
        }
    }

    fn parse_tool_entry(&self, entry: &Value) -> Result<ServerToolInfo, ToolInvokeError> {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| self.malformed("tool entry without a name"))?;
        Ok(ServerToolInfo {
            name: name.to_string(),
            description: entry
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            input_schema: entry.get("inputSchema").cloned(),
        })
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, Responder>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> String {
        let id = self.id_counter.fetch_add(1, Ordering::SeqCst);
        format!("req-{id}")
    }

    fn malformed(&self, reason: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::MalformedListing {
            server: self.server.clone(),
            reason: reason.into(),
        }
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolInvokeError {
        ToolInvokeError::Transport {
            server: self.server.clone(),
            message: message.into(),
        }
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}
