use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;

/// One entry of a `tools/list` answer, before schema interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerToolInfo {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

/// The two operations the agent loop needs from a tool-providing process.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ServerToolInfo>, ToolInvokeError>;

    /// Returns the raw `tools/call` result object.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, ToolInvokeError>;
}
