use super::error::ToolError;
use super::interface::ToolProvider;
use super::registry::ToolRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Sends one coerced call to the tool provider and reduces the result to
/// the canonical text the loop stores in history.
#[derive(Clone)]
pub struct ToolDispatcher {
    provider: Arc<dyn ToolProvider>,
    timeout: Option<Duration>,
}

impl ToolDispatcher {
    pub fn new(provider: Arc<dyn ToolProvider>, timeout: Option<Duration>) -> Self {
        Self { provider, timeout }
    }

    pub async fn dispatch(
        &self,
        registry: &ToolRegistry,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<String, ToolError> {
        if registry.get(name).is_none() {
            return Err(ToolError::UnknownTool(name.to_string()));
        }

        debug!(tool = name, "Dispatching tool call");
        let call = self.provider.call_tool(name, Value::Object(arguments));
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ToolError::TimedOut {
                    tool: name.to_string(),
                    timeout: limit,
                })?,
            None => call.await,
        };

        let result = outcome.map_err(|source| ToolError::Execution {
            tool: name.to_string(),
            source,
        })?;

        if result.get("isError").and_then(Value::as_bool) == Some(true) {
            warn!(tool = name, "Tool reported an error result");
        }

        Ok(canonicalize(&result))
    }
}

/// Canonical text of a `tools/call` result.
pub fn canonicalize(result: &Value) -> String {
    match result.get("content") {
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item.get("text").and_then(Value::as_str) {
                    Some(text) => text.to_string(),
                    None => item.to_string(),
                })
                .collect();
            format!("[{}]", parts.join(", "))
        }
        Some(single) => render_scalar(single),
        None => render_scalar(result),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
