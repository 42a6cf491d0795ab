use super::error::ToolInvokeError;
use super::interface::ToolProvider;
use crate::domain::ToolDescriptor;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Immutable tool catalogue built once per session from the provider's
/// listing. Order follows the listing.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub async fn discover(provider: &dyn ToolProvider) -> Result<Self, ToolInvokeError> {
        let listing = provider.list_tools().await?;
        let descriptors = listing.into_iter().map(|info| {
            ToolDescriptor::from_schema(info.name, info.description, info.input_schema.as_ref())
        });
        let registry = Self::from_descriptors(descriptors);
        debug!(count = registry.len(), "Tool registry ready");
        Ok(registry)
    }

    /// Duplicate names keep the first occurrence.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let mut tools = Vec::new();
        for descriptor in descriptors {
            if !seen.insert(descriptor.name.clone()) {
                warn!(tool = %descriptor.name, "Duplicate tool name in listing; keeping the first");
                continue;
            }
            tools.push(descriptor);
        }
        Self { tools }
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
