use super::agent::{AgentSettings, LoggingSettings};
use super::error::ConfigError;
use super::provider::ModelProviderConfig;
use super::server::ServerConfig;
use std::path::Path;

/// Application configuration loaded from client.toml
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_provider: String,
    pub model: String,
    /// Task used when none is given on the command line
    pub query: Option<String>,
    pub prompt_template: String,
    pub agent: AgentSettings,
    pub server: ServerConfig,
    pub logging: LoggingSettings,
    pub providers: Vec<ModelProviderConfig>,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    pub fn provider(&self, id: &str) -> Option<&ModelProviderConfig> {
        self.providers.iter().find(|provider| provider.id == id)
    }

    /// Switches the active provider and/or model, keeping the model
    /// registered on the provider the same way the file loader does.
    pub fn select(
        &mut self,
        provider: Option<String>,
        model: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(provider) = provider {
            self.default_provider = provider;
        }
        if let Some(model) = model {
            self.model = model;
        }
        let Some(active) = self
            .providers
            .iter_mut()
            .find(|candidate| candidate.id == self.default_provider)
        else {
            return Err(ConfigError::ProviderNotFound {
                provider: self.default_provider.clone(),
            });
        };
        active.ensure_model(&self.model);
        Ok(())
    }
}
