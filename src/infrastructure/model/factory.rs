//! Provider factory - creates clients from config

use super::clients::{GeminiClient, OllamaClient, OpenAIClient};
use super::traits::ModelClient;
use crate::config::ModelProviderConfig;
use std::env;
use tracing::warn;

/// Resolve API key from the environment variable named in the config
pub fn resolve_api_key(provider: &str, key_ref: Option<&str>) -> Option<String> {
    let raw = key_ref.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    // Accept both `GEMINI_API_KEY` and `${GEMINI_API_KEY}`
    let name = raw
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(raw);
    match env::var(name) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                provider,
                env_var = name,
                %err,
                "API key environment variable is not set"
            );
            None
        }
    }
}

/// Factory for creating model clients from provider config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a model client based on provider type.
    ///
    /// Supported types:
    /// - `ollama`, `localai` → Ollama format
    /// - `gemini`, `google` → Gemini format
    /// - Others → OpenAI-compatible format (default)
    pub fn create(config: &ModelProviderConfig) -> Box<dyn ModelClient> {
        match config.provider_type.to_lowercase().as_str() {
            "ollama" | "localai" => Box::new(OllamaClient::from_config(config)),
            "gemini" | "google" | "google-ai" => Box::new(GeminiClient::from_config(config)),
            _ => Box::new(OpenAIClient::from_config(config)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn resolves_plain_and_braced_variable_names() {
        unsafe {
            env::set_var("MCP_LOOP_TEST_KEY", "secret");
        }

        assert_eq!(
            resolve_api_key("gemini", Some("MCP_LOOP_TEST_KEY")).as_deref(),
            Some("secret")
        );
        assert_eq!(
            resolve_api_key("gemini", Some("${MCP_LOOP_TEST_KEY}")).as_deref(),
            Some("secret")
        );

        unsafe {
            env::remove_var("MCP_LOOP_TEST_KEY");
        }
    }

    #[test]
    #[serial]
    fn missing_or_blank_reference_yields_none() {
        assert!(resolve_api_key("gemini", None).is_none());
        assert!(resolve_api_key("gemini", Some("   ")).is_none());
        assert!(resolve_api_key("gemini", Some("MCP_LOOP_SURELY_UNSET_VAR")).is_none());
    }
}
