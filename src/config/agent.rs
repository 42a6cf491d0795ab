use super::error::ConfigError;
use super::server::expand;
use crate::constants::{DEFAULT_LOG_LEVEL, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL_TIMEOUT_SECS};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Loop limits from the `[agent]` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    pub max_iterations: usize,
    pub model_timeout: Duration,
    /// `None` leaves tool calls unbounded
    pub tool_timeout: Option<Duration>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            tool_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawAgentSettings {
    max_iterations: Option<usize>,
    model_timeout_secs: Option<u64>,
    tool_timeout_secs: Option<u64>,
}

impl TryFrom<RawAgentSettings> for AgentSettings {
    type Error = ConfigError;

    fn try_from(raw: RawAgentSettings) -> Result<Self, Self::Error> {
        let model_timeout_secs = raw.model_timeout_secs.unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS);
        if model_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "agent.model_timeout_secs",
            });
        }
        if raw.tool_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidTimeout {
                field: "agent.tool_timeout_secs",
            });
        }

        Ok(Self {
            max_iterations: raw.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            model_timeout: Duration::from_secs(model_timeout_secs),
            tool_timeout: raw.tool_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawLoggingSettings {
    level: Option<String>,
    file: Option<String>,
}

impl From<RawLoggingSettings> for LoggingSettings {
    fn from(raw: RawLoggingSettings) -> Self {
        Self {
            level: raw
                .level
                .filter(|level| !level.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            file: raw.file.map(|path| PathBuf::from(expand(&path))),
        }
    }
}
