use crate::config::AppConfig;
use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL_TIMEOUT_SECS, DEFAULT_PROMPT_TEMPLATE};
use crate::domain::{IterationError, IterationRecord, SessionPhase, SessionState};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub provider: String,
    pub model: String,
    pub max_iterations: usize,
    pub model_timeout: Duration,
    pub tool_timeout: Option<Duration>,
    pub prompt_template: String,
}

impl AgentOptions {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            tool_timeout: None,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            provider: config.default_provider.clone(),
            model: config.model.clone(),
            max_iterations: config.agent.max_iterations,
            model_timeout: config.agent.model_timeout,
            tool_timeout: config.agent.tool_timeout,
            prompt_template: config.prompt_template.clone(),
        }
    }
}

/// What a finished session hands back to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub phase: SessionPhase,
    pub final_payload: Option<String>,
    pub iterations: usize,
    pub history: Vec<IterationRecord>,
}

impl AgentOutcome {
    /// The failure that ended the session, if any.
    pub fn error(&self) -> Option<&IterationError> {
        if self.phase != SessionPhase::TerminatedError {
            return None;
        }
        self.history.last().and_then(|record| record.error.as_ref())
    }
}

impl From<SessionState> for AgentOutcome {
    fn from(state: SessionState) -> Self {
        let (phase, final_payload, iterations, history) = state.into_parts();
        Self {
            phase,
            final_payload,
            iterations,
            history,
        }
    }
}
