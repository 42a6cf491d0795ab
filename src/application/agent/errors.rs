use super::coercion::CoercionError;
use super::guard::GuardError;
use super::parser::ParseError;
use crate::application::tooling::{ToolError, ToolInvokeError};
use crate::domain::{ErrorKind, IterationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("tool discovery failed: {0}")]
    Discovery(#[source] ToolInvokeError),
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Discovery(_) => ErrorKind::Discovery,
            AgentError::Guard(GuardError::Timeout { .. }) => ErrorKind::Timeout,
            AgentError::Guard(_) => ErrorKind::ModelFailure,
            AgentError::Parse(_) => ErrorKind::Parse,
            AgentError::Coercion(CoercionError::InsufficientParameters { .. }) => {
                ErrorKind::InsufficientParameters
            }
            AgentError::Coercion(CoercionError::TypeMismatch { .. }) => ErrorKind::TypeMismatch,
            AgentError::Tool(ToolError::UnknownTool(_)) => ErrorKind::UnknownTool,
            AgentError::Tool(_) => ErrorKind::Dispatch,
        }
    }

    pub(crate) fn to_iteration_error(&self) -> IterationError {
        IterationError {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::model::ModelError;
    use std::time::Duration;

    #[test]
    fn timeout_and_model_failure_are_distinct() {
        let timeout = AgentError::from(GuardError::Timeout {
            deadline: Duration::from_secs(10),
        });
        let failure = AgentError::from(GuardError::Model(ModelError::missing_api_key("gemini")));

        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(failure.kind(), ErrorKind::ModelFailure);
    }

    #[test]
    fn tool_timeout_counts_as_dispatch() {
        let err = AgentError::from(ToolError::TimedOut {
            tool: "add".into(),
            timeout: Duration::from_secs(1),
        });
        assert_eq!(err.kind(), ErrorKind::Dispatch);
        assert_eq!(
            AgentError::from(ToolError::UnknownTool("x".into())).kind(),
            ErrorKind::UnknownTool
        );
    }
}
