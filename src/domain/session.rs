use super::directive::Directive;
use serde::Serialize;
use serde_json::{Map, Value};

/// Lifecycle of one agent session. The last three variants are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    AwaitingQuery,
    Running,
    TerminatedFinal,
    TerminatedError,
    TerminatedCap,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionPhase::TerminatedFinal
                | SessionPhase::TerminatedError
                | SessionPhase::TerminatedCap
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Discovery,
    Timeout,
    ModelFailure,
    Parse,
    UnknownTool,
    InsufficientParameters,
    TypeMismatch,
    Dispatch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationError {
    pub kind: ErrorKind,
    pub message: String,
}

/// One entry of the session history. Records are never mutated once pushed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<IterationError>,
}

impl IterationRecord {
    pub fn completed(
        index: usize,
        directive: Directive,
        arguments: Map<String, Value>,
        result: String,
    ) -> Self {
        Self {
            index,
            directive: Some(directive),
            arguments: Some(arguments),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(
        index: usize,
        directive: Option<Directive>,
        arguments: Option<Map<String, Value>>,
        error: IterationError,
    ) -> Self {
        Self {
            index,
            directive,
            arguments,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }

    /// Text folded back into the next prompt.
    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Error in iteration {}: {}", self.index, error.message);
        }

        let name = match &self.directive {
            Some(Directive::FunctionCall { name, .. }) => name.as_str(),
            _ => "",
        };
        let arguments = self
            .arguments
            .clone()
            .map(Value::Object)
            .unwrap_or(Value::Null);
        format!(
            "In the {} iteration you called {} with {} parameters, and the function returned {}.",
            self.index,
            name,
            arguments,
            self.result.as_deref().unwrap_or_default()
        )
    }
}

/// Everything one session knows. Owned by the running agent loop and dropped
/// (or turned into an outcome) when it ends.
#[derive(Debug, Clone)]
pub struct SessionState {
    query: String,
    max_iterations: usize,
    iteration_count: usize,
    history: Vec<IterationRecord>,
    phase: SessionPhase,
    final_payload: Option<String>,
}

impl SessionState {
    pub fn new(query: impl Into<String>, max_iterations: usize) -> Self {
        Self {
            query: query.into(),
            max_iterations,
            iteration_count: 0,
            history: Vec::new(),
            phase: SessionPhase::AwaitingQuery,
            final_payload: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn final_payload(&self) -> Option<&str> {
        self.final_payload.as_deref()
    }

    pub(crate) fn into_parts(self) -> (SessionPhase, Option<String>, usize, Vec<IterationRecord>) {
        (
            self.phase,
            self.final_payload,
            self.iteration_count,
            self.history,
        )
    }

    /// Leaves `AwaitingQuery`. A zero iteration budget is exhausted before
    /// the first model call.
    pub(crate) fn begin(&mut self) {
        if self.phase != SessionPhase::AwaitingQuery {
            return;
        }
        self.phase = if self.max_iterations == 0 {
            SessionPhase::TerminatedCap
        } else {
            SessionPhase::Running
        };
    }

    pub(crate) fn record_completion(&mut self, record: IterationRecord) {
        debug_assert_eq!(self.phase, SessionPhase::Running);
        self.history.push(record);
        self.iteration_count += 1;
        if self.iteration_count >= self.max_iterations {
            self.phase = SessionPhase::TerminatedCap;
        }
    }

    pub(crate) fn finish(&mut self, payload: String) {
        self.final_payload = Some(payload);
        self.phase = SessionPhase::TerminatedFinal;
    }

    pub(crate) fn fail(&mut self, record: IterationRecord) {
        self.history.push(record);
        self.phase = SessionPhase::TerminatedError;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add_call() -> Directive {
        Directive::FunctionCall {
            name: "add".into(),
            params: vec!["5".into(), "3".into()],
        }
    }

    fn add_args() -> Map<String, Value> {
        let mut args = Map::new();
        args.insert("a".into(), json!(5));
        args.insert("b".into(), json!(3));
        args
    }

    #[test]
    fn completion_increments_and_caps() {
        let mut state = SessionState::new("sum", 2);
        assert!(!state.phase().is_terminal());
        state.begin();
        assert_eq!(state.phase(), SessionPhase::Running);
        assert!(!state.phase().is_terminal());

        state.record_completion(IterationRecord::completed(1, add_call(), add_args(), "[8]".into()));
        assert_eq!(state.iteration_count(), 1);
        assert_eq!(state.phase(), SessionPhase::Running);

        state.record_completion(IterationRecord::completed(2, add_call(), add_args(), "[8]".into()));
        assert_eq!(state.iteration_count(), 2);
        assert_eq!(state.phase(), SessionPhase::TerminatedCap);
        assert!(state.phase().is_terminal());
        assert!(state.final_payload().is_none());
    }

    #[test]
    fn zero_budget_caps_immediately() {
        let mut state = SessionState::new("anything", 0);
        state.begin();
        assert_eq!(state.phase(), SessionPhase::TerminatedCap);
        assert!(state.history().is_empty());
    }

    #[test]
    fn failure_is_appended_and_does_not_count() {
        let mut state = SessionState::new("sum", 5);
        state.begin();
        state.fail(IterationRecord::failed(
            1,
            None,
            None,
            IterationError {
                kind: ErrorKind::Parse,
                message: "no directive".into(),
            },
        ));

        assert_eq!(state.phase(), SessionPhase::TerminatedError);
        assert_eq!(state.iteration_count(), 0);
        assert_eq!(state.history().len(), 1);
        assert!(!state.history()[0].is_completed());
        assert_eq!(state.history()[0].summary(), "Error in iteration 1: no directive");
    }

    #[test]
    fn completed_summary_mentions_call_and_result() {
        let record = IterationRecord::completed(1, add_call(), add_args(), "[8]".into());
        assert_eq!(
            record.summary(),
            r#"In the 1 iteration you called add with {"a":5,"b":3} parameters, and the function returned [8]."#
        );
    }
}
