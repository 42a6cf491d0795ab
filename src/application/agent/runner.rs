use super::coercion::coerce;
use super::errors::AgentError;
use super::guard;
use super::models::{AgentOptions, AgentOutcome};
use super::parser::parse_directive;
use super::prompt::{compose_context, model_prompt, render_system_prompt};
use crate::application::tooling::{ToolDispatcher, ToolError, ToolProvider, ToolRegistry};
use crate::domain::{Directive, IterationRecord, SessionPhase, SessionState, ToolDescriptor};
use crate::infrastructure::model::{ModelProvider, ModelRequest};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Drives sessions against one model provider and one tool provider.
///
/// The tool catalogue and system prompt are fixed at [`Agent::connect`];
/// each [`Agent::run`] starts a fresh session on top of them.
pub struct Agent<P: ModelProvider + 'static> {
    provider: Arc<P>,
    registry: ToolRegistry,
    dispatcher: ToolDispatcher,
    options: AgentOptions,
    system_prompt: String,
}

impl<P: ModelProvider + 'static> Agent<P> {
    pub async fn connect(
        provider: Arc<P>,
        tools: Arc<dyn ToolProvider>,
        options: AgentOptions,
    ) -> Result<Self, AgentError> {
        let registry = ToolRegistry::discover(tools.as_ref())
            .await
            .map_err(AgentError::Discovery)?;
        let system_prompt = render_system_prompt(&options.prompt_template, registry.tools());
        info!(
            tools = registry.len(),
            provider = %options.provider,
            model = %options.model,
            "Agent connected"
        );

        Ok(Self {
            provider,
            registry,
            dispatcher: ToolDispatcher::new(tools, options.tool_timeout),
            options,
            system_prompt,
        })
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        self.registry.tools()
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub async fn run(&self, query: impl Into<String>) -> AgentOutcome {
        let span = info_span!("session", id = %Uuid::new_v4());
        self.drive(query.into()).instrument(span).await
    }

    async fn drive(&self, query: String) -> AgentOutcome {
        let mut state = SessionState::new(query, self.options.max_iterations);
        state.begin();
        info!(max_iterations = state.max_iterations(), "Session started");

        while !state.phase().is_terminal() {
            self.advance(&mut state).await;
        }

        match state.phase() {
            SessionPhase::TerminatedFinal => info!(
                iterations = state.iteration_count(),
                answer = state.final_payload().unwrap_or_default(),
                "Session finished with a final answer"
            ),
            SessionPhase::TerminatedCap => warn!(
                iterations = state.iteration_count(),
                "Session stopped at the iteration cap"
            ),
            phase => warn!(?phase, iterations = state.iteration_count(), "Session ended with an error"),
        }
        AgentOutcome::from(state)
    }

    /// One cycle: ask, parse, then either finish or call a tool.
    async fn advance(&self, state: &mut SessionState) {
        let index = state.iteration_count() + 1;
        let prompt = model_prompt(&self.system_prompt, &compose_context(state));
        debug!(iteration = index, "Requesting next directive");

        let reply = match self.ask_model(prompt).await {
            Ok(reply) => reply,
            Err(err) => return halt(state, index, None, None, err),
        };
        debug!(iteration = index, reply = %reply.trim(), "Model replied");

        let directive = match parse_directive(&reply) {
            Ok(directive) => directive,
            Err(err) => return halt(state, index, None, None, err.into()),
        };
        info!(iteration = index, directive = %directive, "Parsed directive");

        let (name, params) = match &directive {
            Directive::FinalAnswer { payload } => {
                state.finish(payload.clone());
                return;
            }
            Directive::FunctionCall { name, params } => (name.clone(), params.clone()),
        };

        let Some(tool) = self.registry.get(&name) else {
            let err = ToolError::UnknownTool(name).into();
            return halt(state, index, Some(directive), None, err);
        };
        let arguments = match coerce(tool, &params) {
            Ok(arguments) => arguments,
            Err(err) => return halt(state, index, Some(directive), None, err.into()),
        };

        match self
            .dispatcher
            .dispatch(&self.registry, &name, arguments.clone())
            .await
        {
            Ok(result) => {
                info!(iteration = index, tool = %name, result = %result, "Tool returned");
                state.record_completion(IterationRecord::completed(index, directive, arguments, result));
            }
            Err(err) => halt(state, index, Some(directive), Some(arguments), err.into()),
        }
    }

    async fn ask_model(&self, prompt: String) -> Result<String, AgentError> {
        let provider = Arc::clone(&self.provider);
        let request = ModelRequest {
            provider: self.options.provider.clone(),
            model: self.options.model.clone(),
            prompt,
        };
        let call = async move { provider.generate(request).await }.in_current_span();
        let response = guard::invoke(self.options.model_timeout, call).await?;
        Ok(response.text)
    }
}

fn halt(
    state: &mut SessionState,
    index: usize,
    directive: Option<Directive>,
    arguments: Option<Map<String, Value>>,
    err: AgentError,
) {
    warn!(iteration = index, kind = ?err.kind(), error = %err, "Iteration failed");
    state.fail(IterationRecord::failed(
        index,
        directive,
        arguments,
        err.to_iteration_error(),
    ));
}
