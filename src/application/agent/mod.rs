//! # Agent Module
//!
//! The iteration loop: ask the model for one directive, parse it, bind its
//! params to the tool schema, dispatch, fold the result back into context
//! and repeat until a final answer, an error or the iteration cap.
//!
//! ## Key Types
//!
//! - [`Agent`] - connects to the tools once and runs sessions
//! - [`AgentOptions`] - provider, model, limits and prompt template
//! - [`AgentOutcome`] - serializable result of a session
//! - [`AgentError`] - every way an iteration can fail

pub mod coercion;
mod errors;
pub mod guard;
mod models;
pub mod parser;
pub mod prompt;
mod runner;


pub use coercion::{CoercionError, coerce};
pub use errors::AgentError;
pub use guard::GuardError;
pub use models::{AgentOptions, AgentOutcome};
pub use parser::{ParseError, parse_directive};
pub use runner::Agent;
