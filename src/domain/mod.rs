//! Plain data shared by every layer: tool descriptors, directives and the
//! per-session iteration log.

pub mod directive;
pub mod session;
pub mod tool;

pub use directive::{Directive, FINAL_ANSWER_MARKER, FUNCTION_CALL_MARKER};
pub use session::{ErrorKind, IterationError, IterationRecord, SessionPhase, SessionState};
pub use tool::{ParamType, ToolDescriptor, ToolParameter};
