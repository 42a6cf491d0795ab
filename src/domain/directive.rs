use serde::Serialize;
use std::fmt;

pub const FUNCTION_CALL_MARKER: &str = "FUNCTION_CALL:";
pub const FINAL_ANSWER_MARKER: &str = "FINAL_ANSWER:";

/// The single instruction extracted from one model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    FunctionCall { name: String, params: Vec<String> },
    FinalAnswer { payload: String },
}

/// Renders the directive in its one-line wire form.
impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::FunctionCall { name, params } => {
                write!(f, "{FUNCTION_CALL_MARKER}{name}")?;
                for param in params {
                    write!(f, "|{param}")?;
                }
                Ok(())
            }
            Directive::FinalAnswer { payload } => write!(f, "{FINAL_ANSWER_MARKER}{payload}"),
        }
    }
}
