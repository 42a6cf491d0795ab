use crate::domain::{Directive, FINAL_ANSWER_MARKER, FUNCTION_CALL_MARKER};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("model reply contains neither FUNCTION_CALL: nor FINAL_ANSWER: ({0:?})")]
    MissingMarker(String),
    #[error("FUNCTION_CALL directive has an empty function name")]
    EmptyFunctionName,
}

/// Extracts the single directive carried by a model reply.
///
/// The first line starting with `FUNCTION_CALL:` wins and later lines are
/// ignored. Without one, the whole trimmed reply must itself start with a
/// marker.
pub fn parse_directive(reply: &str) -> Result<Directive, ParseError> {
    let candidate = reply
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(FUNCTION_CALL_MARKER))
        .unwrap_or_else(|| reply.trim());

    if let Some(rest) = candidate.strip_prefix(FINAL_ANSWER_MARKER) {
        return Ok(Directive::FinalAnswer {
            payload: rest.trim().to_string(),
        });
    }

    let Some(rest) = candidate.strip_prefix(FUNCTION_CALL_MARKER) else {
        return Err(ParseError::MissingMarker(preview(candidate)));
    };

    let mut parts = rest.split('|').map(str::trim);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(ParseError::EmptyFunctionName);
    }

    Ok(Directive::FunctionCall {
        name: name.to_string(),
        params: parts.map(str::to_string).collect(),
    })
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 80;
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, params: &[&str]) -> Directive {
        Directive::FunctionCall {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn parses_function_call_with_params() {
        assert_eq!(
            parse_directive("FUNCTION_CALL: add|5|3").unwrap(),
            call("add", &["5", "3"])
        );
    }

    #[test]
    fn parses_function_call_without_params() {
        assert_eq!(
            parse_directive("FUNCTION_CALL: open_paint").unwrap(),
            call("open_paint", &[])
        );
    }

    #[test]
    fn trims_each_part() {
        assert_eq!(
            parse_directive("  FUNCTION_CALL:  int_list_to_exponential_sum | [73, 78, 68] ").unwrap(),
            call("int_list_to_exponential_sum", &["[73, 78, 68]"])
        );
    }

    #[test]
    fn first_function_call_line_wins() {
        let reply = "Let me think.\nFUNCTION_CALL: add|1|2\nFUNCTION_CALL: add|3|4\nFINAL_ANSWER: [3]";
        assert_eq!(parse_directive(reply).unwrap(), call("add", &["1", "2"]));
    }

    #[test]
    fn parses_final_answer() {
        assert_eq!(
            parse_directive("FINAL_ANSWER: [8]").unwrap(),
            Directive::FinalAnswer {
                payload: "[8]".into()
            }
        );
    }

    #[test]
    fn final_answer_must_lead_the_reply() {
        let err = parse_directive("Sure!\nFINAL_ANSWER: [8]").unwrap_err();
        assert!(matches!(err, ParseError::MissingMarker(_)));
    }

    #[test]
    fn missing_marker_fails_closed() {
        let err = parse_directive("add: 5, 3").unwrap_err();
        assert_eq!(err, ParseError::MissingMarker("add: 5, 3".into()));
    }

    #[test]
    fn empty_function_name_is_rejected() {
        assert_eq!(
            parse_directive("FUNCTION_CALL: |5|3").unwrap_err(),
            ParseError::EmptyFunctionName
        );
    }

    #[test]
    fn display_round_trips_wire_line() {
        let directive = parse_directive("FUNCTION_CALL: add|5|3").unwrap();
        assert_eq!(directive.to_string(), "FUNCTION_CALL:add|5|3");
    }
}
