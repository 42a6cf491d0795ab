use crate::domain::{ParamType, ToolDescriptor};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("not enough parameters for '{tool}': missing '{parameter}'")]
    InsufficientParameters { tool: String, parameter: String },
    #[error("parameter '{parameter}' expects {expected}, got {value:?}")]
    TypeMismatch {
        parameter: String,
        expected: ParamType,
        value: String,
    },
}

/// Binds raw directive params to the tool's declared parameters, in order,
/// converting each to its declared type. Surplus params are dropped.
pub fn coerce(tool: &ToolDescriptor, raw_params: &[String]) -> Result<Map<String, Value>, CoercionError> {
    let mut raw = raw_params.iter();
    let mut arguments = Map::new();

    for parameter in &tool.parameters {
        let value = raw
            .next()
            .ok_or_else(|| CoercionError::InsufficientParameters {
                tool: tool.name.clone(),
                parameter: parameter.name.clone(),
            })?;
        let converted = convert(value, parameter.kind).ok_or_else(|| CoercionError::TypeMismatch {
            parameter: parameter.name.clone(),
            expected: parameter.kind,
            value: value.clone(),
        })?;
        arguments.insert(parameter.name.clone(), converted);
    }

    let surplus = raw.len();
    if surplus > 0 {
        debug!(tool = %tool.name, surplus, "Discarding surplus parameters");
    }
    Ok(arguments)
}

fn convert(raw: &str, kind: ParamType) -> Option<Value> {
    match kind {
        ParamType::Integer => raw.trim().parse::<i64>().ok().map(Value::from),
        ParamType::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ParamType::Array => parse_int_list(raw).map(Value::from),
        ParamType::Text => Some(Value::String(raw.to_string())),
    }
}

fn parse_int_list(raw: &str) -> Option<Vec<i64>> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);
    body.split(',')
        .map(|item| item.trim().parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(schema: Value) -> ToolDescriptor {
        ToolDescriptor::from_schema("tool", None, Some(&schema))
    }

    fn raw(params: &[&str]) -> Vec<String> {
        params.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn integers_in_schema_order() {
        let add = tool(json!({"properties": {"a": {"type": "integer"}, "b": {"type": "integer"}}}));

        let args = coerce(&add, &raw(&["5", "3"])).unwrap();

        assert_eq!(Value::Object(args.clone()), json!({"a": 5, "b": 3}));
        let keys: Vec<_> = args.keys().collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn array_with_brackets_and_spaces() {
        let sum = tool(json!({"properties": {"values": {"type": "array"}}}));

        let args = coerce(&sum, &raw(&["[73, 78, 68, 73, 65]"])).unwrap();

        assert_eq!(args["values"], json!([73, 78, 68, 73, 65]));
    }

    #[test]
    fn array_without_brackets() {
        let sum = tool(json!({"properties": {"values": {"type": "array"}}}));

        assert_eq!(coerce(&sum, &raw(&["1,2,3"])).unwrap()["values"], json!([1, 2, 3]));
    }

    #[test]
    fn empty_or_blank_array_is_a_mismatch() {
        let sum = tool(json!({"properties": {"values": {"type": "array"}}}));

        for body in ["[]", "", "  ", "[1,]"] {
            let err = coerce(&sum, &raw(&[body])).unwrap_err();
            assert!(
                matches!(err, CoercionError::TypeMismatch { expected: ParamType::Array, .. }),
                "{body:?} should not coerce"
            );
        }
    }

    #[test]
    fn array_with_bad_element_fails_whole_coercion() {
        let sum = tool(json!({"properties": {"values": {"type": "array"}}}));

        let err = coerce(&sum, &raw(&["[1, two, 3]"])).unwrap_err();

        assert!(matches!(
            err,
            CoercionError::TypeMismatch { parameter, expected: ParamType::Array, .. } if parameter == "values"
        ));
    }

    #[test]
    fn number_and_text() {
        let mixed = tool(json!({"properties": {"x": {"type": "number"}, "label": {"type": "string"}}}));

        let args = coerce(&mixed, &raw(&[" 2.5 ", "  INDIA "])).unwrap();

        assert_eq!(args["x"], json!(2.5));
        assert_eq!(args["label"], json!("  INDIA "));
    }

    #[test]
    fn non_finite_number_is_a_mismatch() {
        let scale = tool(json!({"properties": {"x": {"type": "number"}}}));
        assert!(matches!(
            coerce(&scale, &raw(&["NaN"])).unwrap_err(),
            CoercionError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn integer_mismatch_reports_value() {
        let add = tool(json!({"properties": {"a": {"type": "integer"}}}));

        let err = coerce(&add, &raw(&["five"])).unwrap_err();

        assert_eq!(
            err,
            CoercionError::TypeMismatch {
                parameter: "a".into(),
                expected: ParamType::Integer,
                value: "five".into(),
            }
        );
    }

    #[test]
    fn too_few_params_names_the_missing_one() {
        let add = tool(json!({"properties": {"a": {"type": "integer"}, "b": {"type": "integer"}}}));

        let err = coerce(&add, &raw(&["5"])).unwrap_err();

        assert_eq!(
            err,
            CoercionError::InsufficientParameters {
                tool: "tool".into(),
                parameter: "b".into(),
            }
        );
    }

    #[test]
    fn surplus_params_are_discarded() {
        let add = tool(json!({"properties": {"a": {"type": "integer"}}}));

        let args = coerce(&add, &raw(&["1", "2", "3"])).unwrap();

        assert_eq!(Value::Object(args), json!({"a": 1}));
    }

    #[test]
    fn no_parameters_accepts_anything() {
        let open = ToolDescriptor::from_schema("open_paint", None, None);
        assert!(coerce(&open, &raw(&["ignored"])).unwrap().is_empty());
    }
}
