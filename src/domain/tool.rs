use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Closed set of parameter types a tool schema can declare.
///
/// Anything the schema calls other than `integer`, `number` or `array`
/// (including a missing `type`) is treated as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Number,
    Array,
    Text,
}

impl ParamType {
    pub fn from_schema_type(value: Option<&str>) -> Self {
        match value {
            Some("integer") => ParamType::Integer,
            Some("number") => ParamType::Number,
            Some("array") => ParamType::Array,
            _ => ParamType::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Array => "array",
            ParamType::Text => "string",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
}

/// A tool advertised by the tool provider, reduced to what the loop needs:
/// its name, a description for the prompt and the ordered parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDescriptor {
    /// Builds a descriptor from an MCP `inputSchema`. Parameters keep the
    /// order of `properties` as the server sent them.
    pub fn from_schema(
        name: impl Into<String>,
        description: Option<String>,
        input_schema: Option<&Value>,
    ) -> Self {
        let parameters = input_schema
            .and_then(|schema| schema.get("properties"))
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, info)| ToolParameter {
                        name: name.clone(),
                        kind: ParamType::from_schema_type(info.get("type").and_then(Value::as_str)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: name.into(),
            description: description.unwrap_or_else(|| "No description available".to_string()),
            parameters,
        }
    }

    /// `add(a: integer, b: integer)` style rendering used in the system prompt.
    pub fn signature(&self) -> String {
        if self.parameters.is_empty() {
            return format!("{}(no parameters)", self.name);
        }
        let params = self
            .parameters
            .iter()
            .map(|param| format!("{}: {}", param.name, param.kind))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({params})", self.name)
    }
}
