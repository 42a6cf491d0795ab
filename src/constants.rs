//! Application constants
//!
//! Single source of truth for paths, defaults and directive wording.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/client.toml";

/// Environment files loaded before configuration is read, in order
pub const ENV_PATHS: [&str; 2] = ["config/.env", ".env"];

/// Default Gemini API path (fallback when not specified in config)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

/// Default OpenAI-compatible chat path
pub const DEFAULT_OPENAI_API_PATH: &str = "/v1/chat/completions";

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Appended to the running context from the second iteration on
pub const NEXT_STEP_PROMPT: &str = "What should I do next?";

/// MCP protocol revision announced during `initialize`
pub const MCP_PROTOCOL_VERSION: &str = "2025-06-18";

/// `{{tools}}` is replaced with the numbered tool listing.
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"You are an agent solving problems in iterations. You have access to the following tools.

Available tools:
{{tools}}

You must respond with EXACTLY ONE line in one of these formats (no additional text):
1. For function calls:
   FUNCTION_CALL: function_name|param1|param2|...

2. For final answers:
   FINAL_ANSWER: [answer]

Important:
- When a function returns multiple values, you need to process all of them
- Only give FINAL_ANSWER when you have completed all necessary calculations and steps
- Do not repeat function calls with the same parameters

Examples:
- FUNCTION_CALL: add|5|3
- FUNCTION_CALL: strings_to_chars_to_int|INDIA
- FUNCTION_CALL: int_list_to_exponential_sum|[73, 78, 68, 73, 65]

DO NOT include any explanations or additional text.
Your entire response should be a single line starting with either FUNCTION_CALL: or FINAL_ANSWER:"#;
