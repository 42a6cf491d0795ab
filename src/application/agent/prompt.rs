use crate::constants::NEXT_STEP_PROMPT;
use crate::domain::{SessionState, ToolDescriptor};

const TOOLS_PLACEHOLDER: &str = "{{tools}}";

/// Numbered tool listing, one `N. name(p: type, ...) - description` per line.
pub fn describe_tools(tools: &[ToolDescriptor]) -> String {
    tools
        .iter()
        .enumerate()
        .map(|(i, tool)| format!("{}. {} - {}", i + 1, tool.signature(), tool.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitutes the tool listing into the template. A template without the
/// placeholder gets the listing appended.
pub fn render_system_prompt(template: &str, tools: &[ToolDescriptor]) -> String {
    let listing = describe_tools(tools);
    if template.contains(TOOLS_PLACEHOLDER) {
        template.replace(TOOLS_PLACEHOLDER, &listing)
    } else {
        format!("{}\n\nAvailable tools:\n{listing}", template.trim_end())
    }
}

/// Text sent as the query for the next iteration.
pub fn compose_context(state: &SessionState) -> String {
    if state.history().is_empty() {
        return state.query().to_string();
    }
    let summaries = state
        .history()
        .iter()
        .map(|record| record.summary())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}\n\n{summaries}  {NEXT_STEP_PROMPT}", state.query())
}

pub fn model_prompt(system_prompt: &str, context: &str) -> String {
    format!("{system_prompt}\n\nQuery: {context}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Directive, IterationRecord};
    use serde_json::{Map, json};

    fn tools() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::from_schema(
                "add",
                Some("Add two numbers".into()),
                Some(&json!({"properties": {"a": {"type": "integer"}, "b": {"type": "integer"}}})),
            ),
            ToolDescriptor::from_schema("open_paint", None, None),
        ]
    }

    #[test]
    fn listing_is_numbered() {
        assert_eq!(
            describe_tools(&tools()),
            "1. add(a: integer, b: integer) - Add two numbers\n2. open_paint(no parameters) - No description available"
        );
    }

    #[test]
    fn template_placeholder_is_replaced() {
        let prompt = render_system_prompt("Tools:\n{{tools}}\nGo.", &tools());
        assert!(prompt.starts_with("Tools:\n1. add("));
        assert!(prompt.ends_with("No description available\nGo."));
    }

    #[test]
    fn template_without_placeholder_gets_listing_appended() {
        let prompt = render_system_prompt("Be brief.\n", &tools()[..1]);
        assert_eq!(
            prompt,
            "Be brief.\n\nAvailable tools:\n1. add(a: integer, b: integer) - Add two numbers"
        );
    }

    #[test]
    fn first_context_is_the_query() {
        let state = SessionState::new("Add 5 and 3", 3);
        assert_eq!(compose_context(&state), "Add 5 and 3");
        assert_eq!(
            model_prompt("SYS", &compose_context(&state)),
            "SYS\n\nQuery: Add 5 and 3"
        );
    }

    #[test]
    fn later_context_folds_in_summaries() {
        let mut state = SessionState::new("Add 5 and 3", 3);
        state.begin();
        let mut args = Map::new();
        args.insert("a".into(), json!(5));
        args.insert("b".into(), json!(3));
        state.record_completion(IterationRecord::completed(
            1,
            Directive::FunctionCall {
                name: "add".into(),
                params: vec!["5".into(), "3".into()],
            },
            args,
            "[8]".into(),
        ));

        assert_eq!(
            compose_context(&state),
            "Add 5 and 3\n\nIn the 1 iteration you called add with {\"a\":5,\"b\":3} parameters, and the function returned [8].  What should I do next?"
        );
    }
}
