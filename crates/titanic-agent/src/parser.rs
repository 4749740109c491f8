//! Parsing of ReAct-formatted model replies.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

const FINAL_ANSWER: &str = "Final Answer:";

/// What the model asked for in one reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReActStep {
    /// Call `tool` with `input`. `log` is the reply text that led to it.
    Action { tool: String, input: String, log: String },
    Finish { answer: String },
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:\s*(.*?)\s*Action\s*\d*\s*Input\s*\d*\s*:\s*(.*)")
            .expect("static action regex")
    })
}

/// Interpret a reply.
///
/// An action wins when it appears before any `Final Answer:`; a reply that
/// carries neither is taken verbatim as the answer.
pub fn parse_reply(text: &str) -> ReActStep {
    let final_at = text.find(FINAL_ANSWER);

    if let Some(caps) = action_regex().captures(text) {
        let start = caps.get(0).map_or(0, |m| m.start());
        if final_at.map_or(true, |f| start < f) {
            let tool = caps[1].trim().trim_matches('`').trim().to_string();
            let mut input = caps[2].to_string();
            if let Some(f) = input.find(FINAL_ANSWER) {
                input.truncate(f);
            }
            if let Some(o) = input.find("\nObservation") {
                input.truncate(o);
            }
            let input = input.trim().to_string();
            let log = text[..caps.get(0).map_or(text.len(), |m| m.start() + m.len())]
                .trim_end()
                .to_string();
            let log = truncate_log(log, &input);
            return ReActStep::Action { tool, input, log };
        }
    }

    match final_at {
        Some(f) => ReActStep::Finish { answer: text[f + FINAL_ANSWER.len()..].trim().to_string() },
        None => ReActStep::Finish { answer: text.trim().to_string() },
    }
}

// The scratchpad keeps the reply only up to the end of the action input.
fn truncate_log(log: String, input: &str) -> String {
    match log.rfind(input) {
        Some(i) if !input.is_empty() => log[..i + input.len()].to_string(),
        _ => log,
    }
}

/// Decode an `Action Input`: JSON when it parses (code fences and
/// backticks stripped), otherwise the bare string without quotes.
pub fn parse_action_input(raw: &str) -> Value {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.strip_prefix("json").unwrap_or(rest);
        s = s.strip_suffix("```").unwrap_or(s).trim();
    }
    let s = s.trim_matches('`').trim();

    if s.is_empty() {
        return Value::String(String::new());
    }
    match serde_json::from_str::<Value>(s) {
        Ok(v) => v,
        Err(_) => Value::String(s.trim_matches(|c| c == '"' || c == '\'').to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_action() {
        let reply = " I should count the classes.\nAction: value_counts\nAction Input: {\"column\": \"Pclass\"}";
        match parse_reply(reply) {
            ReActStep::Action { tool, input, log } => {
                assert_eq!(tool, "value_counts");
                assert_eq!(input, "{\"column\": \"Pclass\"}");
                assert_eq!(log, reply);
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn test_parses_final_answer() {
        let reply = " I now know the final answer\nFinal Answer: 38.4% of passengers survived.";
        assert_eq!(
            parse_reply(reply),
            ReActStep::Finish { answer: "38.4% of passengers survived.".into() }
        );
    }

    #[test]
    fn test_unstructured_reply_is_the_answer() {
        assert_eq!(
            parse_reply("  Most passengers embarked at Southampton.  "),
            ReActStep::Finish { answer: "Most passengers embarked at Southampton.".into() }
        );
    }

    #[test]
    fn test_action_before_hallucinated_answer_wins() {
        let reply = "Action: dataset_head\nAction Input: {}\nObservation: made up\nFinal Answer: 3";
        match parse_reply(reply) {
            ReActStep::Action { tool, input, log } => {
                assert_eq!(tool, "dataset_head");
                assert_eq!(input, "{}");
                assert_eq!(log, "Action: dataset_head\nAction Input: {}");
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn test_answer_before_action_wins() {
        let reply = "Final Answer: 891 rows.\nAction: dataset_head\nAction Input: {}";
        assert!(matches!(parse_reply(reply), ReActStep::Finish { ref answer } if answer.starts_with("891 rows.")));
    }

    #[test]
    fn test_action_input_forms() {
        assert_eq!(parse_action_input("{\"column\": \"Age\"}"), json!({"column": "Age"}));
        assert_eq!(parse_action_input("```json\n{\"n\": 3}\n```"), json!({"n": 3}));
        assert_eq!(parse_action_input("`Sex`"), json!("Sex"));
        assert_eq!(parse_action_input("'Embarked'"), json!("Embarked"));
        assert_eq!(parse_action_input("  "), json!(""));
        assert_eq!(parse_action_input("5"), json!(5));
    }
}
