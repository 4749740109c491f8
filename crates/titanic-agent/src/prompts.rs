//! Prompt templates for the dataframe agent.

use minijinja::{context, Environment};
use serde::Serialize;

/// Sent as the system message on every model call.
pub const SYSTEM_PROMPT: &str = "You are a data analyst working strictly with the Titanic dataset. \
Only use the dataframe provided. Never access system files or external data. \
If the question requires a visualization, clearly state that a plot is required. \
Be concise and accurate.";

const REACT_TEMPLATE: &str = r#"You are working with the Titanic passenger table (a pandas-style dataframe named `df`).
You have access to the following tools:

{% for tool in tools -%}
{{ tool.name }}: {{ tool.description }}
{% endfor %}
Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{{ tool_names }}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

This is the result of `print(df.head())`:
{{ preview }}

Begin!
Question: {{ question }}
Thought:{{ scratchpad }}"#;

#[derive(Debug, Serialize)]
pub struct ToolDoc<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// Template environment with the agent prompts registered.
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("react", REACT_TEMPLATE)?;
    Ok(env)
}

pub fn render_react(
    env: &Environment<'_>,
    tools: &[ToolDoc<'_>],
    preview: &str,
    question: &str,
    scratchpad: &str,
) -> Result<String, minijinja::Error> {
    let tool_names = tools.iter().map(|t| t.name).collect::<Vec<_>>().join(", ");
    env.get_template("react")?.render(context! {
        tools,
        tool_names,
        preview,
        question,
        scratchpad,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_react_prompt_lists_tools_and_question() {
        let env = environment().unwrap();
        let tools = [
            ToolDoc { name: "value_counts", description: "counts" },
            ToolDoc { name: "describe_column", description: "stats" },
        ];
        let prompt = render_react(&env, &tools, "PassengerId  Survived", "How many survived?", "").unwrap();
        assert!(prompt.contains("value_counts: counts\ndescribe_column: stats\n"));
        assert!(prompt.contains("should be one of [value_counts, describe_column]"));
        assert!(prompt.contains("PassengerId  Survived"));
        assert!(prompt.ends_with("Question: How many survived?\nThought:"));
    }

    #[test]
    fn test_scratchpad_is_appended_verbatim() {
        let env = environment().unwrap();
        let pad = " check\nAction: x\nAction Input: {}\nObservation: 3\nThought: ";
        let prompt = render_react(&env, &[], "", "q", pad).unwrap();
        assert!(prompt.ends_with(&format!("Thought:{pad}")));
    }

    #[test]
    fn test_system_prompt_requests_plot_statement() {
        assert!(SYSTEM_PROMPT.contains("plot is required"));
    }
}
