//! Zero-shot ReAct agent over the passenger table.
//!
//! Each turn renders the prompt (tool list, table preview, question and the
//! scratchpad of earlier steps), asks the model to continue it and either
//! runs the requested tool or returns the final answer. The model call is
//! cut at `\nObservation:` so the observation always comes from the tool.

use std::sync::Arc;
use std::time::Instant;

use minijinja::Environment;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use titanic_config::AgentConfig;
use titanic_data::Dataset;
use titanic_llm::{LlmBackend, LlmRequest, Message};

use crate::error::AgentError;
use crate::parser::{parse_action_input, parse_reply, ReActStep};
use crate::prompts::{self, ToolDoc, SYSTEM_PROMPT};
use crate::tools::{build_default_registry, table_tool::head_table, ToolRegistry};

pub const STOP_SEQUENCE: &str = "\nObservation:";
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub max_iterations: usize,
    pub max_observation_chars: usize,
    pub preview_rows: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

impl From<&AgentConfig> for AgentSettings {
    fn from(cfg: &AgentConfig) -> Self {
        Self {
            max_iterations: cfg.max_iterations.max(1),
            max_observation_chars: cfg.max_observation_chars,
            preview_rows: cfg.preview_rows,
        }
    }
}

/// One tool call and what it returned.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub input: String,
    pub observation: String,
    #[serde(skip)]
    log: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentOutput {
    pub output: String,
    pub steps: Vec<AgentStep>,
}

pub struct DataFrameAgent {
    llm: Arc<dyn LlmBackend>,
    tools: ToolRegistry,
    settings: AgentSettings,
    env: Environment<'static>,
    preview: String,
}

impl DataFrameAgent {
    pub fn new(
        llm: Arc<dyn LlmBackend>,
        dataset: Arc<Dataset>,
        settings: AgentSettings,
    ) -> Result<Self, AgentError> {
        let preview = head_table(&dataset, settings.preview_rows);
        let tools = build_default_registry(dataset, settings.preview_rows);
        let env = prompts::environment()?;
        info!(model = llm.model_id(), tools = tools.len(), "Dataframe agent ready");
        Ok(Self { llm, tools, settings, env, preview })
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer one question. Tool failures are fed back to the model; only
    /// model or prompt failures end the run with an error.
    pub async fn invoke(&self, question: &str) -> Result<AgentOutput, AgentError> {
        let started = Instant::now();
        let mut steps: Vec<AgentStep> = Vec::new();

        for iteration in 1..=self.settings.max_iterations {
            let prompt = self.render_prompt(question, &steps)?;
            let request = LlmRequest {
                messages: vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
                stop: Some(vec![STOP_SEQUENCE.to_string()]),
                ..Default::default()
            };
            let reply = self.llm.complete(request).await?;
            debug!(iteration, reply = %reply.content, "Agent reply");

            match parse_reply(&reply.content) {
                ReActStep::Finish { answer } => {
                    info!(
                        iterations = iteration,
                        tool_calls = steps.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Agent finished"
                    );
                    return Ok(AgentOutput { output: answer, steps });
                }
                ReActStep::Action { tool, input, log } => {
                    let observation = self.run_tool(&tool, &input).await;
                    debug!(iteration, tool = %tool, observation = %observation, "Tool observation");
                    steps.push(AgentStep { tool, input, observation, log });
                }
            }
        }

        warn!(
            max_iterations = self.settings.max_iterations,
            "Agent hit the iteration limit without a final answer"
        );
        Ok(AgentOutput { output: ITERATION_LIMIT_ANSWER.to_string(), steps })
    }

    fn render_prompt(&self, question: &str, steps: &[AgentStep]) -> Result<String, AgentError> {
        let docs: Vec<ToolDoc<'_>> = self
            .tools
            .iter()
            .map(|t| ToolDoc { name: t.name(), description: t.description() })
            .collect();
        let scratchpad: String = steps
            .iter()
            .map(|s| format!("{}\nObservation: {}\nThought: ", s.log, s.observation))
            .collect();
        Ok(prompts::render_react(&self.env, &docs, &self.preview, question, &scratchpad)?)
    }

    async fn run_tool(&self, tool: &str, input: &str) -> String {
        if self.tools.get(tool).is_none() {
            return format!(
                "{tool} is not a valid tool, try one of [{}].",
                self.tools.names().join(", ")
            );
        }
        let observation = match self.tools.invoke(tool, parse_action_input(input)).await {
            Ok(Value::String(s)) => s,
            Ok(other) => other.to_string(),
            Err(e) => {
                warn!(tool, error = %e, "Tool failed");
                format!("Error: {e:#}")
            }
        };
        truncate_observation(observation, self.settings.max_observation_chars)
    }
}

fn truncate_observation(text: String, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text;
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("\n... (truncated)");
    out
}
