//! titanic-agent: natural-language questions over the passenger table.
//!
//! A zero-shot ReAct agent: the model reasons in `Thought / Action /
//! Action Input` turns, each action runs one of the dataframe tools in
//! [`tools`], and the loop ends on `Final Answer:`.

pub mod agent;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod tools;

pub use agent::{AgentOutput, AgentSettings, AgentStep, DataFrameAgent, ITERATION_LIMIT_ANSWER, STOP_SEQUENCE};
pub use error::AgentError;
pub use tools::{DataTool, ToolRegistry};
