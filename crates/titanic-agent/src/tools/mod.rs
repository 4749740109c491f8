//! Dataframe tools the agent can call.
//!
//! Each tool wraps one read-only operation on the passenger table and is
//! listed to the model in the ReAct prompt by name and description.
//!
//! Tool lifecycle:
//!   1. Implement `DataTool` for your type.
//!   2. Register with `ToolRegistry::register`.
//!   3. The agent loop invokes tools via `ToolRegistry::invoke(name, params)`.

pub mod query_tool;
pub mod stats_tool;
pub mod table_tool;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use titanic_data::Dataset;

// ─────────────────────────────────────────────
//  Core trait, implemented for each dataframe tool
// ─────────────────────────────────────────────

/// A callable tool in the agent loop.
///
/// # Minimal contract
/// - `name()` must be unique across the registry (snake_case, e.g. `"value_counts"`).
/// - `description()` is shown to the model as the tool docstring, including
///   what to pass as `Action Input`.
/// - `invoke()` receives the parsed action input (a JSON value, or a bare
///   string when the model did not send JSON) and returns the observation.
#[async_trait]
pub trait DataTool: Send + Sync {
    /// Unique tool name (used as the `Action:` identifier).
    fn name(&self) -> &str;

    /// Short description shown to the model.
    fn description(&self) -> &str;

    /// Execute the tool. Errors become `Error: …` observations.
    async fn invoke(&self, params: Value) -> Result<Value>;
}

// ─────────────────────────────────────────────
//  Tool registry
// ─────────────────────────────────────────────

/// Registered tools, kept in registration order so the prompt is stable.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn DataTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Panics if the name is already registered.
    pub fn register<T: DataTool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        assert!(self.get(&name).is_none(), "Duplicate tool name: {name}");
        self.tools.push(Arc::new(tool));
    }

    /// Invoke a registered tool by name.
    pub async fn invoke(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self.get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {name}"))?;

        tracing::info!(tool = name, params = %params, "Invoking tool");

        tool.invoke(params).await
    }

    /// Tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DataTool>> {
        self.tools.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize { self.tools.len() }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool { self.tools.is_empty() }

    /// Get a reference to a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DataTool>> {
        self.tools.iter().find(|t| t.name() == name)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self { Self::new() }
}

/// Build the dataframe tool set over one loaded table.
pub fn build_default_registry(dataset: Arc<Dataset>, preview_rows: usize) -> ToolRegistry {
    let mut reg = ToolRegistry::new();
    reg.register(table_tool::SchemaTool::new(dataset.clone()));
    reg.register(table_tool::HeadTool::new(dataset.clone(), preview_rows));
    reg.register(stats_tool::ValueCountsTool::new(dataset.clone()));
    reg.register(stats_tool::DescribeTool::new(dataset.clone()));
    reg.register(query_tool::QueryTool::new(dataset));
    tracing::debug!("ToolRegistry ready with {} tools", reg.len());
    reg
}

// ─────────────────────────────────────────────
//  Shared helpers
// ─────────────────────────────────────────────

/// Column name from either a bare string or `{"column": "..."}`.
pub(crate) fn column_arg(params: &Value) -> Result<&str> {
    params
        .as_str()
        .or_else(|| params["column"].as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("expected a column name, e.g. {{\"column\": \"Age\"}}"))
}

/// Left-aligned plain-text table, in the spirit of `print(df)`.
pub(crate) fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(headers)];
    lines.extend(rows.iter().map(|r| render(r)));
    lines.join("\n")
}

/// Numbers as a person would read them: integers without a fraction,
/// everything else to at most four decimals.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let s = format!("{value:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

// ─────────────────────────────────────────────
//  Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use titanic_test_utils::SAMPLE_CSV;

    struct EchoTool;

    #[async_trait]
    impl DataTool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes the input params back." }
        async fn invoke(&self, params: Value) -> Result<Value> {
            Ok(serde_json::json!({ "echo": params["message"] }))
        }
    }

    #[tokio::test]
    async fn test_registry_register_and_invoke() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool);
        assert_eq!(reg.len(), 1);

        let result = reg.invoke("echo", serde_json::json!({ "message": "hello" })).await.unwrap();
        assert_eq!(result["echo"], "hello");
    }

    #[tokio::test]
    async fn test_registry_unknown_tool_errors() {
        let reg = ToolRegistry::new();
        let err = reg.invoke("nonexistent", serde_json::json!({})).await;
        assert!(err.is_err());
        assert!(err.unwrap_err().to_string().contains("Unknown tool"));
    }

    #[test]
    #[should_panic(expected = "Duplicate tool name")]
    fn test_duplicate_registration_panics() {
        let mut reg = ToolRegistry::new();
        reg.register(EchoTool);
        reg.register(EchoTool); // should panic
    }

    #[test]
    fn test_default_registry_order() {
        let ds = Arc::new(Dataset::from_reader(SAMPLE_CSV.as_bytes(), "t.csv").unwrap());
        let reg = build_default_registry(ds, 5);
        assert_eq!(
            reg.names(),
            vec!["dataset_schema", "dataset_head", "value_counts", "describe_column", "query_dataframe"]
        );
    }

    #[test]
    fn test_column_arg_forms() {
        assert_eq!(column_arg(&Value::String(" Age ".into())).unwrap(), "Age");
        assert_eq!(column_arg(&serde_json::json!({"column": "Sex"})).unwrap(), "Sex");
        assert!(column_arg(&serde_json::json!({})).is_err());
        assert!(column_arg(&Value::String("".into())).is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(891.0), "891");
        assert_eq!(format_number(0.38383838), "0.3838");
        assert_eq!(format_number(7.25), "7.25");
    }

    #[test]
    fn test_format_table_pads_columns() {
        let table = format_table(
            &["a".into(), "bbb".into()],
            &[vec!["long".into(), "x".into()]],
        );
        assert_eq!(table, "a     bbb\nlong  x");
    }
}
