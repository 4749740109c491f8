//! Tools: per-column frequency tables and summary statistics.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use titanic_data::Dataset;

use super::{column_arg, format_number, format_table, DataTool};

pub struct ValueCountsTool {
    dataset: Arc<Dataset>,
}

impl ValueCountsTool {
    pub fn new(dataset: Arc<Dataset>) -> Self { Self { dataset } }
}

#[async_trait]
impl DataTool for ValueCountsTool {
    fn name(&self) -> &str { "value_counts" }

    fn description(&self) -> &str {
        "Frequency of each distinct value in one column, most common first, \
         like df[column].value_counts(). Action Input: {\"column\": \"Embarked\"}"
    }

    async fn invoke(&self, params: Value) -> Result<Value> {
        let column = self.dataset.resolve_column(column_arg(&params)?)?;
        let counts = self.dataset.value_counts(column);
        let missing = self.dataset.len() - counts.iter().map(|(_, n)| n).sum::<usize>();

        let headers = [column.to_string(), "count".to_string()];
        let rows: Vec<Vec<String>> = counts
            .iter()
            .map(|(value, n)| vec![value.to_string(), n.to_string()])
            .collect();

        let mut out = format_table(&headers, &rows);
        if missing > 0 {
            out.push_str(&format!("\nmissing: {missing}"));
        }
        Ok(Value::String(out))
    }
}

pub struct DescribeTool {
    dataset: Arc<Dataset>,
}

impl DescribeTool {
    pub fn new(dataset: Arc<Dataset>) -> Self { Self { dataset } }
}

#[async_trait]
impl DataTool for DescribeTool {
    fn name(&self) -> &str { "describe_column" }

    fn description(&self) -> &str {
        "Summary of one column, like df[column].describe(): count, mean, std, min, \
         quartiles and max for numbers; count, unique, top and freq for text. \
         Action Input: {\"column\": \"Age\"}"
    }

    async fn invoke(&self, params: Value) -> Result<Value> {
        let column = self.dataset.resolve_column(column_arg(&params)?)?;

        let lines: Vec<(String, String)> = if column.is_numeric() {
            let s = self.dataset.describe(column)?;
            vec![
                ("count".into(),  s.count.to_string()),
                ("mean".into(),   format_number(s.mean)),
                ("std".into(),    s.std.map_or("NaN".to_string(), format_number)),
                ("min".into(),    format_number(s.min)),
                ("25%".into(),    format_number(s.q25)),
                ("50%".into(),    format_number(s.median)),
                ("75%".into(),    format_number(s.q75)),
                ("max".into(),    format_number(s.max)),
            ]
        } else {
            let counts = self.dataset.value_counts(column);
            let (top, freq) = counts
                .first()
                .map(|(v, n)| (v.to_string(), n.to_string()))
                .unwrap_or_else(|| ("NaN".into(), "0".into()));
            vec![
                ("count".into(),  counts.iter().map(|(_, n)| n).sum::<usize>().to_string()),
                ("unique".into(), counts.len().to_string()),
                ("top".into(),    top),
                ("freq".into(),   freq),
            ]
        };

        let rows: Vec<Vec<String>> = lines.into_iter().map(|(k, v)| vec![k, v]).collect();
        Ok(Value::String(format_table(&[String::new(), column.to_string()], &rows)))
    }
}
