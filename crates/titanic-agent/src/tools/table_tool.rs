//! Tools: table shape and row preview.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use titanic_data::Dataset;

use super::{format_table, DataTool};

const MAX_HEAD_ROWS: usize = 50;

/// Rows rendered as a text table with the column header, like `df.head(n)`.
pub fn head_table(dataset: &Dataset, n: usize) -> String {
    let headers: Vec<String> = dataset.columns().iter().map(|c| c.to_string()).collect();
    format_table(&headers, &dataset.head(n))
}

pub struct SchemaTool {
    dataset: Arc<Dataset>,
}

impl SchemaTool {
    pub fn new(dataset: Arc<Dataset>) -> Self { Self { dataset } }
}

#[async_trait]
impl DataTool for SchemaTool {
    fn name(&self) -> &str { "dataset_schema" }

    fn description(&self) -> &str {
        "Row count and, for every column, its dtype, non-null count and number of \
         distinct values. Action Input: {}"
    }

    async fn invoke(&self, _params: Value) -> Result<Value> {
        let ds = &self.dataset;
        let missing: HashMap<_, _> = ds.missing_counts().into_iter().collect();
        let unique: HashMap<_, _> = ds.nunique().into_iter().collect();

        let headers = ["column", "dtype", "non-null", "unique"].map(String::from);
        let rows: Vec<Vec<String>> = ds
            .columns()
            .iter()
            .map(|c| {
                vec![
                    c.to_string(),
                    c.dtype().to_string(),
                    (ds.len() - missing.get(c).copied().unwrap_or(0)).to_string(),
                    unique.get(c).copied().unwrap_or(0).to_string(),
                ]
            })
            .collect();

        Ok(Value::String(format!(
            "rows: {}\ncolumns: {}\n{}",
            ds.len(),
            ds.columns().len(),
            format_table(&headers, &rows)
        )))
    }
}

pub struct HeadTool {
    dataset: Arc<Dataset>,
    default_rows: usize,
}

impl HeadTool {
    pub fn new(dataset: Arc<Dataset>, default_rows: usize) -> Self {
        Self { dataset, default_rows }
    }
}

#[async_trait]
impl DataTool for HeadTool {
    fn name(&self) -> &str { "dataset_head" }

    fn description(&self) -> &str {
        "First rows of the table, like df.head(n). Action Input: {\"n\": 5}"
    }

    async fn invoke(&self, params: Value) -> Result<Value> {
        let n = params
            .as_u64()
            .or_else(|| params["n"].as_u64())
            .or_else(|| params.as_str().and_then(|s| s.trim().parse().ok()))
            .map(|n| n as usize)
            .unwrap_or(self.default_rows)
            .min(MAX_HEAD_ROWS);
        Ok(Value::String(head_table(&self.dataset, n)))
    }
}
