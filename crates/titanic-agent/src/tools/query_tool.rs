//! Tool: filter / group / aggregate query over the passenger table.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use titanic_data::{Dataset, Query};

use super::DataTool;

pub struct QueryTool {
    dataset: Arc<Dataset>,
}

impl QueryTool {
    pub fn new(dataset: Arc<Dataset>) -> Self { Self { dataset } }
}

#[async_trait]
impl DataTool for QueryTool {
    fn name(&self) -> &str { "query_dataframe" }

    fn description(&self) -> &str {
        "Filter rows, optionally group by a column, then aggregate. Action Input is JSON: \
         {\"filters\": [{\"column\": \"Sex\", \"op\": \"eq\", \"value\": \"female\"}], \
         \"group_by\": \"Pclass\", \"aggregate\": {\"column\": \"Survived\", \"func\": \"mean\"}}. \
         ops: eq, ne, gt, ge, lt, le, contains, is_null, not_null. \
         funcs: count, sum, mean, median, min, max, std, nunique. \
         Every key is optional; with no aggregate the matching rows are counted."
    }

    async fn invoke(&self, params: Value) -> Result<Value> {
        let query: Query = match params {
            Value::Null => Query::default(),
            Value::String(ref s) if s.trim().is_empty() => Query::default(),
            other => serde_json::from_value(other).context("Action Input is not a valid query")?,
        };
        let result = self.dataset.run_query(&query)?;
        Ok(serde_json::to_value(result)?)
    }
}
