//! Structured dataframe operations: filter rows, optionally group by one
//! column, then aggregate. This is the operation language the agent's
//! `query_dataframe` tool accepts as JSON, e.g.
//!
//! ```json
//! {
//!   "filters":   [{"column": "Sex", "op": "eq", "value": "female"}],
//!   "group_by":  "Pclass",
//!   "aggregate": {"column": "Survived", "func": "mean"}
//! }
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::{mean, quantile_sorted, sample_std, Dataset};
use crate::error::{DataError, Result};
use crate::schema::{Cell, Column, Passenger};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub group_by: Option<String>,
    /// Defaults to counting rows.
    #[serde(default)]
    pub aggregate: Option<Aggregate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Contains,
    IsNull,
    NotNull,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregate {
    /// Column to aggregate. Only `count` may omit it (counts rows).
    #[serde(default)]
    pub column: Option<String>,
    pub func: AggFunc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggFunc {
    Count,
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Std,
    Nunique,
}

impl AggFunc {
    fn needs_numeric(&self) -> bool {
        !matches!(self, AggFunc::Count | AggFunc::Nunique)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResult {
    Scalar {
        rows_matched: usize,
        func: AggFunc,
        column: Option<String>,
        value: Option<f64>,
    },
    Grouped {
        rows_matched: usize,
        func: AggFunc,
        column: Option<String>,
        group_by: String,
        groups: Vec<GroupValue>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupValue {
    pub key: Cell,
    pub size: usize,
    pub value: Option<f64>,
}

/// A filter with its column resolved and its operand checked.
struct BoundFilter<'a> {
    column: Column,
    op: FilterOp,
    value: Option<&'a Value>,
}

impl BoundFilter<'_> {
    fn matches(&self, passenger: &Passenger) -> bool {
        let cell = passenger.cell(self.column);
        match self.op {
            FilterOp::IsNull  => return cell.is_missing(),
            FilterOp::NotNull => return !cell.is_missing(),
            _ => {}
        }
        let Some(value) = self.value else { return false };
        if cell.is_missing() {
            // NaN compares unequal to everything
            return self.op == FilterOp::Ne;
        }

        let rhs = json_as_text(value).to_lowercase();
        if self.op == FilterOp::Contains {
            return cell.to_string().to_lowercase().contains(&rhs);
        }

        let ordering = match (cell.as_f64(), json_as_f64(value)) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => Some(cell.to_string().to_lowercase().cmp(&rhs)),
        };
        let Some(ord) = ordering else { return false };
        match self.op {
            FilterOp::Eq => ord == Ordering::Equal,
            FilterOp::Ne => ord != Ordering::Equal,
            FilterOp::Gt => ord == Ordering::Greater,
            FilterOp::Ge => ord != Ordering::Less,
            FilterOp::Lt => ord == Ordering::Less,
            FilterOp::Le => ord != Ordering::Greater,
            FilterOp::Contains | FilterOp::IsNull | FilterOp::NotNull => false,
        }
    }
}

fn json_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b)   => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn json_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn aggregate(func: AggFunc, cells: &[Cell], rows: usize) -> Option<f64> {
    let mut values: Vec<f64> = cells.iter().filter_map(Cell::as_f64).collect();
    values.sort_by(f64::total_cmp);

    match func {
        AggFunc::Count if cells.is_empty() => Some(rows as f64),
        AggFunc::Count => Some(cells.iter().filter(|c| !c.is_missing()).count() as f64),
        AggFunc::Nunique => {
            let distinct: HashSet<String> = cells
                .iter()
                .filter(|c| !c.is_missing())
                .map(|c| c.to_string())
                .collect();
            Some(distinct.len() as f64)
        }
        _ if values.is_empty() => None,
        AggFunc::Sum    => Some(values.iter().sum()),
        AggFunc::Mean   => Some(mean(&values)),
        AggFunc::Median => Some(quantile_sorted(&values, 0.5)),
        AggFunc::Min    => values.first().copied(),
        AggFunc::Max    => values.last().copied(),
        AggFunc::Std    => sample_std(&values),
    }
}

impl Dataset {
    /// Run a structured query against the table.
    pub fn run_query(&self, query: &Query) -> Result<QueryResult> {
        let filters = query
            .filters
            .iter()
            .map(|f| {
                let column = self.resolve_column(&f.column)?;
                let needs_value = !matches!(f.op, FilterOp::IsNull | FilterOp::NotNull);
                if needs_value && f.value.as_ref().map_or(true, Value::is_null) {
                    return Err(DataError::InvalidQuery(format!(
                        "filter on {} with op {:?} needs a value", column, f.op
                    )));
                }
                Ok(BoundFilter { column, op: f.op, value: f.value.as_ref() })
            })
            .collect::<Result<Vec<_>>>()?;

        let (func, agg_column) = match &query.aggregate {
            None => (AggFunc::Count, None),
            Some(agg) => {
                let column = agg.column.as_deref().map(|c| self.resolve_column(c)).transpose()?;
                match column {
                    None if agg.func != AggFunc::Count => {
                        return Err(DataError::InvalidQuery(format!(
                            "aggregate {:?} needs a column", agg.func
                        )));
                    }
                    Some(c) if agg.func.needs_numeric() && !c.is_numeric() => {
                        return Err(DataError::NotNumeric(c.as_str().to_string()));
                    }
                    _ => {}
                }
                (agg.func, column)
            }
        };

        let rows: Vec<&Passenger> = self
            .passengers()
            .iter()
            .filter(|p| filters.iter().all(|f| f.matches(p)))
            .collect();

        let values_of = |subset: &[&Passenger]| -> Vec<Cell> {
            match agg_column {
                Some(c) => subset.iter().map(|p| p.cell(c)).collect(),
                None => Vec::new(),
            }
        };
        let column_name = agg_column.map(|c| c.as_str().to_string());

        let Some(group_name) = &query.group_by else {
            return Ok(QueryResult::Scalar {
                rows_matched: rows.len(),
                func,
                column: column_name,
                value: aggregate(func, &values_of(&rows), rows.len()),
            });
        };

        let group_column = self.resolve_column(group_name)?;
        let mut groups: Vec<(Cell, Vec<&Passenger>)> = Vec::new();
        for p in rows.iter().copied() {
            let key = p.cell(group_column);
            if key.is_missing() {
                continue;
            }
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(p),
                None => groups.push((key, vec![p])),
            }
        }
        groups.sort_by(|a, b| a.0.sort_cmp(&b.0));

        let groups = groups
            .into_iter()
            .map(|(key, members)| GroupValue {
                size: members.len(),
                value: aggregate(func, &values_of(&members), members.len()),
                key,
            })
            .collect();

        Ok(QueryResult::Grouped {
            rows_matched: rows.len(),
            func,
            column: column_name,
            group_by: group_column.as_str().to_string(),
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use titanic_test_utils::SAMPLE_CSV;

    fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE_CSV.as_bytes(), "sample.csv").unwrap()
    }

    fn parse(v: Value) -> Query {
        serde_json::from_value(v).unwrap()
    }

    fn scalar(result: QueryResult) -> Option<f64> {
        match result {
            QueryResult::Scalar { value, .. } => value,
            other => panic!("expected scalar, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_query_counts_rows() {
        assert_eq!(scalar(sample().run_query(&Query::default()).unwrap()), Some(20.0));
    }

    #[test]
    fn test_filter_is_case_insensitive_on_text() {
        let q = parse(json!({"filters": [{"column": "sex", "op": "eq", "value": "FEMALE"}]}));
        assert_eq!(scalar(sample().run_query(&q).unwrap()), Some(11.0));
    }

    #[test]
    fn test_numeric_filter_accepts_string_operand() {
        let q = parse(json!({"filters": [{"column": "Age", "op": "gt", "value": "50"}]}));
        assert_eq!(scalar(sample().run_query(&q).unwrap()), Some(3.0));
    }

    #[test]
    fn test_missing_values_skip_comparisons() {
        let q = parse(json!({"filters": [{"column": "Age", "op": "is_null"}]}));
        assert_eq!(scalar(sample().run_query(&q).unwrap()), Some(3.0));

        let q = parse(json!({"filters": [{"column": "Age", "op": "ge", "value": 0}]}));
        assert_eq!(scalar(sample().run_query(&q).unwrap()), Some(17.0));
    }

    #[test]
    fn test_survival_rate_by_sex() {
        let q = parse(json!({
            "group_by": "Sex",
            "aggregate": {"column": "Survived", "func": "mean"}
        }));
        match sample().run_query(&q).unwrap() {
            QueryResult::Grouped { groups, group_by, rows_matched, .. } => {
                assert_eq!(group_by, "Sex");
                assert_eq!(rows_matched, 20);
                assert_eq!(groups.len(), 2);
                assert_eq!(groups[0].key, Cell::Text("female".into()));
                assert_eq!(groups[0].size, 11);
                assert!((groups[0].value.unwrap() - 9.0 / 11.0).abs() < 1e-9);
                assert_eq!(groups[1].key, Cell::Text("male".into()));
                assert!((groups[1].value.unwrap() - 1.0 / 9.0).abs() < 1e-9);
            }
            other => panic!("expected groups, got {other:?}"),
        }
    }

    #[test]
    fn test_mean_fare_first_class() {
        let q = parse(json!({
            "filters": [{"column": "class", "op": "eq", "value": 1}],
            "aggregate": {"column": "Fare", "func": "mean"}
        }));
        let mean = scalar(sample().run_query(&q).unwrap()).unwrap();
        assert!((mean - 50.69895).abs() < 1e-6);
    }

    #[test]
    fn test_groups_drop_missing_keys() {
        let q = parse(json!({"group_by": "Cabin"}));
        match sample().run_query(&q).unwrap() {
            QueryResult::Grouped { groups, .. } => {
                assert_eq!(groups.len(), 5);
                assert!(groups.iter().all(|g| g.value == Some(1.0)));
            }
            other => panic!("expected groups, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_aggregate_on_text_column_errors() {
        let q = parse(json!({"aggregate": {"column": "Embarked", "func": "mean"}}));
        assert!(matches!(sample().run_query(&q), Err(DataError::NotNumeric(_))));
    }

    #[test]
    fn test_unknown_column_errors() {
        let q = parse(json!({"filters": [{"column": "lifeboat", "op": "not_null"}]}));
        assert!(matches!(sample().run_query(&q), Err(DataError::UnknownColumn(_))));
    }

    #[test]
    fn test_comparison_without_value_errors() {
        let q = parse(json!({"filters": [{"column": "Fare", "op": "gt"}]}));
        assert!(matches!(sample().run_query(&q), Err(DataError::InvalidQuery(_))));
    }

    #[test]
    fn test_nunique_embarked() {
        let q = parse(json!({"aggregate": {"column": "Embarked", "func": "nunique"}}));
        assert_eq!(scalar(sample().run_query(&q).unwrap()), Some(3.0));
    }
}
