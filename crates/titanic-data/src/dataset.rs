//! In-memory passenger table and the pandas-like summaries the agent and
//! the charts are built from.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{DataError, Result};
use crate::schema::{Cell, Column, Passenger};

/// The loaded Titanic table. Read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    passengers: Vec<Passenger>,
    /// Known columns present in the file, in file order.
    columns: Vec<Column>,
    source: PathBuf,
}

/// Numeric summary of one column, as in `DataFrame.describe()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Dataset {
    /// Parse a CSV with a header row. Unknown columns are ignored; the
    /// required ones (`Survived, Pclass, Sex, Age, SibSp, Parch, Ticket,
    /// Fare, Cabin, Embarked`) must be present.
    pub fn from_reader<R: Read>(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut reader = csv::Reader::from_reader(reader);

        let headers = reader.headers()?.clone();
        let columns: Vec<Column> = headers
            .iter()
            .filter_map(|h| Column::ALL.into_iter().find(|c| c.as_str() == h.trim()))
            .collect();

        for required in Column::ALL {
            if matches!(required, Column::PassengerId | Column::Name) {
                continue;
            }
            if !columns.contains(&required) {
                return Err(DataError::MissingColumn(required.as_str().to_string()));
            }
        }

        let mut passengers = Vec::new();
        for record in reader.deserialize::<Passenger>() {
            passengers.push(record?);
        }

        debug!(rows = passengers.len(), columns = columns.len(), "Parsed passenger table");
        Ok(Self { passengers, columns, source })
    }

    /// Load the table from a CSV file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(DataError::NotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read(path).await?;
        let dataset = Self::from_reader(content.as_slice(), path)?;
        info!(path = %path.display(), rows = dataset.len(), "Titanic dataset loaded");
        Ok(dataset)
    }

    pub fn len(&self) -> usize { self.passengers.len() }

    pub fn is_empty(&self) -> bool { self.passengers.is_empty() }

    pub fn columns(&self) -> &[Column] { &self.columns }

    pub fn source(&self) -> &Path { &self.source }

    pub fn passengers(&self) -> &[Passenger] { &self.passengers }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Resolve a user/model supplied column name against this table.
    pub fn resolve_column(&self, name: &str) -> Result<Column> {
        Column::parse(name)
            .filter(|c| self.has_column(*c))
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    }

    pub fn cells(&self, column: Column) -> impl Iterator<Item = Cell> + '_ {
        self.passengers.iter().map(move |p| p.cell(column))
    }

    /// Non-missing numeric values of a column.
    pub fn numeric_values(&self, column: Column) -> Vec<f64> {
        self.cells(column).filter_map(|c| c.as_f64()).collect()
    }

    /// First `n` rows rendered as strings, in column order.
    pub fn head(&self, n: usize) -> Vec<Vec<String>> {
        self.passengers
            .iter()
            .take(n)
            .map(|p| self.columns.iter().map(|c| p.cell(*c).to_string()).collect())
            .collect()
    }

    /// Distinct non-missing values with their counts, most frequent first.
    /// Ties keep the natural value order.
    pub fn value_counts(&self, column: Column) -> Vec<(Cell, usize)> {
        let mut counts: Vec<(Cell, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for cell in self.cells(column).filter(|c| !c.is_missing()) {
            let key = cell.to_string();
            match index.get(&key) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(key, counts.len());
                    counts.push((cell, 1));
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.sort_cmp(&b.0)));
        counts
    }

    /// Number of distinct non-missing values per column, in column order.
    pub fn nunique(&self) -> Vec<(Column, usize)> {
        self.columns
            .iter()
            .map(|c| {
                let distinct: HashSet<String> = self
                    .cells(*c)
                    .filter(|cell| !cell.is_missing())
                    .map(|cell| cell.to_string())
                    .collect();
                (*c, distinct.len())
            })
            .collect()
    }

    /// Number of missing values per column, in column order.
    pub fn missing_counts(&self) -> Vec<(Column, usize)> {
        self.columns
            .iter()
            .map(|c| (*c, self.cells(*c).filter(Cell::is_missing).count()))
            .collect()
    }

    /// Summary statistics of a numeric column.
    pub fn describe(&self, column: Column) -> Result<ColumnStats> {
        if !column.is_numeric() {
            return Err(DataError::NotNumeric(column.as_str().to_string()));
        }
        let mut values = self.numeric_values(column);
        if values.is_empty() {
            return Err(DataError::Empty(column.as_str().to_string()));
        }
        values.sort_by(f64::total_cmp);

        Ok(ColumnStats {
            column: column.as_str().to_string(),
            count: values.len(),
            mean: mean(&values),
            std: sample_std(&values),
            min: values[0],
            q25: quantile_sorted(&values, 0.25),
            median: quantile_sorted(&values, 0.5),
            q75: quantile_sorted(&values, 0.75),
            max: values[values.len() - 1],
        })
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
