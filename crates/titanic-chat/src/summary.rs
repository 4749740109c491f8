//! Dataset overview shown when the client starts.

use std::path::Path;

use titanic_data::{DataError, Dataset};

pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    pub preview: Vec<Vec<String>>,
}

impl DatasetSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            rows: dataset.len(),
            columns: dataset.columns().iter().map(|c| c.as_str().to_string()).collect(),
            preview: dataset.head(PREVIEW_ROWS),
        }
    }

    pub async fn load(path: &Path) -> Result<Self, DataError> {
        let dataset = Dataset::load(path).await?;
        Ok(Self::from_dataset(&dataset))
    }

    /// Preview rows as an aligned plain-text table with a header line.
    pub fn preview_table(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.preview {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, &w)| format!("{c:<w$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&self.columns);
        for row in &self.preview {
            out.push('\n');
            out.push_str(&line(row));
        }
        out
    }
}
