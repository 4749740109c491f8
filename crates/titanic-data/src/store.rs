//! Process-wide handle to the passenger table.
//!
//! The CSV is read on first use and the same `Arc<Dataset>` is handed out
//! for the rest of the process. A failed load is not remembered, so a later
//! call retries once the file exists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::dataset::Dataset;
use crate::error::Result;

#[derive(Debug)]
pub struct DatasetStore {
    path: PathBuf,
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), cell: OnceCell::new() }
    }

    /// A store that is already populated, e.g. with a table parsed in memory.
    pub fn preloaded(dataset: Dataset) -> Self {
        let path = dataset.source().to_path_buf();
        Self { path, cell: OnceCell::new_with(Some(Arc::new(dataset))) }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn is_loaded(&self) -> bool { self.cell.initialized() }

    pub async fn get(&self) -> Result<Arc<Dataset>> {
        self.cell
            .get_or_try_init(|| async { Dataset::load(&self.path).await.map(Arc::new) })
            .await
            .cloned()
    }
}
