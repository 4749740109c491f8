//! Titanic passenger table.
//!
//! Loads the Kaggle `train.csv` once per process and exposes the
//! dataframe-style operations used by the agent tools and the chart
//! renderer.
//!
//! # Example
//!
//! ```rust,no_run
//! use titanic_data::{Column, DatasetStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), titanic_data::DataError> {
//!     let store = DatasetStore::new("titanic.csv");
//!     let dataset = store.get().await?;
//!
//!     for (value, count) in dataset.value_counts(Column::Pclass) {
//!         println!("class {value}: {count}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod dataset;
pub mod error;
pub mod query;
pub mod schema;
pub mod store;

pub use dataset::{ColumnStats, Dataset};
pub use error::{DataError, Result};
pub use query::{AggFunc, Aggregate, Filter, FilterOp, GroupValue, Query, QueryResult};
pub use schema::{Cell, Column, Passenger};
pub use store::DatasetStore;
