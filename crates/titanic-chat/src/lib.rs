//! titanic-chat: terminal client for the Titanic Q&A API.
//!
//! Keeps the conversation in memory, saves returned charts as PNG files and
//! starts the API server itself when nothing is listening yet.

pub mod backend;
pub mod client;
pub mod plots;
pub mod summary;
pub mod transcript;
pub mod ui;

pub use client::{ApiClient, ClientError};
pub use plots::{attached_chart, PlotSaver};
pub use summary::DatasetSummary;
pub use transcript::{Role, Transcript, Turn};
