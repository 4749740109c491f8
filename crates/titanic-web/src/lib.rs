//! titanic-web: HTTP API for Titanic dataset questions.
//!
//! Routes:
//!   POST /ask     answer a question, optionally with a chart
//!   GET  /health  liveness probe

pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::{AppState, SharedState};
