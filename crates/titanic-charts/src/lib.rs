//! titanic-charts: decides whether an answer deserves a chart, picks one
//! from the question's wording and renders it as a base64 PNG.

pub mod error;
pub mod fonts;
pub mod heuristic;
pub mod render;

pub use error::ChartError;
pub use heuristic::{detect_plot_needed, plot_requested, ChartKind, PLOT_KEYWORDS};
pub use render::ChartRenderer;
