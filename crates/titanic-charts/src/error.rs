use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

use titanic_data::DataError;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Dataset error: {0}")]
    Data(#[from] DataError),

    #[error("Nothing to plot: {0}")]
    NoData(String),

    #[error("Drawing failed: {0}")]
    Draw(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Pixel buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Draw(e.to_string())
    }
}
