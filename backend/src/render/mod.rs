//! PDF rendering boundary: HTML in, PDF bytes sized to a physical card out.

mod chrome;

pub use chrome::HeadlessChromeRenderer;

use async_trait::async_trait;
use thiserror::Error;

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl CardSize {
    /// Pixel dimensions at `dpi`, rounded.
    pub fn pixels(&self, dpi: u32) -> (u32, u32) {
        let to_px = |mm: f64| ((mm / 25.4) * dpi as f64).round() as u32;
        (to_px(self.width_mm), to_px(self.height_mm))
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("renderer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("renderer produced no output")]
    Empty,
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, html: &str, size: CardSize) -> Result<Vec<u8>, RenderError>;
}
