//! OCR engine boundary.
//!
//! An engine returns the detected text annotations for an image in reading
//! order: element 0 is the full concatenated text, the rest are individual
//! blocks. An empty list means no text was found.

mod vision;

pub use vision::VisionClient;

use async_trait::async_trait;
use common::model::ocr::Vertex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotation {
    pub description: String,
    /// Engines that do not score detections report 0.
    pub score: f32,
    pub bounding_poly: Vec<Vertex>,
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine is not configured: {0}")]
    NotConfigured(String),

    #[error("could not read image: {0}")]
    Image(#[from] crate::objects::ObjectError),

    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OCR engine returned an error: {0}")]
    Engine(String),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn detect_text(&self, image_path: &str) -> Result<Vec<TextAnnotation>, OcrError>;
}
