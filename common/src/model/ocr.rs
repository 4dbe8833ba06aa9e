use serde::{Deserialize, Serialize};

/// A corner of a detected text region, in source image pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// One text run reported by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrBlock {
    pub id: String,
    pub text: String,
    /// 0.0 - 1.0; engines that do not score blocks report 0.
    pub confidence: f32,
    #[serde(default)]
    pub bounding_box: Vec<Vertex>,
}

/// OCR result kept on a template: the full text plus its individual blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrData {
    pub raw_text: String,
    pub blocks: Vec<OcrBlock>,
}
