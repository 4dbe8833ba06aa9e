//! QR code shown on every card: a small JSON payload rendered to a PNG data URL.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{GrayImage, Luma};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use qrcode::{Color, QrCode};
use serde::Serialize;
use thiserror::Error;

/// Smallest edge of the rendered image, in pixels.
pub const MIN_SIZE_PX: u32 = 300;
/// Light modules around the symbol, per side.
pub const QUIET_ZONE: u32 = 1;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("qr encoding failed: {0}")]
    Encode(String),

    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// What a scanner reads back from the card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QrPayload {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "c")]
    pub company: String,
}

impl QrPayload {
    pub fn to_json(&self) -> String {
        // Plain strings and options always serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Draws the symbol with a quiet zone, scaled up to at least [`MIN_SIZE_PX`].
pub fn render_image(data: &str) -> Result<GrayImage, QrError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| QrError::Encode(e.to_string()))?;
    let width = code.width() as u32;
    let colors = code.to_colors();
    let modules = width + 2 * QUIET_ZONE;
    let scale = MIN_SIZE_PX.div_ceil(modules).max(1);
    let size = modules * scale;

    Ok(GrayImage::from_fn(size, size, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let dark = mx >= QUIET_ZONE
            && my >= QUIET_ZONE
            && mx < QUIET_ZONE + width
            && my < QUIET_ZONE + width
            && colors[((my - QUIET_ZONE) * width + (mx - QUIET_ZONE)) as usize] == Color::Dark;
        if dark {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    }))
}

pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, QrError> {
    let (w, h) = img.dimensions();
    let mut out = Vec::new();
    {
        let mut encoder = PngEncoder::new(&mut out, w, h);
        encoder.set_color(PngColorType::Grayscale);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(img.as_raw())?;
        writer.finish()?;
    }
    Ok(out)
}

/// `data:image/png;base64,...` for embedding in card HTML.
pub fn data_url(payload: &QrPayload) -> Result<String, QrError> {
    let png = encode_png(&render_image(&payload.to_json())?)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}
