use crate::model::field::TemplateField;
use crate::model::ocr::OcrData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CARD_WIDTH_MM: f64 = 85.6;
pub const DEFAULT_CARD_HEIGHT_MM: f64 = 53.98;
pub const DEFAULT_CARD_DPI: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    #[default]
    Draft,
    Active,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFileType {
    #[default]
    Image,
    Pdf,
}

/// Physical card layout. Zero dimensions fall back to the CR80 defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDesign {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub dpi: u32,
    /// Custom HTML with `{{employee.*}}`, `{{company.*}}`, `{{photo}}` and `{{qrCode}}` slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_template: Option<String>,
}

impl Default for CardDesign {
    fn default() -> Self {
        Self {
            width: DEFAULT_CARD_WIDTH_MM,
            height: DEFAULT_CARD_HEIGHT_MM,
            dpi: DEFAULT_CARD_DPI,
            html_template: None,
        }
    }
}

impl CardDesign {
    pub fn width_mm(&self) -> f64 {
        if self.width > 0.0 {
            self.width
        } else {
            DEFAULT_CARD_WIDTH_MM
        }
    }

    pub fn height_mm(&self) -> f64 {
        if self.height > 0.0 {
            self.height
        } else {
            DEFAULT_CARD_HEIGHT_MM
        }
    }

    /// The custom layout, if one is set and non-blank.
    pub fn custom_html(&self) -> Option<&str> {
        self.html_template
            .as_deref()
            .filter(|html| !html.trim().is_empty())
    }
}

/// An ID-card design plus the form fields extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub company_id: String,
    #[serde(default)]
    pub name: String,
    /// Object-store path of the uploaded design.
    #[serde(default)]
    pub original_file: String,
    #[serde(default)]
    pub file_type: TemplateFileType,
    #[serde(default)]
    pub ocr_processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_data: Option<OcrData>,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
    #[serde(default)]
    pub card_design: CardDesign,
    #[serde(default)]
    pub status: TemplateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn requires_photo(&self) -> bool {
        self.fields.iter().any(|f| f.is_photo() && f.required)
    }
}
