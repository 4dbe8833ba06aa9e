use serde::{Deserialize, Serialize};

/// Input kind of a registration form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Number,
    Date,
    /// Image upload. Older templates stored this as `file`.
    #[serde(alias = "file")]
    Photo,
}

/// One input slot on the public registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    pub id: String,
    pub label: String,
    #[serde(rename = "fieldType")]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
    /// `true` when the field was proposed from an OCR block.
    #[serde(default)]
    pub ocr_mapped: bool,
    /// The OCR block text the field was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
}

impl TemplateField {
    pub fn is_photo(&self) -> bool {
        self.kind == FieldKind::Photo
    }
}
