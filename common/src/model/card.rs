use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of one rendered ID-card PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCard {
    pub id: String,
    pub submission_id: String,
    pub company_id: String,
    pub employee_id: String,
    pub pdf_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub file_size: u64,
    pub generated_at: DateTime<Utc>,
    pub download_count: u64,
}
