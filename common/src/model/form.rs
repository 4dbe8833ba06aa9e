use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored form status. Expiry and caps never flip this field; see the
/// backend's usability check for the derived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    #[default]
    Active,
    Closed,
}

/// A published, shareable registration form built from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub company_id: String,
    pub template_id: String,
    pub public_url: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_submissions: Option<u64>,
    #[serde(default)]
    pub submission_count: u64,
    pub status: FormStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
