//! Request and response payloads for the caller-facing operations.
//!
//! Incoming payloads are deserialized into `*Payload` structs whose fields are
//! all optional, then turned into a validated request with `validate()`. A
//! missing or blank required field therefore surfaces as [`InvalidInput`]
//! with a readable message instead of a deserializer error, and business
//! logic only ever sees fully populated values.
//!
//! [`ApiRequest`] wraps the four core operations into one tagged enum for the
//! single-endpoint call style (`{"operation": "publishForm", "data": {...}}`).

use crate::model::field::TemplateField;
use crate::model::form::Form;
use crate::model::submission::EmployeeData;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A payload failed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput(pub String);

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidInput {}

fn required(value: Option<String>, name: &str) -> Result<String, InvalidInput> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(InvalidInput(format!("Missing required field: {}", name))),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, InvalidInput> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| InvalidInput(format!("Invalid expiry date: {}", raw)))
}

// --- Publish form ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishFormPayload {
    pub company_id: Option<String>,
    pub template_id: Option<String>,
    pub expiry_date: Option<String>,
    pub max_submissions: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublishForm {
    pub company_id: String,
    pub template_id: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// `None` when no cap was requested; a requested cap of 0 means no cap.
    pub max_submissions: Option<u64>,
}

impl PublishFormPayload {
    pub fn validate(self) -> Result<PublishForm, InvalidInput> {
        let company_id = required(self.company_id, "companyId")?;
        let template_id = required(self.template_id, "templateId")?;
        let expires_at = optional(self.expiry_date)
            .map(|raw| parse_expiry(&raw))
            .transpose()?;
        Ok(PublishForm {
            company_id,
            template_id,
            expires_at,
            max_submissions: self.max_submissions.filter(|max| *max > 0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishFormResponse {
    pub success: bool,
    pub form_id: String,
    pub public_url: String,
}

// --- Submit to form ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormPayload {
    pub form_id: Option<String>,
    pub employee_data: Option<EmployeeData>,
    /// Echoed by clients but never trusted; the stored form decides.
    pub company_id: Option<String>,
    /// Echoed by clients but never trusted; the stored form decides.
    pub template_id: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitForm {
    pub form_id: String,
    pub employee_data: EmployeeData,
    pub photo_url: Option<String>,
}

impl SubmitFormPayload {
    pub fn validate(self) -> Result<SubmitForm, InvalidInput> {
        let form_id = required(self.form_id, "formId")?;
        let employee_data = self
            .employee_data
            .ok_or_else(|| InvalidInput("Missing required field: employeeData".to_string()))?;
        Ok(SubmitForm {
            form_id,
            employee_data,
            photo_url: optional(self.photo_url),
        })
    }
}

/// JSON part of the public multipart submission; the form id comes from the path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSubmissionPayload {
    pub employee_data: Option<EmployeeData>,
}

impl PublicSubmissionPayload {
    pub fn validate(self, form_id: &str) -> Result<SubmitForm, InvalidInput> {
        SubmitFormPayload {
            form_id: Some(form_id.to_string()),
            employee_data: self.employee_data,
            ..Default::default()
        }
        .validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormResponse {
    pub success: bool,
    pub submission_id: String,
}

/// What the public registration page needs to render a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicFormView {
    pub form: Form,
    pub template_name: String,
    pub fields: Vec<TemplateField>,
    /// Whether a submission would currently be accepted.
    pub usable: bool,
}

// --- Run extraction ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunExtractionPayload {
    pub template_id: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunExtraction {
    pub template_id: String,
    pub image_path: String,
}

impl RunExtractionPayload {
    pub fn validate(self) -> Result<RunExtraction, InvalidInput> {
        Ok(RunExtraction {
            template_id: required(self.template_id, "templateId")?,
            image_path: required(self.image_path, "imagePath")?,
        })
    }
}

/// Extraction result. `success == false` is the soft "no text found" outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<TemplateField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExtractionResponse {
    pub fn extracted(fields: Vec<TemplateField>) -> Self {
        Self {
            success: true,
            fields: Some(fields),
            message: None,
        }
    }

    pub fn no_text_found() -> Self {
        Self {
            success: false,
            fields: None,
            message: Some("No text found.".to_string()),
        }
    }
}

// --- Issue card ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCardPayload {
    pub submission_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueCard {
    pub submission_id: String,
}

impl IssueCardPayload {
    pub fn validate(self) -> Result<IssueCard, InvalidInput> {
        Ok(IssueCard {
            submission_id: required(self.submission_id, "submissionId")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCardResponse {
    pub success: bool,
    pub pdf_url: String,
}

// --- Templates ---

/// JSON part of the template upload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTemplatePayload {
    pub company_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadTemplate {
    pub company_id: String,
    pub name: String,
}

impl UploadTemplatePayload {
    pub fn validate(self) -> Result<UploadTemplate, InvalidInput> {
        let company_id = required(self.company_id, "companyId")?;
        let name = optional(self.name).unwrap_or_else(|| "Untitled template".to_string());
        Ok(UploadTemplate { company_id, name })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTemplateResponse {
    pub success: bool,
    pub template_id: String,
    pub image_path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFieldsPayload {
    pub fields: Option<Vec<TemplateField>>,
}

impl SaveFieldsPayload {
    /// Field ids must be non-empty and unique within the template.
    pub fn validate(self) -> Result<Vec<TemplateField>, InvalidInput> {
        let fields = self
            .fields
            .ok_or_else(|| InvalidInput("Missing required field: fields".to_string()))?;
        let mut seen = HashSet::new();
        for field in &fields {
            if field.id.trim().is_empty() {
                return Err(InvalidInput("Field id must not be empty".to_string()));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(InvalidInput(format!("Duplicate field id: {}", field.id)));
            }
        }
        Ok(fields)
    }
}

// --- Companies ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompanyPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo: Option<String>,
    pub brand_color: Option<String>,
    pub plan: Option<crate::model::company::SubscriptionPlan>,
    pub cards_limit: Option<u64>,
}

impl RegisterCompanyPayload {
    /// Only the name is mandatory.
    pub fn validate(self) -> Result<Self, InvalidInput> {
        let name = required(self.name, "name")?;
        Ok(Self {
            name: Some(name),
            ..self
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompanyResponse {
    pub success: bool,
    pub company_id: String,
}

// --- Single-endpoint dispatch ---

/// One variant per caller-facing core operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", content = "data", rename_all = "camelCase")]
pub enum ApiRequest {
    PublishForm(PublishFormPayload),
    SubmitForm(SubmitFormPayload),
    RunExtraction(RunExtractionPayload),
    IssueCard(IssueCardPayload),
}

impl ApiRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            ApiRequest::PublishForm(_) => "publishForm",
            ApiRequest::SubmitForm(_) => "submitForm",
            ApiRequest::RunExtraction(_) => "runExtraction",
            ApiRequest::IssueCard(_) => "issueCard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    PublishForm(PublishFormResponse),
    SubmitForm(SubmitFormResponse),
    RunExtraction(ExtractionResponse),
    IssueCard(IssueCardResponse),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_requires_company_and_template() {
        let err = PublishFormPayload {
            company_id: Some("c1".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.0.contains("templateId"));

        let err = PublishFormPayload {
            company_id: Some("   ".into()),
            template_id: Some("t1".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.0.contains("companyId"));
    }

    #[test]
    fn publish_treats_zero_cap_as_uncapped() {
        let req = PublishFormPayload {
            company_id: Some("c1".into()),
            template_id: Some("t1".into()),
            expiry_date: None,
            max_submissions: Some(0),
        }
        .validate()
        .unwrap();
        assert_eq!(req.max_submissions, None);
    }

    #[test]
    fn expiry_accepts_dates_and_timestamps() {
        let day = parse_expiry("2030-01-15").unwrap();
        assert_eq!(day.to_rfc3339(), "2030-01-15T00:00:00+00:00");

        let ts = parse_expiry("2030-01-15T10:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2030-01-15T08:30:00+00:00");

        assert!(parse_expiry("next tuesday").is_err());
    }

    #[test]
    fn submit_requires_employee_data() {
        let err = SubmitFormPayload {
            form_id: Some("f1".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.0.contains("employeeData"));
    }

    #[test]
    fn tagged_request_parses_operation() {
        let req: ApiRequest = serde_json::from_str(
            r#"{"operation":"issueCard","data":{"submissionId":"s1"}}"#,
        )
        .unwrap();
        assert_eq!(req.operation(), "issueCard");
        match req {
            ApiRequest::IssueCard(p) => assert_eq!(p.validate().unwrap().submission_id, "s1"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn save_fields_rejects_duplicate_ids() {
        let field = TemplateField {
            id: "f1".into(),
            label: "Name".into(),
            kind: crate::model::field::FieldKind::Text,
            required: true,
            placeholder: String::new(),
            validation: None,
            ocr_mapped: false,
            ocr_text: None,
        };
        let err = SaveFieldsPayload {
            fields: Some(vec![field.clone(), field]),
        }
        .validate()
        .unwrap_err();
        assert!(err.0.contains("Duplicate"));
    }
}
