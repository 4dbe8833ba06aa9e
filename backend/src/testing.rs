//! Fakes and fixtures shared by the unit tests.

use crate::config::Config;
use crate::objects::LocalObjectStore;
use crate::ocr::{OcrEngine, OcrError, TextAnnotation};
use crate::render::{CardSize, PdfRenderer, RenderError};
use crate::state::AppState;
use crate::store::{to_document, Collection, MemoryStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::model::company::{Company, Subscription, SubscriptionPlan, SubscriptionStatus};
use common::model::field::{FieldKind, TemplateField};
use common::model::form::{Form, FormStatus};
use common::model::submission::{Submission, SubmissionStatus};
use common::model::template::{CardDesign, Template, TemplateFileType, TemplateStatus};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const BASE_URL: &str = "http://localhost:8080";

#[derive(Default)]
pub struct FakeOcr {
    annotations: Vec<TextAnnotation>,
    delay: Option<Duration>,
}

impl FakeOcr {
    /// Engine output for `blocks`, with the joined full text in front.
    pub fn with_blocks(blocks: &[&str]) -> Self {
        let full = blocks.join("\n");
        let annotations = std::iter::once(full.as_str())
            .chain(blocks.iter().copied())
            .map(|text| TextAnnotation {
                description: text.to_string(),
                score: 0.95,
                bounding_poly: Vec::new(),
            })
            .collect();
        Self {
            annotations,
            delay: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::with_blocks(&["Name"])
        }
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn detect_text(&self, _image_path: &str) -> Result<Vec<TextAnnotation>, OcrError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.annotations.clone())
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    calls: AtomicUsize,
    fail: bool,
    delay: Option<Duration>,
}

impl FakeRenderer {
    pub const PDF: &'static [u8] = b"%PDF-1.4 fake card";

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn render(&self, html: &str, _size: CardSize) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail || html.is_empty() {
            return Err(RenderError::Empty);
        }
        Ok(Self::PDF.to_vec())
    }
}

/// Memory store, temp-dir object store and fakes for OCR and rendering.
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn test_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        public_base_url: BASE_URL.to_string(),
        object_root: dir.path().display().to_string(),
        database: crate::config::MEMORY_DATABASE.to_string(),
        ..Config::default()
    };
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(MemoryStore::new()),
        objects: Arc::new(LocalObjectStore::new(dir.path(), BASE_URL)),
        ocr: Arc::new(FakeOcr::with_blocks(&["Name", "Phone"])),
        renderer: Arc::new(FakeRenderer::default()),
    };
    (state, dir)
}

pub fn template(id: &str, requires_photo: bool) -> Template {
    let mut fields = vec![TemplateField {
        id: "field_name".into(),
        label: "Name".into(),
        kind: FieldKind::Text,
        required: true,
        placeholder: "Enter Name".into(),
        validation: None,
        ocr_mapped: true,
        ocr_text: Some("Name:".into()),
    }];
    let mut photo = crate::extract::photo_field();
    photo.required = requires_photo;
    fields.push(photo);

    Template {
        id: id.into(),
        company_id: "c1".into(),
        name: "Staff card".into(),
        original_file: format!("{}/files/templates/c1/{}/card.png", BASE_URL, id),
        file_type: TemplateFileType::Image,
        ocr_processed: false,
        ocr_data: None,
        fields,
        card_design: CardDesign::default(),
        status: TemplateStatus::Draft,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn submission(id: &str) -> Submission {
    Submission {
        id: id.into(),
        form_id: "f1".into(),
        company_id: "c1".into(),
        template_id: "t1".into(),
        employee_data: BTreeMap::from([
            ("name".to_string(), json!("Grace Hopper")),
            ("employee_id".to_string(), json!("EMP-9")),
            ("department".to_string(), json!("Navy")),
        ]),
        photo_url: None,
        qr_code_data: None,
        status: SubmissionStatus::Pending,
        submitted_at: Utc::now(),
        approved_at: None,
        approved_by: None,
        card_url: None,
    }
}

pub async fn seed_template(state: &AppState, id: &str, requires_photo: bool) {
    state
        .store
        .insert(Collection::Templates, id, to_document(&template(id, requires_photo)).unwrap())
        .await
        .unwrap();
}

pub async fn seed_form(state: &AppState, id: &str, status: FormStatus, expires_at: Option<DateTime<Utc>>) {
    let form = Form {
        id: id.into(),
        company_id: "c1".into(),
        template_id: "t1".into(),
        public_url: state.config.form_url(id),
        expires_at,
        max_submissions: None,
        submission_count: 0,
        status,
        created_by: "admin".into(),
        created_at: Utc::now(),
    };
    state
        .store
        .insert(Collection::Forms, id, to_document(&form).unwrap())
        .await
        .unwrap();
}

pub async fn seed_company(state: &AppState, id: &str, cards_used: u64, cards_limit: u64) {
    let company = Company {
        id: id.into(),
        name: "Acme".into(),
        email: "hr@acme.test".into(),
        phone: String::new(),
        address: String::new(),
        logo: String::new(),
        brand_color: None,
        admin_id: "admin".into(),
        subscription: Subscription {
            plan: SubscriptionPlan::Starter,
            start_date: None,
            end_date: None,
            cards_limit,
            cards_used,
            status: SubscriptionStatus::Active,
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    state
        .store
        .insert(Collection::Companies, id, to_document(&company).unwrap())
        .await
        .unwrap();
}

pub async fn seed_submission(state: &AppState, id: &str) {
    state
        .store
        .insert(Collection::Submissions, id, to_document(&submission(id)).unwrap())
        .await
        .unwrap();
}

pub const BOUNDARY: &str = "card-upload-boundary";

/// A `multipart/form-data` body with a `json` part and an optional `photo` part.
pub fn multipart_body(json: &serde_json::Value, photo: Option<&[u8]>) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"json\"\r\nContent-Type: application/json\r\n\r\n{json}\r\n"
    )
    .into_bytes();
    if let Some(photo) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"me.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(photo);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
