//! # Template Upload Service
//!
//! `POST /api/templates/upload` stores a card design image and creates the
//! draft template that extraction and field editing later fill in.
//!
//! The request is multipart: a `json` part with `{companyId, name}` and a
//! `file` part with the image or PDF. The file lands at
//! `templates/{companyId}/{templateId}/{filename}`; that object path is
//! returned as `imagePath` and is what `POST /api/templates/extract` expects.

use crate::auth::Caller;
use crate::error::{Result, ServiceError};
use crate::objects::safe_segment;
use crate::services::multipart::{read_parts, FilePart};
use crate::state::AppState;
use crate::store::{to_document, Collection};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::template::{CardDesign, Template, TemplateFileType, TemplateStatus};
use common::requests::{UploadTemplate, UploadTemplatePayload, UploadTemplateResponse};
use log::{info, warn};
use uuid::Uuid;

pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    payload: Multipart,
) -> impl Responder {
    match upload(&state, &caller, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("Template upload failed: {}", e);
            e.error_response()
        }
    }
}

async fn upload(state: &AppState, caller: &Caller, payload: Multipart) -> Result<UploadTemplateResponse> {
    let mut parts = read_parts(payload, state.config.json_limit_bytes).await?;
    let request = parts.json::<UploadTemplatePayload>()?.validate()?;
    let file = parts
        .take_file("file")
        .ok_or_else(|| ServiceError::InvalidInput("Missing file".to_string()))?;
    create_template(state, caller, request, file).await
}

fn file_type_of(file: &FilePart) -> TemplateFileType {
    let is_pdf = file.content_type.as_deref() == Some("application/pdf")
        || file.filename.to_lowercase().ends_with(".pdf");
    if is_pdf {
        TemplateFileType::Pdf
    } else {
        TemplateFileType::Image
    }
}

pub async fn create_template(
    state: &AppState,
    caller: &Caller,
    request: UploadTemplate,
    file: FilePart,
) -> Result<UploadTemplateResponse> {
    let template_id = Uuid::new_v4().simple().to_string();
    let filename = if file.filename.is_empty() {
        "template".to_string()
    } else {
        safe_segment(&file.filename)
    };
    let image_path = format!(
        "templates/{}/{}/{}",
        safe_segment(&request.company_id),
        template_id,
        filename
    );
    info!(
        "Uploading template {} for company {} ({} bytes, by {})",
        template_id,
        request.company_id,
        file.bytes.len(),
        caller.uid
    );

    let file_type = file_type_of(&file);
    let content_type = file
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let url = state.objects.put(&image_path, file.bytes, &content_type).await?;

    let now = Utc::now();
    let template = Template {
        id: template_id.clone(),
        company_id: request.company_id,
        name: request.name,
        original_file: url,
        file_type,
        ocr_processed: false,
        ocr_data: None,
        fields: Vec::new(),
        card_design: CardDesign::default(),
        status: TemplateStatus::Draft,
        created_at: now,
        updated_at: now,
    };
    state
        .store
        .insert(Collection::Templates, &template_id, to_document(&template)?)
        .await?;

    Ok(UploadTemplateResponse {
        success: true,
        template_id,
        image_path,
    })
}
