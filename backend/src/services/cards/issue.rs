//! # Card Issuance Service
//!
//! `POST /api/cards/issue` renders the ID card for one submission and records
//! the issuance.
//!
//! ## Workflow
//!
//! 1.  **Lookup**: submission, then its template, then its company. The first
//!     missing record ends the request with not-found.
//! 2.  **Quota**: the company's `cardsUsed` is compared against its limit
//!     (50 when unset) before any rendering starts.
//! 3.  **Render**: QR code, HTML (template layout or the default one), then
//!     the PDF renderer under the configured timeout.
//! 4.  **Upload**: the PDF goes to `generated_cards/{companyId}/...`.
//! 5.  **Record**: one batch inserts the generated-card record, increments
//!     `subscription.cardsUsed` guarded by the limit, and approves the
//!     submission. Nothing on the submission changes until the render and
//!     upload have succeeded.

use crate::auth::Caller;
use crate::error::{Result, ServiceError};
use crate::objects::safe_segment;
use crate::render::CardSize;
use crate::services::cards::html::{card_html, CardData};
use crate::services::cards::qr::{self, QrPayload};
use crate::state::AppState;
use crate::store::{self, fields, to_document, Collection, CommitOutcome, WriteBatch};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::card::GeneratedCard;
use common::model::company::Company;
use common::model::submission::{Submission, SubmissionStatus};
use common::model::template::Template;
use common::requests::{IssueCardPayload, IssueCardResponse};
use log::{error, info, warn};
use serde_json::{json, Value};
use uuid::Uuid;

pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    payload: web::Json<IssueCardPayload>,
) -> impl Responder {
    match issue_card(&state, &caller, payload.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("Card issuance failed: {}", e);
            e.error_response()
        }
    }
}

fn quota_exhausted() -> ServiceError {
    ServiceError::ResourceExhausted("Card limit reached.".to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub async fn issue_card(
    state: &AppState,
    caller: &Caller,
    payload: IssueCardPayload,
) -> Result<IssueCardResponse> {
    let request = payload.validate()?;
    let submission_id = request.submission_id;
    info!("Generating card for submission {} (by {})", submission_id, caller.uid);

    let store = state.store.as_ref();
    let submission: Submission = store::load(store, Collection::Submissions, &submission_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Submission not found".to_string()))?;
    let template: Template = store::load(store, Collection::Templates, &submission.template_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))?;
    let company: Company = store::load(store, Collection::Companies, &submission.company_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Company not found".to_string()))?;

    let subscription = &company.subscription;
    if subscription.quota_reached() {
        warn!(
            "Company {} is at its card limit ({}/{})",
            company.id,
            subscription.cards_used,
            subscription.effective_limit()
        );
        return Err(quota_exhausted());
    }

    let qr_payload = QrPayload {
        id: non_empty(submission.employee_text("id")).unwrap_or_else(|| submission_id.clone()),
        name: submission.employee_text("name"),
        company: company.name.clone(),
    };
    let qr_code = qr::data_url(&qr_payload)
        .map_err(|e| ServiceError::Internal(format!("PDF generation failed: {}", e)))?;

    let design = &template.card_design;
    let size = CardSize {
        width_mm: design.width_mm(),
        height_mm: design.height_mm(),
    };
    let data = CardData {
        company_name: &company.name,
        company_logo: &company.logo,
        brand_color: company.brand_color.as_deref(),
        employee: &submission.employee_data,
        photo: submission.photo_url.as_deref(),
        qr_code: &qr_code,
        width_mm: size.width_mm,
        height_mm: size.height_mm,
    };
    let html = card_html(design.custom_html(), &data)
        .map_err(|e| ServiceError::Internal(format!("PDF generation failed: {}", e)))?;

    let pdf = tokio::time::timeout(
        state.config.render_timeout,
        state.renderer.render(&html, size),
    )
    .await
    .map_err(|_| {
        error!("Rendering card for submission {} timed out", submission_id);
        ServiceError::Internal("PDF generation timed out.".to_string())
    })??;

    let now = Utc::now();
    let path = format!(
        "generated_cards/{}/{}_{}.pdf",
        safe_segment(&submission.company_id),
        safe_segment(&submission_id),
        now.timestamp_millis()
    );
    let file_size = pdf.len() as u64;
    let pdf_url = state.objects.put(&path, pdf, "application/pdf").await?;

    let card = GeneratedCard {
        id: Uuid::new_v4().simple().to_string(),
        submission_id: submission_id.clone(),
        company_id: submission.company_id.clone(),
        employee_id: non_empty(submission.employee_text("employee_id"))
            .unwrap_or_else(|| submission_id.clone()),
        pdf_url: pdf_url.clone(),
        thumbnail_url: None,
        file_size,
        generated_at: now,
        download_count: 0,
    };

    let limit = i64::try_from(subscription.effective_limit()).unwrap_or(i64::MAX);
    let batch = WriteBatch::new()
        .insert(Collection::GeneratedCards, &card.id, to_document(&card)?)
        .increment_below(
            Collection::Companies,
            &company.id,
            "subscription.cardsUsed",
            1,
            limit,
        )
        .update(
            Collection::Submissions,
            &submission_id,
            fields([
                ("status", to_document(&SubmissionStatus::Approved)?),
                ("approvedAt", to_document(&now)?),
                ("approvedBy", json!(caller.uid)),
                ("cardUrl", json!(pdf_url)),
                ("qrCodeData", Value::String(qr_payload.to_json())),
            ]),
        );

    match store.commit(batch).await? {
        CommitOutcome::Committed => {
            info!(
                "Issued card {} for submission {} ({} bytes)",
                card.id, submission_id, file_size
            );
            Ok(IssueCardResponse {
                success: true,
                pdf_url,
            })
        }
        CommitOutcome::GuardFailed { .. } => {
            warn!(
                "Company {} reached its card limit while rendering; removing {}",
                company.id, path
            );
            if let Err(e) = state.objects.delete(&path).await {
                warn!("Could not remove unreferenced card {}: {}", path, e);
            }
            Err(quota_exhausted())
        }
    }
}
