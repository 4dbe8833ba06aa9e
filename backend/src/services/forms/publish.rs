//! `POST /api/forms/publish`: turns a template into a shareable form.

use crate::auth::Caller;
use crate::error::{Result, ServiceError};
use crate::services::forms::lifecycle::new_form_id;
use crate::state::AppState;
use crate::store::{to_document, Collection, StoreError};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::form::{Form, FormStatus};
use common::requests::{PublishFormPayload, PublishFormResponse};
use log::{info, warn};

/// Fresh ids are drawn again only on a create-only conflict.
const MAX_ID_ATTEMPTS: usize = 3;

pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    payload: web::Json<PublishFormPayload>,
) -> impl Responder {
    match publish_form(&state, &caller, payload.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("Publish form failed: {}", e);
            e.error_response()
        }
    }
}

pub async fn publish_form(
    state: &AppState,
    caller: &Caller,
    payload: PublishFormPayload,
) -> Result<PublishFormResponse> {
    let request = payload.validate()?;
    info!(
        "Publishing form for company {} template {} (by {})",
        request.company_id, request.template_id, caller.uid
    );

    for _ in 0..MAX_ID_ATTEMPTS {
        let id = new_form_id();
        let form = Form {
            public_url: state.config.form_url(&id),
            id,
            company_id: request.company_id.clone(),
            template_id: request.template_id.clone(),
            expires_at: request.expires_at,
            max_submissions: request.max_submissions,
            submission_count: 0,
            status: FormStatus::Active,
            created_by: caller.uid.clone(),
            created_at: Utc::now(),
        };

        match state
            .store
            .insert(Collection::Forms, &form.id, to_document(&form)?)
            .await
        {
            Ok(()) => {
                info!("Published form {} at {}", form.id, form.public_url);
                return Ok(PublishFormResponse {
                    success: true,
                    form_id: form.id,
                    public_url: form.public_url,
                });
            }
            Err(StoreError::AlreadyExists(_, id)) => {
                warn!("Form id {} already taken, drawing another", id);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::Internal(
        "Failed to allocate a unique form id.".to_string(),
    ))
}
