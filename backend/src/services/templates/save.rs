//! `PUT /api/templates/{template_id}/fields`: the operator's confirmed field
//! list replaces whatever extraction proposed, and the template goes active.

use crate::auth::Caller;
use crate::error::{Result, ServiceError};
use crate::state::AppState;
use crate::store::{fields, to_document, Collection};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::template::TemplateStatus;
use common::requests::SaveFieldsPayload;
use log::{info, warn};
use serde_json::json;

pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    template_id: web::Path<String>,
    payload: web::Json<SaveFieldsPayload>,
) -> impl Responder {
    match save_fields(&state, &caller, &template_id, payload.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(e) => {
            warn!("Saving fields for template {} failed: {}", template_id, e);
            e.error_response()
        }
    }
}

pub async fn save_fields(
    state: &AppState,
    caller: &Caller,
    template_id: &str,
    payload: SaveFieldsPayload,
) -> Result<()> {
    let template_fields = payload.validate()?;

    if state
        .store
        .get(Collection::Templates, template_id)
        .await?
        .is_none()
    {
        return Err(ServiceError::NotFound("Template not found".to_string()));
    }

    state
        .store
        .update(
            Collection::Templates,
            template_id,
            fields([
                ("fields", to_document(&template_fields)?),
                ("status", to_document(&TemplateStatus::Active)?),
                ("updatedAt", to_document(&Utc::now())?),
            ]),
        )
        .await?;

    info!(
        "Saved {} fields on template {} (by {})",
        template_fields.len(),
        template_id,
        caller.uid
    );
    Ok(())
}
