//! # Template Retrieval Service
//!
//! `GET /api/templates/{template_id}` returns the stored template document:
//! file location, OCR output, current fields, card design and status.

use crate::error::{Result, ServiceError};
use crate::state::AppState;
use crate::store::{self, Collection};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::template::Template;
use log::warn;

/// # Returns
/// - `200 OK` with the `Template` as JSON.
/// - `404 Not Found` when no template has that id.
pub async fn process(state: web::Data<AppState>, template_id: web::Path<String>) -> impl Responder {
    match get_template(&state, &template_id).await {
        Ok(template) => HttpResponse::Ok().json(template),
        Err(e) => {
            warn!("Error retrieving template {}: {}", template_id, e);
            e.error_response()
        }
    }
}

pub async fn get_template(state: &AppState, template_id: &str) -> Result<Template> {
    store::load(state.store.as_ref(), Collection::Templates, template_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))
}
