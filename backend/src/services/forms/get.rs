use crate::error::{Result, ServiceError};
use crate::services::forms::lifecycle::is_usable;
use crate::state::AppState;
use crate::store::{self, Collection};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::form::Form;
use common::model::template::Template;
use common::requests::PublicFormView;
use log::warn;

/// `GET /api/forms/{formId}`: what the public form page needs to render.
/// Unusable forms are still returned, flagged with `usable: false`.
pub async fn process(state: web::Data<AppState>, form_id: web::Path<String>) -> impl Responder {
    match get_public_form(&state, &form_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => {
            warn!("Error retrieving form {}: {}", form_id, e);
            e.error_response()
        }
    }
}

pub async fn get_public_form(state: &AppState, form_id: &str) -> Result<PublicFormView> {
    let form: Form = store::load(state.store.as_ref(), Collection::Forms, form_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Form not found".to_string()))?;
    let template: Template =
        store::load(state.store.as_ref(), Collection::Templates, &form.template_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))?;

    Ok(PublicFormView {
        usable: is_usable(&form, Utc::now()),
        form,
        template_name: template.name,
        fields: template.fields,
    })
}
