//! Submission endpoints.
//!
//! - `POST /api/forms/submit`: JSON body `{formId, employeeData, ...}`. The
//!   caller's `companyId`/`templateId` are accepted but ignored; the stored
//!   form decides where the submission belongs.
//! - `POST /api/forms/{formId}/submit`: multipart body from the public form
//!   page, a `json` part with `{employeeData}` and an optional `photo` part.
//!
//! Both run the same usability check and record the submission together
//! with the form counter increment.

use crate::error::{Result, ServiceError};
use crate::objects::safe_segment;
use crate::services::forms::lifecycle::{load_for_submission, record_submission};
use crate::services::multipart::{read_parts, FilePart};
use crate::state::AppState;
use crate::store::{self, Collection};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::{DateTime, Utc};
use common::model::form::Form;
use common::model::template::Template;
use common::requests::{
    PublicSubmissionPayload, SubmitForm, SubmitFormPayload, SubmitFormResponse,
};
use log::{info, warn};

const DEFAULT_PHOTO_TYPE: &str = "image/jpeg";

pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<SubmitFormPayload>,
) -> impl Responder {
    match submit_form(&state, payload.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("Form submission failed: {}", e);
            e.error_response()
        }
    }
}

pub async fn process_public(
    state: web::Data<AppState>,
    form_id: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    match submit_public(&state, &form_id, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("Public submission to form {} failed: {}", form_id, e);
            e.error_response()
        }
    }
}

pub async fn submit_form(state: &AppState, payload: SubmitFormPayload) -> Result<SubmitFormResponse> {
    let request = payload.validate()?;
    info!("Submission received for form {}", request.form_id);
    let now = Utc::now();
    let form = load_for_submission(state.store.as_ref(), &request.form_id, now).await?;
    let submission_id = record_submission(state.store.as_ref(), &form, request, now).await?;
    Ok(SubmitFormResponse {
        success: true,
        submission_id,
    })
}

async fn submit_public(
    state: &AppState,
    form_id: &str,
    payload: Multipart,
) -> Result<SubmitFormResponse> {
    let mut parts = read_parts(payload, state.config.json_limit_bytes).await?;
    let request = parts
        .json::<PublicSubmissionPayload>()?
        .validate(form_id)?;
    let photo = parts.take_file("photo");
    submit_with_photo(state, request, photo).await
}

/// Validates the form, enforces the template's photo requirement, stores the
/// photo and records the submission with its URL.
pub async fn submit_with_photo(
    state: &AppState,
    request: SubmitForm,
    photo: Option<FilePart>,
) -> Result<SubmitFormResponse> {
    info!(
        "Public submission received for form {} (photo: {})",
        request.form_id,
        photo.is_some()
    );
    let now = Utc::now();
    let form = load_for_submission(state.store.as_ref(), &request.form_id, now).await?;

    let template: Template = store::load(state.store.as_ref(), Collection::Templates, &form.template_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))?;

    record_with_photo(state, &form, &template, request, photo, now).await
}

/// Stores the photo and records the submission. A photo whose submission
/// is rejected by the form cap is deleted again.
async fn record_with_photo(
    state: &AppState,
    form: &Form,
    template: &Template,
    mut request: SubmitForm,
    photo: Option<FilePart>,
    now: DateTime<Utc>,
) -> Result<SubmitFormResponse> {
    let mut stored_path = None;
    match photo {
        Some(photo) => {
            let path = format!(
                "submissions/{}/{}/{}_photo.jpg",
                safe_segment(&form.company_id),
                safe_segment(&form.id),
                now.timestamp_millis()
            );
            let content_type = photo
                .content_type
                .as_deref()
                .unwrap_or(DEFAULT_PHOTO_TYPE)
                .to_string();
            let url = state.objects.put(&path, photo.bytes, &content_type).await?;
            request.photo_url = Some(url);
            stored_path = Some(path);
        }
        None if template.requires_photo() => {
            return Err(ServiceError::InvalidInput(
                "A photo is required for this form.".to_string(),
            ));
        }
        None => {}
    }

    match record_submission(state.store.as_ref(), form, request, now).await {
        Ok(submission_id) => Ok(SubmitFormResponse {
            success: true,
            submission_id,
        }),
        Err(e) => {
            if let Some(path) = stored_path {
                if let Err(cleanup) = state.objects.delete(&path).await {
                    warn!("Could not remove unreferenced photo {}: {}", path, cleanup);
                }
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_form, seed_template, test_state};
    use common::model::form::FormStatus;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn payload(form_id: &str) -> SubmitFormPayload {
        SubmitFormPayload {
            form_id: Some(form_id.into()),
            employee_data: Some(BTreeMap::from([
                ("name".to_string(), json!("Grace Hopper")),
                ("id".to_string(), json!("E-7")),
            ])),
            company_id: Some("someone-else".into()),
            template_id: Some("not-this-one".into()),
            photo_url: None,
        }
    }

    #[actix_web::test]
    async fn stored_form_decides_company_and_template() {
        let (state, _dir) = test_state();
        seed_form(&state, "f1", FormStatus::Active, None).await;

        let response = submit_form(&state, payload("f1")).await.unwrap();
        let stored = state
            .store
            .get(Collection::Submissions, &response.submission_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["companyId"], json!("c1"));
        assert_eq!(stored["templateId"], json!("t1"));
        assert_eq!(stored["status"], json!("pending"));

        let form = state.store.get(Collection::Forms, "f1").await.unwrap().unwrap();
        assert_eq!(form["submissionCount"], json!(1));
    }

    #[actix_web::test]
    async fn closed_form_writes_nothing() {
        let (state, _dir) = test_state();
        seed_form(&state, "f1", FormStatus::Closed, None).await;

        let err = submit_form(&state, payload("f1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::FailedPrecondition(_)));

        let submissions = state
            .store
            .find_by(Collection::Submissions, "formId", &json!("f1"))
            .await
            .unwrap();
        assert!(submissions.is_empty());
        let form = state.store.get(Collection::Forms, "f1").await.unwrap().unwrap();
        assert_eq!(form["submissionCount"], json!(0));
    }

    #[actix_web::test]
    async fn missing_employee_data_is_invalid_input() {
        let (state, _dir) = test_state();
        let mut bad = payload("f1");
        bad.employee_data = None;
        let err = submit_form(&state, bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn photo_is_stored_and_linked() {
        let (state, _dir) = test_state();
        seed_template(&state, "t1", true).await;
        seed_form(&state, "f1", FormStatus::Active, None).await;

        let request = payload("f1").validate().unwrap();
        let photo = FilePart {
            filename: "me.png".into(),
            content_type: Some("image/png".into()),
            bytes: vec![1, 2, 3],
        };
        let response = submit_with_photo(&state, request, Some(photo)).await.unwrap();

        let stored = state
            .store
            .get(Collection::Submissions, &response.submission_id)
            .await
            .unwrap()
            .unwrap();
        let url = stored["photoUrl"].as_str().unwrap();
        assert!(url.contains("/files/submissions/c1/f1/"));
        assert!(url.ends_with("_photo.jpg"));
    }

    #[actix_web::test]
    async fn photo_is_removed_when_form_fills_first() {
        let (state, dir) = test_state();
        seed_template(&state, "t1", true).await;
        seed_form(&state, "f1", FormStatus::Active, None).await;
        let now = Utc::now();
        let loaded = load_for_submission(state.store.as_ref(), "f1", now).await.unwrap();
        let template: Template = store::load(state.store.as_ref(), Collection::Templates, "t1")
            .await
            .unwrap()
            .unwrap();
        state
            .store
            .update(Collection::Forms, "f1", store::fields([("maxSubmissions", json!(1)), ("submissionCount", json!(1))]))
            .await
            .unwrap();
        let mut stale = loaded.clone();
        stale.max_submissions = Some(1);

        let photo = FilePart {
            filename: "me.jpg".into(),
            content_type: None,
            bytes: vec![1, 2, 3],
        };
        let request = payload("f1").validate().unwrap();
        let err = record_with_photo(&state, &stale, &template, request, Some(photo), now)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ResourceExhausted(_)));

        let photo_dir = dir.path().join("submissions/c1/f1");
        let leftovers = std::fs::read_dir(&photo_dir).map(|d| d.count()).unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[actix_web::test]
    async fn required_photo_cannot_be_skipped() {
        let (state, _dir) = test_state();
        seed_template(&state, "t1", true).await;
        seed_form(&state, "f1", FormStatus::Active, None).await;

        let request = payload("f1").validate().unwrap();
        let err = submit_with_photo(&state, request, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
