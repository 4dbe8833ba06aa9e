//! # Template Extraction Service
//!
//! `POST /api/templates/extract` runs OCR over an uploaded template image and
//! stores the proposed fields on the template.
//!
//! When the engine finds no text the template is left untouched and the
//! caller gets `{success: false, message: "No text found."}` so the operator
//! can enter fields by hand. Engine errors and timeouts are internal errors.

use crate::auth::Caller;
use crate::error::{Result, ServiceError};
use crate::extract::extract;
use crate::state::AppState;
use crate::store::{fields, to_document, Collection};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::requests::{ExtractionResponse, RunExtractionPayload};
use log::{error, info, warn};
use serde_json::Value;

pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    payload: web::Json<RunExtractionPayload>,
) -> impl Responder {
    match run_extraction(&state, &caller, payload.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("Extraction failed: {}", e);
            e.error_response()
        }
    }
}

pub async fn run_extraction(
    state: &AppState,
    caller: &Caller,
    payload: RunExtractionPayload,
) -> Result<ExtractionResponse> {
    let request = payload.validate()?;
    info!(
        "Processing OCR for template {}, path {} (by {})",
        request.template_id, request.image_path, caller.uid
    );

    if state
        .store
        .get(Collection::Templates, &request.template_id)
        .await?
        .is_none()
    {
        return Err(ServiceError::NotFound("Template not found".to_string()));
    }

    let annotations = tokio::time::timeout(
        state.config.ocr_timeout,
        state.ocr.detect_text(&request.image_path),
    )
    .await
    .map_err(|_| {
        error!("OCR for template {} timed out", request.template_id);
        ServiceError::Internal("OCR processing timed out.".to_string())
    })??;

    let Some(extraction) = extract(&annotations) else {
        info!("No text found on template {}", request.template_id);
        return Ok(ExtractionResponse::no_text_found());
    };

    state
        .store
        .update(
            Collection::Templates,
            &request.template_id,
            fields([
                ("ocrProcessed", Value::Bool(true)),
                ("ocrData", to_document(&extraction.ocr_data())?),
                ("fields", to_document(&extraction.fields)?),
                ("updatedAt", to_document(&Utc::now())?),
            ]),
        )
        .await?;

    info!(
        "Template {}: {} blocks, {} proposed fields",
        request.template_id,
        extraction.blocks.len(),
        extraction.fields.len()
    );
    Ok(ExtractionResponse::extracted(extraction.fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_template, test_state, FakeOcr};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn caller() -> Caller {
        Caller { uid: "admin".into() }
    }

    fn payload() -> RunExtractionPayload {
        RunExtractionPayload {
            template_id: Some("t1".into()),
            image_path: Some("templates/c1/t1/card.png".into()),
        }
    }

    #[actix_web::test]
    async fn stores_ocr_data_and_proposed_fields() {
        let (mut state, _dir) = test_state();
        state.ocr = Arc::new(FakeOcr::with_blocks(&["John Doe", "Employee ID: 4821", "Role: Engineer"]));
        seed_template(&state, "t1", false).await;

        let response = run_extraction(&state, &caller(), payload()).await.unwrap();
        assert!(response.success);
        let proposed = response.fields.unwrap();
        assert_eq!(proposed.len(), 3);
        assert!(proposed[2].is_photo());

        let stored = state.store.get(Collection::Templates, "t1").await.unwrap().unwrap();
        assert_eq!(stored["ocrProcessed"], json!(true));
        assert_eq!(stored["ocrData"]["blocks"].as_array().unwrap().len(), 3);
        assert_eq!(stored["ocrData"]["blocks"][1]["id"], json!("block_1"));
        assert_eq!(stored["fields"].as_array().unwrap().len(), 3);
        assert_eq!(stored["fields"][0]["fieldType"], json!("text"));
    }

    #[actix_web::test]
    async fn no_text_is_a_soft_result() {
        let (mut state, _dir) = test_state();
        state.ocr = Arc::new(FakeOcr::empty());
        seed_template(&state, "t1", false).await;

        let response = run_extraction(&state, &caller(), payload()).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("No text found."));

        let stored = state.store.get(Collection::Templates, "t1").await.unwrap().unwrap();
        assert_eq!(stored["ocrProcessed"], json!(false));
    }

    #[actix_web::test]
    async fn engine_timeout_is_internal() {
        let (mut state, _dir) = test_state();
        state.ocr = Arc::new(FakeOcr::slow(Duration::from_secs(5)));
        let mut config = (*state.config).clone();
        config.ocr_timeout = Duration::from_millis(20);
        state.config = Arc::new(config);
        seed_template(&state, "t1", false).await;

        let err = run_extraction(&state, &caller(), payload()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[actix_web::test]
    async fn unknown_template_is_not_found() {
        let (state, _dir) = test_state();
        let err = run_extraction(&state, &caller(), payload()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn missing_image_path_is_invalid_input() {
        let (state, _dir) = test_state();
        let err = run_extraction(
            &state,
            &caller(),
            RunExtractionPayload {
                template_id: Some("t1".into()),
                image_path: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
