//! `POST /api/call`: the four core operations behind one endpoint.
//!
//! The body is `{"operation": "...", "data": {...}}`. An unknown operation or
//! a body that does not match its operation is rejected by the JSON extractor
//! as `invalid-input` before anything runs.

use crate::auth::Caller;
use crate::error::Result;
use crate::services::cards::issue::issue_card;
use crate::services::forms::publish::publish_form;
use crate::services::forms::submit::submit_form;
use crate::services::templates::extract::run_extraction;
use crate::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Responder, ResponseError};
use common::requests::{ApiRequest, ApiResponse};
use log::{debug, warn};

pub async fn process(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<ApiRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let operation = request.operation();
    debug!("Dispatching {}", operation);
    match dispatch(&state, &req, request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("{} failed: {}", operation, e);
            e.error_response()
        }
    }
}

pub async fn dispatch(state: &AppState, req: &HttpRequest, request: ApiRequest) -> Result<ApiResponse> {
    Ok(match request {
        ApiRequest::PublishForm(payload) => {
            let caller = Caller::from_request_headers(req)?;
            ApiResponse::PublishForm(publish_form(state, &caller, payload).await?)
        }
        ApiRequest::SubmitForm(payload) => ApiResponse::SubmitForm(submit_form(state, payload).await?),
        ApiRequest::RunExtraction(payload) => {
            let caller = Caller::from_request_headers(req)?;
            ApiResponse::RunExtraction(run_extraction(state, &caller, payload).await?)
        }
        ApiRequest::IssueCard(payload) => {
            let caller = Caller::from_request_headers(req)?;
            ApiResponse::IssueCard(issue_card(state, &caller, payload).await?)
        }
    })
}
