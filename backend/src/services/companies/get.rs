use crate::error::{Result, ServiceError};
use crate::state::AppState;
use crate::store::{self, Collection};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::company::Company;
use common::model::submission::Submission;
use log::warn;
use serde_json::json;

/// `GET /api/companies/{company_id}`
pub async fn process(state: web::Data<AppState>, company_id: web::Path<String>) -> impl Responder {
    match get_company(&state, &company_id).await {
        Ok(company) => HttpResponse::Ok().json(company),
        Err(e) => {
            warn!("Error retrieving company {}: {}", company_id, e);
            e.error_response()
        }
    }
}

/// `GET /api/companies/{company_id}/submissions`, newest first.
pub async fn process_submissions(
    state: web::Data<AppState>,
    company_id: web::Path<String>,
) -> impl Responder {
    match list_submissions(&state, &company_id).await {
        Ok(submissions) => HttpResponse::Ok().json(submissions),
        Err(e) => {
            warn!("Error listing submissions of company {}: {}", company_id, e);
            e.error_response()
        }
    }
}

pub async fn get_company(state: &AppState, company_id: &str) -> Result<Company> {
    store::load(state.store.as_ref(), Collection::Companies, company_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Company not found".to_string()))
}

pub async fn list_submissions(state: &AppState, company_id: &str) -> Result<Vec<Submission>> {
    let docs = state
        .store
        .find_by(Collection::Submissions, "companyId", &json!(company_id))
        .await?;
    let mut submissions = docs
        .into_iter()
        .map(serde_json::from_value::<Submission>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ServiceError::Internal(format!("Malformed submission: {}", e)))?;
    submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    Ok(submissions)
}
