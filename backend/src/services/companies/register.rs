//! `POST /api/companies`: creates a company with a fresh subscription.

use crate::auth::Caller;
use crate::error::Result;
use crate::state::AppState;
use crate::store::{to_document, Collection};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use chrono::Utc;
use common::model::company::{Company, Subscription, SubscriptionStatus};
use common::requests::{RegisterCompanyPayload, RegisterCompanyResponse};
use log::{info, warn};
use uuid::Uuid;

pub async fn process(
    state: web::Data<AppState>,
    caller: Option<Caller>,
    payload: web::Json<RegisterCompanyPayload>,
) -> impl Responder {
    match register_company(&state, caller.as_ref(), payload.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("Company registration failed: {}", e);
            e.error_response()
        }
    }
}

pub async fn register_company(
    state: &AppState,
    caller: Option<&Caller>,
    payload: RegisterCompanyPayload,
) -> Result<RegisterCompanyResponse> {
    let request = payload.validate()?;
    let now = Utc::now();
    let company = Company {
        id: Uuid::new_v4().simple().to_string(),
        name: request.name.unwrap_or_default(),
        email: request.email.unwrap_or_default(),
        phone: request.phone.unwrap_or_default(),
        address: request.address.unwrap_or_default(),
        logo: request.logo.unwrap_or_default(),
        brand_color: request.brand_color,
        admin_id: caller.map(|c| c.uid.clone()).unwrap_or_default(),
        subscription: Subscription {
            plan: request.plan.unwrap_or_default(),
            start_date: Some(now),
            end_date: None,
            cards_limit: request.cards_limit.unwrap_or_default(),
            cards_used: 0,
            status: SubscriptionStatus::Active,
        },
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .insert(Collection::Companies, &company.id, to_document(&company)?)
        .await?;
    info!(
        "Registered company {} ({}), card limit {}",
        company.id,
        company.name,
        company.subscription.effective_limit()
    );
    Ok(RegisterCompanyResponse {
        success: true,
        company_id: company.id,
    })
}
