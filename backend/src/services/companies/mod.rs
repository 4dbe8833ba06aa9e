//! # Company Service Module
//!
//! Company records and their submission inbox under `/api/companies`.

mod get;
mod register;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/companies";

/// # Registered Routes:
///
/// *   **`POST ""`**: `register::process`. Body `{name, email?, phone?, address?,
///     logo?, brandColor?, plan?, cardsLimit?}`.
/// *   **`GET /{company_id}`**: `get::process`.
/// *   **`GET /{company_id}/submissions`**: `get::process_submissions`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(register::process))
        .route("/{company_id}", get().to(get::process))
        .route("/{company_id}/submissions", get().to(get::process_submissions))
}
