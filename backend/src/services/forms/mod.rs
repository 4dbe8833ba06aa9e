//! # Form Service Module
//!
//! Publishing, reading and submitting to public registration forms, all
//! under `/api/forms`.
//!
//! ## Sub-modules:
//! - `lifecycle`: the usability predicate and the submission write.
//! - `publish`: creates a form from a template.
//! - `submit`: JSON and multipart submission endpoints.
//! - `get`: the public view of a form.

mod get;
pub mod lifecycle;
pub mod publish;
pub mod submit;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/forms";

/// # Registered Routes:
///
/// *   **`POST /publish`**: `publish::process`, requires `X-Caller-Id`.
/// *   **`POST /submit`**: `submit::process`, JSON submission.
/// *   **`POST /{form_id}/submit`**: `submit::process_public`, multipart with optional photo.
/// *   **`GET /{form_id}`**: `get::process`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/publish", post().to(publish::process))
        .route("/submit", post().to(submit::process))
        .route("/{form_id}/submit", post().to(submit::process_public))
        .route("/{form_id}", get().to(get::process))
}
