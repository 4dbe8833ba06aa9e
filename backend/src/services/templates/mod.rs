//! # Template Service Module
//!
//! This module aggregates all API endpoints related to card templates under
//! `/api/templates`.
//!
//! ## Sub-modules:
//! - `upload`: stores a design image and creates a draft template.
//! - `extract`: runs OCR on the image and proposes form fields.
//! - `get`: returns a stored template.
//! - `save`: replaces the field list with the operator's confirmed version.

pub mod extract;
mod get;
mod save;
mod upload;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// *   **`POST /upload`**: `upload::process`. Multipart with a `json` part
///     (`{companyId, name}`) and a `file` part. Requires `X-Caller-Id`.
///     Returns `{templateId, imagePath}`.
///
/// *   **`POST /extract`**: `extract::process`. Body `{templateId, imagePath}`.
///     Requires `X-Caller-Id`. Returns the proposed fields, or
///     `{success: false, message}` when no text was found.
///
/// *   **`GET /{template_id}`**: `get::process`.
///
/// *   **`PUT /{template_id}/fields`**: `save::process`. Body `{fields: [...]}`.
///     Requires `X-Caller-Id`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/extract", post().to(extract::process))
        .route("/{template_id}", get().to(get::process))
        .route("/{template_id}/fields", put().to(save::process))
}
