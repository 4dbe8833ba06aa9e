//! # Card Service Module
//!
//! ## Sub-modules:
//! - `issue`: the quota-gated issuance endpoint.
//! - `html`: card layouts and placeholder substitution.
//! - `qr`: the QR code embedded in every card.

pub mod html;
pub mod issue;
pub mod qr;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/cards";

/// *   **`POST /issue`**: `issue::process`, requires `X-Caller-Id`. Body `{submissionId}`.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/issue", post().to(issue::process))
}
