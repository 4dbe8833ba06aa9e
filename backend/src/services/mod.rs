pub mod call;
pub mod cards;
pub mod companies;
pub mod forms;
pub mod multipart;
pub mod templates;

use crate::error::ServiceError;
use actix_web::web::{self, post};

/// JSON body extraction capped at `limit` bytes. Bodies that are too large or
/// do not deserialize come back as `invalid-input` errors.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|e, _req| ServiceError::InvalidInput(format!("Invalid request body: {}", e)).into())
}

/// Registers every API scope plus the single-endpoint dispatcher.
pub fn configure(json_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(json_config(json_limit))
            .service(forms::configure_routes())
            .service(templates::configure_routes())
            .service(cards::configure_routes())
            .service(companies::configure_routes())
            .route("/api/call", post().to(call::process));
    }
}
