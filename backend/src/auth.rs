//! Caller identity for operations that must not run anonymously.
//!
//! Authentication happens in the gateway in front of this service, which
//! forwards the verified user id in the `X-Caller-Id` header. Handlers that
//! need an identity take a [`Caller`]; a request without one is rejected as
//! unauthenticated before the handler body runs.

use crate::error::ServiceError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

pub const CALLER_HEADER: &str = "X-Caller-Id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub uid: String,
}

impl Caller {
    pub fn from_request_headers(req: &HttpRequest) -> Result<Self, ServiceError> {
        req.headers()
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|uid| Caller {
                uid: uid.to_string(),
            })
            .ok_or_else(|| ServiceError::Unauthenticated("User must be authenticated.".to_string()))
    }
}

impl FromRequest for Caller {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Caller::from_request_headers(req))
    }
}
