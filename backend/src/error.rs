use crate::objects::ObjectError;
use crate::ocr::OcrError;
use crate::render::RenderError;
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::error::{ErrorBody, ErrorKind};
use common::requests::InvalidInput;
use thiserror::Error;

/// Classified failure of a caller-facing operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    FailedPrecondition(String),

    #[error("{0}")]
    ResourceExhausted(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServiceError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            ServiceError::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::FailedPrecondition(_) => StatusCode::PRECONDITION_FAILED,
            ServiceError::ResourceExhausted(_) => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

impl From<InvalidInput> for ServiceError {
    fn from(e: InvalidInput) -> Self {
        ServiceError::InvalidInput(e.0)
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Internal(format!("Document store error: {}", e))
    }
}

impl From<OcrError> for ServiceError {
    fn from(e: OcrError) -> Self {
        ServiceError::Internal(format!("OCR processing failed: {}", e))
    }
}

impl From<RenderError> for ServiceError {
    fn from(e: RenderError) -> Self {
        ServiceError::Internal(format!("PDF generation failed: {}", e))
    }
}

impl From<ObjectError> for ServiceError {
    fn from(e: ObjectError) -> Self {
        ServiceError::Internal(format!("Object store error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (ServiceError::InvalidInput("x".into()), 400),
            (ServiceError::Unauthenticated("x".into()), 401),
            (ServiceError::NotFound("x".into()), 404),
            (ServiceError::FailedPrecondition("x".into()), 412),
            (ServiceError::ResourceExhausted("x".into()), 429),
            (ServiceError::Internal("x".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{:?}", err);
        }
    }

    #[test]
    fn store_failures_are_internal() {
        let err: ServiceError = StoreError::Backend("disk full".into()).into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("disk full"));
    }
}
