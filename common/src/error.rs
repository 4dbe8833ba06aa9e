use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification attached to every failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// A required field is missing or malformed in the caller payload.
    InvalidInput,
    /// The operation needs a caller identity and none was supplied.
    Unauthenticated,
    /// A referenced form, template, company or submission does not exist.
    NotFound,
    /// The record exists but is not in a usable state (closed, expired).
    FailedPrecondition,
    /// A submission cap or card quota has been reached.
    ResourceExhausted,
    /// Any unclassified collaborator failure.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid-input",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::NotFound => "not-found",
            ErrorKind::FailedPrecondition => "failed-precondition",
            ErrorKind::ResourceExhausted => "resource-exhausted",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body returned alongside a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}
