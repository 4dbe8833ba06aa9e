//! Shared document and wire model for the ID-card service.
//!
//! Everything in here is plain data: the records persisted in the document
//! store (`model`), the request/response payloads exchanged with callers
//! (`requests`) and the error taxonomy every operation reports (`error`).

pub mod error;
pub mod model;
pub mod requests;
