//! Shared handles injected into every request handler.
//!
//! `AppState` is built once in `main.rs` and registered as `web::Data`. Each
//! collaborator sits behind a trait object so tests can swap in fakes
//! without touching the services.

use crate::config::Config;
use crate::objects::ObjectStore;
use crate::ocr::OcrEngine;
use crate::render::PdfRenderer;
use crate::store::DocumentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub ocr: Arc<dyn OcrEngine>,
    pub renderer: Arc<dyn PdfRenderer>,
}
