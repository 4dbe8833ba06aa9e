//! Blob storage for template images, employee photos and rendered cards.

mod local;

pub use local::{LocalObjectStore, FILES_ROUTE};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid object path: {0}")]
    InvalidPath(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` at `path` and returns a publicly resolvable URL.
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, ObjectError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectError>;

    /// Removes the object at `path`; a missing object is not an error.
    async fn delete(&self, path: &str) -> Result<(), ObjectError>;
}

/// Rejects absolute paths and parent traversal; returns the normalized relative path.
pub fn sanitize_path(path: &str) -> Result<String, ObjectError> {
    let trimmed = path.trim().trim_start_matches('/');
    let parts: Vec<&str> = trimmed.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() || parts.iter().any(|p| *p == ".." || *p == "." || p.contains('\\')) {
        return Err(ObjectError::InvalidPath(path.to_string()));
    }
    Ok(parts.join("/"))
}

/// Replaces characters that do not belong in an object key segment.
pub fn safe_segment(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
