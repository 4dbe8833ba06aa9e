//! Reads the two-part uploads used by the template and public-form endpoints:
//! a `json` part describing the request, plus named binary parts.

use crate::error::{Result, ServiceError};
use actix_multipart::Multipart;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// A binary part collected in memory.
#[derive(Debug, Clone, Default)]
pub struct FilePart {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Parts {
    pub json: Option<Vec<u8>>,
    pub files: HashMap<String, FilePart>,
}

impl Parts {
    /// Decodes the `json` part; absence is a client error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = self
            .json
            .as_deref()
            .ok_or_else(|| ServiceError::InvalidInput("Missing json part".to_string()))?;
        serde_json::from_slice(bytes)
            .map_err(|e| ServiceError::InvalidInput(format!("Invalid json part: {}", e)))
    }

    /// Removes a named binary part, ignoring empty uploads.
    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        self.files.remove(name).filter(|f| !f.bytes.is_empty())
    }
}

fn bad_part(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::InvalidInput(format!("Malformed multipart body: {}", e))
}

/// Collects every part, failing once the parts together exceed `limit` bytes.
pub async fn read_parts(mut payload: Multipart, limit: usize) -> Result<Parts> {
    let mut parts = Parts::default();
    let mut total = 0usize;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(bad_part)?;
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(|n| n.to_string()),
                cd.get_filename().map(|f| f.to_string()),
            ),
            None => (None, None),
        };
        let content_type = field.content_type().map(|m| m.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(bad_part)?;
            total += chunk.len();
            if total > limit {
                return Err(ServiceError::InvalidInput(format!(
                    "Upload exceeds the {} byte limit",
                    limit
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_deref() {
            Some("json") => parts.json = Some(bytes),
            Some(other) => {
                parts.files.insert(
                    other.to_string(),
                    FilePart {
                        filename: filename.unwrap_or_default(),
                        content_type,
                        bytes,
                    },
                );
            }
            None => {}
        }
    }

    Ok(parts)
}
