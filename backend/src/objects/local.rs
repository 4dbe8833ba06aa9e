use super::{sanitize_path, ObjectError, ObjectStore};
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;

/// Mount point under which `main` serves the object root with actix-files.
pub const FILES_ROUTE: &str = "/files";

/// Filesystem-backed object store; URLs resolve through the `/files` route.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}/{}", self.public_base_url, FILES_ROUTE, path)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, ObjectError> {
        let rel = sanitize_path(path)?;
        let full = self.root.join(&rel);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!("Storing {} bytes ({}) at {}", bytes.len(), content_type, full.display());
        tokio::fs::write(&full, bytes).await?;
        Ok(self.url_for(&rel))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, ObjectError> {
        let rel = sanitize_path(path)?;
        match tokio::fs::read(self.root.join(&rel)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ObjectError::NotFound(rel)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), ObjectError> {
        let rel = sanitize_path(path)?;
        match tokio::fs::remove_file(self.root.join(&rel)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
