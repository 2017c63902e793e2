use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::debug;

use crate::errors::ServiceError;

/// Directory of named JSON documents.
///
/// Nothing is cached: `load` always parses the file as it is on disk, and
/// `save` replaces the whole file. Writes go to a sibling temp file which is
/// then renamed over the target, so readers see either the previous or the
/// new document in full.
#[derive(Clone, Debug)]
pub struct JsonDocStore {
    dir: PathBuf,
}

impl JsonDocStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Parse the named document. Missing file, unreadable file and malformed
    /// JSON are all reported as `ServiceError::Storage`.
    pub async fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, ServiceError> {
        let path = self.path_of(name);
        let bytes = fs::read(&path).await.map_err(|e| ServiceError::storage(name, e))?;
        let doc = serde_json::from_slice(&bytes).map_err(|e| ServiceError::storage(name, e))?;
        debug!(document = name, bytes = bytes.len(), "document loaded");
        Ok(doc)
    }

    /// Serialize `doc` (2-space pretty JSON) and atomically replace the named file.
    pub async fn save<T: Serialize>(&self, name: &str, doc: &T) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(|e| ServiceError::storage(name, e))?;
        let target = self.path_of(name);
        let tmp = self.dir.join(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()));

        fs::write(&tmp, &data).await.map_err(|e| ServiceError::storage(name, e))?;
        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage(name, e));
        }
        debug!(document = name, bytes = data.len(), "document saved");
        Ok(())
    }
}
