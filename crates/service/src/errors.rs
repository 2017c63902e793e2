use thiserror::Error;

/// Failures that abort a call.
///
/// Storage errors mean the mock documents are not in the expected shape
/// (missing, unreadable, malformed) and are not recoverable per request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn storage(document: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{document}: {err}"))
    }
}
