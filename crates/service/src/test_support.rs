//! Seeded data directories for tests.
//!
//! The seed is the same set of documents shipped under `data/`.

use std::path::{Path, PathBuf};

use models::{AccountsDocument, LimitsDocument, TemporaryLimitsDocument};

use crate::card_limits::repository::{ACCOUNTS_DOC, LIMITS_DOC, TEMPORARY_LIMITS_DOC};

pub const SEED_ACCOUNTS: &str = include_str!("../../../data/accounts.json");
pub const SEED_LIMITS: &str = include_str!("../../../data/limits.json");
pub const SEED_TEMPORARY_LIMITS: &str = include_str!("../../../data/temporary_limits.json");

/// Parsed seed documents.
pub fn seed_documents() -> (AccountsDocument, LimitsDocument, TemporaryLimitsDocument) {
    (
        serde_json::from_str(SEED_ACCOUNTS).expect("seed accounts.json"),
        serde_json::from_str(SEED_LIMITS).expect("seed limits.json"),
        serde_json::from_str(SEED_TEMPORARY_LIMITS).expect("seed temporary_limits.json"),
    )
}

/// Fresh temp directory holding a copy of the seed documents.
pub async fn seeded_data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = std::env::temp_dir().join(format!("card_limits_data_{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(ACCOUNTS_DOC), SEED_ACCOUNTS).await?;
    tokio::fs::write(dir.join(LIMITS_DOC), SEED_LIMITS).await?;
    tokio::fs::write(dir.join(TEMPORARY_LIMITS_DOC), SEED_TEMPORARY_LIMITS).await?;
    Ok(dir)
}

pub async fn cleanup(dir: &Path) {
    let _ = tokio::fs::remove_dir_all(dir).await;
}
