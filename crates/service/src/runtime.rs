//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use crate::card_limits::repository::DOCUMENTS;

/// Fail on a missing data directory; warn on each missing document.
pub async fn ensure_env(data_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_data_dir(data_dir, &DOCUMENTS).await
}
