//! Environment/runtime helpers
//!
//! Sanity checks to ensure the mock data directory is usable at startup.

use std::path::Path;

use tracing::warn;

/// Fail if the data directory is missing; warn on each expected document that is absent.
///
/// Missing documents are not fatal here: the first call that needs one fails instead.
pub async fn ensure_data_dir(data_dir: &str, documents: &[&str]) -> anyhow::Result<()> {
    let meta = tokio::fs::metadata(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("data directory {data_dir} is not accessible: {e}"))?;
    if !meta.is_dir() {
        anyhow::bail!("{data_dir} is not a directory");
    }
    for doc in documents {
        let path = Path::new(data_dir).join(doc);
        if tokio::fs::metadata(&path).await.is_err() {
            warn!(path = %path.display(), "expected data document not found; calls reading it will fail");
        }
    }
    Ok(())
}
