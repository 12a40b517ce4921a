//! Environment/runtime helpers
//!
//! Sanity checks to ensure the local storage directory exists at startup.

use std::path::Path;

use tracing::{debug, warn};

use crate::CommonError;

/// Ensure the data directory exists, creating it when missing.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), CommonError> {
    match tokio::fs::metadata(data_dir).await {
        Ok(meta) if meta.is_dir() => {
            debug!(data_dir = %data_dir.display(), "data directory present");
            Ok(())
        }
        Ok(_) => Err(CommonError::Env(format!("{} exists and is not a directory", data_dir.display()))),
        Err(_) => {
            warn!(data_dir = %data_dir.display(), "data directory missing; creating it");
            tokio::fs::create_dir_all(data_dir)
                .await
                .map_err(|e| CommonError::Env(format!("cannot create {}: {e}", data_dir.display())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_dir_and_rejects_files() -> Result<(), anyhow::Error> {
        let base = std::env::temp_dir().join(format!("spendario_env_{}", uuid::Uuid::new_v4()));
        ensure_data_dir(&base).await?;
        assert!(base.is_dir());

        let file = base.join("blob.json");
        tokio::fs::write(&file, b"{}").await?;
        assert!(matches!(ensure_data_dir(&file).await, Err(CommonError::Env(_))));

        let _ = tokio::fs::remove_dir_all(&base).await;
        Ok(())
    }
}
