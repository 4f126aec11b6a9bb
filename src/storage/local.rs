use async_trait::async_trait;
use std::path::PathBuf;

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::AppError;

/// Writes objects beneath a local directory
pub struct LocalStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.local_dir.clone(),
            public_base_url: config
                .public_base_url
                .as_ref()
                .map(|u| u.trim_end_matches('/').to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, AppError> {
        if key.split('/').any(|part| part == "..") {
            return Err(AppError::StorageError(format!("Invalid object key: {}", key)));
        }

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::StorageError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            AppError::StorageError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        match &self.public_base_url {
            Some(base) => Ok(format!("{}/{}", base, key)),
            None => {
                let absolute = tokio::fs::canonicalize(&path).await.unwrap_or(path);
                Ok(format!("file://{}", absolute.display()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
