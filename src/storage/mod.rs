//! Where generated workbooks end up.
//!
//! `ObjectStore` is the seam between the generation pipeline and the backing
//! store: Google Cloud Storage in production, a local directory for the CLI
//! and tests.

mod gcs;
mod local;

pub use gcs::GcsStore;
pub use local::LocalStore;

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use std::path::Path;
use uuid::Uuid;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::AppError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the URL it can be fetched from
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError>;

    /// Short backend name for logs and metrics
    fn name(&self) -> &'static str;
}

/// Build the configured store
pub fn from_config(config: &StorageConfig, client: &Client) -> Box<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Gcs => Box::new(GcsStore::new(config, client.clone())),
        StorageBackend::Local => Box::new(LocalStore::new(config)),
    }
}

/// Upload a workbook under the configured prefix, recording the outcome
pub async fn upload(
    store: &dyn ObjectStore,
    prefix: &str,
    filename: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<String, AppError> {
    let key = object_key(prefix, filename);
    let result = store.put(&key, bytes, content_type).await;

    match &result {
        Ok(url) => {
            tracing::info!(backend = store.name(), key = %key, url = %url, "Uploaded change order");
            crate::metrics::record_upload(store.name(), "success");
        }
        Err(e) => {
            tracing::error!(backend = store.name(), key = %key, error = %e, "Upload failed");
            crate::metrics::record_upload(store.name(), "failure");
        }
    }

    result
}

/// `prefix/filename`, tolerating empty or slash-terminated prefixes
pub fn object_key(prefix: &str, filename: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", prefix, filename)
    }
}

/// `YYYYMMDD_HHMMSS_<8 hex>.<ext>` using the extension of `original`
pub fn generate_unique_filename(original: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let id = Uuid::new_v4().simple().to_string();
    let suffix = &id[..8];

    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}_{}.{}", timestamp, suffix, ext),
        _ => format!("{}_{}", timestamp, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_filename_shape() {
        let name = generate_unique_filename("change_order.xlsx");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        assert_eq!(ext, "xlsx");

        let parts: Vec<&str> = stem.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[0].chars().chain(parts[1].chars()).all(|c| c.is_ascii_digit()));
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_unique_filename_is_unique() {
        let a = generate_unique_filename("change_order.xlsx");
        let b = generate_unique_filename("change_order.xlsx");
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_unique_filename_without_extension() {
        let name = generate_unique_filename("README");
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("change_orders", "a.xlsx"), "change_orders/a.xlsx");
        assert_eq!(object_key("/change_orders/", "a.xlsx"), "change_orders/a.xlsx");
        assert_eq!(object_key("", "a.xlsx"), "a.xlsx");
    }
}
