use async_trait::async_trait;
use reqwest::Client;

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::AppError;

const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Google Cloud Storage via the JSON API's simple media upload.
///
/// The bucket is expected to use uniform bucket-level access, so objects are
/// readable at their public URL without a per-object ACL.
pub struct GcsStore {
    client: Client,
    bucket: String,
    access_token: String,
    upload_base_url: String,
    public_base_url: String,
}

impl GcsStore {
    pub fn new(config: &StorageConfig, client: Client) -> Self {
        let public_base_url = config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("{}/{}", PUBLIC_HOST, config.bucket));

        Self {
            client,
            bucket: config.bucket.clone(),
            access_token: config.access_token.clone(),
            upload_base_url: config.upload_base_url.trim_end_matches('/').to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o",
            self.upload_base_url, self.bucket
        )
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        let response = self
            .client
            .post(self.upload_url())
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(&self.access_token)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::StorageError(format!(
                "Upload to bucket '{}' failed ({}): {}",
                self.bucket, status, error_text
            )));
        }

        Ok(format!("{}/{}", self.public_base_url, key))
    }

    fn name(&self) -> &'static str {
        "gcs"
    }
}
