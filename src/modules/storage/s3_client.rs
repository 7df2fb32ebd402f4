//! S3-compatible document storage
//!
//! Uploaded document files live in one bucket; the Document record only keeps
//! the opaque object key. Uses the rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use chrono::Utc;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::shared::validation::UNSAFE_KEY_CHARS_REGEX;

/// Prefix for uploaded document files
pub const UPLOADS_PREFIX: &str = "uploads";

/// Object storage used for document uploads
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Direct URL of the object
    fn object_url(&self, key: &str) -> String;
}

/// Generate a unique object key for an uploaded file.
///
/// Format: `uploads/<unix millis>-<random>-<filename>`, with characters that are
/// unsafe in object keys replaced by `_`.
pub fn generate_document_key(filename: &str) -> String {
    let random: String = Uuid::new_v4().simple().to_string().chars().take(13).collect();
    let sanitized = UNSAFE_KEY_CHARS_REGEX.replace_all(filename.trim(), "_");
    let sanitized = if sanitized.is_empty() {
        "file".into()
    } else {
        sanitized
    };
    format!(
        "{}/{}-{}-{}",
        UPLOADS_PREFIX,
        Utc::now().timestamp_millis(),
        random,
        sanitized
    )
}

/// S3 (or S3-compatible) bucket client
pub struct S3DocumentStorage {
    bucket: Box<Bucket>,
    endpoint: Option<String>,
    region_name: String,
}

impl S3DocumentStorage {
    /// Create a client for the configured bucket.
    ///
    /// Explicit access/secret keys are used when configured; otherwise
    /// credentials come from the environment or the local profile.
    pub fn new(config: StorageConfig) -> Result<Self> {
        let credentials = match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            }
            _ => Credentials::default(),
        }
        .map_err(|e| AppError::Storage(format!("Failed to resolve S3 credentials: {}", e)))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse::<Region>()
                .map_err(|e| AppError::Storage(format!("Invalid region '{}': {}", config.region, e)))?,
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Storage(format!("Failed to open bucket: {}", e)))?;

        // Use path-style URLs for custom endpoints (http://endpoint/bucket instead of http://bucket.endpoint)
        if config.endpoint.is_some() {
            bucket.set_path_style();
        }

        info!(
            "Document storage initialized for bucket: {}, region: {}",
            bucket.name(),
            config.region
        );

        Ok(Self {
            bucket,
            endpoint: config.endpoint,
            region_name: config.region,
        })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

#[async_trait]
impl ObjectStore for S3DocumentStorage {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let response = self.bucket.get_object(key).await.map_err(|e| {
            AppError::Storage(format!("Failed to download file '{}': {}", key, e))
        })?;

        debug!(
            "Downloaded file '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(response.to_vec())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!("Deleted file '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket.name(),
                key
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket.name(),
                self.region_name,
                key
            ),
        }
    }
}
