#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{MemoryStorage, Storage, StorageBackend, StorageError, StorageResult, UrlSigner};
use std::sync::Arc;
use tubely_core::Config;

/// Signer for the local and memory backends' URLs.
///
/// Uses `URL_SIGNING_SECRET`; the memory backend falls back to the JWT secret since it
/// only runs outside production.
pub fn url_signer(config: &Config) -> UrlSigner {
    match config.url_signing_secret.as_deref() {
        Some(secret) => UrlSigner::new(secret),
        None => UrlSigner::new(&config.jwt_secret),
    }
}

/// Base URL of the API's asset route when none is configured.
fn default_asset_base_url(config: &Config) -> String {
    format!("http://localhost:{}/assets", config.server_port)
}

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(bucket, region, config.s3_endpoint.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;
            if config.url_signing_secret.is_none() {
                return Err(StorageError::ConfigError(
                    "URL_SIGNING_SECRET not configured".to_string(),
                ));
            }

            let storage = LocalStorage::new(base_path, base_url, url_signer(config)).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; uploaded objects are lost on restart");
            let base_url = config
                .local_storage_base_url
                .clone()
                .unwrap_or_else(|| default_asset_base_url(config));
            Ok(Arc::new(MemoryStorage::new(base_url, url_signer(config))))
        }
    }
}
