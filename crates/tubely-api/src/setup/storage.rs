//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use tubely_core::{Config, StorageBackend};
use tubely_storage::{create_storage, url_signer, Storage, UrlSigner};

/// Setup storage; for backends served through `/assets`, also return the URL signer.
pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Option<UrlSigner>)> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config).await?;
    let backend_type = storage.backend_type();
    tracing::info!(
        backend = ?backend_type,
        bucket = %storage.bucket(),
        "Storage abstraction initialized successfully"
    );

    let asset_signer = match backend_type {
        StorageBackend::S3 => None,
        StorageBackend::Local | StorageBackend::Memory => Some(url_signer(config)),
    };

    Ok((storage, asset_signer))
}
