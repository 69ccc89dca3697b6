//! In-process object store for development and tests.

use crate::keys::validate_key;
use crate::signing::UrlSigner;
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::RwLock;
use tubely_core::models::StorageReference;

const MEMORY_BUCKET: &str = "memory";

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

#[derive(Clone)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    base_url: String,
    signer: UrlSigner,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>, signer: UrlSigner) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
            signer,
        }
    }

    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    /// Content type recorded for `storage_key`, if the object exists.
    pub async fn content_type(&self, storage_key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.content_type.clone())
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn check_key(storage_key: &str) -> StorageResult<()> {
        if validate_key(storage_key) {
            Ok(())
        } else {
            Err(StorageError::InvalidKey(storage_key.to_string()))
        }
    }

    async fn insert(&self, storage_key: &str, data: Bytes, content_type: &str) {
        self.objects.write().await.insert(
            storage_key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn bucket(&self) -> &str {
        MEMORY_BUCKET
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<StorageReference> {
        Self::check_key(storage_key)?;

        let mut buffer = Vec::with_capacity(content_length.unwrap_or(0) as usize);
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to read from stream: {}", e)))?;

        tracing::debug!(
            key = %storage_key,
            size_bytes = buffer.len(),
            "Memory storage stream upload successful"
        );

        self.insert(storage_key, Bytes::from(buffer), content_type).await;
        Ok(StorageReference::new(MEMORY_BUCKET, storage_key))
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StorageReference> {
        Self::check_key(storage_key)?;
        self.insert(storage_key, Bytes::from(data), content_type).await;
        Ok(StorageReference::new(MEMORY_BUCKET, storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        Self::check_key(storage_key)?;
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.data.to_vec())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn download_stream(&self, storage_key: &str) -> StorageResult<ByteStream> {
        Self::check_key(storage_key)?;
        let data = self
            .objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))?;
        Ok(Box::pin(futures::stream::once(async move { Ok::<_, StorageError>(data) })))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        Self::check_key(storage_key)?;
        self.objects.write().await.remove(storage_key);
        Ok(())
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Self::check_key(storage_key)?;
        Ok(self
            .signer
            .signed_url(&self.base_url, storage_key, expires_in, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::SignatureError;

    fn storage() -> MemoryStorage {
        MemoryStorage::new("http://localhost:8091/assets", UrlSigner::new("memory-secret"))
    }

    fn query_param(url: &str, name: &str) -> String {
        let query = url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{name}=")))
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_stream_upload_records_content_type() {
        let storage = storage();
        let reader = Box::pin(std::io::Cursor::new(b"mp4 bytes".to_vec()))
            as Pin<Box<dyn AsyncRead + Send + Unpin>>;

        let reference = storage
            .upload_stream("other/x.mp4", "video/mp4", None, reader)
            .await
            .unwrap();

        assert_eq!(reference, StorageReference::new("memory", "other/x.mp4"));
        assert_eq!(storage.download("other/x.mp4").await.unwrap(), b"mp4 bytes");
        assert_eq!(
            storage.content_type("other/x.mp4").await.as_deref(),
            Some("video/mp4")
        );
    }

    #[tokio::test]
    async fn test_missing_object() {
        let storage = storage();
        assert!(matches!(
            storage.download("other/missing.mp4").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(storage.delete("other/missing.mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_presigned_url_stops_verifying_after_ttl() {
        let storage = storage();
        storage
            .upload_with_key("landscape/a.mp4", b"v".to_vec(), "video/mp4")
            .await
            .unwrap();

        let ttl = Duration::from_secs(15 * 60);
        let url = storage.get_presigned_url("landscape/a.mp4", ttl).await.unwrap();
        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        let signature = query_param(&url, "signature");

        let now = Utc::now();
        assert!(storage
            .signer()
            .verify("landscape/a.mp4", expires, &signature, now)
            .is_ok());

        let after_ttl = now + chrono::Duration::seconds(ttl.as_secs() as i64 + 1);
        assert_eq!(
            storage
                .signer()
                .verify("landscape/a.mp4", expires, &signature, after_ttl),
            Err(SignatureError::Expired)
        );
    }
}
