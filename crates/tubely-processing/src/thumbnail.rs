//! Thumbnail upload: the small-payload sibling of video ingestion.
//!
//! Thumbnails are bounded by the HTTP body limit, so they are stored straight from
//! memory with no staging or media tools involved.

use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use tubely_core::constants::{SUPPORTED_THUMBNAIL_MEDIA_TYPES, THUMBNAIL_KEY_PREFIX};
use tubely_core::models::VideoResponse;
use tubely_core::validation::{parse_media_type, MediaTypeError};
use tubely_storage::derive_key;

use crate::error::IngestError;
use crate::video::VideoIngestor;

/// Accepted thumbnail type and the key extension it maps to.
fn thumbnail_media_type(declared: Option<&str>) -> Result<(String, &'static str), IngestError> {
    let media_type = parse_media_type(declared).map_err(|e| match e {
        MediaTypeError::Missing => {
            IngestError::BadInput("Missing Content-Type for thumbnail".to_string())
        }
        MediaTypeError::Malformed(raw) => {
            IngestError::BadInput(format!("Invalid Content-Type for thumbnail: {}", raw))
        }
    })?;

    SUPPORTED_THUMBNAIL_MEDIA_TYPES
        .iter()
        .find(|(supported, _)| *supported == media_type)
        .map(|(_, ext)| (media_type.clone(), *ext))
        .ok_or_else(|| {
            IngestError::UnsupportedMedia("Thumbnails must be JPEG or PNG images".to_string())
        })
}

impl VideoIngestor {
    /// Store a thumbnail for `video_id` and return the signed video view.
    #[tracing::instrument(skip(self, token, data), fields(video_id = %video_id, size_bytes = data.len()))]
    pub async fn ingest_thumbnail(
        &self,
        video_id: Uuid,
        token: &str,
        declared_media_type: Option<&str>,
        data: Bytes,
    ) -> Result<VideoResponse, IngestError> {
        let user_id = self.authenticate(token).await?;
        let (media_type, ext) = thumbnail_media_type(declared_media_type)?;
        if data.is_empty() {
            return Err(IngestError::BadInput("Uploaded thumbnail is empty".to_string()));
        }
        let mut video = self.owned_video(video_id, user_id).await?;

        let key = derive_key(THUMBNAIL_KEY_PREFIX, ext)
            .map_err(|e| IngestError::EntropyError(e.to_string()))?;

        let reference = self
            .storage()
            .upload_with_key(&key, data.to_vec(), &media_type)
            .await
            .map_err(|e| IngestError::StoreFailure(e.to_string()))?;

        video.thumbnail_url = Some(reference.clone());
        video.updated_at = Utc::now();
        self.persist(&video, &reference).await?;

        tracing::info!(video_id = %video_id, key = %reference.key, "Thumbnail stored");

        self.sign_record(video).await
    }
}
