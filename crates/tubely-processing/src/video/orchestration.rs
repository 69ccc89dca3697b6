//! Video ingestion: authenticate → authorize → stage → remux → probe → key → store →
//! persist → presign.

use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use tubely_core::constants::SUPPORTED_VIDEO_MEDIA_TYPE;
use tubely_core::models::{StorageReference, VideoRecord, VideoResponse};
use tubely_core::validation::{parse_media_type, MediaTypeError};
use tubely_core::{Authenticator, Config};
use tubely_db::VideoRepository;
use tubely_storage::{derive_key, Storage};

use super::probe::MediaProber;
use super::remux::{remux_output_path, FastStartRemuxer};
use super::AspectRatio;
use crate::error::{from_metadata_error, IngestError, UploadTooLarge};

const STAGED_FILE_NAME: &str = "upload.mp4";
const STAGING_PREFIX: &str = "tubely-upload-";
const STAGING_CHUNK_SIZE: usize = 64 * 1024;

/// Config for ingestion (staging location, signed URL lifetime).
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub staging_dir: PathBuf,
    pub presigned_url_ttl: Duration,
}

impl IngestConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            presigned_url_ttl: config.presigned_url_ttl(),
        }
    }
}

/// Outcome of a successful video ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestedVideo {
    pub reference: StorageReference,
    pub aspect: AspectRatio,
    /// Time-limited URL for the stored object
    pub url: String,
}

/// Runs uploads through validation, the media tools and storage, then records the
/// result on the video's metadata record.
///
/// Holds no per-request state; concurrent ingestions only share the object store and
/// the metadata store.
#[derive(Clone)]
pub struct VideoIngestor {
    authenticator: Arc<dyn Authenticator>,
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn MediaProber>,
    remuxer: Arc<dyn FastStartRemuxer>,
    config: IngestConfig,
}

fn video_media_type(declared: Option<&str>) -> Result<String, IngestError> {
    let media_type = parse_media_type(declared).map_err(|e| match e {
        MediaTypeError::Missing => IngestError::BadInput("Missing Content-Type for video".to_string()),
        MediaTypeError::Malformed(raw) => {
            IngestError::BadInput(format!("Invalid Content-Type for video: {}", raw))
        }
    })?;

    if media_type != SUPPORTED_VIDEO_MEDIA_TYPE {
        return Err(IngestError::UnsupportedMedia(format!(
            "Only {} videos are supported",
            SUPPORTED_VIDEO_MEDIA_TYPE
        )));
    }

    Ok(media_type)
}

fn read_error(err: std::io::Error) -> IngestError {
    if err.get_ref().is_some_and(|inner| inner.is::<UploadTooLarge>()) {
        IngestError::TooLarge(err.to_string())
    } else {
        IngestError::BadInput(format!("Failed to read upload: {}", err))
    }
}

/// Drain `upload` into `dir`, flushed and synced before returning.
async fn stage<R>(dir: &Path, mut upload: R) -> Result<PathBuf, IngestError>
where
    R: AsyncRead + Unpin + Send,
{
    let path = dir.join(STAGED_FILE_NAME);
    let mut file = tokio::fs::File::create(&path).await?;
    let mut buf = vec![0u8; STAGING_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        // Read failures come from the client side (disconnect, body limit).
        let n = upload.read(&mut buf).await.map_err(read_error)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await?;
        total += n as u64;
    }

    if total == 0 {
        return Err(IngestError::BadInput("Uploaded video is empty".to_string()));
    }

    file.flush().await?;
    file.sync_all().await?;

    tracing::debug!(path = %path.display(), size_bytes = total, "Upload staged");
    Ok(path)
}

impl VideoIngestor {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn MediaProber>,
        remuxer: Arc<dyn FastStartRemuxer>,
        config: IngestConfig,
    ) -> Self {
        Self {
            authenticator,
            videos,
            storage,
            prober,
            remuxer,
            config,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub(crate) async fn authenticate(&self, token: &str) -> Result<Uuid, IngestError> {
        self.authenticator
            .authenticate(token)
            .await
            .map_err(|e| IngestError::Unauthenticated(e.to_string()))
    }

    /// Fetch `video_id` and require that `user_id` owns it.
    pub(crate) async fn owned_video(
        &self,
        video_id: Uuid,
        user_id: Uuid,
    ) -> Result<VideoRecord, IngestError> {
        let video = self
            .videos
            .get_video(video_id)
            .await
            .map_err(from_metadata_error)?
            .ok_or_else(|| IngestError::NotFound(format!("Video {} not found", video_id)))?;

        if !video.is_owned_by(user_id) {
            tracing::debug!(video_id = %video_id, user_id = %user_id, "Rejected non-owner");
            return Err(IngestError::Forbidden(
                "You are not the owner of this video".to_string(),
            ));
        }

        Ok(video)
    }

    /// Persist `video`; on failure, delete the just-uploaded object once and give up.
    pub(crate) async fn persist(
        &self,
        video: &VideoRecord,
        uploaded: &StorageReference,
    ) -> Result<(), IngestError> {
        if let Err(e) = self.videos.update_video(video).await {
            tracing::error!(
                error = %e,
                video_id = %video.id,
                key = %uploaded.key,
                "Metadata update failed after upload, deleting uploaded object"
            );
            if let Err(delete_err) = self.storage.delete(&uploaded.key).await {
                tracing::warn!(
                    error = %delete_err,
                    key = %uploaded.key,
                    "Compensating delete failed, object is orphaned"
                );
            }
            return Err(IngestError::MetadataFailure(e.to_string()));
        }
        Ok(())
    }

    pub(crate) async fn presign(&self, reference: &StorageReference) -> Result<String, IngestError> {
        self.storage
            .get_presigned_url(&reference.key, self.config.presigned_url_ttl)
            .await
            .map_err(|e| IngestError::StoreFailure(e.to_string()))
    }

    /// Client view of `record` with stored references replaced by signed URLs.
    pub(crate) async fn sign_record(&self, record: VideoRecord) -> Result<VideoResponse, IngestError> {
        let video_url = match &record.video_url {
            Some(reference) => Some(self.presign(reference).await?),
            None => None,
        };
        let thumbnail_url = match &record.thumbnail_url {
            Some(reference) => Some(self.presign(reference).await?),
            None => None,
        };
        Ok(VideoResponse::from_record(record, video_url, thumbnail_url))
    }

    /// Signed view of a video for its owner.
    #[tracing::instrument(skip(self, token), fields(video_id = %video_id))]
    pub async fn signed_view(&self, video_id: Uuid, token: &str) -> Result<VideoResponse, IngestError> {
        let user_id = self.authenticate(token).await?;
        let video = self.owned_video(video_id, user_id).await?;
        self.sign_record(video).await
    }

    /// Ingest an uploaded video for `video_id`.
    ///
    /// Every gate runs in order and the first failure ends the attempt. Nothing is
    /// staged before the caller is authenticated, the media type accepted and
    /// ownership confirmed. The staging directory is removed on every exit path,
    /// including cancellation.
    #[tracing::instrument(skip(self, token, upload), fields(video_id = %video_id))]
    pub async fn ingest_video<R>(
        &self,
        video_id: Uuid,
        token: &str,
        declared_media_type: Option<&str>,
        upload: R,
    ) -> Result<IngestedVideo, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let user_id = self.authenticate(token).await?;
        let media_type = video_media_type(declared_media_type)?;
        let mut video = self.owned_video(video_id, user_id).await?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.config.staging_dir)?;

        let staged = stage(staging.path(), upload).await?;

        let remuxed = remux_output_path(&staged);
        self.remuxer
            .remux(&staged, &remuxed)
            .await
            .map_err(|e| IngestError::ExternalToolFailure(e.to_string()))?;
        if !tokio::fs::try_exists(&remuxed).await.unwrap_or(false) {
            return Err(IngestError::ExternalToolFailure(
                "remux produced no output file".to_string(),
            ));
        }

        if let Err(e) = tokio::fs::remove_file(&staged).await {
            tracing::warn!(error = %e, path = %staged.display(), "Failed to remove pre-remux file");
        }

        let probe = self
            .prober
            .probe(&remuxed)
            .await
            .map_err(|e| IngestError::ExternalToolFailure(e.to_string()))?;
        let aspect = probe.classification();

        let key = derive_key(aspect.as_str(), "mp4")
            .map_err(|e| IngestError::EntropyError(e.to_string()))?;

        let file = tokio::fs::File::open(&remuxed).await?;
        let size = file.metadata().await?.len();
        let reference = self
            .storage
            .upload_stream(&key, &media_type, Some(size), Box::pin(file))
            .await
            .map_err(|e| IngestError::StoreFailure(e.to_string()))?;

        if let Err(e) = staging.close() {
            tracing::warn!(error = %e, "Failed to remove staging directory");
        }

        video.video_url = Some(reference.clone());
        video.updated_at = Utc::now();
        self.persist(&video, &reference).await?;

        let url = self.presign(&reference).await?;

        tracing::info!(
            video_id = %video_id,
            user_id = %user_id,
            key = %reference.key,
            aspect = %aspect,
            width = probe.width,
            height = probe.height,
            size_bytes = size,
            "Video ingested"
        );

        Ok(IngestedVideo {
            reference,
            aspect,
            url,
        })
    }
}
