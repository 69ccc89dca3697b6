use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::STORAGE_REFERENCE_SCHEME;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageReferenceError {
    #[error("storage reference must start with {STORAGE_REFERENCE_SCHEME}: {0}")]
    MissingScheme(String),

    #[error("storage reference has an empty bucket: {0}")]
    EmptyBucket(String),

    #[error("storage reference has an empty key: {0}")]
    EmptyKey(String),
}

/// Location of an object in the object store.
///
/// Persisted as `object://{bucket}/{key}`. Bucket names cannot contain `/`, so the
/// first `/` after the scheme always separates bucket from key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageReference {
    pub bucket: String,
    pub key: String,
}

impl StorageReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl Display for StorageReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}/{}", STORAGE_REFERENCE_SCHEME, self.bucket, self.key)
    }
}

impl FromStr for StorageReference {
    type Err = StorageReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(STORAGE_REFERENCE_SCHEME)
            .ok_or_else(|| StorageReferenceError::MissingScheme(s.to_string()))?;
        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| StorageReferenceError::EmptyKey(s.to_string()))?;
        if bucket.is_empty() {
            return Err(StorageReferenceError::EmptyBucket(s.to_string()));
        }
        if key.is_empty() {
            return Err(StorageReferenceError::EmptyKey(s.to_string()));
        }
        Ok(Self::new(bucket, key))
    }
}

impl TryFrom<String> for StorageReference {
    type Error = StorageReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StorageReference> for String {
    fn from(value: StorageReference) -> Self {
        value.to_string()
    }
}

/// Video metadata record as held by the metadata store.
///
/// Ingestion only ever rewrites `video_url` / `thumbnail_url`; `id` and `user_id`
/// are fixed when the record is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: Option<StorageReference>,
    pub thumbnail_url: Option<StorageReference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            video_url: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Client view of a video with storage references replaced by signed URLs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    /// Time-limited URL for the video, if one has been uploaded
    pub video_url: Option<String>,
    /// Time-limited URL for the thumbnail, if one has been uploaded
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_record(
        record: VideoRecord,
        video_url: Option<String>,
        thumbnail_url: Option<String>,
    ) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            title: record.title,
            description: record.description,
            video_url,
            thumbnail_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
