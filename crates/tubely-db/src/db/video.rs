//! Video metadata repository backed by the `videos` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tubely_core::models::{StorageReference, VideoRecord};
use tubely_core::AppError;
use uuid::Uuid;

/// Metadata store operations needed by the ingestion pipeline.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a record by id. `Ok(None)` when no such video exists.
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Persist the mutable fields of `video` (`video_url`, `thumbnail_url`,
    /// `updated_at`). Fails with `NotFound` if the record no longer exists.
    async fn update_video(&self, video: &VideoRecord) -> Result<(), AppError>;

    /// Insert a new record.
    async fn create_video(&self, video: &VideoRecord) -> Result<(), AppError>;
}

/// Row type for the videos table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    video_url: Option<String>,
    thumbnail_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_reference(raw: Option<String>) -> Result<Option<StorageReference>, AppError> {
    raw.map(|value| {
        value
            .parse::<StorageReference>()
            .map_err(|e| AppError::Metadata(e.to_string()))
    })
    .transpose()
}

impl TryFrom<VideoRow> for VideoRecord {
    type Error = AppError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        Ok(VideoRecord {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            video_url: parse_reference(row.video_url)?,
            thumbnail_url: parse_reference(row.thumbnail_url)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            SELECT id, user_id, title, description, video_url, thumbnail_url, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VideoRecord::try_from).transpose()
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_video(&self, video: &VideoRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET video_url = $2, thumbnail_url = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(video.video_url.as_ref().map(|r| r.to_string()))
        .bind(video.thumbnail_url.as_ref().map(|r| r.to_string()))
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Video {} not found", video.id)));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    async fn create_video(&self, video: &VideoRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO videos (id, user_id, title, description, video_url, thumbnail_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.video_url.as_ref().map(|r| r.to_string()))
        .bind(video.thumbnail_url.as_ref().map(|r| r.to_string()))
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
