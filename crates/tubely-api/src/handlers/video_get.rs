//! `GET /videos/{video_id}`

use axum::{extract::State, Json};
use std::sync::Arc;
use tubely_core::models::VideoResponse;

use super::VideoId;
use crate::auth::BearerToken;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video with signed URLs", body = VideoResponse),
        (status = 400, description = "Invalid video ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    VideoId(video_id): VideoId,
    BearerToken(token): BearerToken,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = state.ingestor.signed_view(video_id, &token).await?;
    Ok(Json(video))
}
