//! `GET /assets/{*key}`: serves objects behind URLs minted by `UrlSigner`.
//!
//! Only mounted for the local and memory backends; S3 URLs point at the bucket.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tubely_core::AppError;
use tubely_storage::{content_type_for_key, SignatureError};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    expires: Option<String>,
    signature: Option<String>,
}

#[utoipa::path(
    get,
    path = "/assets/{key}",
    tag = "assets",
    params(
        ("key" = String, Path, description = "Object key"),
        ("expires" = i64, Query, description = "Expiry as unix seconds"),
        ("signature" = String, Query, description = "URL signature")
    ),
    responses(
        (status = 200, description = "Object content"),
        (status = 403, description = "Signature invalid or expired", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse)
    )
)]
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedQuery>,
) -> Result<Response, HttpAppError> {
    let signer = state
        .asset_signer
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Asset serving is not enabled".to_string()))?;

    let expires = query
        .expires
        .as_deref()
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or(SignatureError::Invalid)?;
    let signature = query.signature.as_deref().ok_or(SignatureError::Invalid)?;

    signer.verify(&key, expires, signature, Utc::now())?;

    let stream = state.storage.download_stream(&key).await?;

    tracing::debug!(key = %key, "Serving signed asset");
    Ok((
        [(header::CONTENT_TYPE, content_type_for_key(&key))],
        Body::from_stream(stream),
    )
        .into_response())
}
