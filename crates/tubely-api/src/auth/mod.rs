//! Bearer-token authentication.

pub mod jwt;

pub use jwt::{JwtAuthenticator, JwtClaims};

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use tubely_core::AppError;

use crate::error::HttpAppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("Authorization header must be a bearer token".to_string())
        })?;
    Ok(token)
}

/// Raw bearer token from the request headers.
///
/// Only the header shape is checked here so a request without credentials is turned
/// away before its body is read. The token itself is validated once, by the ingestion
/// pipeline.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_token(&parts.headers)?.to_string()))
    }
}
