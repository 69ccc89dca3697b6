//! Authentication capability.
//!
//! The ingestion pipeline only needs to turn a bearer token into a user id.
//! Token formats and verification live behind this trait (the API crate
//! provides the JWT implementation).

use async_trait::async_trait;
use uuid::Uuid;

use crate::AppError;

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve the principal behind `token`.
    ///
    /// Returns `AppError::Unauthorized` when the token is malformed, expired or
    /// otherwise not acceptable.
    async fn authenticate(&self, token: &str) -> Result<Uuid, AppError>;
}
