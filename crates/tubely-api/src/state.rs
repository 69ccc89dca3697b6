//! Application state shared by every handler.

use std::sync::Arc;
use tubely_processing::VideoIngestor;
use tubely_storage::{Storage, UrlSigner};

#[derive(Clone)]
pub struct AppState {
    pub ingestor: VideoIngestor,
    pub storage: Arc<dyn Storage>,
    /// Present when the backend's URLs are served by `/assets` (local and memory).
    pub asset_signer: Option<UrlSigner>,
}
