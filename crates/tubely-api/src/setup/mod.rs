//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::auth::JwtAuthenticator;
use crate::state::AppState;
use anyhow::Result;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::PgVideoRepository;
use tubely_processing::{FfmpegRemuxer, FfprobeProber, IngestConfig, VideoIngestor};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let (storage, asset_signer) = storage::setup_storage(&config).await?;

    let ingestor = VideoIngestor::new(
        Arc::new(JwtAuthenticator::new(&config.jwt_secret)),
        Arc::new(PgVideoRepository::new(pool)),
        storage.clone(),
        Arc::new(FfprobeProber::new(
            config.ffprobe_path.clone(),
            config.media_tool_timeout(),
        )),
        Arc::new(FfmpegRemuxer::new(
            config.ffmpeg_path.clone(),
            config.media_tool_timeout(),
        )),
        IngestConfig::from_config(&config),
    );

    let state = Arc::new(AppState {
        ingestor,
        storage,
        asset_signer,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
