//! Configuration module
//!
//! Configuration is read from the environment (and an optional `.env` file) once at
//! startup. Every knob has a default so a development server starts with nothing set
//! except `JWT_SECRET` and `DATABASE_URL`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const MAX_THUMBNAIL_SIZE_MB: usize = 10;
const MEDIA_TOOL_TIMEOUT_SECS: u64 = 300;
const PRESIGNED_URL_TTL_SECS: u64 = 15 * 60;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub url_signing_secret: Option<String>,
    pub presigned_url_ttl_secs: u64,
    // Media tooling
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub media_tool_timeout_secs: u64,
    pub staging_dir: PathBuf,
    // Upload limits
    pub max_video_size_mb: usize,
    pub max_thumbnail_size_mb: usize,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn megabytes(mb: usize) -> Option<usize> {
    mb.checked_mul(1024 * 1024)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Split a comma-separated list, dropping empty entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = parse_list(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let storage_backend = match env_opt("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let staging_dir = env_opt("STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        let config = Config {
            server_port: env_or("PORT", SERVER_PORT),
            environment,
            cors_origins,
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            jwt_secret,
            storage_backend,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            url_signing_secret: env_opt("URL_SIGNING_SECRET"),
            presigned_url_ttl_secs: env_or("PRESIGNED_URL_TTL_SECS", PRESIGNED_URL_TTL_SECS),
            ffmpeg_path: env_opt("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: env_opt("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            media_tool_timeout_secs: env_or("MEDIA_TOOL_TIMEOUT_SECS", MEDIA_TOOL_TIMEOUT_SECS),
            staging_dir,
            max_video_size_mb: env_or("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB),
            max_thumbnail_size_mb: env_or("MAX_THUMBNAIL_SIZE_MB", MAX_THUMBNAIL_SIZE_MB),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("Database max connections cannot be 0"));
        }

        if self.presigned_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PRESIGNED_URL_TTL_SECS must be greater than 0"));
        }

        if self.media_tool_timeout_secs == 0 {
            return Err(anyhow::anyhow!("MEDIA_TOOL_TIMEOUT_SECS must be greater than 0"));
        }

        for (name, mb) in [
            ("MAX_VIDEO_SIZE_MB", self.max_video_size_mb),
            ("MAX_THUMBNAIL_SIZE_MB", self.max_thumbnail_size_mb),
        ] {
            if mb == 0 || megabytes(mb).is_none() {
                return Err(anyhow::anyhow!("{} must be between 1 and {}", name, usize::MAX >> 20));
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!("S3_BUCKET is required for the s3 backend"));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION is required for the s3 backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() || self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL are required for the local backend"
                    ));
                }
                if self.url_signing_secret.is_none() {
                    return Err(anyhow::anyhow!(
                        "URL_SIGNING_SECRET is required for the local backend"
                    ));
                }
            }
            StorageBackend::Memory => {
                if self.is_production() {
                    return Err(anyhow::anyhow!(
                        "The memory storage backend cannot be used in production"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn presigned_url_ttl(&self) -> Duration {
        Duration::from_secs(self.presigned_url_ttl_secs)
    }

    pub fn media_tool_timeout(&self) -> Duration {
        Duration::from_secs(self.media_tool_timeout_secs)
    }

    /// Request body limit for video uploads. Saturates on values `validate` rejects.
    pub fn max_video_size_bytes(&self) -> usize {
        megabytes(self.max_video_size_mb).unwrap_or(usize::MAX)
    }

    pub fn max_thumbnail_size_bytes(&self) -> usize {
        megabytes(self.max_thumbnail_size_mb).unwrap_or(usize::MAX)
    }
}
