mod file_config;

pub use file_config::{BackgroundJobsConfig, FileConfig, MediaConfig};

use crate::media::MediaStorageConfig;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_VIDEO_BYTES: u64 = 50 * 1024 * 1024;
pub const DEFAULT_STORY_SWEEP_INTERVAL_SECS: u64 = 60 * 60;
pub const UPLOADS_BASE_URL: &str = "/uploads";

const MIN_JWT_SECRET_LEN: usize = 16;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub jwt_secret: Option<String>,
    pub max_image_bytes: Option<u64>,
    pub max_video_bytes: Option<u64>,
    pub story_sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    /// None means a random secret is generated at startup, so sessions do not
    /// survive restarts.
    pub jwt_secret: Option<String>,

    pub media: MediaSettings,
    pub background_jobs: BackgroundJobsSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    pub max_image_bytes: u64,
    pub max_video_bytes: u64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundJobsSettings {
    pub story_sweep_interval_secs: u64,
}

impl Default for BackgroundJobsSettings {
    fn default() -> Self {
        Self {
            story_sweep_interval_secs: DEFAULT_STORY_SWEEP_INTERVAL_SECS,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let upload_dir = file
            .upload_dir
            .map(PathBuf::from)
            .or_else(|| cli.upload_dir.clone())
            .unwrap_or_else(|| db_dir.join("uploads"));
        if upload_dir.exists() && !upload_dir.is_dir() {
            bail!("upload_dir is not a directory: {:?}", upload_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Invalid logging_level in config file: {}", s),
            },
            None => cli.logging_level.clone(),
        };

        let jwt_secret = file.jwt_secret.or_else(|| cli.jwt_secret.clone());
        if let Some(secret) = &jwt_secret {
            if secret.len() < MIN_JWT_SECRET_LEN {
                bail!(
                    "jwt_secret must be at least {} characters long",
                    MIN_JWT_SECRET_LEN
                );
            }
        }

        let media_file = file.media.unwrap_or_default();
        let media = MediaSettings {
            max_image_bytes: media_file
                .max_image_bytes
                .or(cli.max_image_bytes)
                .unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
            max_video_bytes: media_file
                .max_video_bytes
                .or(cli.max_video_bytes)
                .unwrap_or(DEFAULT_MAX_VIDEO_BYTES),
        };
        if media.max_image_bytes == 0 || media.max_video_bytes == 0 {
            bail!("Media size limits must be greater than zero");
        }

        let jobs_file = file.background_jobs.unwrap_or_default();
        let background_jobs = BackgroundJobsSettings {
            story_sweep_interval_secs: jobs_file
                .story_sweep_interval_secs
                .or(cli.story_sweep_interval_secs)
                .unwrap_or(DEFAULT_STORY_SWEEP_INTERVAL_SECS),
        };
        if background_jobs.story_sweep_interval_secs == 0 {
            bail!("story_sweep_interval_secs must be greater than zero");
        }

        Ok(Self {
            db_dir,
            upload_dir,
            port,
            logging_level,
            jwt_secret,
            media,
            background_jobs,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join("skillshare.db")
    }

    pub fn media_storage_config(&self) -> MediaStorageConfig {
        MediaStorageConfig {
            upload_dir: self.upload_dir.clone(),
            base_url: UPLOADS_BASE_URL.to_string(),
            max_image_bytes: self.media.max_image_bytes,
            max_video_bytes: self.media.max_video_bytes,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
