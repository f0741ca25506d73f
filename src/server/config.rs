use super::RequestsLoggingLevel;
use crate::config::{AppConfig, DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MAX_VIDEO_BYTES, UPLOADS_BASE_URL};
use crate::content::MAX_ATTACHMENTS;
use std::path::PathBuf;

/// Room for multipart framing and the non-file fields of an upload request.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Served read-only under `uploads_base_url`.
    pub upload_dir: PathBuf,
    pub uploads_base_url: String,
    /// Largest request body accepted, derived from the media limits.
    pub max_request_bytes: usize,
}

/// Enough for the largest post: one video, or the maximum number of images.
pub fn max_request_bytes(max_image_bytes: u64, max_video_bytes: u64) -> usize {
    let largest = max_video_bytes.max(max_image_bytes.saturating_mul(MAX_ATTACHMENTS as u64));
    usize::try_from(largest)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

impl ServerConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            upload_dir: config.upload_dir.clone(),
            uploads_base_url: UPLOADS_BASE_URL.to_string(),
            max_request_bytes: max_request_bytes(
                config.media.max_image_bytes,
                config.media.max_video_bytes,
            ),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            upload_dir: PathBuf::from("uploads"),
            uploads_base_url: UPLOADS_BASE_URL.to_string(),
            max_request_bytes: max_request_bytes(DEFAULT_MAX_IMAGE_BYTES, DEFAULT_MAX_VIDEO_BYTES),
        }
    }
}
