use super::MediaType;
use crate::outcome::{SecondaryEffect, SecondaryFailure};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Unsupported media type: {0}, only images and videos are allowed")]
    UnsupportedType(String),

    #[error("Declared type {declared} does not match the file content ({detected})")]
    TypeMismatch { declared: String, detected: String },

    #[error("Empty file")]
    Empty,

    #[error("{} too large: {size} bytes (max: {max})", .media_type.as_str())]
    TooLarge {
        media_type: MediaType,
        size: u64,
        max: u64,
    },

    #[error("Only one video is allowed and it cannot be combined with other media")]
    VideoNotAlone,
}

#[derive(Debug, Clone)]
pub struct MediaStorageConfig {
    pub upload_dir: PathBuf,
    /// URL path the upload directory is served under, without trailing slash.
    pub base_url: String,
    pub max_image_bytes: u64,
    pub max_video_bytes: u64,
}

/// A file as received from a client.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub url: String,
    pub media_type: MediaType,
}

pub struct MediaStorage {
    config: MediaStorageConfig,
}

impl MediaStorage {
    pub fn new(config: MediaStorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MediaStorageConfig {
        &self.config
    }

    /// Creates the upload directory.
    pub async fn init(&self) -> Result<(), MediaError> {
        fs::create_dir_all(&self.config.upload_dir).await?;
        Ok(())
    }

    pub fn validate(&self, upload: &MediaUpload) -> Result<MediaType, MediaError> {
        let declared = upload.content_type.trim().to_ascii_lowercase();
        let media_type = match declared.split_once('/') {
            Some(("image", subtype)) if !subtype.is_empty() => MediaType::Image,
            Some(("video", subtype)) if !subtype.is_empty() => MediaType::Video,
            _ => return Err(MediaError::UnsupportedType(upload.content_type.clone())),
        };

        if upload.bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        // Unrecognised content is accepted on the declared type
        if let Some(kind) = infer::get(&upload.bytes) {
            let detected = kind.mime_type();
            if detected.split('/').next() != Some(media_type.as_str()) {
                return Err(MediaError::TypeMismatch {
                    declared,
                    detected: detected.to_string(),
                });
            }
        }

        let size = upload.bytes.len() as u64;
        let max = match media_type {
            MediaType::Image => self.config.max_image_bytes,
            MediaType::Video => self.config.max_video_bytes,
        };
        if size > max {
            return Err(MediaError::TooLarge {
                media_type,
                size,
                max,
            });
        }

        if let Some(name) = &upload.file_name {
            if name.contains("..") {
                return Err(MediaError::InvalidFilename(name.clone()));
            }
        }

        Ok(media_type)
    }

    /// Validates a set of attachments. A video is only accepted on its own.
    pub fn validate_all(&self, uploads: &[MediaUpload]) -> Result<Vec<MediaType>, MediaError> {
        let types = uploads
            .iter()
            .map(|upload| self.validate(upload))
            .collect::<Result<Vec<_>, _>>()?;
        if types.len() > 1 && types.contains(&MediaType::Video) {
            return Err(MediaError::VideoNotAlone);
        }
        Ok(types)
    }

    /// Validates and writes the upload as `<uuid>.<ext>`, returning its public URL.
    pub async fn store(&self, upload: &MediaUpload) -> Result<StoredMedia, MediaError> {
        let media_type = self.validate(upload)?;
        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), extension_for(upload));

        fs::create_dir_all(&self.config.upload_dir).await?;
        let path = self.config.upload_dir.join(&file_name);
        let mut file = fs::File::create(&path).await?;
        file.write_all(&upload.bytes).await?;
        file.flush().await?;

        debug!("Stored {} bytes at {:?}", upload.bytes.len(), path);
        Ok(StoredMedia {
            url: format!("{}/{}", self.config.base_url, file_name),
            media_type,
        })
    }

    /// Removes the file behind `url`. A missing file counts as removed.
    pub async fn delete(&self, url: &str) -> Result<(), MediaError> {
        let path = self.path_for_url(url)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(MediaError::Io(err)),
        }
    }

    pub async fn delete_best_effort(&self, url: &str) -> Result<(), SecondaryFailure> {
        self.delete(url).await.map_err(|err| {
            warn!("Failed to delete media file {}: {}", url, err);
            SecondaryFailure {
                effect: SecondaryEffect::MediaDeletion {
                    url: url.to_string(),
                },
                reason: err.to_string(),
            }
        })
    }

    pub async fn delete_all_best_effort(&self, urls: &[&str]) -> Vec<SecondaryFailure> {
        let mut failures = vec![];
        for url in urls.iter().copied() {
            if let Err(failure) = self.delete_best_effort(url).await {
                failures.push(failure);
            }
        }
        failures
    }

    fn path_for_url(&self, url: &str) -> Result<PathBuf, MediaError> {
        let file_name = url
            .strip_prefix(&self.config.base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| MediaError::InvalidFilename(url.to_string()))?;
        if file_name.is_empty()
            || file_name.contains("..")
            || file_name.contains('/')
            || file_name.contains('\\')
        {
            return Err(MediaError::InvalidFilename(url.to_string()));
        }
        Ok(self.config.upload_dir.join(file_name))
    }
}

/// Sniffed extension first, then the original name, then the declared subtype.
fn extension_for(upload: &MediaUpload) -> String {
    if let Some(kind) = infer::get(&upload.bytes) {
        return kind.extension().to_string();
    }
    let from_name = upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| is_safe_extension(ext));
    if let Some(ext) = from_name {
        return ext.to_ascii_lowercase();
    }
    upload
        .content_type
        .split('/')
        .nth(1)
        .and_then(|subtype| subtype.split(['+', ';']).next())
        .map(str::trim)
        .filter(|ext| is_safe_extension(ext))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".to_string())
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    fn storage(dir: &TempDir) -> MediaStorage {
        MediaStorage::new(MediaStorageConfig {
            upload_dir: dir.path().join("uploads"),
            base_url: "/uploads".to_string(),
            max_image_bytes: 64,
            max_video_bytes: 128,
        })
    }

    fn upload(bytes: &[u8], content_type: &str) -> MediaUpload {
        MediaUpload {
            bytes: bytes.to_vec(),
            content_type: content_type.to_string(),
            file_name: None,
        }
    }

    #[test]
    fn rejects_non_media_types() {
        let dir = TempDir::new().unwrap();
        let result = storage(&dir).validate(&upload(b"hello", "text/plain"));
        assert!(matches!(result, Err(MediaError::UnsupportedType(_))));
    }

    #[test]
    fn declared_type_needs_a_subtype() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        for declared in ["image", "video", "image/", "imagery/png", ""] {
            let result = storage.validate(&upload(PNG_HEADER, declared));
            assert!(
                matches!(result, Err(MediaError::UnsupportedType(_))),
                "{:?}",
                declared
            );
        }
        assert!(matches!(
            storage.validate(&upload(PNG_HEADER, "Image/PNG")),
            Ok(MediaType::Image)
        ));
    }

    #[test]
    fn rejects_content_not_matching_declared_type() {
        let dir = TempDir::new().unwrap();
        let result = storage(&dir).validate(&upload(PNG_HEADER, "video/mp4"));
        assert!(matches!(result, Err(MediaError::TypeMismatch { .. })));
    }

    #[test]
    fn enforces_size_ceilings_per_type() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        assert!(matches!(
            storage.validate(&upload(&[1u8; 100], "image/png")),
            Err(MediaError::TooLarge {
                media_type: MediaType::Image,
                size: 100,
                max: 64
            })
        ));
        assert_eq!(
            storage.validate(&upload(&[1u8; 100], "video/mp4")).unwrap(),
            MediaType::Video
        );
        assert!(matches!(
            storage.validate(&upload(&[1u8; 200], "video/mp4")),
            Err(MediaError::TooLarge { .. })
        ));
    }

    #[test]
    fn video_must_be_alone() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let result = storage.validate_all(&[
            upload(PNG_HEADER, "image/png"),
            upload(&[1u8; 10], "video/mp4"),
        ]);
        assert!(matches!(result, Err(MediaError::VideoNotAlone)));

        let types = storage
            .validate_all(&[upload(PNG_HEADER, "image/png"), upload(PNG_HEADER, "image/png")])
            .unwrap();
        assert_eq!(types, vec![MediaType::Image, MediaType::Image]);
    }

    #[tokio::test]
    async fn stores_with_sniffed_extension_and_deletes() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        let stored = storage
            .store(&MediaUpload {
                bytes: PNG_HEADER.to_vec(),
                content_type: "image/png".to_string(),
                file_name: Some("holiday.jpeg".to_string()),
            })
            .await
            .unwrap();
        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.url.ends_with(".png"));
        assert_eq!(stored.media_type, MediaType::Image);

        let file_name = stored.url.trim_start_matches("/uploads/");
        let path = dir.path().join("uploads").join(file_name);
        assert!(path.exists());

        storage.delete(&stored.url).await.unwrap();
        assert!(!path.exists());
        // Deleting again is fine
        storage.delete(&stored.url).await.unwrap();
    }

    #[tokio::test]
    async fn delete_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        assert!(matches!(
            storage.delete("/uploads/../secret.db").await,
            Err(MediaError::InvalidFilename(_))
        ));
        assert!(matches!(
            storage.delete("/elsewhere/file.png").await,
            Err(MediaError::InvalidFilename(_))
        ));
    }

    #[tokio::test]
    async fn best_effort_delete_reports_failure() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let failure = storage
            .delete_best_effort("/uploads/../escape")
            .await
            .unwrap_err();
        assert_eq!(
            failure.effect,
            SecondaryEffect::MediaDeletion {
                url: "/uploads/../escape".to_string()
            }
        );
    }

    #[test]
    fn falls_back_to_declared_subtype_for_extension() {
        assert_eq!(extension_for(&upload(&[1, 2, 3], "image/svg+xml")), "svg");
        assert_eq!(extension_for(&upload(&[1, 2, 3], "video/")), "bin");
    }
}
