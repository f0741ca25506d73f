use super::api_error::{ApiError, ApiResult};
use crate::media::MediaUpload;
use axum::extract::Multipart;
use std::collections::HashMap;
use tracing::debug;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A multipart body split into text fields and file parts.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub texts: HashMap<String, String>,
    /// Uploads in the order they were sent, with their field name.
    pub files: Vec<(String, MediaUpload)>,
}

impl MultipartForm {
    /// Parts named in `file_fields` become uploads, every other part is read as text.
    pub async fn read(mut multipart: Multipart, file_fields: &[&str]) -> ApiResult<Self> {
        let mut form = MultipartForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if file_fields.contains(&name.as_str()) {
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                debug!(
                    "Received file part {} ({}, {} bytes)",
                    name,
                    content_type,
                    bytes.len()
                );
                form.files.push((
                    name,
                    MediaUpload {
                        bytes: bytes.to_vec(),
                        content_type,
                        file_name,
                    },
                ));
            } else {
                let text = field.text().await?;
                form.texts.insert(name, text);
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn take_files(&mut self, field: &str) -> Vec<MediaUpload> {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(name, _)| name == field);
        self.files = rest;
        taken.into_iter().map(|(_, upload)| upload).collect()
    }

    /// Parses a text field holding JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self, name: &str) -> ApiResult<T> {
        let raw = self
            .text(name)
            .ok_or_else(|| ApiError::bad_request(format!("Missing '{}' part", name)))?;
        serde_json::from_str(raw)
            .map_err(|e| ApiError::bad_request(format!("Invalid '{}' part: {}", name, e)))
    }
}
