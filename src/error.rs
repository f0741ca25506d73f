//! Error taxonomy shared by every service.

use crate::media::MediaError;
use std::collections::BTreeMap;
use thiserror::Error;

/// The six error categories a caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    NotAuthorized,
    Unauthenticated,
    Conflict,
    Unexpected,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, String>,
    },

    #[error("You cannot follow yourself")]
    SelfFollow,

    #[error("Invalid media: {0}")]
    InvalidMedia(MediaError),

    #[error("{0}")]
    DuplicateIdentity(String),

    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotAuthorized(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation { .. }
            | ServiceError::SelfFollow
            | ServiceError::InvalidMedia(_) => ErrorKind::Validation,
            ServiceError::DuplicateIdentity(_) => ErrorKind::Conflict,
            ServiceError::InvalidCredentials | ServiceError::Unauthenticated => {
                ErrorKind::Unauthenticated
            }
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::NotAuthorized(_) => ErrorKind::NotAuthorized,
            ServiceError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.clone());
        ServiceError::Validation { message, fields }
    }

    pub fn not_found(what: &str, id: usize) -> Self {
        ServiceError::NotFound(format!("{} not found with id: {}", what, id))
    }

    /// Field errors, only populated for validation failures.
    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ServiceError::Validation { fields, .. } if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }
}

impl From<MediaError> for ServiceError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Io(io_err) => ServiceError::Unexpected(
                anyhow::Error::new(io_err).context("Media storage I/O failed"),
            ),
            other => ServiceError::InvalidMedia(other),
        }
    }
}

/// Collects field errors and turns them into a single `Validation` error.
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless `ok` holds. The first message per field wins.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.fields
                .entry(field.to_string())
                .or_insert_with(|| message.to_string());
        }
        self
    }

    pub fn into_result(self) -> ServiceResult<()> {
        if self.fields.is_empty() {
            return Ok(());
        }
        Err(ServiceError::Validation {
            message: "Validation failed".to_string(),
            fields: self.fields,
        })
    }
}

/// True when the error chain holds a SQLite UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    })
}
