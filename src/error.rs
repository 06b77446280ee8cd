//! Error handling for spx projects
//!
//! Every error maps onto one of three kinds: something looked up by name or
//! key does not exist, an adapter failed to move bytes, or the caller broke a
//! structural assumption of the model.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for project operations
pub type Result<T> = std::result::Result<T, ProjectError>;

/// Coarse classification of a [`ProjectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A name, key or project does not exist.
    NotFound,
    /// A cloud, cache or archive adapter failed.
    Io,
    /// The input violated a structural assumption.
    Precondition,
}

/// Main error type for project operations
#[derive(Error, Debug)]
pub enum ProjectError {
    // Lookup Errors
    #[error("Sprite not found: {name}")]
    SpriteNotFound { name: String },

    #[error("Sound not found: {name}")]
    SoundNotFound { name: String },

    #[error("Sprite not found in zorder: {name}")]
    ZorderEntryNotFound { name: String },

    #[error("No local cache entry for key: {key}")]
    CacheEntryNotFound { key: String },

    #[error("Cloud project not found: {owner}/{name}")]
    CloudProjectNotFound { owner: String, name: String },

    // Model Errors
    #[error("Name already taken by a sibling asset: {name}")]
    NameConflict { name: String },

    #[error("Malformed config document {path}: {reason}")]
    MalformedConfig { path: String, reason: String },

    #[error("Invalid asset path: {path}")]
    InvalidAssetPath { path: String },

    #[error("Invalid local cache key: {key:?}")]
    InvalidCacheKey { key: String },

    #[error("Project needs an owner and a name before it can be saved to the cloud")]
    MissingIdentity,

    // Adapter Errors
    #[error("Cloud store error: {reason}")]
    Cloud { reason: String },

    #[error("Failed to write cache file: {path}: {source}")]
    CacheWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read cache file: {path}: {source}")]
    CacheReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic Errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProjectError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProjectError::SpriteNotFound { .. }
            | ProjectError::SoundNotFound { .. }
            | ProjectError::ZorderEntryNotFound { .. }
            | ProjectError::CacheEntryNotFound { .. }
            | ProjectError::CloudProjectNotFound { .. } => ErrorKind::NotFound,
            ProjectError::NameConflict { .. }
            | ProjectError::MalformedConfig { .. }
            | ProjectError::InvalidAssetPath { .. }
            | ProjectError::InvalidCacheKey { .. }
            | ProjectError::MissingIdentity
            | ProjectError::Internal(_) => ErrorKind::Precondition,
            ProjectError::Cloud { .. }
            | ProjectError::CacheWriteError { .. }
            | ProjectError::CacheReadError { .. }
            | ProjectError::Archive(_)
            | ProjectError::Io(_)
            | ProjectError::Json(_) => ErrorKind::Io,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ProjectError::SpriteNotFound { .. } => "SPRITE_NOT_FOUND",
            ProjectError::SoundNotFound { .. } => "SOUND_NOT_FOUND",
            ProjectError::ZorderEntryNotFound { .. } => "ZORDER_ENTRY_NOT_FOUND",
            ProjectError::CacheEntryNotFound { .. } => "CACHE_ENTRY_NOT_FOUND",
            ProjectError::CloudProjectNotFound { .. } => "CLOUD_PROJECT_NOT_FOUND",
            ProjectError::NameConflict { .. } => "NAME_CONFLICT",
            ProjectError::MalformedConfig { .. } => "MALFORMED_CONFIG",
            ProjectError::InvalidAssetPath { .. } => "INVALID_ASSET_PATH",
            ProjectError::InvalidCacheKey { .. } => "INVALID_CACHE_KEY",
            ProjectError::MissingIdentity => "MISSING_IDENTITY",
            ProjectError::Cloud { .. } => "CLOUD_ERROR",
            ProjectError::CacheWriteError { .. } => "CACHE_WRITE_ERROR",
            ProjectError::CacheReadError { .. } => "CACHE_READ_ERROR",
            ProjectError::Archive(_) => "ARCHIVE_ERROR",
            ProjectError::Io(_) => "IO_ERROR",
            ProjectError::Json(_) => "SERIALIZATION_ERROR",
            ProjectError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ProjectError::CacheEntryNotFound { .. } => {
                Some("Nothing was cached under this key yet. Load the project from the cloud instead.")
            }
            ProjectError::NameConflict { .. } => Some("Pick a name no other sprite or sound uses."),
            ProjectError::MissingIdentity => Some("Set the project owner and name before saving."),
            ProjectError::MalformedConfig { .. } => {
                Some("The project file may be corrupted. Try re-exporting it from the editor.")
            }
            ProjectError::Cloud { .. } => Some("Check your connection and save again."),
            _ => None,
        }
    }

    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        ProjectError::MalformedConfig {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
