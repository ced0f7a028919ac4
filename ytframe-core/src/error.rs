//! Error types for ytframe-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can arise while loading or validating an [`EmbedConfig`].
///
/// [`EmbedConfig`]: crate::config::EmbedConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse embed config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config parsed but a field holds an unusable value.
    #[error("invalid embed config: {0}")]
    Invalid(String),
}

/// Error codes the widget platform reports through its `onError` callback.
///
/// `Display` yields the human-readable message surfaced to callers; the
/// table is closed and every unrecognised code falls into [`Unspecified`].
///
/// [`Unspecified`]: PlaybackError::Unspecified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("Invalid videoId value.")]
    InvalidParam,

    #[error("The requested content cannot be played in an HTML5 player or another error related to the HTML5 player has occurred.")]
    Html5,

    #[error("Video not found; It may have been deleted or marked as private.")]
    NotFound,

    /// Codes 101 and 150 mean the same thing; the raw code is kept.
    #[error("Embedding is not supported for this video.")]
    EmbeddingNotAllowed(i32),

    #[error("Unspecified Error")]
    Unspecified(i32),
}

impl PlaybackError {
    pub const INVALID_PARAM: i32 = 2;
    pub const HTML5: i32 = 5;
    pub const NOT_FOUND: i32 = 100;
    pub const EMBEDDING_NOT_ALLOWED: i32 = 101;
    pub const EMBEDDING_NOT_ALLOWED_DISGUISED: i32 = 150;

    /// Map a raw platform error code onto the closed table.
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::INVALID_PARAM => PlaybackError::InvalidParam,
            Self::HTML5 => PlaybackError::Html5,
            Self::NOT_FOUND => PlaybackError::NotFound,
            Self::EMBEDDING_NOT_ALLOWED | Self::EMBEDDING_NOT_ALLOWED_DISGUISED => {
                PlaybackError::EmbeddingNotAllowed(code)
            }
            other => PlaybackError::Unspecified(other),
        }
    }

    /// The raw platform code this error was mapped from.
    pub fn code(&self) -> i32 {
        match self {
            PlaybackError::InvalidParam => Self::INVALID_PARAM,
            PlaybackError::Html5 => Self::HTML5,
            PlaybackError::NotFound => Self::NOT_FOUND,
            PlaybackError::EmbeddingNotAllowed(code) | PlaybackError::Unspecified(code) => *code,
        }
    }
}

/// A collaborator failed synchronously (e.g. the widget constructor threw).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("widget platform error: {message}")]
pub struct PlatformError {
    pub message: String,
}

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
