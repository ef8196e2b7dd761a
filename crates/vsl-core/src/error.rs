//! Error types for VSL Core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Mount errors
    #[error("Container \"{selector}\" not found")]
    ContainerNotFound { selector: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid quality preference: {0}")]
    InvalidQuality(String),

    // Storage errors
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    #[error("Progress record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true for storage failures, which are swallowed rather than surfaced
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::StorageUnavailable(_) | Error::StorageWrite(_) | Error::Serialization(_)
        )
    }

    /// Returns the error code for logs and embedders
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::ContainerNotFound { .. } => "CONTAINER_NOT_FOUND",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidQuality(_) => "INVALID_QUALITY",
            Error::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Error::StorageWrite(_) => "STORAGE_WRITE",
            Error::Serialization(_) => "SERIALIZATION",
            Error::Internal(_) => "INTERNAL",
        }
    }
}

/// Category of a playback failure reported by the media element or the
/// streaming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackErrorKind {
    /// Segment or manifest could not be fetched
    Network,
    /// Decode failure or unsupported format
    Media,
    /// Manifest source on a platform with neither native HLS nor the engine
    Unsupported,
    /// Anything else
    Other,
}

impl PlaybackErrorKind {
    /// `MediaError.code` values from the HTML media element
    pub const MEDIA_ERR_NETWORK: u16 = 2;
    pub const MEDIA_ERR_DECODE: u16 = 3;
    pub const MEDIA_ERR_SRC_NOT_SUPPORTED: u16 = 4;

    /// User-facing message shown in the error overlay
    pub fn message(&self) -> &'static str {
        match self {
            PlaybackErrorKind::Network => "Network error. Please check your connection.",
            PlaybackErrorKind::Media => "Media error. The video format may not be supported.",
            PlaybackErrorKind::Unsupported => "Your browser does not support HLS video playback",
            PlaybackErrorKind::Other => "An error occurred while playing the video",
        }
    }

    /// Classify a media element `MediaError.code`
    pub fn from_media_error_code(code: u16) -> Self {
        match code {
            Self::MEDIA_ERR_NETWORK => PlaybackErrorKind::Network,
            Self::MEDIA_ERR_DECODE | Self::MEDIA_ERR_SRC_NOT_SUPPORTED => PlaybackErrorKind::Media,
            _ => PlaybackErrorKind::Other,
        }
    }

    /// Classify an hls.js error `type` string
    pub fn from_engine_type(error_type: &str) -> Self {
        match error_type {
            "networkError" => PlaybackErrorKind::Network,
            "mediaError" => PlaybackErrorKind::Media,
            _ => PlaybackErrorKind::Other,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PlaybackErrorKind::Network => "NETWORK",
            PlaybackErrorKind::Media => "MEDIA",
            PlaybackErrorKind::Unsupported => "UNSUPPORTED",
            PlaybackErrorKind::Other => "PLAYBACK",
        }
    }
}

impl std::fmt::Display for PlaybackErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_error_codes() {
        assert_eq!(PlaybackErrorKind::from_media_error_code(2), PlaybackErrorKind::Network);
        assert_eq!(PlaybackErrorKind::from_media_error_code(3), PlaybackErrorKind::Media);
        assert_eq!(PlaybackErrorKind::from_media_error_code(4), PlaybackErrorKind::Media);
        assert_eq!(PlaybackErrorKind::from_media_error_code(1), PlaybackErrorKind::Other);
    }

    #[test]
    fn test_engine_error_types() {
        assert_eq!(PlaybackErrorKind::from_engine_type("networkError"), PlaybackErrorKind::Network);
        assert_eq!(PlaybackErrorKind::from_engine_type("mediaError"), PlaybackErrorKind::Media);
        assert_eq!(PlaybackErrorKind::from_engine_type("muxError"), PlaybackErrorKind::Other);
    }

    #[test]
    fn test_playback_error_display() {
        let kind = PlaybackErrorKind::Network;
        assert_eq!(kind.to_string(), "Network error. Please check your connection.");
        assert_eq!(kind.error_code(), "NETWORK");
        assert!(!Error::InvalidConfig("x".into()).is_storage());
        assert!(Error::StorageWrite("quota".into()).is_storage());
    }
}
