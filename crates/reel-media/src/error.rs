//! Error types for composition.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use reel_models::ConfigError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Kind of asset a page depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Speech,
    Sound,
    Music,
    Captions,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Image => "image",
            AssetKind::Speech => "speech",
            AssetKind::Sound => "sound",
            AssetKind::Music => "music",
            AssetKind::Captions => "captions",
        };
        f.write_str(name)
    }
}

/// Audio channel a degenerate signal was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Speech,
    Effect,
    Music,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::Speech => "speech",
            TrackKind::Effect => "effect",
            TrackKind::Music => "music",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while composing a slideshow.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Missing {kind} asset for page {page}: {}", .path.display())]
    MissingAsset {
        /// 1-based page index, 0 for story-wide assets
        page: usize,
        kind: AssetKind,
        path: PathBuf,
    },

    #[error("Invalid configuration for `{parameter}`: {message}")]
    InvalidConfiguration {
        parameter: &'static str,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate {track} signal: zero RMS energy")]
    DegenerateSignal { track: TrackKind },

    #[error("Failed to write {}: {message}", .path.display())]
    AssemblyWrite { path: PathBuf, message: String },

    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Unreadable audio {}: {source}", .path.display())]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<ConfigError> for MediaError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfiguration {
            parameter: err.parameter,
            message: err.message,
        }
    }
}

impl MediaError {
    /// Create a missing asset error.
    pub fn missing_asset(page: usize, kind: AssetKind, path: impl Into<PathBuf>) -> Self {
        Self::MissingAsset {
            page,
            kind,
            path: path.into(),
        }
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an assembly write error.
    pub fn assembly_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::AssemblyWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn wav(path: impl Into<PathBuf>, source: hound::Error) -> Self {
        Self::Wav {
            path: path.into(),
            source,
        }
    }
}
