use std::path::PathBuf;

use thiserror::Error;

/// Invalid settings, either from the settings file or from operator input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A settings line could not be parsed.
    #[error("settings line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Display interval outside the accepted range.
    #[error("display time {ms} ms is outside {min}..={max} ms")]
    IntervalOutOfRange { ms: u64, min: u64, max: u64 },

    /// Repeat counts start at one.
    #[error("repeat count must be at least 1 (got {0})")]
    InvalidRepeatCount(u32),

    /// Settings file exists but could not be read.
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Problems discovering or reading resource directories.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Any other filesystem failure; the directory's scan was abandoned.
    #[error("failed to scan {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown deck: {0}")]
    UnknownDeck(String),

    /// The scan found no complete image/audio pair.
    #[error("no paired image and audio files found ({} directory problem(s))", .problems.len())]
    EmptyCatalog { problems: Vec<ResourceError> },
}

/// Failures while presenting a card. Never fatal to a session.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no catalog entry at index {index} (catalog holds {len})")]
    NoSuchEntry { index: usize, len: usize },

    #[error("failed to prepare image {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to present {label}")]
    Present {
        label: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to play audio {path}")]
    Audio {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
