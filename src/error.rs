//! Error types for ingestion and replay.
//!
//! Ingestion errors are reported per file and never abort a multi-file
//! batch. Replay errors cover session setup and renderer adapters; the
//! resolver and clock are total functions and have no error paths.

use thiserror::Error;

/// A flight log could not be turned into a track.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File name does not end in `.igc`.
    #[error("{file_name} is not an IGC file")]
    UnsupportedExtension { file_name: String },

    /// The file parsed but contained no usable samples.
    #[error("no valid track points found")]
    NoValidFixes,

    /// The file violates the IGC format.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    /// The file could not be read.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while setting up or driving a replay session.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Replay requested with zero valid tracks.
    #[error("cannot create a replay without any valid tracks")]
    EmptySession,

    /// No track with this id is in the store.
    #[error("unknown track: {track_id}")]
    UnknownTrack { track_id: String },

    /// A renderer adapter failed.
    #[error("renderer error: {0}")]
    Renderer(String),
}

impl From<std::io::Error> for ReplayError {
    fn from(err: std::io::Error) -> Self {
        ReplayError::Renderer(err.to_string())
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(err: serde_json::Error) -> Self {
        ReplayError::Renderer(err.to_string())
    }
}

pub type Result<T, E = ReplayError> = std::result::Result<T, E>;

/// Convert lookups into replay errors.
pub trait OptionExt<T> {
    fn ok_or_unknown_track(self, track_id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_unknown_track(self, track_id: &str) -> Result<T> {
        self.ok_or_else(|| ReplayError::UnknownTrack {
            track_id: track_id.to_string(),
        })
    }
}
