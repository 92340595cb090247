//! Error types for the slide sequencer.

use thiserror::Error;

/// Errors raised by the sequencer and its slide track.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequencerError {
    #[error("Slide track has no slides")]
    EmptyTrack,

    #[error("Slide {id} has no clips")]
    EmptySlide { id: u32 },

    #[error("Duplicate slide id: {id}")]
    DuplicateSlideId { id: u32 },

    #[error("Slide index {index} out of range (slide count {count})")]
    SlideOutOfRange { index: usize, count: usize },
}

/// Errors raised while loading slide configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid timing: {reason}")]
    InvalidTiming { reason: String },

    #[error(transparent)]
    Track(#[from] SequencerError),
}

/// Errors surfaced by a media backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Playback rejected for {uri}: {reason}")]
    PlayRejected { uri: String, reason: String },

    #[error("Media not loaded: {uri}")]
    NotLoaded { uri: String },
}

/// Errors raised while probing clip durations with ffprobe.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Failed to start ffprobe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffprobe failed for {path}: {stderr}")]
    Failed { path: String, stderr: String },

    #[error("Unparseable duration {output:?}")]
    Unparseable { output: String },
}

pub type Result<T, E = SequencerError> = std::result::Result<T, E>;
