use serde::Serialize;

use crate::error::MediaError;

/// Address of a clip: slide index, clip index within that slide, and which
/// activation of the slide the request belongs to.
///
/// Backends echo the `ClipRef` they were handed in the events they raise, so
/// progress and end events left over from an earlier activation can be told
/// apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClipRef {
    pub slide: usize,
    pub clip: usize,
    pub activation: u64,
}

impl ClipRef {
    pub fn new(slide: usize, clip: usize) -> Self {
        Self { slide, clip, activation: 0 }
    }

    pub fn with_activation(self, activation: u64) -> Self {
        Self { activation, ..self }
    }
}

/// Notifications from the media subsystem. Delivered in any order, possibly duplicated.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    MetadataLoaded { target: ClipRef, duration: f64 },
    CanPlay { target: ClipRef },
    Playing { target: ClipRef },
    Waiting { target: ClipRef },
    TimeUpdate { target: ClipRef, position: f64 },
    Ended { target: ClipRef },
}

impl MediaEvent {
    pub fn target(&self) -> ClipRef {
        match self {
            MediaEvent::MetadataLoaded { target, .. }
            | MediaEvent::CanPlay { target }
            | MediaEvent::Playing { target }
            | MediaEvent::Waiting { target }
            | MediaEvent::TimeUpdate { target, .. }
            | MediaEvent::Ended { target } => *target,
        }
    }
}

/// The media subsystem the sequencer drives. Loading is asynchronous: readiness
/// comes back later as `MetadataLoaded` / `CanPlay` events.
pub trait MediaBackend {
    /// Hint that `uri` should start buffering.
    fn load(&mut self, target: ClipRef, uri: &str);

    /// Start or resume playback. May be rejected.
    ///
    /// After a rejection the player keeps the clip pending and plays it on the
    /// next `CanPlay` for that clip, so a backend that wants a retry must raise
    /// `CanPlay` again.
    fn play(&mut self, target: ClipRef, uri: &str) -> Result<(), MediaError>;

    fn pause(&mut self, target: ClipRef);

    fn seek(&mut self, target: ClipRef, position: f64);
}
