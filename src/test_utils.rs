//! Test helpers shared by unit tests.

use crate::engine::{ClipRef, MediaBackend};
use crate::error::MediaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(ClipRef),
    Play(ClipRef),
    Rejected(ClipRef),
    Pause(ClipRef),
    Seek(ClipRef, f64),
}

/// Backend that records every call and can reject a number of upcoming plays.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub reject_next: usize,
}

impl RecordingBackend {
    pub fn plays(&self) -> usize {
        self.calls.iter().filter(|call| matches!(call, Call::Play(_))).count()
    }

    pub fn played(&self, target: ClipRef) -> bool {
        self.calls.contains(&Call::Play(target))
    }
}

impl MediaBackend for RecordingBackend {
    fn load(&mut self, target: ClipRef, _uri: &str) {
        self.calls.push(Call::Load(target));
    }

    fn play(&mut self, target: ClipRef, uri: &str) -> Result<(), MediaError> {
        if self.reject_next > 0 {
            self.reject_next -= 1;
            self.calls.push(Call::Rejected(target));
            return Err(MediaError::PlayRejected {
                uri: uri.to_string(),
                reason: "resource temporarily unavailable".to_string(),
            });
        }
        self.calls.push(Call::Play(target));
        Ok(())
    }

    fn pause(&mut self, target: ClipRef) {
        self.calls.push(Call::Pause(target));
    }

    fn seek(&mut self, target: ClipRef, position: f64) {
        self.calls.push(Call::Seek(target, position));
    }
}
