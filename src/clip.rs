//! Clip playback state and the per-slide clip player.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::Timing;
use crate::constants::PRELOAD_AHEAD;
use crate::engine::{ClipRef, MediaBackend, MediaEvent};
use crate::state::ClipSignal;

/// A playable media reference plus what the media subsystem has told us about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clip {
    uri: String,
    duration: Option<f64>,
    position: f64,
    ready: bool,
    playing: bool,
}

impl Clip {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            duration: None,
            position: 0.0,
            ready: false,
            playing: false,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Known once metadata has loaded.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn remaining(&self) -> Option<f64> {
        self.duration.map(|duration| (duration - self.position).max(0.0))
    }

    fn rewind(&mut self) {
        self.position = 0.0;
        self.playing = false;
    }
}

/// Plays the clips of one slide in order and turns media events into clip signals.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    slide: usize,
    clips: Vec<Clip>,
    active: bool,
    activation: u64,
    current: usize,
    ready: bool,
    pending_play: Option<usize>,
}

impl ClipPlayer {
    pub fn new(slide: usize, uris: &[String]) -> Self {
        Self {
            slide,
            clips: uris.iter().map(Clip::new).collect(),
            active: false,
            activation: 0,
            current: 0,
            ready: false,
            pending_play: None,
        }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Whether the tracked clip has started playing. Drives the loading indicator.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn playing_count(&self) -> usize {
        self.clips.iter().filter(|clip| clip.playing).count()
    }

    /// Counts deactivations. Tags every request handed to the backend.
    pub fn activation(&self) -> u64 {
        self.activation
    }

    pub fn target(&self, clip: usize) -> ClipRef {
        ClipRef::new(self.slide, clip).with_activation(self.activation)
    }

    /// Slide became active: rewind everything and start from clip 0.
    pub fn activate(&mut self, backend: &mut impl MediaBackend) {
        self.rewind_all(backend);
        self.active = true;
        self.current = 0;
        self.ready = false;
        self.pending_play = None;
        if self.clips.is_empty() {
            return;
        }

        for index in 0..=PRELOAD_AHEAD.min(self.clips.len() - 1) {
            backend.load(self.target(index), &self.clips[index].uri);
        }
        self.request_play(0, backend);
    }

    /// Slide became inactive: pause and rewind every clip. Playback events
    /// still in flight for this activation are ignored from now on.
    pub fn deactivate(&mut self, backend: &mut impl MediaBackend) {
        self.rewind_all(backend);
        self.activation += 1;
        self.active = false;
        self.current = 0;
        self.ready = false;
        self.pending_play = None;
    }

    /// Cut to `next`: the outgoing clip is paused, `next` starts as soon as it is
    /// buffered and the clip after it begins loading.
    pub fn advance_to(&mut self, next: usize, backend: &mut impl MediaBackend) {
        if next >= self.clips.len() {
            return;
        }

        let outgoing = self.current;
        if self.clips[outgoing].playing {
            backend.pause(self.target(outgoing));
            self.clips[outgoing].playing = false;
        }

        self.current = next;
        if self.clips[next].ready {
            backend.seek(self.target(next), 0.0);
            self.clips[next].position = 0.0;
        }
        self.request_play(next, backend);

        if let Some(upcoming) = self.clips.get(next + PRELOAD_AHEAD) {
            backend.load(self.target(next + PRELOAD_AHEAD), &upcoming.uri);
        }
    }

    /// Applies a media event for one of this slide's clips and reports whether
    /// the tracked clip is about to end or has ended.
    pub fn handle_event(
        &mut self,
        event: &MediaEvent,
        timing: &Timing,
        backend: &mut impl MediaBackend,
    ) -> Option<ClipSignal> {
        let target = event.target();
        let index = target.clip;
        if index >= self.clips.len() {
            trace!(slide = self.slide, clip = index, "event for unknown clip");
            return None;
        }

        let playback = matches!(
            event,
            MediaEvent::Playing { .. } | MediaEvent::TimeUpdate { .. } | MediaEvent::Ended { .. }
        );
        if playback && target.activation != self.activation {
            trace!(?target, activation = self.activation, "event from an earlier activation");
            return None;
        }

        match *event {
            MediaEvent::MetadataLoaded { duration, .. } => {
                if duration.is_finite() && duration > 0.0 {
                    self.clips[index].duration = Some(duration);
                }
                None
            }
            MediaEvent::CanPlay { .. } => {
                self.clips[index].ready = true;
                if self.active && self.pending_play == Some(index) {
                    self.start(index, backend);
                }
                None
            }
            MediaEvent::Playing { .. } => {
                if self.active && index == self.current {
                    self.clips[index].playing = true;
                    self.ready = true;
                }
                None
            }
            MediaEvent::Waiting { .. } => {
                debug!(slide = self.slide, clip = index, "clip buffering");
                None
            }
            MediaEvent::TimeUpdate { position, .. } => {
                if !self.active {
                    return None;
                }
                self.clips[index].position = position;
                if index != self.current {
                    return None;
                }
                let duration = self.clips[index].duration?;
                let threshold = timing.trigger_threshold(duration);
                if duration - position <= threshold {
                    Some(ClipSignal::NearEnd { clip: index, threshold })
                } else {
                    None
                }
            }
            MediaEvent::Ended { .. } => {
                if !self.active {
                    return None;
                }
                let clip = &mut self.clips[index];
                clip.playing = false;
                if let Some(duration) = clip.duration {
                    clip.position = duration;
                }
                (index == self.current).then_some(ClipSignal::Ended { clip: index })
            }
        }
    }

    fn request_play(&mut self, index: usize, backend: &mut impl MediaBackend) {
        if self.clips[index].ready {
            self.start(index, backend);
        } else {
            self.pending_play = Some(index);
        }
    }

    fn start(&mut self, index: usize, backend: &mut impl MediaBackend) {
        // At most one playing clip per slide.
        for other in 0..self.clips.len() {
            if other != index && self.clips[other].playing {
                backend.pause(self.target(other));
                self.clips[other].playing = false;
            }
        }

        let target = self.target(index);
        match backend.play(target, &self.clips[index].uri) {
            Ok(()) => {
                self.clips[index].playing = true;
                self.ready = true;
                self.pending_play = None;
            }
            Err(e) => {
                // Retried on the next CanPlay for this clip.
                warn!(slide = self.slide, clip = index, error = %e, "play rejected");
                self.pending_play = Some(index);
            }
        }
    }

    fn rewind_all(&mut self, backend: &mut impl MediaBackend) {
        for index in 0..self.clips.len() {
            let target = self.target(index);
            backend.pause(target);
            backend.seek(target, 0.0);
            self.clips[index].rewind();
        }
    }
}
