//! Slide sequencer: the transition controller tying the slide track to the
//! per-slide clip players.
//!
//! Everything runs on one thread. Media events are applied one at a time by
//! [`Sequencer::handle_event`]; deferred cuts and guard releases fire from
//! [`Sequencer::tick`]. Time is passed in explicitly as the offset since mount.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::clip::ClipPlayer;
use crate::config::Timing;
use crate::crossfade::{clip_layer_opacity, Crossfade};
use crate::engine::{MediaBackend, MediaEvent};
use crate::error::Result;
use crate::slide::SlideTrack;
use crate::state::{ClipSignal, Phase, Position, Trigger};
use crate::timer::{TimerHandle, Timers};

/// Callbacks the controller defers. Each remembers the slide it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    ReleaseGuard { slide: usize },
    AdvanceSlide { from: usize },
}

/// Fade state exposed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FadeState {
    pub from: usize,
    pub to: usize,
    pub progress: f32,
}

/// Everything the surrounding layout needs to render the carousel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub slide: usize,
    pub clip: usize,
    pub phase: Phase,
    pub ready: bool,
    pub title: String,
    pub description: String,
    pub cta_label: String,
    pub cta_target: String,
    pub indicators: Vec<bool>,
    pub clip_opacity: Vec<f32>,
    pub clip_crossfade: Option<FadeState>,
    pub slide_crossfade: Option<FadeState>,
}

pub struct Sequencer<B: MediaBackend> {
    track: SlideTrack,
    timing: Timing,
    backend: B,
    players: Vec<ClipPlayer>,
    position: Position,
    phase: Phase,
    timers: Timers<Deferred>,
    pending: Option<TimerHandle>,
    guarded_clip: Option<usize>,
    clip_fade: Option<Crossfade>,
    slide_fade: Option<Crossfade>,
    slide_changes: u64,
}

impl<B: MediaBackend> Sequencer<B> {
    /// Creates the sequencer and activates slide 0. Out-of-range timing values
    /// are clamped.
    pub fn mount(track: SlideTrack, timing: Timing, backend: B) -> Self {
        if let Err(e) = timing.validate() {
            warn!(error = %e, "clamping timing");
        }
        let timing = timing.clamped();
        let players = track
            .iter()
            .enumerate()
            .map(|(index, slide)| ClipPlayer::new(index, &slide.clips))
            .collect();

        let mut sequencer = Self {
            track,
            timing,
            backend,
            players,
            position: Position::default(),
            phase: Phase::Idle,
            timers: Timers::new(),
            pending: None,
            guarded_clip: None,
            clip_fade: None,
            slide_fade: None,
            slide_changes: 0,
        };
        sequencer.players[0].activate(&mut sequencer.backend);
        info!(slides = sequencer.track.len(), "sequencer mounted");
        sequencer
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase == Phase::Transitioning
    }

    /// Whether the active slide's clip is playing. False means show a loading indicator.
    pub fn is_ready(&self) -> bool {
        self.players[self.position.slide].is_ready()
    }

    pub fn track(&self) -> &SlideTrack {
        &self.track
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn player(&self, slide: usize) -> Option<&ClipPlayer> {
        self.players.get(slide)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Whether a guard release or deferred slide advance is scheduled.
    pub fn has_pending_callback(&self) -> bool {
        self.pending.is_some()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Number of slide changes since mount, manual jumps included.
    pub fn slide_changes(&self) -> u64 {
        self.slide_changes
    }

    /// Feeds one media event through the active slide's clip player and acts on
    /// the signal it raises, if any.
    pub fn handle_event(&mut self, event: &MediaEvent, now: Duration) {
        let target = event.target();
        let Some(player) = self.players.get_mut(target.slide) else {
            trace!(slide = target.slide, "event for unknown slide");
            return;
        };

        let signal = player.handle_event(event, &self.timing, &mut self.backend);
        if let Some(signal) = signal {
            if target.slide == self.position.slide {
                self.on_signal(signal, now);
            }
        }
    }

    /// Fires every deferred callback due at `now`.
    pub fn tick(&mut self, now: Duration) {
        while let Some((handle, action)) = self.timers.pop_due(now) {
            if self.pending == Some(handle) {
                self.pending = None;
            }

            match action {
                Deferred::ReleaseGuard { slide } if slide == self.position.slide => {
                    self.phase = Phase::Idle;
                    self.guarded_clip = None;
                    trace!(slide, "transition guard released");
                }
                Deferred::AdvanceSlide { from } if from == self.position.slide => {
                    let to = self.track.next_index(from);
                    self.change_slide(to, now);
                }
                stale => debug!(?stale, current = self.position.slide, "dropping stale callback"),
            }
        }
    }

    /// Manual override: go straight to `index`, clip 0, cancelling any pending transition.
    pub fn jump_to(&mut self, index: usize, now: Duration) -> Result<()> {
        self.track.check_index(index)?;
        info!(from = self.position.slide, to = index, "manual jump");
        self.change_slide(index, now);
        Ok(())
    }

    pub fn snapshot(&self, now: Duration) -> Snapshot {
        let Position { slide, clip } = self.position;
        let content = &self.track[slide];
        let fade = |crossfade: &Crossfade| FadeState {
            from: crossfade.from,
            to: crossfade.to,
            progress: crossfade.progress(now),
        };

        Snapshot {
            slide,
            clip,
            phase: self.phase,
            ready: self.is_ready(),
            title: content.title.clone(),
            description: content.description.clone(),
            cta_label: content.cta_label.clone(),
            cta_target: content.cta_target.clone(),
            indicators: (0..self.track.len()).map(|i| i == slide).collect(),
            clip_opacity: clip_layer_opacity(content.clips.len(), clip),
            clip_crossfade: self.clip_fade.as_ref().map(fade),
            slide_crossfade: self.slide_fade.as_ref().map(fade),
        }
    }

    fn on_signal(&mut self, signal: ClipSignal, now: Duration) {
        if signal.clip() != self.position.clip {
            trace!(?signal, current = self.position.clip, "ignored, not the tracked clip");
            return;
        }
        if self.phase == Phase::Transitioning {
            // Only the end of a clip cut to during the window gets through.
            let fresh_end = matches!(signal, ClipSignal::Ended { .. }) && self.guarded_clip != Some(signal.clip());
            if !fresh_end {
                trace!(?signal, "ignored, transition in progress");
                return;
            }
            debug!(clip = signal.clip(), "clip ended inside the guard window");
            self.cancel_pending();
        }

        self.phase = Phase::Transitioning;
        self.guarded_clip = Some(self.position.clip);
        let slide = self.position.slide;
        let last_clip = self.track[slide].last_clip();

        if self.position.clip < last_clip {
            self.advance_clip(signal.trigger(), now);
            return;
        }

        match signal {
            ClipSignal::NearEnd { threshold, .. } => {
                // Line the cut up with the clip's natural end.
                let delay = Duration::try_from_secs_f64(threshold).unwrap_or_default();
                self.pending = Some(self.timers.schedule(now, delay, Deferred::AdvanceSlide { from: slide }));
                debug!(slide, delay_ms = delay.as_millis() as u64, "slide advance scheduled");
            }
            ClipSignal::Ended { .. } => {
                let to = self.track.next_index(slide);
                self.change_slide(to, now);
            }
        }
    }

    fn advance_clip(&mut self, trigger: Trigger, now: Duration) {
        let slide = self.position.slide;
        let from = self.position.clip;
        let to = from + 1;

        self.players[slide].advance_to(to, &mut self.backend);
        self.position.clip = to;
        self.clip_fade = Some(Crossfade::new(from, to, now, self.timing.crossfade()));

        let guard = match trigger {
            Trigger::NearEnd => self.timing.near_end_guard(),
            Trigger::Ended => self.timing.ended_guard(),
        };
        self.pending = Some(self.timers.schedule(now, guard, Deferred::ReleaseGuard { slide }));
        debug!(slide, from, to, ?trigger, "clip advanced");
    }

    fn change_slide(&mut self, to: usize, now: Duration) {
        let from = self.position.slide;

        self.cancel_pending();
        self.players[from].deactivate(&mut self.backend);
        self.position = Position::new(to, 0);
        self.phase = Phase::Idle;
        self.guarded_clip = None;
        self.clip_fade = None;
        self.slide_fade = Some(Crossfade::new(from, to, now, self.timing.crossfade()));
        self.slide_changes += 1;
        self.players[to].activate(&mut self.backend);

        info!(from, to, "slide changed");
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timers.cancel(handle);
        }
    }
}
