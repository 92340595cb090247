use std::time::Duration;

use serde::Serialize;

use crate::config::Timing;
use crate::error::Result;
use crate::sequencer::{Sequencer, Snapshot};
use crate::simulation::media::{SimOptions, SimulatedMedia};
use crate::slide::SlideTrack;
use crate::state::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    Mount,
    Clip,
    Slide,
    Jump,
}

/// One change of (slide, clip) on the virtual clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub at_secs: f64,
    pub slide: usize,
    pub clip: usize,
    pub cause: Cause,
}

/// Drives a sequencer with simulated media on a virtual clock.
pub struct Simulation {
    sequencer: Sequencer<SimulatedMedia>,
    now: Duration,
    last: Position,
    last_changes: u64,
    timeline: Vec<TimelineEntry>,
}

impl Simulation {
    pub fn new(track: SlideTrack, timing: Timing, options: SimOptions) -> Self {
        let sequencer = Sequencer::mount(track, timing, SimulatedMedia::new(options));
        let last = sequencer.position();
        Self {
            sequencer,
            now: Duration::ZERO,
            last,
            last_changes: 0,
            timeline: vec![TimelineEntry {
                at_secs: 0.0,
                slide: last.slide,
                clip: last.clip,
                cause: Cause::Mount,
            }],
        }
    }

    pub fn sequencer(&self) -> &Sequencer<SimulatedMedia> {
        &self.sequencer
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    pub fn snapshot(&self) -> Snapshot {
        self.sequencer.snapshot(self.now)
    }

    /// Advances the clock by `dt` seconds: media first, then its events, then due callbacks.
    pub fn step(&mut self, dt: f32) {
        self.now += Duration::from_secs_f32(dt);
        self.sequencer.backend_mut().advance(dt);
        while let Some(event) = self.sequencer.backend_mut().pop_event() {
            self.sequencer.handle_event(&event, self.now);
            self.record(None);
        }
        self.sequencer.tick(self.now);
        self.record(None);
    }

    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        self.sequencer.jump_to(index, self.now)?;
        self.record(Some(Cause::Jump));
        Ok(())
    }

    pub fn run_until(&mut self, limit: Duration, dt: f32) {
        while self.now < limit {
            self.step(dt);
        }
    }

    /// Runs until the carousel has gone round `cycles` times. Returns false if
    /// `limit` was reached first, e.g. because a clip never loads.
    pub fn run_cycles(&mut self, cycles: usize, limit: Duration, dt: f32) -> bool {
        let target = (cycles * self.sequencer.track().len()) as u64;
        while self.sequencer.slide_changes() < target {
            if self.now >= limit {
                return false;
            }
            self.step(dt);
        }
        true
    }

    fn record(&mut self, cause: Option<Cause>) {
        let position = self.sequencer.position();
        let changes = self.sequencer.slide_changes();
        let slide_changed = changes != self.last_changes;
        if position == self.last && !slide_changed && cause.is_none() {
            return;
        }
        let cause = cause.unwrap_or(if slide_changed { Cause::Slide } else { Cause::Clip });
        self.timeline.push(TimelineEntry {
            at_secs: self.now.as_secs_f64(),
            slide: position.slide,
            clip: position.clip,
            cause,
        });
        self.last = position;
        self.last_changes = changes;
    }
}
