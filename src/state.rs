use serde::Serialize;

/// Transition controller phase. `Transitioning` is the guard: clip signals are ignored.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
pub enum Phase {
    Idle,          // Waiting for clip signals
    Transitioning, // A decision was taken, waiting for the guard or the deferred cut
}

/// Which clip signal led to a decision.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Trigger {
    NearEnd,
    Ended,
}

/// Signals the clip player raises for the tracked clip.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ClipSignal {
    NearEnd { clip: usize, threshold: f64 },
    Ended { clip: usize },
}

impl ClipSignal {
    pub fn clip(&self) -> usize {
        match self {
            ClipSignal::NearEnd { clip, .. } | ClipSignal::Ended { clip } => *clip,
        }
    }

    pub fn trigger(&self) -> Trigger {
        match self {
            ClipSignal::NearEnd { .. } => Trigger::NearEnd,
            ClipSignal::Ended { .. } => Trigger::Ended,
        }
    }
}

/// Current (slide, clip) of the sequencer.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize)]
pub struct Position {
    pub slide: usize,
    pub clip: usize,
}

impl Position {
    pub fn new(slide: usize, clip: usize) -> Self {
        Self { slide, clip }
    }
}
