//! `hero_reel`: the slide sequencer behind a hero video carousel.
//!
//! A [`SlideTrack`] holds the slides, each with an ordered list of clips. The
//! [`Sequencer`] plays the active slide's clips through a [`MediaBackend`],
//! cuts to the next clip shortly before the current one ends, moves on to the
//! next slide after the last clip and wraps around forever. Indicator clicks
//! map to [`Sequencer::jump_to`].

pub mod clip;
pub mod config;
pub mod constants;
pub mod crossfade;
pub mod engine;
pub mod error;
pub mod probe;
pub mod sequencer;
pub mod simulation;
pub mod slide;
pub mod state;
pub mod timer;

#[cfg(feature = "preview")]
pub mod preview;

#[cfg(test)]
mod test_utils;

pub use clip::{Clip, ClipPlayer};
pub use config::{Config, Timing};
pub use engine::{ClipRef, MediaBackend, MediaEvent};
pub use error::{ConfigError, MediaError, ProbeError, SequencerError};
pub use sequencer::{FadeState, Sequencer, Snapshot};
pub use slide::{Slide, SlideTrack};
pub use state::{ClipSignal, Phase, Position, Trigger};
