//! Headless driver: runs the sequencer against a simulated media subsystem.

pub mod engine;
pub mod media;

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::probe::{probe_duration, resolve_clip};
use crate::slide::SlideTrack;

pub use engine::{Cause, Simulation, TimelineEntry};
pub use media::{SimOptions, SimulatedMedia};

/// Probes every clip of the track under `media_root`. Clips that fail to probe
/// are left out and fall back to the default duration.
pub fn probe_track(track: &SlideTrack, media_root: &Path) -> HashMap<String, f64> {
    let mut durations = HashMap::new();
    for uri in track.iter().flat_map(|slide| slide.clips.iter()) {
        if durations.contains_key(uri) {
            continue;
        }
        match probe_duration(&resolve_clip(media_root, uri)) {
            Ok(duration) => {
                durations.insert(uri.clone(), duration);
            }
            Err(e) => warn!(uri = %uri, error = %e, "could not probe clip"),
        }
    }
    durations
}
