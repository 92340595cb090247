use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::constants::TIME_UPDATE_INTERVAL;
use crate::engine::{ClipRef, MediaBackend, MediaEvent};
use crate::error::MediaError;

const REJECT_RETRY_SECS: f32 = 0.2; // Delay before a rejected clip reports CanPlay again

/// Knobs for the simulated media subsystem.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub default_duration: f64,
    pub durations: HashMap<String, f64>,
    pub load_latency: (f32, f32),
    pub jitter: bool,
    pub duplicate_rate: f64,
    pub reject_rate: f64,
    pub never_loads: HashSet<String>,
    pub seed: u64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            default_duration: 6.0,
            durations: HashMap::new(),
            load_latency: (0.1, 0.4),
            jitter: false,
            duplicate_rate: 0.0,
            reject_rate: 0.0,
            never_loads: HashSet::new(),
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LoadState {
    Loading { remaining: f32 },
    Stalled,
    Loaded,
}

#[derive(Debug)]
struct SimClip {
    target: ClipRef,
    duration: f64,
    load: LoadState,
    position: f64,
    playing: bool,
    since_update: f32,
    next_update: f32,
    retry_in: Option<f32>,
}

/// Fake media subsystem: buffers, plays and reports progress on a virtual clock.
pub struct SimulatedMedia {
    options: SimOptions,
    clips: BTreeMap<(usize, usize), SimClip>,
    outbox: VecDeque<MediaEvent>,
    rng: StdRng,
}

impl SimulatedMedia {
    pub fn new(options: SimOptions) -> Self {
        let rng = StdRng::seed_from_u64(options.seed);
        Self {
            options,
            clips: BTreeMap::new(),
            outbox: VecDeque::new(),
            rng,
        }
    }

    pub fn pop_event(&mut self) -> Option<MediaEvent> {
        self.outbox.pop_front()
    }

    pub fn is_playing(&self, target: ClipRef) -> bool {
        self.clips.get(&key(target)).is_some_and(|clip| clip.playing)
    }

    /// Advances every clip by `dt` seconds, queueing the events a browser would fire.
    pub fn advance(&mut self, dt: f32) {
        let duplicate_rate = probability(self.options.duplicate_rate);

        for clip in self.clips.values_mut() {
            let target = clip.target;
            if let LoadState::Loading { remaining } = clip.load {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    clip.load = LoadState::Loaded;
                    self.outbox.push_back(MediaEvent::MetadataLoaded { target, duration: clip.duration });
                    self.outbox.push_back(MediaEvent::CanPlay { target });
                } else {
                    clip.load = LoadState::Loading { remaining };
                }
            }

            if let Some(retry_in) = clip.retry_in {
                let retry_in = retry_in - dt;
                if retry_in <= 0.0 {
                    clip.retry_in = None;
                    self.outbox.push_back(MediaEvent::CanPlay { target });
                } else {
                    clip.retry_in = Some(retry_in);
                }
            }

            if !clip.playing {
                continue;
            }

            clip.position += dt as f64;
            clip.since_update += dt;

            if clip.position >= clip.duration {
                clip.position = clip.duration;
                clip.playing = false;
                self.outbox.push_back(MediaEvent::TimeUpdate { target, position: clip.duration });
                self.outbox.push_back(MediaEvent::Ended { target });
                if self.rng.random_bool(duplicate_rate) {
                    self.outbox.push_back(MediaEvent::Ended { target });
                }
            } else if clip.since_update >= clip.next_update {
                let event = MediaEvent::TimeUpdate { target, position: clip.position };
                if self.rng.random_bool(duplicate_rate) {
                    self.outbox.push_back(event.clone());
                }
                self.outbox.push_back(event);
                clip.since_update = 0.0;
                clip.next_update = if self.options.jitter {
                    TIME_UPDATE_INTERVAL * self.rng.random_range(0.6f32..1.4f32)
                } else {
                    TIME_UPDATE_INTERVAL
                };
            }
        }
    }

    fn duration_for(&self, uri: &str) -> f64 {
        self.options.durations.get(uri).copied().unwrap_or(self.options.default_duration)
    }
}

fn key(target: ClipRef) -> (usize, usize) {
    (target.slide, target.clip)
}

/// Clamps a configured rate into `0..=1`; NaN counts as never.
fn probability(rate: f64) -> f64 {
    if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) }
}

impl MediaBackend for SimulatedMedia {
    fn load(&mut self, target: ClipRef, uri: &str) {
        if let Some(clip) = self.clips.get_mut(&key(target)) {
            clip.target = target;
            return;
        }

        let load = if self.options.never_loads.contains(uri) {
            LoadState::Stalled
        } else {
            let (low, high) = self.options.load_latency;
            let remaining = if high > low { self.rng.random_range(low..high) } else { low };
            LoadState::Loading { remaining }
        };
        let duration = self.duration_for(uri);

        trace!(?target, uri, "loading clip");
        self.clips.insert(key(target), SimClip {
            target,
            duration,
            load,
            position: 0.0,
            playing: false,
            since_update: 0.0,
            next_update: TIME_UPDATE_INTERVAL,
            retry_in: None,
        });
    }

    fn play(&mut self, target: ClipRef, uri: &str) -> Result<(), MediaError> {
        let reject_rate = probability(self.options.reject_rate);
        let Some(clip) = self.clips.get_mut(&key(target)) else {
            return Err(MediaError::NotLoaded { uri: uri.to_string() });
        };
        if clip.load != LoadState::Loaded {
            return Err(MediaError::NotLoaded { uri: uri.to_string() });
        }

        if self.rng.random_bool(reject_rate) {
            clip.retry_in = Some(REJECT_RETRY_SECS);
            return Err(MediaError::PlayRejected {
                uri: uri.to_string(),
                reason: "resource temporarily unavailable".to_string(),
            });
        }

        if clip.position >= clip.duration {
            clip.position = 0.0;
        }
        clip.target = target;
        clip.playing = true;
        clip.since_update = 0.0;
        self.outbox.push_back(MediaEvent::Playing { target });
        Ok(())
    }

    fn pause(&mut self, target: ClipRef) {
        if let Some(clip) = self.clips.get_mut(&key(target)) {
            clip.playing = false;
        }
    }

    fn seek(&mut self, target: ClipRef, position: f64) {
        if let Some(clip) = self.clips.get_mut(&key(target)) {
            clip.position = position.clamp(0.0, clip.duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(media: &mut SimulatedMedia) -> Vec<MediaEvent> {
        std::iter::from_fn(|| media.pop_event()).collect()
    }

    #[test]
    fn load_reports_metadata_then_canplay() {
        let mut media = SimulatedMedia::new(SimOptions {
            load_latency: (0.1, 0.1),
            ..SimOptions::default()
        });
        let target = ClipRef::new(0, 0);
        media.load(target, "a.mp4");
        assert!(media.play(target, "a.mp4").is_err());

        media.advance(0.05);
        assert!(drain(&mut media).is_empty());

        media.advance(0.06);
        assert_eq!(
            drain(&mut media),
            vec![
                MediaEvent::MetadataLoaded { target, duration: 6.0 },
                MediaEvent::CanPlay { target },
            ]
        );
    }

    #[test]
    fn playing_clip_reports_progress_and_end() {
        let mut media = SimulatedMedia::new(SimOptions {
            default_duration: 1.0,
            load_latency: (0.0, 0.0),
            ..SimOptions::default()
        });
        let target = ClipRef::new(1, 0);
        media.load(target, "a.mp4");
        media.advance(0.01);
        drain(&mut media);

        media.play(target, "a.mp4").unwrap();
        assert_eq!(media.pop_event(), Some(MediaEvent::Playing { target }));

        let mut events = Vec::new();
        for _ in 0..120 {
            media.advance(0.01);
            events.extend(drain(&mut media));
        }
        let updates = events.iter().filter(|e| matches!(e, MediaEvent::TimeUpdate { .. })).count();
        assert!(updates >= 3);
        assert_eq!(events.last(), Some(&MediaEvent::Ended { target }));
        assert!(!media.is_playing(target));
    }

    #[test]
    fn stalled_clip_never_becomes_ready() {
        let mut media = SimulatedMedia::new(SimOptions {
            never_loads: HashSet::from(["broken.mp4".to_string()]),
            ..SimOptions::default()
        });
        let target = ClipRef::new(0, 0);
        media.load(target, "broken.mp4");
        for _ in 0..100 {
            media.advance(0.1);
        }
        assert!(drain(&mut media).is_empty());
        assert!(matches!(media.play(target, "broken.mp4"), Err(MediaError::NotLoaded { .. })));
    }

    #[test]
    fn events_carry_the_latest_activation() {
        let mut media = SimulatedMedia::new(SimOptions {
            default_duration: 0.5,
            load_latency: (0.0, 0.0),
            ..SimOptions::default()
        });
        let first = ClipRef::new(0, 0);
        let second = first.with_activation(1);
        media.load(first, "a.mp4");
        media.advance(0.01);
        drain(&mut media);

        media.play(second, "a.mp4").unwrap();
        assert_eq!(media.pop_event(), Some(MediaEvent::Playing { target: second }));
        media.advance(1.0);
        assert_eq!(drain(&mut media).last(), Some(&MediaEvent::Ended { target: second }));
        assert!(!media.is_playing(first));
    }

    #[test]
    fn nan_rates_never_fire() {
        let mut media = SimulatedMedia::new(SimOptions {
            default_duration: 0.5,
            load_latency: (0.0, 0.0),
            duplicate_rate: f64::NAN,
            reject_rate: f64::NAN,
            ..SimOptions::default()
        });
        let target = ClipRef::new(0, 0);
        media.load(target, "a.mp4");
        media.advance(0.01);
        drain(&mut media);

        assert!(media.play(target, "a.mp4").is_ok());
        media.advance(1.0);
        let ends = drain(&mut media).iter().filter(|e| matches!(e, MediaEvent::Ended { .. })).count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn rejected_play_reports_canplay_again() {
        let mut media = SimulatedMedia::new(SimOptions {
            load_latency: (0.0, 0.0),
            reject_rate: 1.0,
            ..SimOptions::default()
        });
        let target = ClipRef::new(0, 0);
        media.load(target, "a.mp4");
        media.advance(0.01);
        drain(&mut media);

        assert!(matches!(media.play(target, "a.mp4"), Err(MediaError::PlayRejected { .. })));
        media.advance(0.25);
        assert_eq!(drain(&mut media), vec![MediaEvent::CanPlay { target }]);
    }
}
