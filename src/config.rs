//! Slide configuration loaded from a TOML file.
//!
//! ```toml
//! [timing]
//! near_end_guard_ms = 800
//!
//! [[slides]]
//! id = 1
//! clips = ["/video/install.mp4", "/video/install2.mp4"]
//! title = "Easy Installation"
//! cta_label = "WATCH"
//! cta_target = "#install"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::slide::{Slide, SlideTrack};

/// Lead times and guard windows used by the transition controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub near_end_lead_secs: f64,
    pub short_clip_lead_secs: f64,
    pub short_clip_cutoff_secs: f64,
    pub near_end_guard_ms: u64,
    pub ended_guard_ms: u64,
    pub crossfade_secs: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            near_end_lead_secs: NEAR_END_LEAD_SECS,
            short_clip_lead_secs: SHORT_CLIP_LEAD_SECS,
            short_clip_cutoff_secs: SHORT_CLIP_CUTOFF_SECS,
            near_end_guard_ms: NEAR_END_GUARD_MS,
            ended_guard_ms: ENDED_GUARD_MS,
            crossfade_secs: CROSSFADE_SECS,
        }
    }
}

impl Timing {
    /// Remaining-time threshold that triggers a near-end signal for a clip of `duration` seconds.
    pub fn trigger_threshold(&self, duration: f64) -> f64 {
        if duration < self.short_clip_cutoff_secs {
            self.short_clip_lead_secs
        } else {
            self.near_end_lead_secs
        }
    }

    pub fn near_end_guard(&self) -> Duration {
        Duration::from_millis(self.near_end_guard_ms)
    }

    pub fn ended_guard(&self) -> Duration {
        Duration::from_millis(self.ended_guard_ms)
    }

    /// Zero when `crossfade_secs` is not a representable duration.
    pub fn crossfade(&self) -> Duration {
        Duration::try_from_secs_f64(self.crossfade_secs).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let secs = [
            ("near_end_lead_secs", self.near_end_lead_secs),
            ("short_clip_lead_secs", self.short_clip_lead_secs),
            ("short_clip_cutoff_secs", self.short_clip_cutoff_secs),
            ("crossfade_secs", self.crossfade_secs),
        ];
        for (name, value) in secs {
            if !value.is_finite() || !(0.0..=MAX_TIMING_SECS).contains(&value) {
                return Err(ConfigError::InvalidTiming {
                    reason: format!("{name} must be between 0 and {MAX_TIMING_SECS}, got {value}"),
                });
            }
        }

        let guards = [
            ("near_end_guard_ms", self.near_end_guard_ms),
            ("ended_guard_ms", self.ended_guard_ms),
        ];
        for (name, value) in guards {
            if value > MAX_GUARD_MS {
                return Err(ConfigError::InvalidTiming {
                    reason: format!("{name} must be at most {MAX_GUARD_MS}, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Copy with every value forced into range: unusable lead times and
    /// crossfades fall back to their defaults, oversized ones are capped.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let secs = |value: f64, fallback: f64| {
            if value.is_finite() && value >= 0.0 {
                value.min(MAX_TIMING_SECS)
            } else {
                fallback
            }
        };

        Self {
            near_end_lead_secs: secs(self.near_end_lead_secs, defaults.near_end_lead_secs),
            short_clip_lead_secs: secs(self.short_clip_lead_secs, defaults.short_clip_lead_secs),
            short_clip_cutoff_secs: secs(self.short_clip_cutoff_secs, defaults.short_clip_cutoff_secs),
            near_end_guard_ms: self.near_end_guard_ms.min(MAX_GUARD_MS),
            ended_guard_ms: self.ended_guard_ms.min(MAX_GUARD_MS),
            crossfade_secs: secs(self.crossfade_secs, defaults.crossfade_secs),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timing: Timing,
    pub slides: Vec<Slide>,
}

impl Config {
    /// Validates the slide list and turns it into a track.
    pub fn into_parts(self) -> Result<(SlideTrack, Timing), ConfigError> {
        self.timing.validate()?;
        let track = SlideTrack::new(self.slides)?;
        Ok((track, self.timing))
    }
}

pub fn from_str(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    from_str(&content)
}
