use std::time::Duration;

use serde::Serialize;

/// A running fade from one layer to the next. Layers are clip or slide indices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Crossfade {
    pub from: usize,
    pub to: usize,
    #[serde(skip)]
    pub started_at: Duration,
    #[serde(skip)]
    pub duration: Duration,
}

impl Crossfade {
    pub fn new(from: usize, to: usize, started_at: Duration, duration: Duration) -> Self {
        Self { from, to, started_at, duration }
    }

    /// Linear progress in [0, 1]. Easing is left to the renderer.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Target opacity of each clip layer: every clip up to the current one is shown,
/// later clips stack on top as they start.
pub fn clip_layer_opacity(clip_count: usize, current: usize) -> Vec<f32> {
    (0..clip_count).map(|i| if i <= current { 1.0 } else { 0.0 }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let fade = Crossfade::new(0, 1, Duration::from_secs(2), Duration::from_millis(1200));
        assert_eq!(fade.progress(Duration::from_secs(1)), 0.0);
        assert!((fade.progress(Duration::from_millis(2600)) - 0.5).abs() < 1e-4);
        assert_eq!(fade.progress(Duration::from_secs(10)), 1.0);
        assert!(fade.is_finished(Duration::from_millis(3200)));
    }

    #[test]
    fn zero_duration_is_immediate() {
        let fade = Crossfade::new(1, 2, Duration::from_secs(1), Duration::ZERO);
        assert_eq!(fade.progress(Duration::from_secs(1)), 1.0);
    }

    #[test]
    fn clip_layers_follow_current_index() {
        assert_eq!(clip_layer_opacity(3, 0), vec![1.0, 0.0, 0.0]);
        assert_eq!(clip_layer_opacity(3, 2), vec![1.0, 1.0, 1.0]);
    }
}
