pub const NEAR_END_LEAD_SECS: f64 = 1.2;       // Lead time before a clip ends that triggers the next cut (seconds)
pub const SHORT_CLIP_LEAD_SECS: f64 = 0.3;     // Lead time used for short clips (seconds)
pub const SHORT_CLIP_CUTOFF_SECS: f64 = 4.0;   // Clips shorter than this use the short lead time (seconds)

pub const NEAR_END_GUARD_MS: u64 = 800;        // Guard window after a near-end clip advance (milliseconds)
pub const ENDED_GUARD_MS: u64 = 500;           // Guard window after an ended clip advance (milliseconds)

pub const CROSSFADE_SECS: f64 = 1.2;           // Duration of clip and slide crossfades (seconds)

pub const MAX_TIMING_SECS: f64 = 3600.0;       // Upper bound for any configured lead time or crossfade (seconds)
pub const MAX_GUARD_MS: u64 = 60_000;          // Upper bound for guard windows (milliseconds)

pub const PRELOAD_AHEAD: usize = 1;            // Clips buffered ahead of the current one

pub const FPS: u32 = 60;                       // Frames per second for simulation and preview
pub const FRAME_TIME: f32 = 1.0 / FPS as f32;  // Time per frame (seconds)
pub const TIME_UPDATE_INTERVAL: f32 = 0.25;    // Cadence of progress events from the media subsystem (seconds)

pub const PREVIEW_WIDTH: i32 = 1280;           // Width of the preview window
pub const PREVIEW_HEIGHT: i32 = 720;           // Height of the preview window
