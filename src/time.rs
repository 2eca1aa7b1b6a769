//! Frame timing for the presentation loop.
//!
//! Measures wall-clock time between redraws. The fixed-step scheduler banks
//! [`Time::delta`]; the window title shows [`Time::fps`] and
//! [`Time::frame_ms`].

use std::time::{Duration, Instant};

/// Longest frame delta handed to the scheduler. A stall longer than this
/// (window drag, debugger pause) is treated as this long.
const MAX_DELTA: f32 = 0.25;

/// Frame clock with a periodically refreshed FPS estimate.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    /// Time since last frame in seconds, clamped to `MAX_DELTA`.
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    /// Mean frame time over the last FPS window, in milliseconds.
    frame_ms: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            frame_ms: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Mark a new frame. Returns the delta in seconds.
    pub fn update(&mut self) -> f32 {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = raw.min(MAX_DELTA);
        self.last_frame = now;
        self.frame_count += 1;

        let window = now.saturating_duration_since(self.fps_update_time);
        if window >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            let secs = window.as_secs_f32();
            self.fps = frames as f32 / secs;
            self.frame_ms = secs * 1000.0 / frames.max(1) as f32;
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn frame_ms(&self) -> f32 {
        self.frame_ms
    }

    /// Wall-clock seconds since creation.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
