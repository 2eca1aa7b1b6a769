//! Fixed-timestep scheduling.
//!
//! Presentation ticks arrive at whatever rate the display runs; physics
//! always advances in steps of exactly `time_step`. Elapsed real time goes
//! into an accumulator and each tick spends it one step at a time.
//!
//! With `max_steps_per_tick == 1` (the default) at most one step runs per
//! tick and there is no catch-up: under slow rendering the simulation falls
//! behind real time rather than running several steps in one frame.

use crate::cloth::ClothState;

/// Accumulator-driven fixed-step scheduler.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    time_step: f32,
    accumulator: f32,
    max_steps_per_tick: u32,
    steps_taken: u64,
    paused: bool,
}

impl FixedTimestep {
    /// The accumulator starts with one full step banked, so the first tick
    /// always advances the simulation.
    pub fn new(time_step: f32) -> Self {
        assert!(time_step > 0.0, "time step must be positive");
        Self {
            time_step,
            accumulator: time_step,
            max_steps_per_tick: 1,
            steps_taken: 0,
            paused: false,
        }
    }

    pub fn with_max_steps_per_tick(mut self, steps: u32) -> Self {
        self.max_steps_per_tick = steps.max(1);
        self
    }

    /// Bank `elapsed` seconds of real time.
    ///
    /// When catch-up is enabled the bank is capped so a long stall cannot
    /// queue an unbounded number of steps.
    pub fn accumulate(&mut self, elapsed: f32) {
        if self.paused {
            return;
        }
        self.accumulator += elapsed.max(0.0);
        if self.max_steps_per_tick > 1 {
            let cap = self.time_step * (self.max_steps_per_tick * 8) as f32;
            self.accumulator = self.accumulator.min(cap);
        }
    }

    /// Run as many whole steps as the bank and the per-tick limit allow.
    ///
    /// Returns the number of steps taken.
    pub fn tick(&mut self, cloth: &mut ClothState) -> u32 {
        self.tick_with(|dt| cloth.step(dt))
    }

    /// Like [`tick`](Self::tick) but calls `step` instead of stepping a cloth
    /// directly. Lets the caller interleave work (e.g. holding a dragged
    /// point) before each step.
    pub fn tick_with(&mut self, mut step: impl FnMut(f32)) -> u32 {
        if self.paused {
            return 0;
        }
        let mut steps = 0;
        while steps < self.max_steps_per_tick && self.accumulator >= self.time_step {
            step(self.time_step);
            self.accumulator -= self.time_step;
            steps += 1;
        }
        self.steps_taken += steps as u64;
        steps
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Seconds banked but not yet simulated.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Total steps since creation.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Simulated time since creation.
    pub fn simulated_time(&self) -> f64 {
        self.steps_taken as f64 * self.time_step as f64
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop banking time and stepping. Resuming does not replay paused time.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}
