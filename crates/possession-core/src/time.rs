//! Simulation time for the tick-driven scheduler
//!
//! Every routine that needs to "wait N seconds" stores a [`Deadline`] against
//! [`GameTime::total_time`] and checks it on later ticks.

use serde::{Deserialize, Serialize};

/// Configuration for simulation time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Maximum delta time to prevent huge jumps after a stall
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

/// Simulation time tracking
#[derive(Debug, Clone, Default)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Simulated seconds since the session started
    pub total_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Unscaled delta time
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Whether the simulation is paused
    pub paused: bool,
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Update the game time with the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.unscaled_delta_time = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        self.delta_time = self.unscaled_delta_time * self.config.time_scale;
        self.total_time += self.delta_time as f64;
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// A deadline `seconds` after the current time
    pub fn deadline_in(&self, seconds: f32) -> Deadline {
        Deadline::after(self.total_time, seconds)
    }
}

/// A point in simulated time at which a waiting routine resumes
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Deadline {
    at: f64,
}

impl Deadline {
    /// Deadline `seconds` after `now`
    pub fn after(now: f64, seconds: f32) -> Self {
        Self {
            at: now + seconds.max(0.0) as f64,
        }
    }

    /// Simulated time at which the deadline falls due
    pub fn at(&self) -> f64 {
        self.at
    }

    /// Whether the deadline has been reached
    pub fn is_due(&self, now: f64) -> bool {
        now >= self.at
    }

    /// Seconds left until the deadline (zero once due)
    pub fn remaining(&self, now: f64) -> f64 {
        (self.at - now).max(0.0)
    }
}
