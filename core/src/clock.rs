//! Simulation clock — owns tick count, speed control, and pause.

use crate::types::Tick;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub current_tick: Tick,
    pub speed:        SimSpeed,
    pub paused:       bool,
    tick_interval_ms: u64,
}

impl SimClock {
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            current_tick: 0,
            speed: SimSpeed::Normal,
            paused: false,
            tick_interval_ms,
        }
    }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }

    /// Ticks resolved per scheduler step.
    pub fn ticks_per_step(&self) -> u32 {
        match self.speed {
            SimSpeed::Normal      => 1,
            SimSpeed::Fast        => 3,
            SimSpeed::FastForward => 10,
        }
    }

    /// Wall-clock spacing between scheduler steps.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Normal,       // 1 tick/step
    Fast,         // 3 ticks/step
    FastForward,  // 10 ticks/step
}
