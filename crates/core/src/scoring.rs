//! Scoring module - points, time bonus and special-tile waves
//!
//! One pop step scores `matched * doubler_base ^ doublers` points and grants
//! `timers * time_per_timer` seconds. Every time the running score crosses the
//! next multiple of the special threshold a new wave unlocks, which lets the
//! following refill spawn special tiles.

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_SPECIAL_THRESHOLD, DOUBLER_BASE, TIME_PER_TIMER_SECS};

/// Tunable scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Seconds granted per popped plus-time tile.
    pub time_per_timer: u32,
    /// Multiplier applied once per popped double-points tile.
    pub doubler_base: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            time_per_timer: TIME_PER_TIMER_SECS,
            doubler_base: DOUBLER_BASE,
        }
    }
}

impl ScoringRules {
    /// Points for one pop step. Saturates instead of overflowing.
    pub fn pop_score(&self, matched: u32, doublers: u32) -> u32 {
        matched.saturating_mul(self.doubler_base.saturating_pow(doublers))
    }

    /// Seconds for one pop step.
    pub fn pop_time(&self, timers: u32) -> u32 {
        timers.saturating_mul(self.time_per_timer)
    }
}

/// Counts unlocked special waves against a running score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveTracker {
    threshold: u32,
    waves: u32,
}

impl WaveTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            waves: 0,
        }
    }

    pub fn waves(&self) -> u32 {
        self.waves
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Score at which the next wave unlocks.
    pub fn next_boundary(&self) -> u32 {
        self.waves.saturating_add(1).saturating_mul(self.threshold)
    }

    /// Check the running total and unlock at most one wave.
    ///
    /// Returns true when a wave was unlocked by this call.
    pub fn advance(&mut self, total: u32) -> bool {
        if total >= self.next_boundary() {
            self.waves += 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.waves = 0;
    }
}

impl Default for WaveTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SPECIAL_THRESHOLD)
    }
}
