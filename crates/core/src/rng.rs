//! RNG module - weighted tile selection
//!
//! Spawning a tile means drawing a kind from the tile table with probability
//! proportional to its weight. The draw goes through [`WeightedPicker`] so the
//! cascade logic can be driven by a seeded generator in tests and benches and
//! by anything else (scripted pickers, for instance) where that is useful.
//!
//! [`SimpleRng`] is a small LCG, good enough for gameplay and fully
//! deterministic for a given seed.

use crate::types::TileKind;

/// Source of weighted tile draws.
pub trait WeightedPicker {
    /// Pick one kind from `candidates`, each paired with its positive weight.
    ///
    /// Returns `None` only when there is nothing to pick from.
    fn pick(&mut self, candidates: &[(TileKind, u32)]) -> Option<TileKind>;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // A zero seed is remapped so it still yields a usable stream
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits of the state; the low bits of a power-of-two LCG
    /// cycle with a short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }

    /// Current internal state, usable as a seed to resume the same stream.
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl WeightedPicker for SimpleRng {
    fn pick(&mut self, candidates: &[(TileKind, u32)]) -> Option<TileKind> {
        let total: u64 = candidates.iter().map(|&(_, w)| u64::from(w)).sum();
        if total == 0 {
            return None;
        }
        let total = u32::try_from(total).unwrap_or(u32::MAX);
        let mut roll = self.next_range(total);
        for &(kind, weight) in candidates {
            if roll < weight {
                return Some(kind);
            }
            roll -= weight;
        }
        candidates.last().map(|&(kind, _)| kind)
    }
}
