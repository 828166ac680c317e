//! Read-only copies of the grid for renderers, tests and logging.

use std::hash::Hasher;

use serde::Serialize;

use crate::grid::{Grid, Tile};
use crate::types::TileKind;

/// Stable 64-bit FNV-1a hasher.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions, and
/// board hashes end up in logs and test expectations.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= u64::from(b);
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Board contents at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major
    #[serde(serialize_with = "serialize_kinds")]
    pub tiles: Vec<Tile>,
}

fn serialize_kinds<S: serde::Serializer>(tiles: &[Tile], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(tiles.iter().map(|t| t.kind))
}

impl BoardSnapshot {
    pub fn kind(&self, row: usize, col: usize) -> Option<TileKind> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.tiles.get(row * self.width + col).map(|t| t.kind)
    }

    /// Hash of the board's kinds and dimensions. Tile ids are not included,
    /// so two boards showing the same tiles hash equal.
    pub fn board_hash(&self) -> u64 {
        let mut h = Fnv1aHasher::new();
        h.write_u32(self.width as u32);
        h.write_u32(self.height as u32);
        for tile in &self.tiles {
            h.write_u8(tile.kind.index() as u8);
        }
        h.finish()
    }
}

impl Grid {
    /// Fill `out` with the current board, reusing its allocation.
    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.width = self.width();
        out.height = self.height();
        out.tiles.clear();
        out.tiles.extend_from_slice(self.tiles());
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut out = BoardSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }
}
