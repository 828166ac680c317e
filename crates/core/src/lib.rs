//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds the grid and every rule that acts on it. It has **no
//! dependencies** on async runtimes, terminals or I/O, which makes it:
//!
//! - **Deterministic**: the same seed and inputs give the same board
//! - **Testable**: boards can be written as ASCII pictures
//! - **Portable**: the engine, the terminal app and headless tools share it
//!
//! # Module Structure
//!
//! - [`grid`]: the board of tiles with stable tile ids
//! - [`matcher`]: run detection and area-clearing specials
//! - [`cascade`]: pop and refill steps, reporting what moved
//! - [`hint`]: search for a swap that makes a match
//! - [`rng`]: weighted tile draws from a seeded LCG
//! - [`scoring`]: points, time bonus and special waves
//! - [`config`]: board size, tile table and tuning
//! - [`snapshot`]: read-only copies with a stable hash
//!
//! # Rules
//!
//! | Rule | Behaviour |
//! |------|-----------|
//! | Run | three consecutive cells in a row or column, same plain kind |
//! | Wildcards | special kinds match anything except `Empty` |
//! | Area clear | `Cross` clears its row and column, `Vertical`/`Horizontal` one line |
//! | Score | `matched * 2 ^ doublers` per pop step |
//! | Time | 5 s per popped plus-time tile |
//! | Waves | a wave unlocks each time the score reaches the next multiple of the threshold; the following refill may spawn specials |
//!
//! # Example
//!
//! ```
//! use tui_gems_core::{fill, is_match, pop_matches, Grid, ScoringRules, SimpleRng};
//! use tui_gems_core::types::Position;
//!
//! let mut grid = Grid::from_layout(
//!     "RBGY\n\
//!      GYRB\n\
//!      RRGR",
//! )
//! .unwrap();
//!
//! // Move the lone red into the gap.
//! grid.swap_adjacent(Position::new(2, 3), Position::new(2, 2)).unwrap();
//! assert!(is_match(&grid));
//!
//! let outcome = pop_matches(&mut grid, &ScoringRules::default());
//! assert_eq!(outcome.score, 3);
//!
//! let mut rng = SimpleRng::new(7);
//! fill(&mut grid, &mut rng, true, false).unwrap();
//! assert!(grid.is_full());
//! ```

pub mod cascade;
pub mod config;
pub mod grid;
pub mod hint;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tui_gems_types as types;

// Re-export commonly used types for convenience
pub use cascade::{fill, fill_board, pop_matches, FillEffect, PopOutcome, PoppedTile};
pub use config::{GameConfig, TileSpec, TileSpecEntry, TileTable};
pub use grid::{Grid, Tile};
pub use hint::{all_hints, find_hint, Hint};
pub use matcher::{compute_match_mask, is_match, triple_matches, MatchMask};
pub use rng::{SimpleRng, WeightedPicker};
pub use scoring::{ScoringRules, WaveTracker};
pub use snapshot::{BoardSnapshot, Fnv1aHasher};
