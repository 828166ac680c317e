//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no game logic attached, making them usable
//! in any context (board logic, turn engine, terminal rendering, input mapping).
//!
//! # Board Dimensions
//!
//! The default board matches the classic layout of the game:
//!
//! - **Width**: 11 columns (indexed 0-10, left to right)
//! - **Height**: 8 rows (indexed 0-7, top to bottom)
//! - Row 0 is the top row; gravity pulls tiles towards the last row
//!
//! Dimensions are configuration values; any size between [`MIN_BOARD_DIM`] and
//! [`MAX_BOARD_DIM`] is accepted.
//!
//! # Tile Kinds
//!
//! | Kind | Weight | Special | Layout char | Effect |
//! |------|--------|---------|-------------|--------|
//! | `empty` | 0 | yes | `.` | pending refill, never matches |
//! | `red` .. `pink` | 10 | no | `R B G L Y P` | plain colours |
//! | `anyColor` | 3 | yes | `*` | wildcard |
//! | `cross` | 1 | yes | `+` | clears its row and column |
//! | `vertical` | 1 | yes | `\|` | clears its column |
//! | `horizontal` | 1 | yes | `-` | clears its row |
//! | `plusTime` | 2 | yes | `T` | adds time when popped |
//! | `doublePoints` | 2 | yes | `D` | doubles the pop score |
//!
//! # Animation Timing
//!
//! Durations used by animation collaborators (in milliseconds):
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MOVE_MS` | 273 | Swap, fall and appear tweens |
//! | `POP_MS` | 273 | Shrink-out of a matched tile |
//! | `SELECT_MS` | 68 | Grow/shrink on (de)selection |
//! | `TICK_MS` | 16 | Frame interval for terminal frontends |
//!
//! # Examples
//!
//! ```
//! use tui_gems_types::{Position, TileKind, DEFAULT_BOARD_WIDTH, DEFAULT_BOARD_HEIGHT};
//!
//! // Parse a tile kind from its configuration name
//! let kind = TileKind::from_name("lightblue").unwrap();
//! assert_eq!(kind, TileKind::LightBlue);
//! assert!(!kind.is_special_by_default());
//!
//! // Adjacency is Manhattan distance 1
//! let a = Position::new(2, 3);
//! assert!(a.is_adjacent(Position::new(2, 4)));
//! assert!(!a.is_adjacent(Position::new(3, 4)));
//!
//! assert_eq!(DEFAULT_BOARD_WIDTH, 11);
//! assert_eq!(DEFAULT_BOARD_HEIGHT, 8);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default board width in cells (11 columns)
pub const DEFAULT_BOARD_WIDTH: usize = 11;

/// Default board height in cells (8 rows)
pub const DEFAULT_BOARD_HEIGHT: usize = 8;

/// Smallest accepted board side (a run needs three cells)
pub const MIN_BOARD_DIM: usize = 3;

/// Largest accepted board side
pub const MAX_BOARD_DIM: usize = 32;

/// Cumulative score step that unlocks special tile spawning (one wave per step)
pub const DEFAULT_SPECIAL_THRESHOLD: u32 = 10;

/// Seconds granted per popped `plusTime` tile
pub const TIME_PER_TIMER_SECS: u32 = 5;

/// Score multiplier applied per popped `doublePoints` tile
pub const DOUBLER_BASE: u32 = 2;

/// Idle time before a hint is highlighted (milliseconds)
pub const DEFAULT_HINT_DELAY_MS: u64 = 5000;

/// Swap/fall/appear tween duration (milliseconds)
pub const MOVE_MS: u64 = 273;

/// Pop tween duration (milliseconds)
pub const POP_MS: u64 = 273;

/// Select/deselect tween duration (milliseconds)
pub const SELECT_MS: u64 = 68;

/// Frame interval for terminal frontends (16ms ≈ 60 FPS)
pub const TICK_MS: u64 = 16;

/// Library error taxonomy.
///
/// None of these are transient: every operation is deterministic given its
/// inputs and the RNG source, so failures are structural.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Unknown tile kind name, out-of-range position, or an unusable tile table.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A swap was requested between cells that are not orthogonal neighbours.
    #[error("illegal move: {from} and {to} are not adjacent")]
    IllegalMove { from: Position, to: Position },
    /// Internal bookkeeping is corrupt (e.g. a tile reference no longer matches its slot).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of tile a board cell can hold
///
/// `Empty` marks a cell pending refill. It has weight 0, counts as special,
/// and never takes part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileKind {
    Empty,
    Red,
    Blue,
    Green,
    #[serde(rename = "lightblue")]
    LightBlue,
    Yellow,
    Pink,
    /// Wildcard: joins any run
    AnyColor,
    /// Clears the whole row and column of the matched cell
    Cross,
    /// Clears the whole column of the matched cell
    Vertical,
    /// Clears the whole row of the matched cell
    Horizontal,
    /// Adds time when popped
    PlusTime,
    /// Doubles the score of the pop it takes part in
    DoublePoints,
}

impl TileKind {
    /// Every kind, in table order.
    pub const ALL: [TileKind; 13] = [
        TileKind::Empty,
        TileKind::Red,
        TileKind::Blue,
        TileKind::Green,
        TileKind::LightBlue,
        TileKind::Yellow,
        TileKind::Pink,
        TileKind::AnyColor,
        TileKind::Cross,
        TileKind::Vertical,
        TileKind::Horizontal,
        TileKind::PlusTime,
        TileKind::DoublePoints,
    ];

    /// Number of kinds (size of lookup tables indexed by [`TileKind::index`]).
    pub const COUNT: usize = 13;

    /// Stable index into [`TileKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a kind from its configuration name (case-sensitive, as written in tile tables)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_gems_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_name("red"), Some(TileKind::Red));
    /// assert_eq!(TileKind::from_name("doublePoints"), Some(TileKind::DoublePoints));
    /// assert_eq!(TileKind::from_name("purple"), None);
    /// ```
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "empty" => Some(TileKind::Empty),
            "red" => Some(TileKind::Red),
            "blue" => Some(TileKind::Blue),
            "green" => Some(TileKind::Green),
            "lightblue" => Some(TileKind::LightBlue),
            "yellow" => Some(TileKind::Yellow),
            "pink" => Some(TileKind::Pink),
            "anyColor" => Some(TileKind::AnyColor),
            "cross" => Some(TileKind::Cross),
            "vertical" => Some(TileKind::Vertical),
            "horizontal" => Some(TileKind::Horizontal),
            "plusTime" => Some(TileKind::PlusTime),
            "doublePoints" => Some(TileKind::DoublePoints),
            _ => None,
        }
    }

    /// Configuration name of the kind
    pub fn name(self) -> &'static str {
        match self {
            TileKind::Empty => "empty",
            TileKind::Red => "red",
            TileKind::Blue => "blue",
            TileKind::Green => "green",
            TileKind::LightBlue => "lightblue",
            TileKind::Yellow => "yellow",
            TileKind::Pink => "pink",
            TileKind::AnyColor => "anyColor",
            TileKind::Cross => "cross",
            TileKind::Vertical => "vertical",
            TileKind::Horizontal => "horizontal",
            TileKind::PlusTime => "plusTime",
            TileKind::DoublePoints => "doublePoints",
        }
    }

    /// Single-character form used by ASCII board layouts
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_gems_types::TileKind;
    ///
    /// for kind in TileKind::ALL {
    ///     assert_eq!(TileKind::from_char(kind.as_char()), Some(kind));
    /// }
    /// ```
    pub fn as_char(self) -> char {
        match self {
            TileKind::Empty => '.',
            TileKind::Red => 'R',
            TileKind::Blue => 'B',
            TileKind::Green => 'G',
            TileKind::LightBlue => 'L',
            TileKind::Yellow => 'Y',
            TileKind::Pink => 'P',
            TileKind::AnyColor => '*',
            TileKind::Cross => '+',
            TileKind::Vertical => '|',
            TileKind::Horizontal => '-',
            TileKind::PlusTime => 'T',
            TileKind::DoublePoints => 'D',
        }
    }

    /// Inverse of [`TileKind::as_char`]
    pub fn from_char(c: char) -> Option<Self> {
        TileKind::ALL.into_iter().find(|k| k.as_char() == c)
    }

    /// Default spawn weight (0 = never spawned directly)
    pub fn default_weight(self) -> u32 {
        match self {
            TileKind::Empty => 0,
            TileKind::Red
            | TileKind::Blue
            | TileKind::Green
            | TileKind::LightBlue
            | TileKind::Yellow
            | TileKind::Pink => 10,
            TileKind::AnyColor => 3,
            TileKind::Cross | TileKind::Vertical | TileKind::Horizontal => 1,
            TileKind::PlusTime | TileKind::DoublePoints => 2,
        }
    }

    /// Whether the kind is special in the default tile table
    pub fn is_special_by_default(self) -> bool {
        !matches!(
            self,
            TileKind::Red
                | TileKind::Blue
                | TileKind::Green
                | TileKind::LightBlue
                | TileKind::Yellow
                | TileKind::Pink
        )
    }

    pub fn is_empty(self) -> bool {
        self == TileKind::Empty
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A (row, column) slot on the board. Row 0 is the top row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two positions
    pub fn manhattan(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Adjacent means Manhattan distance exactly 1
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }

    /// Offset by a signed delta; `None` when the result would be negative.
    ///
    /// Upper bounds are the grid's concern.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Position> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Some(Position { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Identity of a placed tile, unique within one grid.
///
/// Animation collaborators key their visuals on this id; a fresh id is issued
/// every time a tile is placed (spawns and pops included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Player input after translation into grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnInput {
    /// Pointer pressed on a cell
    Tap(Position),
    /// Pointer dragged from the pressed cell into another cell
    DragTo(Position),
}

impl TurnInput {
    pub fn position(&self) -> Position {
        match self {
            TurnInput::Tap(p) | TurnInput::DragTo(p) => *p,
        }
    }
}
