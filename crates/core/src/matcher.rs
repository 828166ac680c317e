//! Match detection
//!
//! A match is any horizontal or vertical window of three consecutive cells
//! whose kinds are compatible:
//!
//! - no cell in the window is `Empty`, and
//! - all non-special kinds in the window are the same kind (a window of
//!   only specials matches).
//!
//! Area-clearing specials extend the mark beyond their window as soon as the
//! window is found: `Cross` marks its whole row and column, `Vertical` its
//! column and `Horizontal` its row. The extension is not recursive, so a
//! special reached only through another special's sweep clears nothing extra.

use std::fmt;

use crate::config::TileTable;
use crate::grid::Grid;
use crate::types::{Position, TileKind};

/// Which cells are part of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchMask {
    width: usize,
    height: usize,
    marks: Vec<bool>,
}

impl MatchMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            marks: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width && self.marks[pos.row * self.width + pos.col]
    }

    fn mark(&mut self, pos: Position) {
        if pos.row < self.height && pos.col < self.width {
            self.marks[pos.row * self.width + pos.col] = true;
        }
    }

    fn mark_row(&mut self, row: usize) {
        for col in 0..self.width {
            self.mark(Position::new(row, col));
        }
    }

    fn mark_col(&mut self, col: usize) {
        for row in 0..self.height {
            self.mark(Position::new(row, col));
        }
    }

    pub fn any(&self) -> bool {
        self.marks.iter().any(|&m| m)
    }

    pub fn count(&self) -> usize {
        self.marks.iter().filter(|&&m| m).count()
    }

    /// Marked positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width;
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(move |(i, _)| Position::new(i / width, i % width))
    }

    /// Left-right reflection
    pub fn mirrored(&self) -> MatchMask {
        let mut out = MatchMask::new(self.width, self.height);
        for pos in self.positions() {
            out.mark(Position::new(pos.row, self.width - 1 - pos.col));
        }
        out
    }
}

impl fmt::Display for MatchMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                let c = if self.get(Position::new(row, col)) { 'x' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Whether three kinds form a run under `table`'s special flags.
pub fn triple_matches(table: &TileTable, kinds: [TileKind; 3]) -> bool {
    if kinds.iter().any(|k| k.is_empty()) {
        return false;
    }
    let mut plain = kinds.iter().copied().filter(|&k| !table.is_special(k));
    match plain.next() {
        None => true,
        Some(first) => plain.all(|k| k == first),
    }
}

/// Horizontal windows, row by row top to bottom, left to right.
pub(crate) fn horizontal_windows(
    width: usize,
    height: usize,
) -> impl DoubleEndedIterator<Item = [Position; 3]> {
    (0..height).flat_map(move |row| {
        (0..width.saturating_sub(2)).map(move |col| {
            [
                Position::new(row, col),
                Position::new(row, col + 1),
                Position::new(row, col + 2),
            ]
        })
    })
}

/// Vertical windows, column by column left to right, top to bottom.
pub(crate) fn vertical_windows(
    width: usize,
    height: usize,
) -> impl DoubleEndedIterator<Item = [Position; 3]> {
    (0..width).flat_map(move |col| {
        (0..height.saturating_sub(2)).map(move |row| {
            [
                Position::new(row, col),
                Position::new(row + 1, col),
                Position::new(row + 2, col),
            ]
        })
    })
}

pub(crate) fn window_kinds(grid: &Grid, window: [Position; 3]) -> [TileKind; 3] {
    window.map(|pos| grid.kind_at(pos))
}

fn all_windows(grid: &Grid) -> impl Iterator<Item = [Position; 3]> {
    horizontal_windows(grid.width(), grid.height())
        .chain(vertical_windows(grid.width(), grid.height()))
}

/// Mark every cell that pops in the current state.
pub fn compute_match_mask(grid: &Grid) -> MatchMask {
    let table = grid.tile_table();
    let mut mask = MatchMask::new(grid.width(), grid.height());

    for window in all_windows(grid) {
        let kinds = window_kinds(grid, window);
        if !triple_matches(table, kinds) {
            continue;
        }
        for (pos, kind) in window.into_iter().zip(kinds) {
            mask.mark(pos);
            match kind {
                TileKind::Cross => {
                    mask.mark_row(pos.row);
                    mask.mark_col(pos.col);
                }
                TileKind::Vertical => mask.mark_col(pos.col),
                TileKind::Horizontal => mask.mark_row(pos.row),
                _ => {}
            }
        }
    }
    mask
}

/// True when at least one window matches. Stops at the first.
pub fn is_match(grid: &Grid) -> bool {
    let table = grid.tile_table();
    all_windows(grid).any(|window| triple_matches(table, window_kinds(grid, window)))
}
