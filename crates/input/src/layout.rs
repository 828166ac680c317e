//! Screen <-> grid coordinate mapping.
//!
//! The board is drawn as a block of `cell_w` x `cell_h` terminal cells per
//! tile, with the top-left tile at (`origin_x`, `origin_y`). The renderer and
//! the pointer tracker share one layout so a click always lands on the tile
//! drawn under it.

use crate::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub origin_x: i32,
    pub origin_y: i32,
    /// Terminal columns per tile
    pub cell_w: i32,
    /// Terminal rows per tile
    pub cell_h: i32,
    /// Grid columns
    pub width: usize,
    /// Grid rows
    pub height: usize,
}

impl BoardLayout {
    pub fn new(width: usize, height: usize, cell_w: i32, cell_h: i32) -> Self {
        Self {
            origin_x: 0,
            origin_y: 0,
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            width,
            height,
        }
    }

    /// Board size on screen, in terminal cells.
    pub fn screen_size(&self) -> (i32, i32) {
        (
            self.cell_w * self.width as i32,
            self.cell_h * self.height as i32,
        )
    }

    /// Place the board in the middle of a `term_w` x `term_h` area, leaving
    /// `reserved_rows` free at the bottom for a status line.
    pub fn centered(mut self, term_w: u16, term_h: u16, reserved_rows: u16) -> Self {
        let (w, h) = self.screen_size();
        let avail_h = i32::from(term_h) - i32::from(reserved_rows);
        self.origin_x = ((i32::from(term_w) - w) / 2).max(0);
        self.origin_y = ((avail_h - h) / 2).max(0);
        self
    }

    /// Grid position under a terminal cell, `None` when off the board.
    pub fn position_from_screen(&self, x: i32, y: i32) -> Option<Position> {
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        if dx < 0 || dy < 0 {
            return None;
        }
        let col = (dx / self.cell_w) as usize;
        let row = (dy / self.cell_h) as usize;
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(Position::new(row, col))
    }

    /// Top-left terminal cell of a tile, `None` when off the board.
    pub fn screen_from_position(&self, pos: Position) -> Option<(i32, i32)> {
        if pos.row >= self.height || pos.col >= self.width {
            return None;
        }
        Some((
            self.origin_x + pos.col as i32 * self.cell_w,
            self.origin_y + pos.row as i32 * self.cell_h,
        ))
    }
}
