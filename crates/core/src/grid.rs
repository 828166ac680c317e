//! Grid module - the board of tiles
//!
//! The grid is `width` columns by `height` rows stored as a flat row-major
//! vector. Coordinates are (row, col) with row 0 at the top; gravity pulls
//! toward higher row numbers.
//!
//! Every slot always holds a [`Tile`]. A slot waiting for refill holds an
//! `Empty` tile. Each tile carries a [`TileId`] that is fresh every time
//! something is placed, so animation code can follow a tile across swaps and
//! falls. An id index keeps [`Grid::position_of`] O(1).

use std::collections::HashMap;
use std::fmt;

use crate::config::{GameConfig, TileTable};
use crate::types::{Error, Position, Result, TileId, TileKind, MAX_BOARD_DIM, MIN_BOARD_DIM};

/// One placed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    /// Slot the tile currently occupies.
    pub pos: Position,
}

/// The game board
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Flat array of tiles, row-major order (row * width + col)
    tiles: Vec<Tile>,
    /// Slot index of every live tile id
    index_of: HashMap<TileId, usize>,
    table: TileTable,
    next_id: u32,
}

impl Grid {
    /// Create an all-empty grid sized by `config`.
    pub fn new(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::empty(config.width, config.height, config.tiles))
    }

    fn empty(width: usize, height: usize, table: TileTable) -> Self {
        let mut grid = Self {
            width,
            height,
            tiles: Vec::with_capacity(width * height),
            index_of: HashMap::with_capacity(width * height),
            table,
            next_id: 0,
        };
        for row in 0..height {
            for col in 0..width {
                let id = grid.issue_id();
                grid.index_of.insert(id, grid.tiles.len());
                grid.tiles.push(Tile {
                    id,
                    kind: TileKind::Empty,
                    pos: Position::new(row, col),
                });
            }
        }
        grid
    }

    /// Build a grid from an ASCII picture, one line per row, top row first.
    ///
    /// Characters follow [`TileKind::as_char`]; whitespace inside a line is
    /// ignored and blank lines are skipped.
    ///
    /// ```
    /// use tui_gems_core::Grid;
    /// use tui_gems_core::types::{Position, TileKind};
    ///
    /// let grid = Grid::from_layout("RRB\nGYB\nPPL").unwrap();
    /// assert_eq!(grid.get(Position::new(2, 2)), Some(TileKind::LightBlue));
    /// ```
    pub fn from_layout(layout: &str) -> Result<Self> {
        Self::from_layout_with_table(layout, TileTable::default())
    }

    pub fn from_layout_with_table(layout: &str, table: TileTable) -> Result<Self> {
        let rows: Vec<Vec<TileKind>> = layout
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|chars| !chars.is_empty())
            .map(|chars| {
                chars
                    .into_iter()
                    .map(|c| {
                        TileKind::from_char(c).ok_or_else(|| {
                            Error::InvalidConfiguration(format!("unknown layout char {c:?}"))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?;

        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return Err(Error::InvalidConfiguration("ragged layout".to_string()));
        }
        for (label, value) in [("width", width), ("height", height)] {
            if !(MIN_BOARD_DIM..=MAX_BOARD_DIM).contains(&value) {
                return Err(Error::InvalidConfiguration(format!(
                    "layout {label} {value} outside {MIN_BOARD_DIM}..={MAX_BOARD_DIM}"
                )));
            }
        }
        table.validate()?;

        let mut grid = Self::empty(width, height, table);
        for (row, kinds) in rows.into_iter().enumerate() {
            for (col, kind) in kinds.into_iter().enumerate() {
                grid.put(row * width + col, kind);
            }
        }
        Ok(grid)
    }

    #[inline(always)]
    pub(crate) fn index(&self, pos: Position) -> Option<usize> {
        if pos.row >= self.height || pos.col >= self.width {
            return None;
        }
        Some(pos.row * self.width + pos.col)
    }

    fn issue_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn checked_index(&self, pos: Position) -> Result<usize> {
        self.index(pos).ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "position {pos} outside {}x{} grid",
                self.width, self.height
            ))
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_table(&self) -> &TileTable {
        &self.table
    }

    pub fn is_valid_position(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Kind at `pos`, `None` if out of bounds
    pub fn get(&self, pos: Position) -> Option<TileKind> {
        self.index(pos).map(|idx| self.tiles[idx].kind)
    }

    /// Full tile at `pos`, `None` if out of bounds
    pub fn tile(&self, pos: Position) -> Option<Tile> {
        self.index(pos).map(|idx| self.tiles[idx])
    }

    /// Kind at a position the caller has already bounds-checked.
    pub(crate) fn kind_at(&self, pos: Position) -> TileKind {
        self.get(pos).unwrap_or(TileKind::Empty)
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tiles of one row, left to right
    pub fn row(&self, row: usize) -> Option<&[Tile]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        Some(&self.tiles[start..start + self.width])
    }

    /// Put a freshly identified tile of `kind` at `pos`, replacing what was there.
    pub fn place(&mut self, pos: Position, kind: TileKind) -> Result<TileId> {
        let idx = self.checked_index(pos)?;
        Ok(self.put(idx, kind))
    }

    pub(crate) fn put(&mut self, idx: usize, kind: TileKind) -> TileId {
        let id = self.issue_id();
        let old = self.tiles[idx].id;
        self.index_of.remove(&old);
        self.index_of.insert(id, idx);
        self.tiles[idx].id = id;
        self.tiles[idx].kind = kind;
        id
    }

    /// Change a slot's kind in place, keeping its id. Used while trying out spawn candidates.
    pub(crate) fn set_kind(&mut self, pos: Position, kind: TileKind) {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx].kind = kind;
        }
    }

    /// Both positions are on the grid and orthogonal neighbours.
    pub fn adjacent(&self, a: Position, b: Position) -> bool {
        self.is_valid_position(a) && self.is_valid_position(b) && a.is_adjacent(b)
    }

    /// Current position of a tile, looked up by id.
    ///
    /// Fails when the tile is no longer on the grid (popped or replaced).
    pub fn position_of(&self, id: TileId) -> Result<Position> {
        let idx = *self
            .index_of
            .get(&id)
            .ok_or_else(|| Error::InvariantViolation(format!("tile {id} is not on the grid")))?;
        let tile = self.tiles[idx];
        if tile.id != id {
            return Err(Error::InvariantViolation(format!(
                "index for tile {id} points at {}",
                tile.pos
            )));
        }
        Ok(tile.pos)
    }

    /// Exchange two neighbouring tiles.
    ///
    /// Returns the ids now sitting at `a` and `b` (i.e. the former occupants of
    /// `b` and `a`). On error nothing changes.
    pub fn swap_adjacent(&mut self, a: Position, b: Position) -> Result<(TileId, TileId)> {
        let ia = self.checked_index(a)?;
        let ib = self.checked_index(b)?;
        if !a.is_adjacent(b) {
            return Err(Error::IllegalMove { from: a, to: b });
        }
        self.exchange(ia, ib);
        Ok((self.tiles[ia].id, self.tiles[ib].id))
    }

    /// Unchecked exchange of two slots, updating positions and the id index.
    pub(crate) fn exchange(&mut self, ia: usize, ib: usize) {
        if ia == ib {
            return;
        }
        let pos_a = self.tiles[ia].pos;
        let pos_b = self.tiles[ib].pos;
        self.tiles.swap(ia, ib);
        self.tiles[ia].pos = pos_a;
        self.tiles[ib].pos = pos_b;
        self.index_of.insert(self.tiles[ia].id, ia);
        self.index_of.insert(self.tiles[ib].id, ib);
    }

    pub(crate) fn exchange_positions(&mut self, a: Position, b: Position) {
        if let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) {
            self.exchange(ia, ib);
        }
    }

    pub fn column_has_empty(&self, col: usize) -> bool {
        col < self.width
            && (0..self.height).any(|row| self.tiles[row * self.width + col].kind.is_empty())
    }

    /// No slot is waiting for refill
    pub fn is_full(&self) -> bool {
        self.tiles.iter().all(|t| !t.kind.is_empty())
    }

    pub fn empty_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.kind.is_empty()).count()
    }

    /// Kinds in row-major order
    pub fn kinds(&self) -> impl Iterator<Item = TileKind> + '_ {
        self.tiles.iter().map(|t| t.kind)
    }

    /// Left-right reflection, with fresh ids.
    pub fn mirrored(&self) -> Grid {
        let mut out = Self::empty(self.width, self.height, self.table);
        for tile in &self.tiles {
            let col = self.width - 1 - tile.pos.col;
            out.put(tile.pos.row * self.width + col, tile.kind);
        }
        out
    }

    /// Empty every slot, issuing new ids.
    pub fn clear(&mut self) {
        for idx in 0..self.tiles.len() {
            self.put(idx, TileKind::Empty);
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for tile in &self.tiles[row * self.width..(row + 1) * self.width] {
                write!(f, "{}", tile.kind.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(&GameConfig::default()).unwrap();
        assert_eq!(grid.width(), 11);
        assert_eq!(grid.height(), 8);
        assert_eq!(grid.empty_count(), 88);
        assert!(!grid.is_full());
    }

    #[test]
    fn test_out_of_bounds() {
        let grid = Grid::from_layout("RGB\nGBR\nBRG").unwrap();
        assert_eq!(grid.get(Position::new(3, 0)), None);
        assert_eq!(grid.get(Position::new(0, 3)), None);
        assert!(!grid.is_valid_position(Position::new(3, 3)));
    }

    #[test]
    fn test_layout_round_trips_through_display() {
        let layout = "RGB*\nGBRT\nBRGD\n";
        let grid = Grid::from_layout(layout).unwrap();
        assert_eq!(grid.to_string(), layout);
    }

    #[test]
    fn test_layout_errors() {
        assert!(Grid::from_layout("RG\nGB").is_err());
        assert!(Grid::from_layout("RGB\nGB\nRGB").is_err());
        assert!(Grid::from_layout("RGB\nGBX\nRGB").is_err());
    }

    #[test]
    fn test_place_issues_new_id() {
        let mut grid = Grid::from_layout("RGB\nGBR\nBRG").unwrap();
        let pos = Position::new(1, 1);
        let before = grid.tile(pos).unwrap().id;
        let id = grid.place(pos, TileKind::Yellow).unwrap();
        assert_ne!(before, id);
        assert_eq!(grid.get(pos), Some(TileKind::Yellow));
        assert_eq!(grid.position_of(id).unwrap(), pos);
        assert!(matches!(
            grid.position_of(before),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_swap_adjacent_updates_positions() {
        let mut grid = Grid::from_layout("RGB\nGBR\nBRG").unwrap();
        let a = Position::new(0, 0);
        let b = Position::new(0, 1);
        let red = grid.tile(a).unwrap().id;
        let green = grid.tile(b).unwrap().id;

        let (at_a, at_b) = grid.swap_adjacent(a, b).unwrap();
        assert_eq!((at_a, at_b), (green, red));
        assert_eq!(grid.get(a), Some(TileKind::Green));
        assert_eq!(grid.position_of(red).unwrap(), b);
        assert_eq!(grid.tile(b).unwrap().pos, b);
    }

    #[test]
    fn test_swap_rejects_non_adjacent_without_mutation() {
        let mut grid = Grid::from_layout("RGB\nGBR\nBRG").unwrap();
        let before = grid.clone();
        let err = grid
            .swap_adjacent(Position::new(0, 0), Position::new(1, 1))
            .unwrap_err();
        assert_eq!(
            err,
            Error::IllegalMove {
                from: Position::new(0, 0),
                to: Position::new(1, 1)
            }
        );
        assert_eq!(grid, before);

        assert!(matches!(
            grid.swap_adjacent(Position::new(0, 2), Position::new(0, 3)),
            Err(Error::InvalidConfiguration(_))
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_column_has_empty() {
        let grid = Grid::from_layout("R.B\nGBR\nBRG").unwrap();
        assert!(grid.column_has_empty(1));
        assert!(!grid.column_has_empty(0));
        assert!(!grid.column_has_empty(7));
    }

    #[test]
    fn test_mirrored() {
        let grid = Grid::from_layout("RGB\nGBY\nBRP").unwrap();
        assert_eq!(grid.mirrored().to_string(), "BGR\nYBG\nPRB\n");
    }

    #[test]
    fn test_clear() {
        let mut grid = Grid::from_layout("RGB\nGBY\nBRP").unwrap();
        grid.clear();
        assert_eq!(grid.empty_count(), 9);
    }
}
