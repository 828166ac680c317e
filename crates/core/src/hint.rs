//! Move hints
//!
//! A hint is one adjacent swap that creates a match. The search looks at every
//! three-cell window where two cells already agree and the third does not; if
//! a neighbour of the odd cell (outside the window) would complete the run,
//! swapping the neighbour into the odd slot is a hint.
//!
//! Windows are visited horizontally first (rows bottom to top, columns right
//! to left) and then vertically (columns right to left, rows bottom to top).
//! [`find_hint`] returns the last hint found in that order.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::matcher::{horizontal_windows, triple_matches, vertical_windows, window_kinds};
use crate::types::Position;

/// Swap `from` into `to` to make a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hint {
    pub from: Position,
    pub to: Position,
}

const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Every hint on the grid, in search order. May contain duplicates.
pub fn all_hints(grid: &Grid) -> Vec<Hint> {
    let mut hints = Vec::new();
    let windows = horizontal_windows(grid.width(), grid.height())
        .rev()
        .chain(vertical_windows(grid.width(), grid.height()).rev());
    for window in windows {
        collect_window(grid, window, &mut hints);
    }
    hints
}

/// One legal swap that creates a match, or `None` when the player is stuck.
pub fn find_hint(grid: &Grid) -> Option<Hint> {
    all_hints(grid).last().copied()
}

fn collect_window(grid: &Grid, window: [Position; 3], out: &mut Vec<Hint>) {
    let table = grid.tile_table();
    let kinds = window_kinds(grid, window);
    if triple_matches(table, kinds) {
        return;
    }

    for (gap, &gap_pos) in window.iter().enumerate() {
        let others: ArrayVec<_, 2> = (0..3).filter(|&i| i != gap).map(|i| kinds[i]).collect();
        if others.iter().any(|k| k.is_empty()) {
            continue;
        }

        for (d_row, d_col) in NEIGHBOURS {
            let Some(neighbour) = gap_pos.offset(d_row, d_col) else {
                continue;
            };
            if window.contains(&neighbour) {
                continue;
            }
            let Some(incoming) = grid.get(neighbour) else {
                continue;
            };
            let mut candidate = kinds;
            candidate[gap] = incoming;
            if triple_matches(table, candidate) {
                out.push(Hint {
                    from: neighbour,
                    to: gap_pos,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::is_match;

    fn apply(grid: &Grid, hint: Hint) -> Grid {
        let mut out = grid.clone();
        out.swap_adjacent(hint.from, hint.to).unwrap();
        out
    }

    #[test]
    fn test_split_run() {
        let grid = Grid::from_layout("RRYR\nGBGB\nYPYP").unwrap();
        let hint = find_hint(&grid).unwrap();
        assert!(is_match(&apply(&grid, hint)));
        assert!(all_hints(&grid).contains(&Hint {
            from: Position::new(0, 3),
            to: Position::new(0, 2),
        }));
    }

    #[test]
    fn test_no_hint() {
        let grid = Grid::from_layout("RBGY\nGYRB\nRBGY\nGYRB").unwrap();
        assert_eq!(find_hint(&grid), None);
        assert!(all_hints(&grid).is_empty());
    }

    #[test]
    fn test_every_hint_creates_a_match() {
        let grid = Grid::from_layout("RGBYP\nGRBPY\nBBRYG\nYPGRB").unwrap();
        let hints = all_hints(&grid);
        assert!(!hints.is_empty());
        for hint in hints {
            assert!(hint.from.is_adjacent(hint.to));
            assert!(is_match(&apply(&grid, hint)), "{hint:?} makes no match");
        }
    }

    #[test]
    fn test_vertical_scan_runs_after_horizontal() {
        // Horizontal: P P _ on the bottom row, filled from above.
        // Vertical: L L _ in the last column, filled from the left.
        let grid = Grid::from_layout(
            "RBGYL\n\
             GYRBL\n\
             RBGLR\n\
             GYPBG\n\
             PPGYR",
        )
        .unwrap();
        let horizontal = Hint {
            from: Position::new(3, 2),
            to: Position::new(4, 2),
        };
        let vertical = Hint {
            from: Position::new(2, 3),
            to: Position::new(2, 4),
        };
        assert_eq!(all_hints(&grid), vec![horizontal, vertical]);
        assert_eq!(find_hint(&grid), Some(vertical));
    }

    #[test]
    fn test_upper_row_wins_among_horizontal_hints() {
        let grid = Grid::from_layout(
            "PPGYR\n\
             GYPBG\n\
             RBGYR\n\
             GYLBG\n\
             RBGLL",
        )
        .unwrap();
        let bottom = Hint {
            from: Position::new(3, 2),
            to: Position::new(4, 2),
        };
        let top = Hint {
            from: Position::new(1, 2),
            to: Position::new(0, 2),
        };
        assert_eq!(all_hints(&grid), vec![bottom, top]);
        assert_eq!(find_hint(&grid), Some(top));
    }
}
