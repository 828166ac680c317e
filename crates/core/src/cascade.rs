//! Cascade steps: popping matches and refilling the grid
//!
//! Both steps mutate the grid synchronously and return what happened, so the
//! caller can animate the result afterwards. One turn alternates
//! [`pop_matches`] and [`fill`] until the grid holds no match.

use tracing::debug;

use crate::grid::Grid;
use crate::matcher::{compute_match_mask, is_match};
use crate::rng::WeightedPicker;
use crate::scoring::ScoringRules;
use crate::types::{Error, Position, Result, TileId, TileKind};

/// How many weighted draws a spawn gets before falling back to table order.
pub const MAX_SPAWN_ATTEMPTS: usize = 64;

/// A tile removed by a pop step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoppedTile {
    pub id: TileId,
    pub kind: TileKind,
    pub pos: Position,
}

/// Result of one pop step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopOutcome {
    pub score: u32,
    /// Seconds granted by popped plus-time tiles.
    pub time: u32,
    pub matched: u32,
    pub doublers: u32,
    pub timers: u32,
    pub popped: Vec<PoppedTile>,
}

impl PopOutcome {
    pub fn is_empty(&self) -> bool {
        self.matched == 0
    }
}

/// One visual consequence of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillEffect {
    /// An existing tile dropped down its column.
    Fall {
        tile: TileId,
        kind: TileKind,
        from: Position,
        to: Position,
    },
    /// A new tile appeared in a slot no tile could fall into.
    Spawn {
        tile: TileId,
        kind: TileKind,
        at: Position,
    },
}

/// Replace every matched cell with an empty tile and score the step.
pub fn pop_matches(grid: &mut Grid, rules: &ScoringRules) -> PopOutcome {
    let mask = compute_match_mask(grid);
    let mut outcome = PopOutcome::default();

    for pos in mask.positions() {
        let Some(idx) = grid.index(pos) else {
            continue;
        };
        let tile = grid.tiles()[idx];
        outcome.matched += 1;
        match tile.kind {
            TileKind::DoublePoints => outcome.doublers += 1,
            TileKind::PlusTime => outcome.timers += 1,
            _ => {}
        }
        outcome.popped.push(PoppedTile {
            id: tile.id,
            kind: tile.kind,
            pos,
        });
        grid.put(idx, TileKind::Empty);
    }

    outcome.score = rules.pop_score(outcome.matched, outcome.doublers);
    outcome.time = rules.pop_time(outcome.timers);
    if !outcome.is_empty() {
        debug!(
            matched = outcome.matched,
            doublers = outcome.doublers,
            timers = outcome.timers,
            score = outcome.score,
            "popped matches"
        );
    }
    outcome
}

/// Let tiles fall into empty slots and spawn new tiles where nothing can fall.
///
/// Columns are processed left to right, each from the bottom up. An empty
/// slot takes the nearest non-empty tile above it; if there is none a tile is
/// drawn from the table (specials only when `allow_special`). Unless
/// `can_match_immediately`, a drawn kind that would leave a match on the
/// grid is redrawn.
pub fn fill<P>(
    grid: &mut Grid,
    picker: &mut P,
    can_match_immediately: bool,
    allow_special: bool,
) -> Result<Vec<FillEffect>>
where
    P: WeightedPicker + ?Sized,
{
    let candidates = grid.tile_table().candidates(allow_special);
    if candidates.is_empty() {
        return Err(Error::InvalidConfiguration(
            "no tile kind can spawn".to_string(),
        ));
    }

    let mut effects = Vec::with_capacity(grid.empty_count());
    for col in 0..grid.width() {
        for row in (0..grid.height()).rev() {
            let here = Position::new(row, col);
            if !grid.kind_at(here).is_empty() {
                continue;
            }

            let above = (0..row)
                .rev()
                .map(|r| Position::new(r, col))
                .find(|&p| !grid.kind_at(p).is_empty());

            match above.and_then(|from| grid.tile(from)) {
                Some(tile) => {
                    grid.exchange_positions(tile.pos, here);
                    effects.push(FillEffect::Fall {
                        tile: tile.id,
                        kind: tile.kind,
                        from: tile.pos,
                        to: here,
                    });
                }
                None => {
                    let (tile, kind) =
                        spawn(grid, picker, here, &candidates, can_match_immediately)?;
                    effects.push(FillEffect::Spawn { tile, kind, at: here });
                }
            }
        }
    }
    Ok(effects)
}

fn spawn<P>(
    grid: &mut Grid,
    picker: &mut P,
    at: Position,
    candidates: &[(TileKind, u32)],
    can_match_immediately: bool,
) -> Result<(TileId, TileKind)>
where
    P: WeightedPicker + ?Sized,
{
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let kind = picker.pick(candidates).ok_or_else(|| {
            Error::InvalidConfiguration("weighted pick found no candidate".to_string())
        })?;
        grid.set_kind(at, kind);
        if can_match_immediately || !is_match(grid) {
            return Ok((grid.place(at, kind)?, kind));
        }
    }

    // The weighted draws kept producing matches; try each kind once.
    for &(kind, _) in candidates {
        grid.set_kind(at, kind);
        if !is_match(grid) {
            debug!(%at, %kind, "spawn fell back to table order");
            return Ok((grid.place(at, kind)?, kind));
        }
    }

    grid.set_kind(at, TileKind::Empty);
    Err(Error::InvalidConfiguration(format!(
        "no tile kind can fill {at} without creating a match"
    )))
}

/// Fill an empty grid without creating any match.
pub fn fill_board<P>(grid: &mut Grid, picker: &mut P) -> Result<Vec<FillEffect>>
where
    P: WeightedPicker + ?Sized,
{
    fill(grid, picker, false, false)
}
