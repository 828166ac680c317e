//! TerminalAnimator: timed tweens for the terminal board.
//!
//! The engine has already applied every change to the grid when it asks for an
//! animation, so this type only remembers where each tile *appears* to be.
//! [`BoardView`](crate::BoardView) asks for sprites every frame and the frame
//! loop calls [`TerminalAnimator::advance`], which settles the completions of
//! tweens that have run their course.
//!
//! | Effect | Duration | Easing |
//! |--------|----------|--------|
//! | move, appear | 273 ms | cubic out |
//! | pop | 273 ms | cubic in (shrink) |
//! | select, deselect | 68 ms | cubic out |
//! | hint highlight | until stopped | 400 ms blink |

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::core::BoardSnapshot;
use crate::engine::{Animator, Completion};
use crate::types::{Position, TileId, TileKind, MOVE_MS, POP_MS, SELECT_MS};

const BLINK_MS: u128 = 400;

/// Where a tile is drawn this frame, in fractional grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSprite {
    pub tile: TileId,
    pub kind: TileKind,
    pub row: f32,
    pub col: f32,
    /// 1.0 is full size; popping tiles shrink toward 0.
    pub scale: f32,
}

/// Non-tile decorations for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Selected cells with how far the select effect has run (0..=1).
    pub selections: Vec<(Position, f32)>,
    /// Hinted pair, present only while the blink is in its "on" half.
    pub highlight: Option<(Position, Position)>,
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    Slide { from: Position, to: Position },
    Drop { at: Position },
    Pop { at: Position },
}

#[derive(Debug)]
struct Tween {
    tile: TileId,
    kind: TileKind,
    motion: Motion,
    start: Instant,
    duration: Duration,
    done: Option<Completion>,
}

impl Tween {
    fn progress(&self, now: Instant) -> f32 {
        progress(self.start, self.duration, now)
    }
}

#[derive(Debug)]
struct Selection {
    at: Position,
    start: Instant,
    growing: bool,
    done: Option<Completion>,
}

#[derive(Debug, Default)]
struct State {
    tweens: Vec<Tween>,
    selections: Vec<Selection>,
    highlight: Option<(Position, Position, Instant)>,
}

pub struct TerminalAnimator {
    board_height: usize,
    state: Mutex<State>,
}

fn progress(start: Instant, duration: Duration, now: Instant) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(start).as_secs_f32();
    (elapsed / duration.as_secs_f32()).clamp(0.0, 1.0)
}

pub fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

pub fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

impl TerminalAnimator {
    /// `board_height` is how far above its slot a new tile starts falling.
    pub fn new(board_height: usize) -> Self {
        Self {
            board_height,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Settle everything that has finished by `now`.
    ///
    /// Returns true while anything is still running.
    pub fn advance(&self, now: Instant) -> bool {
        let finished: Vec<Completion> = {
            let mut state = self.state();
            let mut finished = Vec::new();

            state.tweens.retain_mut(|tween| {
                if tween.progress(now) < 1.0 {
                    return true;
                }
                finished.extend(tween.done.take());
                false
            });

            let duration = Duration::from_millis(SELECT_MS);
            state.selections.retain_mut(|sel| {
                if progress(sel.start, duration, now) < 1.0 {
                    return true;
                }
                finished.extend(sel.done.take());
                sel.growing
            });
            finished
        };
        for done in finished {
            done.complete();
        }
        self.is_animating()
    }

    pub fn is_animating(&self) -> bool {
        let state = self.state();
        !state.tweens.is_empty() || state.selections.iter().any(|s| s.done.is_some())
    }

    pub fn has_highlight(&self) -> bool {
        self.state().highlight.is_some()
    }

    /// Sprites for every visible tile: tiles on the board at their tweened
    /// position, plus tiles still popping.
    pub fn sprites_into(&self, board: &BoardSnapshot, now: Instant, out: &mut Vec<TileSprite>) {
        out.clear();
        let state = self.state();

        for tile in &board.tiles {
            if tile.kind.is_empty() {
                continue;
            }
            let tween = state.tweens.iter().find(|t| t.tile == tile.id);
            let (row, col) = match tween.map(|t| (t.motion, t.progress(now))) {
                Some((Motion::Slide { from, to }, t)) => {
                    let e = ease_out_cubic(t);
                    (
                        lerp(from.row as f32, to.row as f32, e),
                        lerp(from.col as f32, to.col as f32, e),
                    )
                }
                Some((Motion::Drop { at }, t)) => {
                    let start = at.row as f32 - self.board_height as f32;
                    (lerp(start, at.row as f32, ease_out_cubic(t)), at.col as f32)
                }
                _ => (tile.pos.row as f32, tile.pos.col as f32),
            };
            out.push(TileSprite {
                tile: tile.id,
                kind: tile.kind,
                row,
                col,
                scale: 1.0,
            });
        }

        for tween in &state.tweens {
            if let Motion::Pop { at } = tween.motion {
                out.push(TileSprite {
                    tile: tween.tile,
                    kind: tween.kind,
                    row: at.row as f32,
                    col: at.col as f32,
                    scale: 1.0 - ease_in_cubic(tween.progress(now)),
                });
            }
        }
    }

    pub fn overlay(&self, now: Instant) -> Overlay {
        let mut out = Overlay::default();
        self.overlay_into(now, &mut out);
        out
    }

    /// Like [`overlay`](Self::overlay), reusing `out`'s allocation.
    pub fn overlay_into(&self, now: Instant, out: &mut Overlay) {
        let state = self.state();
        let duration = Duration::from_millis(SELECT_MS);
        out.selections.clear();
        out.selections.extend(state.selections.iter().map(|sel| {
            let t = ease_out_cubic(progress(sel.start, duration, now));
            (sel.at, if sel.growing { t } else { 1.0 - t })
        }));
        out.highlight = state.highlight.and_then(|(a, b, start)| {
            let phase = now.saturating_duration_since(start).as_millis() / BLINK_MS;
            (phase % 2 == 0).then_some((a, b))
        });
    }

    fn push_tween(&self, tile: TileId, kind: TileKind, motion: Motion, ms: u64, done: Completion) {
        self.state().tweens.push(Tween {
            tile,
            kind,
            motion,
            start: Instant::now(),
            duration: Duration::from_millis(ms),
            done: Some(done),
        });
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Animator for TerminalAnimator {
    fn play_move(&self, tile: TileId, kind: TileKind, from: Position, to: Position, done: Completion) {
        self.push_tween(tile, kind, Motion::Slide { from, to }, MOVE_MS, done);
    }

    fn play_appear(&self, tile: TileId, kind: TileKind, at: Position, done: Completion) {
        self.push_tween(tile, kind, Motion::Drop { at }, MOVE_MS, done);
    }

    fn play_pop(&self, tile: TileId, kind: TileKind, at: Position, done: Completion) {
        self.push_tween(tile, kind, Motion::Pop { at }, POP_MS, done);
    }

    fn play_select(&self, at: Position, done: Completion) {
        self.state().selections.push(Selection {
            at,
            start: Instant::now(),
            growing: true,
            done: Some(done),
        });
    }

    fn play_deselect(&self, at: Position, done: Completion) {
        let mut state = self.state();
        state.selections.retain(|s| s.at != at);
        state.selections.push(Selection {
            at,
            start: Instant::now(),
            growing: false,
            done: Some(done),
        });
    }

    fn play_highlight_loop(&self, from: Position, to: Position) {
        self.state().highlight = Some((from, to, Instant::now()));
    }

    fn stop_highlight(&self) {
        self.state().highlight = None;
    }

    fn destroy_visual(&self, tile: TileId) {
        let removed: Vec<Completion> = {
            let mut state = self.state();
            let mut removed = Vec::new();
            state.tweens.retain_mut(|t| {
                if t.tile != tile {
                    return true;
                }
                removed.extend(t.done.take());
                false
            });
            removed
        };
        for done in removed {
            done.complete();
        }
    }
}
