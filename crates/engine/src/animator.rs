//! Visual collaborator interface
//!
//! The engine mutates the grid first and then asks an [`Animator`] to show
//! what happened. Awaited operations receive a [`Completion`] which the
//! animator settles when the visual finishes; the engine suspends the turn
//! until then. Highlight and destroy calls are fire-and-forget.

use std::sync::Arc;

use tracing::trace;

use crate::coordinator::Completion;
use crate::types::{Position, TileId, TileKind};

pub trait Animator: Send + Sync + 'static {
    /// A tile slides from one cell to another (swaps and gravity).
    fn play_move(&self, tile: TileId, kind: TileKind, from: Position, to: Position, done: Completion);

    /// A freshly spawned tile enters at `at`.
    fn play_appear(&self, tile: TileId, kind: TileKind, at: Position, done: Completion);

    /// A matched tile pops. The effect may depend on the kind.
    fn play_pop(&self, tile: TileId, kind: TileKind, at: Position, done: Completion);

    fn play_select(&self, at: Position, done: Completion);

    fn play_deselect(&self, at: Position, done: Completion);

    /// Keep drawing attention to a hinted pair until [`stop_highlight`](Animator::stop_highlight).
    fn play_highlight_loop(&self, from: Position, to: Position);

    fn stop_highlight(&self);

    /// Drop whatever visual state is kept for a tile that left the board.
    fn destroy_visual(&self, tile: TileId);
}

impl<A: Animator + ?Sized> Animator for Arc<A> {
    fn play_move(&self, tile: TileId, kind: TileKind, from: Position, to: Position, done: Completion) {
        (**self).play_move(tile, kind, from, to, done)
    }

    fn play_appear(&self, tile: TileId, kind: TileKind, at: Position, done: Completion) {
        (**self).play_appear(tile, kind, at, done)
    }

    fn play_pop(&self, tile: TileId, kind: TileKind, at: Position, done: Completion) {
        (**self).play_pop(tile, kind, at, done)
    }

    fn play_select(&self, at: Position, done: Completion) {
        (**self).play_select(at, done)
    }

    fn play_deselect(&self, at: Position, done: Completion) {
        (**self).play_deselect(at, done)
    }

    fn play_highlight_loop(&self, from: Position, to: Position) {
        (**self).play_highlight_loop(from, to)
    }

    fn stop_highlight(&self) {
        (**self).stop_highlight()
    }

    fn destroy_visual(&self, tile: TileId) {
        (**self).destroy_visual(tile)
    }
}

/// Completes every animation on the spot. Used headless and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantAnimator;

impl Animator for InstantAnimator {
    fn play_move(&self, tile: TileId, _kind: TileKind, from: Position, to: Position, done: Completion) {
        trace!(%tile, %from, %to, "move");
        done.complete();
    }

    fn play_appear(&self, tile: TileId, kind: TileKind, at: Position, done: Completion) {
        trace!(%tile, %kind, %at, "appear");
        done.complete();
    }

    fn play_pop(&self, tile: TileId, kind: TileKind, at: Position, done: Completion) {
        trace!(%tile, %kind, %at, "pop");
        done.complete();
    }

    fn play_select(&self, _at: Position, done: Completion) {
        done.complete();
    }

    fn play_deselect(&self, _at: Position, done: Completion) {
        done.complete();
    }

    fn play_highlight_loop(&self, _from: Position, _to: Position) {}

    fn stop_highlight(&self) {}

    fn destroy_visual(&self, _tile: TileId) {}
}
