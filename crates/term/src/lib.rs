//! Terminal collaborator for the gems engine.
//!
//! A small, game-oriented rendering layer: the board is drawn into a
//! [`FrameBuffer`], diffed, and flushed by [`TerminalRenderer`]. Animation
//! state lives in [`TerminalAnimator`], which implements the engine's
//! [`Animator`](crate::engine::Animator) trait and is advanced by the
//! binary's frame tick.
//!
//! - `core`, `engine` and `input` stay free of terminal I/O
//! - [`BoardView`] and the pointer tracker share one `BoardLayout`

pub mod animator;
pub mod board_view;
pub mod fb;
pub mod renderer;

pub use tui_gems_core as core;
pub use tui_gems_engine as engine;
pub use tui_gems_input as input;
pub use tui_gems_types as types;

pub use animator::{Overlay, TerminalAnimator, TileSprite};
pub use board_view::{tile_look, Banner, BoardView, Hud, Scene, Viewport};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
