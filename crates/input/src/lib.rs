//! Terminal input module (engine-facing).
//!
//! Turns raw terminal events into board input. It is independent of any UI
//! framework: [`map`] reads `crossterm` events, [`layout`] converts terminal
//! cells to grid positions, and [`pointer`] tracks press and drag so a
//! click-click or a press-drag both produce a swap.

pub mod layout;
pub mod map;
pub mod pointer;

pub use tui_gems_types as types;

pub use layout::BoardLayout;
pub use map::{handle_key_event, map_mouse_event, should_quit, KeyCommand, PointerEvent};
pub use pointer::PointerTracker;
