//! Press / drag tracking.
//!
//! A press on a tile is a tap. While the button stays down, moving onto a
//! different tile produces one drag; further movement is ignored until the
//! next press.

use crate::layout::BoardLayout;
use crate::map::PointerEvent;
use crate::types::{Position, TurnInput};

#[derive(Debug, Clone)]
pub struct PointerTracker {
    layout: BoardLayout,
    pressed: Option<Position>,
    dragging: bool,
}

impl PointerTracker {
    pub fn new(layout: BoardLayout) -> Self {
        Self {
            layout,
            pressed: None,
            dragging: false,
        }
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Swap in a new layout (terminal resized). Drops any press in progress.
    pub fn set_layout(&mut self, layout: BoardLayout) {
        self.layout = layout;
        self.pointer_up();
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pointer_down(&mut self, x: i32, y: i32) -> Option<TurnInput> {
        let pos = self.layout.position_from_screen(x, y);
        self.pressed = pos;
        self.dragging = pos.is_some();
        pos.map(TurnInput::Tap)
    }

    pub fn pointer_move(&mut self, x: i32, y: i32) -> Option<TurnInput> {
        if !self.dragging {
            return None;
        }
        let pos = self.layout.position_from_screen(x, y)?;
        if Some(pos) == self.pressed {
            return None;
        }
        self.dragging = false;
        Some(TurnInput::DragTo(pos))
    }

    pub fn pointer_up(&mut self) {
        self.pressed = None;
        self.dragging = false;
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<TurnInput> {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(x, y),
            PointerEvent::Move { x, y } => self.pointer_move(x, y),
            PointerEvent::Up { .. } => {
                self.pointer_up();
                None
            }
        }
    }
}
