//! Session notifications
//!
//! The controller reports score, time and hint changes on an unbounded
//! channel; the receiver is returned from
//! [`TurnController::start`](crate::TurnController::start). Sends never block
//! and are dropped silently once the receiver is gone.

use tokio::sync::mpsc;

use crate::core::Hint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ScoreChanged { delta: u32, total: u32 },
    /// Seconds granted by popped plus-time tiles
    TimeChanged { delta: u32 },
    WaveUnlocked { waves: u32 },
    /// No swap on the board makes a match
    NoMovesLeft,
    HintShown(Hint),
    /// The board was cleared and refilled
    Restarted,
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

pub(crate) fn emit(tx: &EventSender, event: SessionEvent) {
    let _ = tx.send(event);
}

/// Pull everything queued without waiting.
pub fn drain(rx: &mut EventReceiver) -> Vec<SessionEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}
