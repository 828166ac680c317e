//! Idle hint task
//!
//! Once nothing has been busy for `hint_delay_ms`, highlight a swap that
//! makes a match and keep it highlighted until the next input. If no such
//! swap exists, report [`SessionEvent::NoMovesLeft`](crate::SessionEvent::NoMovesLeft)
//! once for that idle period instead. The task ends when the session shuts down.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::animator::Animator;
use crate::controller::TurnController;

pub struct IdleHinter {
    handle: JoinHandle<()>,
}

impl IdleHinter {
    /// Start the hint loop on the current tokio runtime.
    pub fn spawn<A: Animator>(controller: Arc<TurnController<A>>) -> Self {
        Self {
            handle: tokio::spawn(run(controller)),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the loop to end after the session shuts down.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

async fn run<A: Animator>(controller: Arc<TurnController<A>>) {
    let gate = controller.busy_gate().clone();
    let delay = Duration::from_millis(controller.config().hint_delay_ms);

    loop {
        if gate.until_free().await.is_err() {
            break;
        }

        // Edge triggered: an input that starts and ends before this task
        // runs again still counts.
        let busy = gate.next_busy();
        tokio::select! {
            result = busy => {
                if result.is_err() {
                    break;
                }
                continue;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let busy = gate.next_busy();
        if !gate.is_free() {
            continue;
        }
        match controller.hint() {
            Some(hint) => {
                debug!(from = %hint.from, to = %hint.to, "showing hint");
                controller.show_hint(hint);
                let result = busy.await;
                controller.clear_hint();
                if result.is_err() {
                    break;
                }
            }
            None => {
                debug!("no moves left");
                controller.notify_no_moves();
                if busy.await.is_err() {
                    break;
                }
            }
        }
    }
    debug!("idle hinter stopped");
}
