//! Ordered input delivery
//!
//! A press-drag reaches the engine as a tap followed closely by a drag. The
//! drag must wait for the tap's select animation rather than bounce off the
//! input gate, so inputs go through one task that applies them in order.
//! Taps that arrive while a turn is still being handled are dropped, the same
//! outcome the controller gives an overlapping tap.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::animator::Animator;
use crate::controller::{InputOutcome, TurnController};
use crate::types::TurnInput;

pub struct InputQueue<A: Animator> {
    controller: Arc<TurnController<A>>,
    tx: mpsc::UnboundedSender<TurnInput>,
    task: JoinHandle<()>,
}

impl<A: Animator> InputQueue<A> {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(controller: Arc<TurnController<A>>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<TurnInput>();
        let worker = Arc::clone(&controller);
        let task = tokio::spawn(async move {
            while let Some(input) = rx.recv().await {
                match worker.handle(input).await {
                    Ok(InputOutcome::Rejected) => debug!(?input, "queued input rejected"),
                    Ok(outcome) => debug!(?input, ?outcome, "input handled"),
                    Err(err) => warn!(?input, %err, "input failed"),
                }
            }
        });
        Self {
            controller,
            tx,
            task,
        }
    }

    /// Queue an input. Returns false if it was dropped.
    pub fn submit(&self, input: TurnInput) -> bool {
        if matches!(input, TurnInput::Tap(_)) && !self.controller.is_interactive() {
            debug!(?input, "tap dropped while busy");
            return false;
        }
        self.tx.send(input).is_ok()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}
