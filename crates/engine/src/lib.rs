//! Turn engine - drives player input through the board rules
//!
//! The engine owns one [`Grid`](crate::core::Grid) per session and turns taps
//! and drags into swaps, cascades and score. Visual work is delegated to an
//! [`Animator`]; the engine waits for each group of animations before it
//! mutates the board again, so a renderer always sees whole steps.
//!
//! - [`coordinator`]: tracked animation completions and the busy gate
//! - [`animator`]: the visual collaborator trait
//! - [`controller`]: the selection and swap state machine
//! - [`idle`]: the background hint task
//! - [`queue`]: in-order delivery of player input
//! - [`events`]: score, time and hint notifications
//!
//! # Example
//!
//! ```
//! use tui_gems_engine::{InputOutcome, InstantAnimator, TurnController};
//! use tui_gems_engine::core::GameConfig;
//! use tui_gems_engine::types::{Position, TurnInput};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let (controller, _events) = TurnController::start(GameConfig::default(), InstantAnimator)
//!     .await
//!     .unwrap();
//!
//! let outcome = controller.handle(TurnInput::Tap(Position::new(0, 0))).await.unwrap();
//! assert_eq!(outcome, InputOutcome::Selected);
//! # });
//! ```

pub mod animator;
pub mod controller;
pub mod coordinator;
pub mod events;
pub mod idle;
pub mod queue;

pub use tui_gems_core as core;
pub use tui_gems_types as types;

pub use animator::{Animator, InstantAnimator};
pub use controller::{InputOutcome, Phase, SessionSnapshot, TurnController, TurnSummary};
pub use coordinator::{BusyGate, BusyGuard, Cancelled, Completion, GateClosed, Tracked, TrackedPool};
pub use events::{EventReceiver, EventSender, SessionEvent};
pub use idle::IdleHinter;
pub use queue::InputQueue;
