//! TUI Gems (workspace facade crate).
//!
//! Re-exports the workspace crates as `tui_gems::{core,engine,input,term,types}`
//! so binaries, tests and benches share one import path.

pub use tui_gems_core as core;
pub use tui_gems_engine as engine;
pub use tui_gems_input as input;
pub use tui_gems_term as term;
pub use tui_gems_types as types;
