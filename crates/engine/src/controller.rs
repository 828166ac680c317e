//! Turn controller - the selection and swap state machine
//!
//! | Phase | Input | Result |
//! |-------|-------|--------|
//! | Idle | tap | select the cell |
//! | Selected | tap same cell | deselect |
//! | Selected | tap or drag to a neighbour | swap and resolve |
//! | Selected | tap elsewhere | move the selection |
//! | Resolving | anything | rejected |
//!
//! Resolving swaps the pair; if that makes no match the swap is undone.
//! Otherwise matches are popped and the grid refilled until it settles.
//!
//! Every grid mutation happens synchronously under the session lock, and the
//! lock is released before any animation is awaited. Only one input is handled
//! at a time: an atomic flag turns away overlapping inputs, and the busy gate
//! is held for the whole of each input so the idle hint stays quiet.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::animator::Animator;
use crate::coordinator::{lock, BusyGate, TrackedPool, Tracked};
use crate::core::{
    fill, fill_board, find_hint, is_match, pop_matches, BoardSnapshot, FillEffect, GameConfig,
    Grid, Hint, PopOutcome, SimpleRng, WaveTracker,
};
use crate::events::{emit, EventReceiver, EventSender, SessionEvent};
use crate::types::{Error, Position, Result, TurnInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Selected(Position),
    Resolving,
}

/// What one input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Another input is still being handled, or the session is shut down
    Rejected,
    /// The input means nothing in the current phase
    Ignored,
    Selected,
    Deselected,
    /// The selection moved to a non-adjacent cell
    Reselected,
    /// The swap made no match and was undone
    Reverted,
    Resolved(TurnSummary),
}

/// Totals for one resolved swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnSummary {
    pub score: u32,
    pub time: u32,
    /// Pop and refill rounds until the board settled
    pub cascades: u32,
    pub waves_unlocked: u32,
}

/// Board plus session counters at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub board: BoardSnapshot,
    pub score: u32,
    pub time_bonus: u32,
    pub waves: u32,
    pub phase: Phase,
}

impl SessionSnapshot {
    pub fn selected(&self) -> Option<Position> {
        match self.phase {
            Phase::Selected(pos) => Some(pos),
            _ => None,
        }
    }
}

struct Session {
    grid: Grid,
    rng: SimpleRng,
    phase: Phase,
    score: u32,
    time_bonus: u32,
    waves: WaveTracker,
}

/// Clears the input flag when an input finishes, however it finishes.
struct InteractiveGuard<'a>(&'a AtomicBool);

impl Drop for InteractiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

pub struct TurnController<A: Animator> {
    config: GameConfig,
    session: Mutex<Session>,
    animator: A,
    pool: TrackedPool,
    gate: BusyGate,
    interactive: AtomicBool,
    events: EventSender,
}

impl<A: Animator> TurnController<A> {
    /// Build a session, fill the board without matches and wait for it to appear.
    pub async fn start(config: GameConfig, animator: A) -> Result<(Self, EventReceiver)> {
        let grid = Grid::new(&config)?;
        Self::start_with_grid(config, grid, animator).await
    }

    /// Start from a prepared board. Empty cells are filled without matches;
    /// a full board is used as is.
    ///
    /// The board must have the configured size and tile table.
    pub async fn start_with_grid(
        config: GameConfig,
        mut grid: Grid,
        animator: A,
    ) -> Result<(Self, EventReceiver)> {
        config.validate()?;
        if grid.width() != config.width || grid.height() != config.height {
            return Err(Error::InvalidConfiguration(format!(
                "board is {}x{} but the config says {}x{}",
                grid.width(),
                grid.height(),
                config.width,
                config.height
            )));
        }
        if *grid.tile_table() != config.tiles {
            return Err(Error::InvalidConfiguration(
                "board tile table differs from the config".to_string(),
            ));
        }
        let mut rng = SimpleRng::new(config.seed);
        let effects = fill_board(&mut grid, &mut rng)?;
        let (tx, rx) = mpsc::unbounded_channel();

        let controller = Self {
            session: Mutex::new(Session {
                grid,
                rng,
                phase: Phase::Idle,
                score: 0,
                time_bonus: 0,
                waves: WaveTracker::new(config.special_threshold),
            }),
            config,
            animator,
            pool: TrackedPool::new(),
            gate: BusyGate::new(),
            interactive: AtomicBool::new(true),
            events: tx,
        };

        {
            let _busy = controller.gate.enter();
            controller.animate_fill(&effects).await;
        }
        info!(
            width = controller.config.width,
            height = controller.config.height,
            seed = controller.config.seed,
            "session started"
        );
        Ok((controller, rx))
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        lock(&self.session)
    }

    fn begin_input(&self) -> Option<InteractiveGuard<'_>> {
        if self.gate.is_closed() {
            return None;
        }
        self.interactive
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InteractiveGuard(&self.interactive))
    }

    /// Apply one player input.
    ///
    /// Positions outside the board are an error; everything else maps to an
    /// [`InputOutcome`].
    pub async fn handle(&self, input: TurnInput) -> Result<InputOutcome> {
        let Some(_interactive) = self.begin_input() else {
            debug!(?input, "input rejected");
            return Ok(InputOutcome::Rejected);
        };
        let _busy = self.gate.enter();

        let pos = input.position();
        let phase = {
            let session = self.session();
            if !session.grid.is_valid_position(pos) {
                return Err(Error::InvalidConfiguration(format!(
                    "input at {pos} is outside the board"
                )));
            }
            session.phase
        };

        match (phase, input) {
            (Phase::Idle, TurnInput::Tap(_)) => {
                self.session().phase = Phase::Selected(pos);
                let (done, tracked) = self.pool.track();
                self.animator.play_select(pos, done);
                self.settle(vec![tracked]).await;
                Ok(InputOutcome::Selected)
            }
            (Phase::Selected(selected), TurnInput::Tap(_)) if selected == pos => {
                self.session().phase = Phase::Idle;
                let (done, tracked) = self.pool.track();
                self.animator.play_deselect(pos, done);
                self.settle(vec![tracked]).await;
                Ok(InputOutcome::Deselected)
            }
            (Phase::Selected(selected), _) if selected.is_adjacent(pos) => {
                let result = self.resolve(selected, pos).await;
                if result.is_err() {
                    self.session().phase = Phase::Idle;
                }
                result
            }
            (Phase::Selected(selected), TurnInput::Tap(_)) => {
                self.session().phase = Phase::Selected(pos);
                let (old, old_tracked) = self.pool.track();
                let (new, new_tracked) = self.pool.track();
                self.animator.play_deselect(selected, old);
                self.animator.play_select(pos, new);
                self.settle(vec![old_tracked, new_tracked]).await;
                Ok(InputOutcome::Reselected)
            }
            (Phase::Idle | Phase::Selected(_), TurnInput::DragTo(_)) => Ok(InputOutcome::Ignored),
            (Phase::Resolving, _) => Ok(InputOutcome::Rejected),
        }
    }

    async fn resolve(&self, selected: Position, target: Position) -> Result<InputOutcome> {
        let (moves, matched) = {
            let mut session = self.session();
            session.phase = Phase::Resolving;
            session.grid.swap_adjacent(selected, target)?;
            (swap_moves(&session.grid, selected, target), is_match(&session.grid))
        };

        let (done, deselect) = self.pool.track();
        self.animator.play_deselect(selected, done);
        let mut tracked = self.animate_moves(&moves);
        tracked.push(deselect);
        self.settle(tracked).await;

        if !matched {
            let moves = {
                let mut session = self.session();
                session.grid.swap_adjacent(selected, target)?;
                swap_moves(&session.grid, selected, target)
            };
            let tracked = self.animate_moves(&moves);
            self.settle(tracked).await;
            self.session().phase = Phase::Idle;
            debug!(%selected, %target, "swap made no match");
            return Ok(InputOutcome::Reverted);
        }

        let mut summary = TurnSummary::default();
        loop {
            let (outcome, unlocked, total, waves) = {
                let mut session = self.session();
                if !is_match(&session.grid) {
                    break;
                }
                let outcome = pop_matches(&mut session.grid, &self.config.scoring);
                session.score = session.score.saturating_add(outcome.score);
                session.time_bonus = session.time_bonus.saturating_add(outcome.time);
                let total = session.score;
                let unlocked = session.waves.advance(total);
                (outcome, unlocked, total, session.waves.waves())
            };

            summary.cascades += 1;
            summary.score = summary.score.saturating_add(outcome.score);
            summary.time = summary.time.saturating_add(outcome.time);
            if outcome.score > 0 {
                emit(
                    &self.events,
                    SessionEvent::ScoreChanged {
                        delta: outcome.score,
                        total,
                    },
                );
            }
            if outcome.time > 0 {
                emit(&self.events, SessionEvent::TimeChanged { delta: outcome.time });
            }
            if unlocked {
                summary.waves_unlocked += 1;
                info!(waves, total, "special wave unlocked");
                emit(&self.events, SessionEvent::WaveUnlocked { waves });
            }

            self.animate_pops(&outcome).await;

            let effects = {
                let mut session = self.session();
                let Session { grid, rng, .. } = &mut *session;
                fill(grid, rng, true, unlocked)?
            };
            self.animate_fill(&effects).await;
        }

        self.session().phase = Phase::Idle;
        debug!(
            score = summary.score,
            cascades = summary.cascades,
            "turn resolved"
        );
        Ok(InputOutcome::Resolved(summary))
    }

    fn animate_moves(&self, moves: &[Move]) -> Vec<Tracked> {
        moves
            .iter()
            .map(|m| {
                let (done, tracked) = self.pool.track();
                self.animator.play_move(m.tile, m.kind, m.from, m.to, done);
                tracked
            })
            .collect()
    }

    async fn animate_pops(&self, outcome: &PopOutcome) {
        let tracked: Vec<_> = outcome
            .popped
            .iter()
            .map(|p| {
                let (done, tracked) = self.pool.track();
                self.animator.play_pop(p.id, p.kind, p.pos, done);
                tracked
            })
            .collect();
        self.settle(tracked).await;
        for p in &outcome.popped {
            self.animator.destroy_visual(p.id);
        }
    }

    async fn animate_fill(&self, effects: &[FillEffect]) {
        let tracked = self.track_fill(effects);
        self.settle(tracked).await;
    }

    fn track_fill(&self, effects: &[FillEffect]) -> Vec<Tracked> {
        effects
            .iter()
            .map(|effect| {
                let (done, tracked) = self.pool.track();
                match *effect {
                    FillEffect::Fall {
                        tile,
                        kind,
                        from,
                        to,
                    } => self.animator.play_move(tile, kind, from, to, done),
                    FillEffect::Spawn { tile, kind, at } => {
                        self.animator.play_appear(tile, kind, at, done)
                    }
                }
                tracked
            })
            .collect()
    }

    /// Wait for a group of animations, or until the session shuts down.
    ///
    /// Cancelled animations count as finished: the grid already holds the
    /// final state.
    async fn settle(&self, tracked: Vec<Tracked>) {
        if tracked.is_empty() {
            return;
        }
        let closed = self.gate.closed();
        tokio::select! {
            result = TrackedPool::join(tracked) => {
                if let Err(err) = result {
                    warn!(%err, "animation did not complete");
                }
            }
            _ = closed => debug!("session closed during animation"),
        }
    }

    /// Clear the board and deal a new one. Returns false if an input is in progress.
    pub async fn restart(&self) -> Result<bool> {
        let Some(_interactive) = self.begin_input() else {
            return Ok(false);
        };
        let _busy = self.gate.enter();

        let (selected, old_tiles, effects) = {
            let mut session = self.session();
            let selected = match session.phase {
                Phase::Selected(pos) => Some(pos),
                _ => None,
            };
            let old_tiles: Vec<_> = session.grid.tiles().iter().map(|t| t.id).collect();
            session.grid.clear();
            session.phase = Phase::Idle;
            session.score = 0;
            session.time_bonus = 0;
            session.waves.reset();
            let Session { grid, rng, .. } = &mut *session;
            (selected, old_tiles, fill_board(grid, rng)?)
        };
        for id in old_tiles {
            self.animator.destroy_visual(id);
        }
        emit(&self.events, SessionEvent::Restarted);

        let mut tracked = self.track_fill(&effects);
        if let Some(pos) = selected {
            let (done, deselect) = self.pool.track();
            self.animator.play_deselect(pos, done);
            tracked.push(deselect);
        }
        self.settle(tracked).await;
        info!("session restarted");
        Ok(true)
    }

    /// Settle every pending animation and close the gate.
    ///
    /// In-flight inputs finish without further waiting; later inputs are rejected.
    pub fn shutdown(&self) {
        self.gate.close();
        let resolved = self.pool.resolve_all();
        self.animator.stop_highlight();
        info!(resolved, "session shut down");
    }

    pub fn phase(&self) -> Phase {
        self.session().phase
    }

    pub fn score(&self) -> u32 {
        self.session().score
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.session();
        SessionSnapshot {
            board: session.grid.snapshot(),
            score: session.score,
            time_bonus: session.time_bonus,
            waves: session.waves.waves(),
            phase: session.phase,
        }
    }

    /// Copy the board into a caller-owned buffer.
    pub fn snapshot_board_into(&self, out: &mut BoardSnapshot) {
        self.session().grid.snapshot_into(out);
    }

    pub fn hint(&self) -> Option<Hint> {
        find_hint(&self.session().grid)
    }

    pub fn busy_gate(&self) -> &BusyGate {
        &self.gate
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive.load(Ordering::Acquire) && !self.gate.is_closed()
    }

    /// Highlight a hint and announce it.
    pub fn show_hint(&self, hint: Hint) {
        self.animator.play_highlight_loop(hint.from, hint.to);
        emit(&self.events, SessionEvent::HintShown(hint));
    }

    pub fn clear_hint(&self) {
        self.animator.stop_highlight();
    }

    pub fn notify_no_moves(&self) {
        emit(&self.events, SessionEvent::NoMovesLeft);
    }
}

#[derive(Debug, Clone, Copy)]
struct Move {
    tile: crate::types::TileId,
    kind: crate::types::TileKind,
    from: Position,
    to: Position,
}

/// Moves shown for a swap that has just been applied between `a` and `b`.
fn swap_moves(grid: &Grid, a: Position, b: Position) -> Vec<Move> {
    [(b, a), (a, b)]
        .into_iter()
        .filter_map(|(from, to)| {
            grid.tile(to).map(|tile| Move {
                tile: tile.id,
                kind: tile.kind,
                from,
                to,
            })
        })
        .collect()
}
