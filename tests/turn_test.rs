//! Turn controller tests: selection, swaps, cascades and input gating.

use std::sync::{Arc, Mutex};

use tui_gems::core::{is_match, GameConfig, Grid};
use tui_gems::engine::events::drain;
use tui_gems::engine::{
    Animator, Completion, InputOutcome, InstantAnimator, Phase, SessionEvent, TurnController,
};
use tui_gems::types::{Position, TileId, TileKind, TurnInput};

const BOARD: &str = "RBGY\nGYRB\nRRGR";

fn config() -> GameConfig {
    GameConfig {
        width: 4,
        height: 3,
        seed: 5,
        ..GameConfig::default()
    }
}

/// Keeps every completion until the test releases it.
#[derive(Default)]
struct HeldAnimator {
    held: Mutex<Vec<Completion>>,
}

impl HeldAnimator {
    fn hold(&self, done: Completion) {
        self.held.lock().unwrap().push(done);
    }

    fn held(&self) -> usize {
        self.held.lock().unwrap().len()
    }

    fn release(&self) {
        for done in self.held.lock().unwrap().drain(..) {
            done.complete();
        }
    }
}

impl Animator for HeldAnimator {
    fn play_move(&self, _: TileId, _: TileKind, _: Position, _: Position, done: Completion) {
        self.hold(done);
    }
    fn play_appear(&self, _: TileId, _: TileKind, _: Position, done: Completion) {
        self.hold(done);
    }
    fn play_pop(&self, _: TileId, _: TileKind, _: Position, done: Completion) {
        self.hold(done);
    }
    fn play_select(&self, _: Position, done: Completion) {
        self.hold(done);
    }
    fn play_deselect(&self, _: Position, done: Completion) {
        self.hold(done);
    }
    fn play_highlight_loop(&self, _: Position, _: Position) {}
    fn stop_highlight(&self) {}
    fn destroy_visual(&self, _: TileId) {}
}

async fn wait_until_held(animator: &HeldAnimator) {
    while animator.held() == 0 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_red_run_scores_three_and_settles() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let (controller, mut events) = TurnController::start_with_grid(config(), grid, InstantAnimator)
        .await
        .unwrap();

    let first = controller
        .handle(TurnInput::Tap(Position::new(2, 3)))
        .await
        .unwrap();
    assert_eq!(first, InputOutcome::Selected);

    let outcome = controller
        .handle(TurnInput::Tap(Position::new(2, 2)))
        .await
        .unwrap();
    let InputOutcome::Resolved(summary) = outcome else {
        panic!("expected a resolved turn, got {outcome:?}");
    };
    assert!(summary.score >= 3);
    assert!(summary.cascades >= 1);

    let events = drain(&mut events);
    assert_eq!(
        events.first(),
        Some(&SessionEvent::ScoreChanged { delta: 3, total: 3 })
    );

    let snap = controller.snapshot();
    assert_eq!(snap.phase, Phase::Idle);
    assert_eq!(snap.score, summary.score);
    assert!(snap.board.tiles.iter().all(|t| !t.kind.is_empty()));

    let grid = Grid::from_layout(&board_text(&snap.board)).unwrap();
    assert!(!is_match(&grid));
}

fn board_text(board: &tui_gems::core::BoardSnapshot) -> String {
    let mut out = String::new();
    for row in 0..board.height {
        for col in 0..board.width {
            if let Some(kind) = board.kind(row, col) {
                out.push(kind.as_char());
            }
        }
        out.push('\n');
    }
    out
}

#[tokio::test]
async fn test_non_matching_swap_reverts() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let (controller, _events) = TurnController::start_with_grid(config(), grid, InstantAnimator)
        .await
        .unwrap();
    let before = controller.snapshot().board.board_hash();

    controller
        .handle(TurnInput::Tap(Position::new(0, 0)))
        .await
        .unwrap();
    let outcome = controller
        .handle(TurnInput::DragTo(Position::new(0, 1)))
        .await
        .unwrap();

    assert_eq!(outcome, InputOutcome::Reverted);
    assert_eq!(controller.snapshot().board.board_hash(), before);
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(controller.score(), 0);
}

#[tokio::test]
async fn test_far_tap_moves_selection_without_touching_board() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let (controller, _events) = TurnController::start_with_grid(config(), grid, InstantAnimator)
        .await
        .unwrap();
    let before = controller.snapshot().board.board_hash();

    controller
        .handle(TurnInput::Tap(Position::new(0, 0)))
        .await
        .unwrap();
    let outcome = controller
        .handle(TurnInput::Tap(Position::new(2, 3)))
        .await
        .unwrap();

    assert_eq!(outcome, InputOutcome::Reselected);
    assert_eq!(controller.phase(), Phase::Selected(Position::new(2, 3)));
    assert_eq!(controller.snapshot().board.board_hash(), before);
}

#[tokio::test]
async fn test_input_during_animation_is_rejected() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let animator = Arc::new(HeldAnimator::default());
    let (controller, _events) =
        TurnController::start_with_grid(config(), grid, Arc::clone(&animator))
            .await
            .unwrap();
    let controller = Arc::new(controller);

    let first = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.handle(TurnInput::Tap(Position::new(1, 1))).await }
    });
    wait_until_held(&animator).await;
    assert!(!controller.busy_gate().is_free());
    assert!(!controller.is_interactive());

    let second = controller
        .handle(TurnInput::Tap(Position::new(0, 0)))
        .await
        .unwrap();
    assert_eq!(second, InputOutcome::Rejected);

    animator.release();
    assert_eq!(first.await.unwrap().unwrap(), InputOutcome::Selected);
    assert!(controller.busy_gate().is_free());
    assert!(controller.is_interactive());
    assert_eq!(controller.phase(), Phase::Selected(Position::new(1, 1)));
}

#[tokio::test]
async fn test_shutdown_releases_waiting_turn() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let animator = Arc::new(HeldAnimator::default());
    let (controller, _events) =
        TurnController::start_with_grid(config(), grid, Arc::clone(&animator))
            .await
            .unwrap();
    let controller = Arc::new(controller);

    let pending = tokio::spawn({
        let controller = Arc::clone(&controller);
        async move { controller.handle(TurnInput::Tap(Position::new(0, 2))).await }
    });
    wait_until_held(&animator).await;

    controller.shutdown();
    assert_eq!(pending.await.unwrap().unwrap(), InputOutcome::Selected);
    assert!(controller.busy_gate().is_closed());

    let after = controller
        .handle(TurnInput::Tap(Position::new(0, 0)))
        .await
        .unwrap();
    assert_eq!(after, InputOutcome::Rejected);
}

#[tokio::test]
async fn test_restart_deals_fresh_board() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let (controller, mut events) = TurnController::start_with_grid(config(), grid, InstantAnimator)
        .await
        .unwrap();
    controller
        .handle(TurnInput::Tap(Position::new(2, 3)))
        .await
        .unwrap();
    controller
        .handle(TurnInput::Tap(Position::new(2, 2)))
        .await
        .unwrap();
    assert!(controller.score() >= 3);

    assert!(controller.restart().await.unwrap());
    let snap = controller.snapshot();
    assert_eq!(snap.score, 0);
    assert_eq!(snap.phase, Phase::Idle);
    assert_eq!((snap.board.width, snap.board.height), (4, 3));
    assert!(snap.board.tiles.iter().all(|t| !t.kind.is_empty()));
    assert!(drain(&mut events).contains(&SessionEvent::Restarted));
}

/// Completes every animation at once and remembers selection changes.
#[derive(Default)]
struct RecordingAnimator {
    selections: Mutex<Vec<(Position, bool)>>,
}

impl RecordingAnimator {
    fn selections(&self) -> Vec<(Position, bool)> {
        self.selections.lock().unwrap().clone()
    }
}

impl Animator for RecordingAnimator {
    fn play_move(&self, _: TileId, _: TileKind, _: Position, _: Position, done: Completion) {
        done.complete();
    }
    fn play_appear(&self, _: TileId, _: TileKind, _: Position, done: Completion) {
        done.complete();
    }
    fn play_pop(&self, _: TileId, _: TileKind, _: Position, done: Completion) {
        done.complete();
    }
    fn play_select(&self, at: Position, done: Completion) {
        self.selections.lock().unwrap().push((at, true));
        done.complete();
    }
    fn play_deselect(&self, at: Position, done: Completion) {
        self.selections.lock().unwrap().push((at, false));
        done.complete();
    }
    fn play_highlight_loop(&self, _: Position, _: Position) {}
    fn stop_highlight(&self) {}
    fn destroy_visual(&self, _: TileId) {}
}

#[tokio::test]
async fn test_restart_deselects_selected_cell() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let animator = Arc::new(RecordingAnimator::default());
    let (controller, _events) =
        TurnController::start_with_grid(config(), grid, Arc::clone(&animator))
            .await
            .unwrap();
    let at = Position::new(0, 0);
    controller.handle(TurnInput::Tap(at)).await.unwrap();

    assert!(controller.restart().await.unwrap());
    assert_eq!(controller.phase(), Phase::Idle);
    assert_eq!(animator.selections(), vec![(at, true), (at, false)]);
}

#[tokio::test]
async fn test_restart_without_selection_plays_no_deselect() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let animator = Arc::new(RecordingAnimator::default());
    let (controller, _events) =
        TurnController::start_with_grid(config(), grid, Arc::clone(&animator))
            .await
            .unwrap();

    assert!(controller.restart().await.unwrap());
    assert!(animator.selections().is_empty());
}

#[tokio::test]
async fn test_wave_unlocks_when_score_reaches_threshold() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let config = GameConfig {
        special_threshold: 3,
        ..config()
    };
    let (controller, mut events) = TurnController::start_with_grid(config, grid, InstantAnimator)
        .await
        .unwrap();

    controller
        .handle(TurnInput::Tap(Position::new(2, 3)))
        .await
        .unwrap();
    let outcome = controller
        .handle(TurnInput::Tap(Position::new(2, 2)))
        .await
        .unwrap();
    let InputOutcome::Resolved(summary) = outcome else {
        panic!("expected a resolved turn, got {outcome:?}");
    };

    let events = drain(&mut events);
    assert_eq!(
        events[..2],
        [
            SessionEvent::ScoreChanged { delta: 3, total: 3 },
            SessionEvent::WaveUnlocked { waves: 1 },
        ]
    );

    // Later cascades may unlock more waves, one step at a time.
    let waves: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::WaveUnlocked { waves } => Some(*waves),
            _ => None,
        })
        .collect();
    let expected: Vec<u32> = (1..=summary.waves_unlocked).collect();
    assert_eq!(waves, expected);
    assert!(summary.waves_unlocked >= 1);
    assert!(summary.waves_unlocked <= summary.cascades);
    assert_eq!(controller.snapshot().waves, summary.waves_unlocked);
}

#[tokio::test]
async fn test_specials_stay_locked_below_threshold() {
    let grid = Grid::from_layout(BOARD).unwrap();
    let config = GameConfig {
        special_threshold: 1000,
        ..config()
    };
    let (controller, mut events) = TurnController::start_with_grid(config, grid, InstantAnimator)
        .await
        .unwrap();

    controller
        .handle(TurnInput::Tap(Position::new(2, 3)))
        .await
        .unwrap();
    let outcome = controller
        .handle(TurnInput::Tap(Position::new(2, 2)))
        .await
        .unwrap();
    let InputOutcome::Resolved(summary) = outcome else {
        panic!("expected a resolved turn, got {outcome:?}");
    };

    assert_eq!(summary.waves_unlocked, 0);
    assert!(!drain(&mut events)
        .iter()
        .any(|e| matches!(e, SessionEvent::WaveUnlocked { .. })));
    let snap = controller.snapshot();
    assert!(snap
        .board
        .tiles
        .iter()
        .all(|t| !t.kind.is_special_by_default()));
}

#[tokio::test]
async fn test_time_tile_in_run_adds_time() {
    // Moving the right-hand red left makes R T R on the bottom row.
    let grid = Grid::from_layout("RBGY\nGYRB\nRTGR").unwrap();
    let config = GameConfig {
        special_threshold: 1000,
        ..config()
    };
    let (controller, mut events) = TurnController::start_with_grid(config, grid, InstantAnimator)
        .await
        .unwrap();

    controller
        .handle(TurnInput::Tap(Position::new(2, 3)))
        .await
        .unwrap();
    let outcome = controller
        .handle(TurnInput::DragTo(Position::new(2, 2)))
        .await
        .unwrap();
    let InputOutcome::Resolved(summary) = outcome else {
        panic!("expected a resolved turn, got {outcome:?}");
    };

    let events = drain(&mut events);
    assert_eq!(
        events[..2],
        [
            SessionEvent::ScoreChanged { delta: 3, total: 3 },
            SessionEvent::TimeChanged { delta: 5 },
        ]
    );
    assert_eq!(summary.time, 5);
    assert_eq!(controller.snapshot().time_bonus, 5);
}
