//! Idle hint task, driven with paused tokio time.

use std::sync::Arc;
use std::time::Duration;

use tui_gems::core::{find_hint, GameConfig, Grid};
use tui_gems::engine::events::drain;
use tui_gems::engine::{IdleHinter, InstantAnimator, SessionEvent, TurnController};
use tui_gems::types::{Position, TurnInput};

fn config() -> GameConfig {
    GameConfig {
        width: 4,
        height: 3,
        hint_delay_ms: 5000,
        ..GameConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_hint_shown_after_delay() {
    let grid = Grid::from_layout("RBGY\nGYRB\nRRGR").unwrap();
    let expected = find_hint(&grid).unwrap();
    let (controller, mut events) = TurnController::start_with_grid(config(), grid, InstantAnimator)
        .await
        .unwrap();
    let controller = Arc::new(controller);
    let hinter = IdleHinter::spawn(Arc::clone(&controller));

    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert!(drain(&mut events).is_empty());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(drain(&mut events), vec![SessionEvent::HintShown(expected)]);

    // Stays quiet until the next input.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(drain(&mut events).is_empty());

    controller.shutdown();
    hinter.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_input_restarts_idle_timer() {
    let grid = Grid::from_layout("RBGY\nGYRB\nRRGR").unwrap();
    let (controller, mut events) = TurnController::start_with_grid(config(), grid, InstantAnimator)
        .await
        .unwrap();
    let controller = Arc::new(controller);
    let hinter = IdleHinter::spawn(Arc::clone(&controller));

    tokio::time::sleep(Duration::from_millis(3000)).await;
    controller
        .handle(TurnInput::Tap(Position::new(0, 0)))
        .await
        .unwrap();
    controller
        .handle(TurnInput::Tap(Position::new(0, 0)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert!(drain(&mut events).is_empty());

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(matches!(
        drain(&mut events).as_slice(),
        [SessionEvent::HintShown(_)]
    ));

    controller.shutdown();
    hinter.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_moves_reported_once() {
    let grid = Grid::from_layout("RBGY\nGYRB\nRBGY\nGYRB").unwrap();
    assert!(find_hint(&grid).is_none());
    let config = GameConfig {
        height: 4,
        ..config()
    };
    let (controller, mut events) = TurnController::start_with_grid(config, grid, InstantAnimator)
        .await
        .unwrap();
    let controller = Arc::new(controller);
    let hinter = IdleHinter::spawn(Arc::clone(&controller));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(drain(&mut events), vec![SessionEvent::NoMovesLeft]);

    controller.shutdown();
    hinter.join().await;
}
