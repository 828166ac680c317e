//! Headless self-play.
//!
//! Plays the hinted swap until no move is left or the move budget runs out,
//! with animations completing instantly. Useful for soak testing the engine
//! and for tuning tile tables: run with `RUST_LOG=debug` to see every turn.
//!
//! Environment: the usual `GEMS_*` configuration variables, plus
//! `GEMS_AUTOPLAY_MOVES` (default 500).

use std::io;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tui_gems::core::GameConfig;
use tui_gems::engine::events::drain;
use tui_gems::engine::{InputOutcome, InstantAnimator, SessionEvent, TurnController};
use tui_gems::types::TurnInput;

const DEFAULT_MOVES: u32 = 500;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = GameConfig::from_env().context("loading configuration")?;
    let budget = match std::env::var("GEMS_AUTOPLAY_MOVES") {
        Ok(v) => v
            .parse::<u32>()
            .with_context(|| format!("GEMS_AUTOPLAY_MOVES={v:?} is not a number"))?,
        Err(_) => DEFAULT_MOVES,
    };

    let (controller, mut events) = TurnController::start(config, InstantAnimator).await?;
    info!(budget, "autoplay started");

    let mut moves = 0u32;
    let mut cascades = 0u32;
    let mut time = 0u32;
    while moves < budget {
        let Some(hint) = controller.hint() else {
            info!(moves, "no moves left");
            break;
        };

        let first = controller.handle(TurnInput::Tap(hint.from)).await?;
        if first != InputOutcome::Selected {
            bail!("tap on {} gave {first:?}", hint.from);
        }
        match controller.handle(TurnInput::Tap(hint.to)).await? {
            InputOutcome::Resolved(summary) => {
                debug!(?hint, ?summary, "turn resolved");
                cascades += summary.cascades;
                time += summary.time;
            }
            other => bail!("hinted swap {hint:?} gave {other:?}"),
        }
        moves += 1;

        for event in drain(&mut events) {
            if let SessionEvent::WaveUnlocked { waves } = event {
                info!(waves, score = controller.score(), "special tiles unlocked");
            }
        }
    }

    let board = controller.snapshot().board;
    info!(
        moves,
        cascades,
        time,
        score = controller.score(),
        board_hash = format_args!("{:016x}", board.board_hash()),
        "autoplay finished"
    );
    println!("moves={moves} score={} cascades={cascades} bonus_time={time}", controller.score());
    controller.shutdown();
    Ok(())
}
