//! Terminal gems runner (default binary).
//!
//! Click a gem and then a neighbour, or drag a gem onto a neighbour, to swap
//! them. Each round lasts 90 seconds; popped plus-time tiles extend it.
//!
//! The turn engine runs on a tokio runtime. This thread polls crossterm,
//! feeds input to the engine without waiting for it, and draws a frame every
//! tick with the same framebuffer renderer and no widget layer.

use std::fs::File;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tui_gems::core::{BoardSnapshot, GameConfig};
use tui_gems::engine::events::drain;
use tui_gems::engine::{EventReceiver, IdleHinter, InputQueue, SessionEvent, TurnController};
use tui_gems::input::{handle_key_event, map_mouse_event, should_quit, KeyCommand, PointerTracker};
use tui_gems::term::{
    Banner, BoardView, FrameBuffer, Hud, Overlay, Scene, TerminalAnimator, TerminalRenderer,
    Viewport,
};
use tui_gems::types::{TurnInput, TICK_MS};

const ROUND_SECS: u64 = 90;

type Controller = TurnController<Arc<TerminalAnimator>>;

fn main() -> Result<()> {
    init_tracing()?;
    let config = GameConfig::from_env().context("loading configuration")?;

    let rt = Runtime::new().context("starting tokio runtime")?;
    let enter = rt.enter();

    let animator = Arc::new(TerminalAnimator::new(config.height));
    let ticker = spawn_ticker(Arc::clone(&animator));
    let (controller, events) = rt.block_on(TurnController::start(config, Arc::clone(&animator)))?;
    let controller = Arc::new(controller);
    let hinter = IdleHinter::spawn(Arc::clone(&controller));
    let queue = InputQueue::spawn(Arc::clone(&controller));

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let mut app = App::new(&rt, Arc::clone(&controller), &queue, animator, events);
    let result = app.run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();

    controller.shutdown();
    hinter.abort();
    queue.abort();
    ticker.abort();
    drop(enter);
    rt.shutdown_timeout(Duration::from_millis(200));
    info!("bye");
    result
}

fn init_tracing() -> Result<()> {
    let path = std::env::var("GEMS_LOG_PATH").unwrap_or_else(|_| "tui-gems.log".to_string());
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Settles finished animations on the frame clock, independent of drawing.
fn spawn_ticker(animator: Arc<TerminalAnimator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            animator.advance(Instant::now());
        }
    })
}

/// Round timer. Frozen once it runs out.
#[derive(Debug, Clone, Copy)]
struct Countdown {
    remaining: Duration,
}

impl Countdown {
    fn new() -> Self {
        Self {
            remaining: Duration::from_secs(ROUND_SECS),
        }
    }

    fn tick(&mut self, dt: Duration) {
        self.remaining = self.remaining.saturating_sub(dt);
    }

    fn extend(&mut self, secs: u32) {
        if !self.is_over() {
            self.remaining += Duration::from_secs(u64::from(secs));
        }
    }

    fn is_over(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Whole seconds left, rounded up.
    fn seconds_left(&self) -> u32 {
        let ms = self.remaining.as_millis();
        ms.div_ceil(1000).min(u128::from(u32::MAX)) as u32
    }
}

struct App<'rt> {
    rt: &'rt Runtime,
    controller: Arc<Controller>,
    queue: &'rt InputQueue<Arc<TerminalAnimator>>,
    animator: Arc<TerminalAnimator>,
    events: EventReceiver,
    view: BoardView,
    countdown: Countdown,
    score: u32,
    waves: u32,
    banner: Banner,
}

impl<'rt> App<'rt> {
    fn new(
        rt: &'rt Runtime,
        controller: Arc<Controller>,
        queue: &'rt InputQueue<Arc<TerminalAnimator>>,
        animator: Arc<TerminalAnimator>,
        events: EventReceiver,
    ) -> Self {
        Self {
            rt,
            controller,
            queue,
            animator,
            events,
            view: BoardView::default(),
            countdown: Countdown::new(),
            score: 0,
            waves: 0,
            banner: Banner::None,
        }
    }

    fn run(&mut self, term: &mut TerminalRenderer) -> Result<()> {
        let (width, height) = {
            let config = self.controller.config();
            (config.width, config.height)
        };
        let tick_duration = Duration::from_millis(TICK_MS);
        let mut fb = FrameBuffer::new(0, 0);
        let mut board = BoardSnapshot::default();
        let mut sprites = Vec::new();
        let mut overlay = Overlay::default();
        let mut last_frame = Instant::now();
        let mut tracker = {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            PointerTracker::new(self.view.layout(Viewport::new(w, h), width, height))
        };

        loop {
            let now = Instant::now();
            if self.banner != Banner::GameOver {
                self.countdown.tick(now.saturating_duration_since(last_frame));
                if self.countdown.is_over() {
                    info!(score = self.score, "time is up");
                    self.banner = Banner::GameOver;
                    self.controller.clear_hint();
                }
            }
            last_frame = now;
            self.pump_events();

            // Render.
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            let viewport = Viewport::new(w, h);
            let layout = self.view.layout(viewport, width, height);
            if *tracker.layout() != layout {
                tracker.set_layout(layout);
            }

            self.controller.snapshot_board_into(&mut board);
            self.animator.sprites_into(&board, now, &mut sprites);
            self.animator.overlay_into(now, &mut overlay);
            let scene = Scene {
                board: &board,
                sprites: &sprites,
                overlay: &overlay,
                hud: Hud {
                    score: self.score,
                    seconds_left: self.countdown.seconds_left(),
                    waves: self.waves,
                    banner: self.banner,
                },
            };
            self.view.render_into(&scene, viewport, &mut fb);
            term.draw_swap(&mut fb)?;

            // Input with timeout until next frame.
            let timeout = tick_duration.saturating_sub(now.elapsed());
            if !event::poll(timeout)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    match handle_key_event(key) {
                        Some(KeyCommand::Hint) => self.show_hint(),
                        Some(KeyCommand::Restart) => self.restart(),
                        None => {}
                    }
                }
                Event::Mouse(mouse) => {
                    let input = map_mouse_event(mouse).and_then(|p| tracker.handle(p));
                    if let Some(input) = input {
                        self.submit(input);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }
    }

    fn pump_events(&mut self) {
        for event in drain(&mut self.events) {
            match event {
                SessionEvent::ScoreChanged { total, .. } => self.score = total,
                SessionEvent::TimeChanged { delta } => self.countdown.extend(delta),
                SessionEvent::WaveUnlocked { waves } => {
                    info!(waves, "special tiles unlocked");
                    self.waves = waves;
                }
                SessionEvent::NoMovesLeft => {
                    if self.banner == Banner::None {
                        self.banner = Banner::NoMoves;
                    }
                }
                SessionEvent::HintShown(hint) => debug!(?hint, "hint shown"),
                SessionEvent::Restarted => {
                    self.countdown = Countdown::new();
                    self.score = 0;
                    self.waves = 0;
                    self.banner = Banner::None;
                }
            }
        }
    }

    /// Hand input to the engine without blocking the frame loop.
    fn submit(&self, input: TurnInput) {
        if self.banner == Banner::GameOver {
            return;
        }
        self.controller.clear_hint();
        self.queue.submit(input);
    }

    fn show_hint(&self) {
        if self.banner == Banner::GameOver || !self.controller.busy_gate().is_free() {
            return;
        }
        match self.controller.hint() {
            Some(hint) => self.controller.show_hint(hint),
            None => self.controller.notify_no_moves(),
        }
    }

    fn restart(&self) {
        let controller = Arc::clone(&self.controller);
        self.rt.spawn(async move {
            match controller.restart().await {
                Ok(true) => {}
                Ok(false) => debug!("restart ignored while busy"),
                Err(err) => warn!(%err, "restart failed"),
            }
        });
    }
}
