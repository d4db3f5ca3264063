//! Terminal Hole Match runner (default binary).
//!
//! Plays the level catalog in the terminal with a custom framebuffer
//! renderer, and lets an external agent drive the same session through the
//! TCP adapter.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};

use hole_match::adapter::{build_observation, state_hash, Adapter, OutboundMessage};
use hole_match::catalog::load_catalog;
use hole_match::config::GameConfig;
use hole_match::core::{LevelSnapshot, Session};
use hole_match::input::{handle_key_event, should_quit, ColumnCursor};
use hole_match::play::{apply_action, apply_remote, ActionError};
use hole_match::progress::FileProgressStore;
use hole_match::term::{AdapterStatusView, FrameBuffer, GameView, Hud, TerminalRenderer, Viewport};
use hole_match::types::{LevelEvent, TICK_MS};

const TOAST_MS: u32 = 1500;
const OBSERVATION_HEARTBEAT: Duration = Duration::from_secs(1);

type GameSession = Session<FileProgressStore>;

fn main() -> Result<()> {
    let config = GameConfig::parse();
    init_logging(config.log_path.as_deref())?;

    let catalog = load_catalog(config.levels_path.as_deref())?;
    let mut session = Session::new(catalog, FileProgressStore::new(&config.save_path));
    match config.start_level {
        Some(index) => session.load_level(index)?,
        None => session.start()?,
    }

    let mut adapter = Adapter::start_from_env();

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut session, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Logs go to a file so they never scribble over the game.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

struct Toast {
    text: &'static str,
    remaining_ms: u32,
}

#[derive(Default)]
struct ObservationState {
    seq: u64,
    last_hash: Option<u64>,
    last_sent: Option<Instant>,
}

fn run(
    term: &mut TerminalRenderer,
    session: &mut GameSession,
    mut adapter: Option<&mut Adapter>,
) -> Result<()> {
    let view = GameView::default();
    let mut cursor = ColumnCursor::new();
    let mut toast: Option<Toast> = None;
    let mut fb = FrameBuffer::new(0, 0);
    let mut snapshot = LevelSnapshot::default();
    let mut observations = ObservationState::default();

    let tick_duration = Duration::from_millis(u64::from(TICK_MS));
    let mut last_tick = Instant::now();

    loop {
        session.snapshot_into(&mut snapshot);

        if let Some(adapter) = adapter.as_deref_mut() {
            while let Some(cmd) = adapter.try_recv() {
                let reply = apply_remote(session, &mut cursor, cmd);
                adapter.send(reply);
            }
            session.snapshot_into(&mut snapshot);
            publish_observation(adapter, session, &snapshot, &mut observations);
        }

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let adapter_view = adapter.as_deref().map(|a| AdapterStatusView {
            client_count: a.stats().client_count(),
            controller_id: a.stats().controller_id(),
            streaming_count: a.stats().streaming_count(),
        });
        let hud = Hud {
            level_index: session.level_index(),
            level_count: session.level_count(),
            cursor: cursor.column(),
            toast: toast.as_ref().map(|t| t.text),
            adapter: adapter_view.as_ref(),
        };
        view.render_into(&snapshot, &hud, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        match apply_action(session, &mut cursor, action) {
                            Ok(()) => {}
                            Err(ActionError::Load(e)) => log::error!("could not load level: {e}"),
                            Err(e) => log::debug!("{} rejected: {e}", action.as_str()),
                        }
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            session.tick(TICK_MS);
            if let Some(t) = toast.as_mut() {
                t.remaining_ms = t.remaining_ms.saturating_sub(TICK_MS);
            }
            if toast.as_ref().is_some_and(|t| t.remaining_ms == 0) {
                toast = None;
            }
        }

        let level_number = session.level_index() + 1;
        for event in session.drain_events() {
            match event {
                LevelEvent::NoSpaceAvailable => {
                    toast = Some(Toast {
                        text: "No free container!",
                        remaining_ms: TOAST_MS,
                    });
                }
                LevelEvent::TimerWarning { remaining_secs } => {
                    log::info!("{remaining_secs}s left");
                }
                LevelEvent::LevelWon => log::info!("level {level_number} won"),
                LevelEvent::LevelFailed { reason } => {
                    log::info!("level {level_number} failed: {}", reason.as_str());
                }
                _ => {}
            }
        }
    }
}

/// Broadcast when the visible state changed, and once a second regardless so
/// late joiners get a picture.
fn publish_observation(
    adapter: &Adapter,
    session: &GameSession,
    snapshot: &LevelSnapshot,
    state: &mut ObservationState,
) {
    let hash = state_hash(snapshot, session.level_index());
    let stale = state
        .last_sent
        .map_or(true, |at| at.elapsed() >= OBSERVATION_HEARTBEAT);
    if state.last_hash == Some(hash) && !stale {
        return;
    }
    state.seq += 1;
    state.last_hash = Some(hash);
    state.last_sent = Some(Instant::now());
    let obs = build_observation(snapshot, session.level_index(), session.level_count(), state.seq);
    adapter.send(OutboundMessage::Observation(Box::new(obs)));
}
