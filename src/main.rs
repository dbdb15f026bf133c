// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! # Showreel.
//!
//! A terminal playlist player that runs a stored sequence of videos and slide
//! presentations back to back.
//!
//! The application coordinates a TUI frontend built with `ratatui`, a video
//! surface worker, and the playback orchestrator that decides what is on
//! screen.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** owns the orchestrator, manages the terminal lifecycle
//!   and renders the UI.
//! * The **Surface Worker** drives the video backend and reports lifecycle
//!   notices back as events.
//! * **Event Loops** capture user input and clock ticks, the ticks being what
//!   lets slide countdowns and settle delays run out.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of a crash. Communication
//! between the UI and background workers is handled via `std::sync::mpsc`
//! channels.
//!
//! Playlist maintenance (`list`, `add`, `edit`, `remove`) runs without the
//! TUI and prints to standard output.

mod config;
mod db;
mod events;
mod model;
mod playback;
mod player;
mod presentation;
mod render;
mod theme;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{self as term, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rusqlite::Connection;
use std::{
    fs::OpenOptions,
    io::{self},
    sync::{
        Mutex,
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::{Duration, Instant},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    config::AppConfig,
    db::{ItemChanges, NewItem},
    events::{AppEvent, process_events},
    model::{Playlist, PlaylistItem, SourceKind},
    playback::{Orchestrator, PlaybackNotice, PlaybackSettings},
    player::VideoSurface,
    presentation::{DisplayCapabilities, Orientation, PresentationAdapter, TerminalDisplay, Unsupported},
    theme::Theme,
};

/// Redraw period. Countdowns and settle delays wake the event loop by
/// themselves.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(name = "showreel")]
#[command(about = "Terminal playlist player for videos and slide presentations", long_about = None)]
struct Args {
    /// Owner whose playlist is used (overrides the configured owner)
    #[arg(short, long)]
    owner: Option<String>,

    /// Name of the configuration to load
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the owner's playlist (the default)
    Play,

    /// List the owner's playlist, newest first
    List,

    /// Add an item to the owner's playlist
    Add {
        #[arg(short, long)]
        title: String,

        /// Either `push` (video) or `timed` (slides)
        #[arg(short, long)]
        kind: SourceKind,

        /// Video URL/path, or slide deck reference
        #[arg(short, long)]
        source: String,
    },

    /// Change an item in the owner's playlist
    Edit {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        kind: Option<SourceKind>,

        #[arg(short, long)]
        source: Option<String>,
    },

    /// Remove an item from the owner's playlist
    Remove { id: i64 },
}

/// Application state.
struct App {
    pub theme: Theme,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub notice_rx: Receiver<PlaybackNotice>,

    pub orchestrator: Orchestrator,
    pub surface: VideoSurface,
    pub presentation: PresentationAdapter<Box<dyn DisplayCapabilities>>,

    pub owner_id: String,
    pub slide_duration_secs: u64,
    pub status: Option<String>,
    pub finished: bool,
}

impl App {
    /// Create a new instance of application state.
    pub fn new(config: &AppConfig, owner_id: String) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();
        let (notice_tx, notice_rx) = mpsc::channel();

        let display: Box<dyn DisplayCapabilities> = if config.display_control {
            Box::new(TerminalDisplay::new(event_tx.clone()))
        } else {
            Box::new(Unsupported)
        };

        Ok(Self {
            theme: Theme::default(),
            surface: VideoSurface::new(event_tx.clone())?,
            presentation: PresentationAdapter::new(display),
            orchestrator: Orchestrator::new(PlaybackSettings::from(config), notice_tx),
            event_tx,
            event_rx,
            notice_rx,
            owner_id,
            slide_duration_secs: config.slide_duration_secs.max(1),
            status: None,
            finished: false,
        })
    }
}

/// The entry point of the application.
///
/// Loads configuration, starts logging, opens the store and then either runs
/// one playlist maintenance command or the player itself.
fn main() -> Result<()> {
    let args = Args::parse();

    let (config, fallback) = config::load_config(args.config.as_deref());
    init_tracing(&config)?;
    if let Some(fallback) = fallback {
        fallback.log();
    }

    let owner_id = args.owner.unwrap_or_else(|| config.owner_id.clone());
    let conn = db::init_db(&config.database_file).context("Failed to open playlist store")?;

    match args.command.unwrap_or(Command::Play) {
        Command::Play => play(&config, &conn, owner_id),
        Command::List => {
            for item in db::list(&conn, &owner_id)? {
                print_item(&item);
            }
            Ok(())
        }
        Command::Add { title, kind, source } => {
            let item = NewItem {
                title,
                source_kind: kind,
                source_ref: source,
            };
            print_item(&db::create(&conn, &owner_id, &item)?);
            Ok(())
        }
        Command::Edit {
            id,
            title,
            kind,
            source,
        } => {
            let changes = ItemChanges {
                title,
                source_kind: kind,
                source_ref: source,
            };
            print_item(&db::update(&conn, &owner_id, id, &changes)?);
            Ok(())
        }
        Command::Remove { id } => {
            db::delete(&conn, &owner_id, id)?;
            println!("Removed {}", id);
            Ok(())
        }
    }
}

fn print_item(item: &PlaylistItem) {
    println!("{:>6}  {:<5}  {}  ({})", item.id, item.source_kind, item.title, item.source_ref);
}

/// Routes `tracing` output to the configured log file.
///
/// The terminal belongs to the TUI, so nothing is ever logged to it. Filtering
/// follows `RUST_LOG`, falling back to `showreel=info`.
fn init_tracing(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file '{}'", config.log_file))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("showreel=info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// Plays the owner's playlist in the TUI until the user quits.
fn play(config: &AppConfig, conn: &Connection, owner_id: String) -> Result<()> {
    let items = db::list(conn, &owner_id)?;
    info!("Playing {} item(s) for owner '{}'", items.len(), owner_id);

    let mut app = App::new(config, owner_id).context("Failed to initalise application")?;

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, &mut app, Playlist::new(items));

    app.presentation.detach();
    app.orchestrator.dispose();
    restore_terminal(&mut terminal);

    if let Err(e) = &res {
        error!("Application error: {:#}", e);
    }

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// This reverses the changes made by [`setup_terminal`] and makes the cursor
/// visible again. It is best-effort and does not return a result, as it runs
/// during cleanup.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
}

/// Starts the input and clock threads, loads the playlist and enters the main
/// event loop.
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App, playlist: Playlist) -> Result<()> {
    // Spawn a thread to translate raw terminal events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || while forward_terminal_event(event::read(), &tx_keys) {});

    // The tick is the minimum "frame rate" for the TUI.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    let orientation = term::size()
        .map(|(cols, rows)| Orientation::from_cells(cols, rows))
        .unwrap_or_default();
    app.presentation.attach(orientation);

    app.orchestrator.load(playlist, Instant::now());

    process_events(terminal, app)
}

/// Forwards one raw terminal event to the main loop.
///
/// Returns `false` once input should stop being read. A failed read is
/// reported once and ends input, a broken terminal will not recover.
fn forward_terminal_event(read: io::Result<Event>, tx: &Sender<AppEvent>) -> bool {
    let sent = match read {
        Ok(Event::Key(key)) => tx.send(AppEvent::Key(key)),
        Ok(Event::Resize(cols, rows)) => tx.send(AppEvent::Resize(cols, rows)),
        Ok(_) => Ok(()),
        Err(e) => {
            tx.send(AppEvent::Error(format!("Terminal input failed: {}", e))).ok();
            return false;
        }
    };

    sent.is_ok()
}
