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

//! Application event distribution and orchestration.
//!
//! This module defines the central event-handling logic for the application,
//! bridging user input (keyboard), background worker updates (the video
//! surface), and the UI rendering pipeline.
//!
//! # Architecture
//!
//! The system follows a reactive event-loop pattern:
//!
//! 1. **Capture**: Events are received via the [`AppEvent`] enum through an
//!    asynchronous channel.
//! 2. **Process**: The [`process_events`] function feeds the event to the
//!    playback orchestrator, lets it catch up with the clock, then routes the
//!    resulting playback notices to the surface and presentation adapter.
//! 3. **Render**: After each event is processed, the UI is re-drawn using the
//!    `ratatui` terminal.
//!
//! Every orchestrator call happens here, on the main thread, one event at a
//! time.

mod handlers;
mod key_handlers;

use handlers::*;
use key_handlers::process_key_event;

use std::{
    io::Stdout,
    sync::mpsc::RecvTimeoutError,
    time::Instant,
};

use anyhow::{Result, anyhow};
use crossterm::event::KeyEvent;
use ratatui::{Terminal, prelude::CrosstermBackend};

use crate::{App, playback::SurfaceNotice, render::draw};

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),

    Surface(SurfaceNotice),
    FullscreenChanged(bool),

    Tick,

    ExitApplication,

    Error(String),
    FatalError(String),
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a 'quit' event is received or the event channel
/// is closed.
///
/// # Errors
///
/// Returns an error if a worker reported a fatal failure, or if drawing or
/// talking to the video surface fails.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    dispatch_notices(app)?;
    terminal.draw(|f| draw(f, app))?;

    while let Some(event) = next_event(app) {
        let now = Instant::now();

        match event {
            AppEvent::ExitApplication => break,
            AppEvent::FatalError(message) => return Err(anyhow!(message)),

            AppEvent::Key(key) => process_key_event(app, key, now)?,
            AppEvent::Resize(cols, rows) => handle_resize(app, cols, rows),
            AppEvent::Surface(notice) => handle_surface_notice(app, notice, now),
            AppEvent::FullscreenChanged(is_fullscreen) => {
                handle_fullscreen_changed(app, is_fullscreen)
            }
            AppEvent::Error(message) => handle_error(app, message),
            AppEvent::Tick => {}
        }

        app.orchestrator.poll(now);
        dispatch_notices(app)?;

        terminal.draw(|f| draw(f, app))?;
    }

    Ok(())
}

/// Waits for the next event, but no longer than the orchestrator's next
/// deadline, so countdowns and settle delays run out on time.
///
/// Returns `None` once every sender is gone.
fn next_event(app: &App) -> Option<AppEvent> {
    let Some(deadline) = app.orchestrator.next_deadline() else {
        return app.event_rx.recv().ok();
    };

    match app
        .event_rx
        .recv_timeout(deadline.saturating_duration_since(Instant::now()))
    {
        Ok(event) => Some(event),
        Err(RecvTimeoutError::Timeout) => Some(AppEvent::Tick),
        Err(RecvTimeoutError::Disconnected) => None,
    }
}
