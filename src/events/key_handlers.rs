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

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{App, events::AppEvent};

/// Maps keyboard input to the orchestrator's control surface.
///
/// # Arguments
///
/// * `app` - A mutable reference to the application state.
/// * `key` - The key event captured from the terminal backend.
/// * `now` - When the key event is being handled.
///
/// # Errors
///
/// Returns an error if the exit request cannot be posted.
pub(super) fn process_key_event(app: &mut App, key: KeyEvent, now: Instant) -> Result<()> {
    if key.kind == KeyEventKind::Release {
        return Ok(());
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.event_tx.send(AppEvent::ExitApplication)?;
        }

        (KeyCode::Char(' '), _) => app.orchestrator.toggle(now),
        (KeyCode::Char('p'), _) => app.orchestrator.play(now),
        (KeyCode::Char('s'), _) => app.orchestrator.pause(now),

        (KeyCode::Char('n'), _) | (KeyCode::Right, _) => app.orchestrator.skip_next(now),
        (KeyCode::Char('b'), _) | (KeyCode::Left, _) => app.orchestrator.skip_previous(now),

        (KeyCode::Char('l'), _) => app.orchestrator.toggle_loop(),

        (KeyCode::Esc, _) => app.status = None,

        _ => {}
    }

    Ok(())
}
