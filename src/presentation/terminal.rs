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

//! Terminal emulator display capabilities.
//!
//! Fullscreen is requested with the XTerm window manipulation sequence
//! (`CSI 10 ; Ps t`). Terminals that do not understand it simply ignore it,
//! so a successful write is the best confirmation available.
//!
//! # Compatibility
//!
//! XTerm and several of its descendants honour the sequence, many modern
//! terminals do not. Terminals have no notion of orientation locking.

use std::{
    io::{self, Write},
    sync::mpsc::Sender,
};

use crossterm::{execute, style::Print};

use crate::{
    events::AppEvent,
    presentation::{CapabilityError, DisplayCapabilities, Orientation},
};

const ENTER_FULLSCREEN: &str = "\x1b[10;1t";
const EXIT_FULLSCREEN: &str = "\x1b[10;0t";

pub(crate) struct TerminalDisplay {
    /// Channel used to post fullscreen change notifications.
    event_tx: Sender<AppEvent>,
}

impl TerminalDisplay {
    pub(crate) fn new(event_tx: Sender<AppEvent>) -> Self {
        Self { event_tx }
    }

    fn set_fullscreen(&mut self, sequence: &str, is_fullscreen: bool) -> Result<(), CapabilityError> {
        let mut stdout = io::stdout();
        execute!(stdout, Print(sequence))?;
        stdout.flush()?;

        self.event_tx
            .send(AppEvent::FullscreenChanged(is_fullscreen))
            .map_err(|e| CapabilityError::Rejected(e.to_string()))
    }
}

impl DisplayCapabilities for TerminalDisplay {
    fn request_fullscreen(&mut self) -> Result<(), CapabilityError> {
        self.set_fullscreen(ENTER_FULLSCREEN, true)
    }

    fn exit_fullscreen(&mut self) -> Result<(), CapabilityError> {
        self.set_fullscreen(EXIT_FULLSCREEN, false)
    }

    fn lock_orientation(&mut self, _orientation: Orientation) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }

    fn unlock_orientation(&mut self) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }
}
