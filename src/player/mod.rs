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

//! Video embed surface for PUSH items.
//!
//! This module provides the [`VideoSurface`] handle the host uses to show the
//! current PUSH item. It manages a background worker thread that interfaces
//! with the video backend, so that loading remote media never blocks the main
//! event loop.
//!
//! The worker reports lifecycle changes back as [`SurfaceNotice`]s, each
//! stamped with the generation the item was loaded under.
//!
//! [`SurfaceNotice`]: crate::playback::SurfaceNotice

mod commands;

use std::sync::mpsc;

use anyhow::Result;

use crate::{events::AppEvent, player::commands::SurfaceCommand, playback::Generation};

/// A handle to the video surface.
///
/// This struct acts as a command proxy; it does not render anything itself
/// but instead sends instructions to a background worker thread.
pub(crate) struct VideoSurface {
    /// Channel for sending commands to the background worker thread.
    command_tx: mpsc::Sender<SurfaceCommand>,
}

impl VideoSurface {
    /// Spawns the surface worker thread and returns a new handle.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - A channel to send lifecycle notices and worker failures
    ///   back to the main event loop.
    pub(crate) fn new(event_tx: mpsc::Sender<AppEvent>) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel::<SurfaceCommand>();

        commands::spawn_surface_worker(command_rx, event_tx);

        Ok(Self { command_tx })
    }

    /// Instructs the worker to show a source.
    ///
    /// # Arguments
    ///
    /// * `source_ref` - Location of the media, anything the backend can open.
    /// * `generation` - Stamp for every notice about this source.
    /// * `should_play` - Start playing straight away, or load paused.
    pub(crate) fn load(&self, source_ref: &str, generation: Generation, should_play: bool) -> Result<()> {
        self.command_tx.send(SurfaceCommand::Load {
            source_ref: source_ref.to_string(),
            generation,
            should_play,
        })?;
        Ok(())
    }

    pub(crate) fn set_paused(&self, paused: bool) -> Result<()> {
        self.command_tx.send(SurfaceCommand::SetPaused(paused))?;
        Ok(())
    }

    /// Clears the surface.
    pub(crate) fn stop(&self) -> Result<()> {
        self.command_tx.send(SurfaceCommand::Stop)?;
        Ok(())
    }
}
