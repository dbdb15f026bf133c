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

//! Surface worker and lifecycle notice production.
//!
//! With the `mpv` feature the worker drives `libmpv`, bridging the command
//! channel and MPV's property observation into stamped lifecycle notices.
//! Without it, a headless worker acknowledges loads as playing and never
//! reports an end, so PUSH items stay current until skipped.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`SurfaceCommand`]s from the host.
//! 2. **Event Channel**: Posts [`AppEvent::Surface`] notices and worker
//!    failures back to the host.

use std::{
    sync::mpsc::{Receiver, Sender},
    thread,
};

use crate::{events::AppEvent, playback::Generation};

#[derive(Debug)]
pub(crate) enum SurfaceCommand {
    Load {
        source_ref: String,
        generation: Generation,
        should_play: bool,
    },
    SetPaused(bool),
    Stop,
}

/// Spawns the surface worker thread to process commands.
///
/// If the internal worker returns an error, it is caught here and broadcast as
/// a fatal application event.
///
/// # Arguments
///
/// * `command_rx` - The receiving end of the surface command channel.
/// * `event_tx` - The channel used to post notices and errors.
pub(crate) fn spawn_surface_worker(command_rx: Receiver<SurfaceCommand>, event_tx: Sender<AppEvent>) {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        if let Err(e) = backend::surface_worker(command_rx, event_tx) {
            let _ = error_tx.send(AppEvent::FatalError(format!("Video surface failure: {:?}", e)));
        }
    });
}

#[cfg(feature = "mpv")]
mod backend {
    use anyhow::{Context, Result};
    use mpv::Format;
    use std::sync::mpsc::{Receiver, Sender};
    use tracing::{debug, info, warn};

    use crate::{
        events::AppEvent,
        playback::{Generation, SurfaceNotice},
        player::commands::SurfaceCommand,
    };

    /// Error code reported for any media MPV could not play.
    const PLAYBACK_ERROR_CODE: i64 = 5;

    /// Which load the worker is reporting for.
    ///
    /// A load only becomes active once MPV reports the file as loaded, so
    /// late notices from the file it replaced can never pick up the new
    /// generation.
    #[derive(Default)]
    struct Stamps {
        requested: Option<Generation>,
        active: Option<Generation>,
        is_paused: bool,
    }

    /// The primary execution loop for the MPV surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the MPV context fails to initialize or if the
    /// command/event loops encounter an unrecoverable failure.
    pub(super) fn surface_worker(command_rx: Receiver<SurfaceCommand>, event_tx: Sender<AppEvent>) -> Result<()> {
        let mut handler = (|| {
            let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
            builder
                .set_option("idle", "yes")
                .context("Failed to enable idle mode")?;
            builder
                .set_option("keep-open", "no")
                .context("Failed to disable keep-open")?;
            builder.build().context("Failed to build MPV handler")
        })()?;

        handler
            .observe_property::<bool>("pause", 0)
            .context("Failed to observe pause")?;

        let mut stamps = Stamps::default();

        loop {
            if !process_commands(&mut handler, &command_rx, &mut stamps)? {
                info!("Surface command channel closed, stopping MPV worker");
                return Ok(());
            }
            process_mpv_events(&mut handler, &mut stamps, &event_tx)?;
        }
    }

    /// Drains and executes all pending commands, returning false once the
    /// host has gone away.
    fn process_commands(
        handler: &mut mpv::MpvHandler,
        command_rx: &Receiver<SurfaceCommand>,
        stamps: &mut Stamps,
    ) -> Result<bool> {
        loop {
            let command = match command_rx.try_recv() {
                Ok(command) => command,
                Err(std::sync::mpsc::TryRecvError::Empty) => return Ok(true),
                Err(std::sync::mpsc::TryRecvError::Disconnected) => return Ok(false),
            };

            match command {
                SurfaceCommand::Load {
                    source_ref,
                    generation,
                    should_play,
                } => {
                    stamps.requested = Some(generation);
                    stamps.active = None;
                    handler
                        .set_property("pause", !should_play)
                        .context("Failed to set pause")?;
                    handler
                        .command(&["loadfile", &source_ref, "replace"])
                        .context(format!("Failed to load: {}", &source_ref))?;
                }
                SurfaceCommand::SetPaused(paused) => {
                    handler
                        .set_property("pause", paused)
                        .context("Failed to set pause")?;
                }
                SurfaceCommand::Stop => {
                    stamps.requested = None;
                    stamps.active = None;
                    handler.command(&["stop"]).context("Failed to stop")?;
                }
            }
        }
    }

    /// Polls for MPV events and turns them into stamped notices.
    ///
    /// This function waits for up to 50ms for an event from the MPV context.
    fn process_mpv_events(
        handler: &mut mpv::MpvHandler,
        stamps: &mut Stamps,
        event_tx: &Sender<AppEvent>,
    ) -> Result<()> {
        let Some(mpv_event) = handler.wait_event(0.05) else {
            return Ok(());
        };

        let notice = match mpv_event {
            mpv::Event::FileLoaded => {
                stamps.active = stamps.requested.take();
                stamps.active.map(|generation| {
                    if stamps.is_paused {
                        SurfaceNotice::paused(generation)
                    } else {
                        SurfaceNotice::playing(generation)
                    }
                })
            }
            mpv::Event::PropertyChange { name: "pause", change: Format::Flag(paused), .. } => {
                stamps.is_paused = paused;
                stamps.active.map(|generation| {
                    if paused {
                        SurfaceNotice::paused(generation)
                    } else {
                        SurfaceNotice::playing(generation)
                    }
                })
            }
            mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_EOF)) => {
                stamps.active.take().map(SurfaceNotice::ended)
            }
            mpv::Event::EndFile(Ok(mpv::EndFileReason::MPV_END_FILE_REASON_ERROR)) | mpv::Event::EndFile(Err(_)) => {
                // A load that never became active failed outright
                let generation = stamps.active.take().or_else(|| stamps.requested.take());
                if generation.is_some() {
                    warn!("MPV could not play the current source");
                }
                generation.map(|generation| SurfaceNotice::error(generation, PLAYBACK_ERROR_CODE))
            }
            _ => None,
        };

        if let Some(notice) = notice {
            debug!("Surface notice {} {}", notice.generation, notice.payload);
            event_tx
                .send(AppEvent::Surface(notice))
                .context("Failed to send surface notice")?;
        }

        Ok(())
    }
}

#[cfg(not(feature = "mpv"))]
mod backend {
    use anyhow::{Context, Result};
    use std::sync::mpsc::{Receiver, Sender};
    use tracing::info;

    use crate::{
        events::AppEvent,
        playback::{Generation, SurfaceNotice},
        player::commands::SurfaceCommand,
    };

    /// A surface with no video backend.
    ///
    /// Loads are acknowledged so the rest of the application behaves, but
    /// nothing is ever rendered and no item ever ends on its own.
    pub(super) fn surface_worker(command_rx: Receiver<SurfaceCommand>, event_tx: Sender<AppEvent>) -> Result<()> {
        info!("Built without the mpv feature, video items will not render");

        let mut active: Option<Generation> = None;

        while let Ok(command) = command_rx.recv() {
            let notice = match command {
                SurfaceCommand::Load {
                    source_ref,
                    generation,
                    should_play,
                } => {
                    info!("Headless surface showing {}", source_ref);
                    active = Some(generation);
                    should_play.then(|| SurfaceNotice::playing(generation))
                }
                SurfaceCommand::SetPaused(paused) => active.map(|generation| {
                    if paused {
                        SurfaceNotice::paused(generation)
                    } else {
                        SurfaceNotice::playing(generation)
                    }
                }),
                SurfaceCommand::Stop => {
                    active = None;
                    None
                }
            };

            if let Some(notice) = notice {
                event_tx
                    .send(AppEvent::Surface(notice))
                    .context("Failed to send surface notice")?;
            }
        }

        Ok(())
    }
}
