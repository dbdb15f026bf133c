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
use tracing::{debug, warn};

use crate::{
    App,
    model::SourceKind,
    playback::{PlaybackNotice, SurfaceNotice},
    presentation::Orientation,
};

pub(super) fn handle_surface_notice(app: &mut App, notice: SurfaceNotice, now: Instant) {
    app.orchestrator.handle_notice(&notice, now);
}

pub(super) fn handle_resize(app: &mut App, cols: u16, rows: u16) {
    app.presentation
        .on_orientation_changed(Orientation::from_cells(cols, rows));
}

pub(super) fn handle_fullscreen_changed(app: &mut App, is_fullscreen: bool) {
    app.presentation.on_fullscreen_changed(is_fullscreen);
}

pub(super) fn handle_error(app: &mut App, message: String) {
    warn!("{}", message);
    app.status = Some(message);
}

/// Routes everything the orchestrator reported to the surface and the
/// presentation adapter.
///
/// The presentation adapter only ever hears about play state, it has no say
/// in what plays.
pub(super) fn dispatch_notices(app: &mut App) -> Result<()> {
    let notices: Vec<PlaybackNotice> = app.notice_rx.try_iter().collect();

    for notice in notices {
        debug!("Playback notice {:?}", notice);

        match notice {
            PlaybackNotice::Load {
                item,
                generation,
                should_play,
            } => {
                app.finished = false;
                match item.source_kind {
                    SourceKind::Push => app.surface.load(&item.source_ref, generation, should_play)?,
                    SourceKind::Timed => app.surface.stop()?,
                }
            }
            PlaybackNotice::PlayStateChanged { is_playing, surface } => {
                // A newer item may have been loaded since, and it starts in
                // the right state by itself
                if let Some(generation) = surface.filter(|g| app.orchestrator.generation() == Some(*g)) {
                    app.surface.set_paused(!is_playing)?;
                    debug!("Surface for {} told to {}", generation, if is_playing { "play" } else { "pause" });
                }
                if is_playing {
                    app.finished = false;
                }
                app.presentation.on_playback_changed(is_playing);
            }
            PlaybackNotice::LoopChanged(_) => {}
            PlaybackNotice::Finished => {
                app.finished = true;
                app.presentation.on_playback_finished();
            }
            PlaybackNotice::Empty | PlaybackNotice::Unloaded => app.surface.stop()?,
        }
    }

    Ok(())
}
