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

//! Playlist playback orchestration.
//!
//! This module decides, at every moment, which playlist item is current,
//! whether it is playing, and when to move on. It reconciles asynchronous
//! signals from two very different kinds of embed surface into one state
//! machine.
//!
//! # Organization
//!
//! * [`signals`]: Normalizes raw surface notices and countdown expiry into
//!   [`CanonicalEvent`]s.
//! * [`timer`]: The single fallback countdown for items without lifecycle
//!   reporting.
//! * [`policy`]: Pure state transitions.
//! * [`controller`]: The [`Orchestrator`] wiring it all together.
//!
//! Every asynchronous input is stamped with a [`Generation`]. The generation
//! moves on whenever the current item changes, and any input stamped with an
//! older one is discarded before it can touch state.

pub(crate) mod controller;
pub(crate) mod policy;
pub(crate) mod signals;
pub(crate) mod timer;

use std::{fmt, time::Duration};

use crate::{
    config::AppConfig,
    model::{Cursor, PlaylistItem},
};

pub(crate) use controller::Orchestrator;
pub(crate) use signals::SurfaceNotice;

/// The epoch of the current item.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub(crate) struct Generation(u64);

impl Generation {
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// The only vocabulary the advance policy understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CanonicalEvent {
    Ended,
    Errored,
    Resumed,
    PausedExternally,
}

/// A canonical event together with the generation it was produced under.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct StampedEvent {
    pub(crate) generation: Generation,
    pub(crate) event: CanonicalEvent,
}

impl StampedEvent {
    pub(crate) fn new(generation: Generation, event: CanonicalEvent) -> Self {
        Self { generation, event }
    }
}

/// Canonical playback state, only present while the playlist is non-empty.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct PlaybackState {
    pub(crate) cursor: Cursor,
    pub(crate) is_playing: bool,
    pub(crate) loop_enabled: bool,
    pub(crate) generation: Generation,
}

impl PlaybackState {
    pub(crate) fn current_index(&self) -> usize {
        self.cursor.index()
    }
}

/// Tunables for the orchestrator, usually derived from [`AppConfig`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlaybackSettings {
    pub(crate) settle_delay: Duration,
    pub(crate) slide_duration_secs: u64,
    pub(crate) loop_enabled: bool,
    pub(crate) autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(300),
            slide_duration_secs: 30,
            loop_enabled: true,
            autoplay: true,
        }
    }
}

impl From<&AppConfig> for PlaybackSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            slide_duration_secs: config.slide_duration_secs.max(1),
            loop_enabled: config.loop_enabled,
            autoplay: config.autoplay,
        }
    }
}

/// What the host needs to know after the orchestrator changed something.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PlaybackNotice {
    /// Render `item`; surfaces must stamp their notices with `generation`.
    Load {
        item: PlaylistItem,
        generation: Generation,
        should_play: bool,
    },
    /// The play state flipped.
    ///
    /// `surface` names the PUSH item whose surface must be told, and is only
    /// set when the change did not come from that surface in the first place.
    PlayStateChanged {
        is_playing: bool,
        surface: Option<Generation>,
    },
    LoopChanged(bool),
    /// A non-looping playlist played its last item.
    Finished,
    /// The supplied playlist has no items.
    Empty,
    /// The current item was torn down and nothing replaces it yet.
    Unloaded,
}

/// A read-only view of the orchestrator for rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PlaybackSnapshot {
    pub(crate) current_item: Option<PlaylistItem>,
    pub(crate) current_index: Option<usize>,
    pub(crate) is_playing: bool,
    pub(crate) loop_enabled: bool,
    pub(crate) remaining_time: Option<u64>,
    pub(crate) len: usize,
}
