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

//! Domain models and core data structures.
//!
//! This module defines the playlist items curated by an owner, and the
//! immutable [`Playlist`] the playback orchestrator walks through with a
//! [`Cursor`].

use std::{fmt, str::FromStr};

/// How an item reports its own lifecycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SourceKind {
    /// An embedded video that pushes play, pause, end and error notices.
    Push,
    /// A slide presentation with no lifecycle reporting, ended by a countdown.
    Timed,
}

impl SourceKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Push => "push",
            SourceKind::Timed => "timed",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "push" | "video" => Ok(SourceKind::Push),
            "timed" | "slides" => Ok(SourceKind::Timed),
            other => Err(format!("unknown source kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct PlaylistItem {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) source_kind: SourceKind,
    pub(crate) source_ref: String,
}

/// An ordered, read-only sequence of items for one playback session.
///
/// A new list from the host replaces the old one wholesale, it is never
/// edited in place.
#[derive(Debug, Clone, Default)]
pub(crate) struct Playlist {
    items: Vec<PlaylistItem>,
}

impl Playlist {
    pub(crate) fn new(items: Vec<PlaylistItem>) -> Self {
        Self { items }
    }

    pub(crate) fn item_at(&self, index: usize) -> Option<&PlaylistItem> {
        self.items.get(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn items(&self) -> &[PlaylistItem] {
        &self.items
    }
}

/// A position within a playlist.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Cursor {
    index: usize,
}

impl Cursor {
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Returns a cursor at `new_index`, leaving this one untouched.
    pub(crate) fn with_index(self, new_index: usize) -> Self {
        Self { index: new_index }
    }
}

#[cfg(test)]
pub(crate) fn item(id: i64, kind: SourceKind) -> PlaylistItem {
    PlaylistItem {
        id,
        title: format!("item {}", id),
        source_kind: kind,
        source_ref: format!("ref-{}", id),
    }
}
