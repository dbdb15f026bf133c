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

//! Best-effort display adaptation.
//!
//! The [`PresentationAdapter`] tries to go fullscreen and lock a landscape
//! orientation when playback starts, and follows device orientation changes
//! while playing. None of this is required for correct playback: every
//! platform call goes through [`DisplayCapabilities`], and every failure stops
//! at this module's boundary.

mod terminal;

pub(crate) use terminal::TerminalDisplay;

use thiserror::Error;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    /// Derives an orientation from a terminal size in character cells.
    ///
    /// Cells are roughly twice as tall as they are wide, hence the factor.
    pub(crate) fn from_cells(cols: u16, rows: u16) -> Self {
        if u32::from(cols) >= 2 * u32::from(rows) {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum CapabilityError {
    #[error("capability not supported on this platform")]
    Unsupported,

    #[error("platform rejected the request: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform display capabilities, each of which may be absent.
pub(crate) trait DisplayCapabilities {
    fn request_fullscreen(&mut self) -> Result<(), CapabilityError>;
    fn exit_fullscreen(&mut self) -> Result<(), CapabilityError>;
    fn lock_orientation(&mut self, orientation: Orientation) -> Result<(), CapabilityError>;
    fn unlock_orientation(&mut self) -> Result<(), CapabilityError>;
}

impl<C: DisplayCapabilities + ?Sized> DisplayCapabilities for Box<C> {
    fn request_fullscreen(&mut self) -> Result<(), CapabilityError> {
        (**self).request_fullscreen()
    }

    fn exit_fullscreen(&mut self) -> Result<(), CapabilityError> {
        (**self).exit_fullscreen()
    }

    fn lock_orientation(&mut self, orientation: Orientation) -> Result<(), CapabilityError> {
        (**self).lock_orientation(orientation)
    }

    fn unlock_orientation(&mut self) -> Result<(), CapabilityError> {
        (**self).unlock_orientation()
    }
}

/// A platform with no display capabilities at all.
#[derive(Debug, Default)]
pub(crate) struct Unsupported;

impl DisplayCapabilities for Unsupported {
    fn request_fullscreen(&mut self) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }

    fn exit_fullscreen(&mut self) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }

    fn lock_orientation(&mut self, _orientation: Orientation) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }

    fn unlock_orientation(&mut self) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported)
    }
}

/// Runs a capability call, logging and discarding any failure.
fn guarded(action: &str, result: Result<(), CapabilityError>) {
    if let Err(e) = result {
        debug!("Display {} unavailable: {}", action, e);
    }
}

pub(crate) struct PresentationAdapter<C: DisplayCapabilities> {
    capabilities: C,
    attached: bool,
    is_playing: bool,
    is_fullscreen: bool,
    orientation: Orientation,
}

impl<C: DisplayCapabilities> PresentationAdapter<C> {
    pub(crate) fn new(capabilities: C) -> Self {
        Self {
            capabilities,
            attached: false,
            is_playing: false,
            is_fullscreen: false,
            orientation: Orientation::default(),
        }
    }

    /// Starts reacting to playback and device notifications.
    pub(crate) fn attach(&mut self, orientation: Orientation) {
        self.attached = true;
        self.orientation = orientation;
    }

    /// Stops reacting and gives back anything requested from the platform.
    ///
    /// Safe to call more than once.
    pub(crate) fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.is_playing = false;

        guarded("orientation unlock", self.capabilities.unlock_orientation());
        if self.is_fullscreen {
            guarded("fullscreen exit", self.capabilities.exit_fullscreen());
        }
    }

    pub(crate) fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    #[cfg(test)]
    pub(crate) fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Reacts to playback starting or stopping.
    pub(crate) fn on_playback_changed(&mut self, is_playing: bool) {
        if !self.attached || self.is_playing == is_playing {
            return;
        }
        self.is_playing = is_playing;

        if is_playing {
            guarded("fullscreen request", self.capabilities.request_fullscreen());
            guarded("orientation lock", self.capabilities.lock_orientation(Orientation::Landscape));
        }
    }

    /// Reacts to the playlist running out.
    pub(crate) fn on_playback_finished(&mut self) {
        if !self.attached {
            return;
        }
        self.is_playing = false;

        guarded("orientation unlock", self.capabilities.unlock_orientation());
        guarded("fullscreen exit", self.capabilities.exit_fullscreen());
    }

    /// Follows the device: landscape while playing means fullscreen, portrait
    /// means windowed.
    pub(crate) fn on_orientation_changed(&mut self, orientation: Orientation) {
        if !self.attached || self.orientation == orientation {
            return;
        }
        self.orientation = orientation;

        if !self.is_playing {
            return;
        }

        match orientation {
            Orientation::Landscape => {
                guarded("fullscreen request", self.capabilities.request_fullscreen())
            }
            Orientation::Portrait => guarded("fullscreen exit", self.capabilities.exit_fullscreen()),
        }
    }

    /// Records a fullscreen change reported by the platform.
    pub(crate) fn on_fullscreen_changed(&mut self, is_fullscreen: bool) {
        self.is_fullscreen = is_fullscreen;
    }
}

impl<C: DisplayCapabilities> Drop for PresentationAdapter<C> {
    fn drop(&mut self) {
        self.detach();
    }
}
