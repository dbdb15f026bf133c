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

//! Unicode symbols for the TUI.

// Playback state
pub(crate) const ICON_PLAY: &str = "\u{25B6}";
pub(crate) const ICON_PAUSE: &str = "\u{23F8}";
pub(crate) const ICON_STOP: &str = "\u{23F9}";

// Variation Selector-15 [\u{FE0E}] keeps these monochrome so they take the
// theme colours.
pub(crate) const ICON_LOOP: &str = "\u{1F501}\u{FE0E}";
pub(crate) const ICON_FULLSCREEN: &str = "\u{26F6}\u{FE0E}";

// Item kinds
pub(crate) const ICON_VIDEO: &str = "\u{25A3}";
pub(crate) const ICON_SLIDES: &str = "\u{25A4}";
