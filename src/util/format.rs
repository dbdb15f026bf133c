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

/// Formats a duration in seconds into a human-readable `MM:SS` string.
///
/// Used for the slide countdown in the player bar.
///
/// # Arguments
///
/// * `total_seconds` - The duration to format, represented as a 64-bit integer.
pub(crate) fn format_time(total_seconds: u64) -> String {
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Formats the playlist position as one-based `i/N`.
pub(crate) fn format_position(index: Option<usize>, len: usize) -> String {
    match index {
        Some(index) => format!("{}/{}", index + 1, len),
        None => format!("-/{}", len),
    }
}

/// How much of a slide's countdown has elapsed, in `0.0..=1.0`.
///
/// An unknown remaining time (paused, or no countdown) reads as nothing
/// elapsed.
pub(crate) fn countdown_ratio(remaining: Option<u64>, total_secs: u64) -> f64 {
    match remaining {
        Some(remaining) if total_secs > 0 => {
            let elapsed = total_secs.saturating_sub(remaining);
            (elapsed as f64 / total_secs as f64).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}
