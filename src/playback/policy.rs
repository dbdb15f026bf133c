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

//! Advance policy.
//!
//! Pure transitions from one [`PlaybackState`] to the next. Nothing here
//! touches timers, surfaces or the host, which keeps every rule testable in
//! isolation.
//!
//! Every transition that moves the cursor also moves the generation on, so
//! signals still in flight for the item being left can be recognised as
//! stale.

use crate::playback::{CanonicalEvent, PlaybackState};

/// Moves the cursor to `index`, starting a new generation.
fn advance_to(state: &PlaybackState, index: usize) -> PlaybackState {
    PlaybackState {
        cursor: state.cursor.with_index(index),
        generation: state.generation.next(),
        ..*state
    }
}

fn next_index(state: &PlaybackState, len: usize) -> usize {
    (state.current_index() + 1) % len
}

/// Applies a canonical event to `state` for a playlist of `len` items.
pub(crate) fn apply(state: &PlaybackState, len: usize, event: CanonicalEvent) -> PlaybackState {
    if len == 0 {
        return *state;
    }

    match event {
        CanonicalEvent::Ended if !state.is_playing => *state,
        CanonicalEvent::Ended => {
            let at_last = state.current_index() + 1 >= len;
            if at_last && !state.loop_enabled {
                PlaybackState {
                    is_playing: false,
                    ..*state
                }
            } else {
                advance_to(state, next_index(state, len))
            }
        }
        // A broken item must never stall the playlist, loop or not
        CanonicalEvent::Errored => advance_to(state, next_index(state, len)),
        CanonicalEvent::Resumed => set_playing(state, true),
        CanonicalEvent::PausedExternally => set_playing(state, false),
    }
}

pub(crate) fn skip_next(state: &PlaybackState, len: usize) -> PlaybackState {
    if len <= 1 {
        return *state;
    }

    advance_to(state, next_index(state, len))
}

pub(crate) fn skip_previous(state: &PlaybackState, len: usize) -> PlaybackState {
    if len <= 1 {
        return *state;
    }

    let index = (state.current_index() + len - 1) % len;
    advance_to(state, index)
}

pub(crate) fn set_playing(state: &PlaybackState, is_playing: bool) -> PlaybackState {
    PlaybackState {
        is_playing,
        ..*state
    }
}

pub(crate) fn toggle_play_pause(state: &PlaybackState) -> PlaybackState {
    set_playing(state, !state.is_playing)
}

pub(crate) fn toggle_loop(state: &PlaybackState) -> PlaybackState {
    PlaybackState {
        loop_enabled: !state.loop_enabled,
        ..*state
    }
}

/// True if moving from `before` to `after` changed the current item.
pub(crate) fn changes_item(before: &PlaybackState, after: &PlaybackState) -> bool {
    before.generation != after.generation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Cursor, playback::Generation};

    fn state(index: usize, is_playing: bool, loop_enabled: bool) -> PlaybackState {
        PlaybackState {
            cursor: Cursor::default().with_index(index),
            is_playing,
            loop_enabled,
            generation: Generation::new(10),
        }
    }

    #[test]
    fn test_loop_wraps_after_len_ended_events() {
        let len = 4;
        let start = state(1, true, true);

        let mut current = start;
        for _ in 0..len {
            current = apply(&current, len, CanonicalEvent::Ended);
        }

        assert_eq!(current.current_index(), start.current_index());
        assert_eq!(current.generation, Generation::new(14));
        assert!(current.is_playing);
    }

    #[test]
    fn test_ended_at_last_without_loop_stops() {
        let before = state(2, true, false);
        let after = apply(&before, 3, CanonicalEvent::Ended);

        assert_eq!(after.current_index(), 2);
        assert!(!after.is_playing);
        assert_eq!(after.generation, before.generation);
        assert!(!changes_item(&before, &after));
    }

    #[test]
    fn test_ended_while_paused_is_noop() {
        let before = state(0, false, true);
        assert_eq!(apply(&before, 3, CanonicalEvent::Ended), before);
    }

    #[test]
    fn test_error_advances_past_non_looping_boundary() {
        let before = state(2, true, false);
        let after = apply(&before, 3, CanonicalEvent::Errored);

        assert_eq!(after.current_index(), 0);
        assert!(after.is_playing);
        assert_eq!(after.generation, before.generation.next());
    }

    #[test]
    fn test_external_play_pause_only_touch_flag() {
        let before = state(1, true, true);

        let paused = apply(&before, 3, CanonicalEvent::PausedExternally);
        assert!(!paused.is_playing);
        assert_eq!(paused.generation, before.generation);
        assert_eq!(paused.current_index(), 1);

        let resumed = apply(&paused, 3, CanonicalEvent::Resumed);
        assert_eq!(resumed, before);
    }

    #[test]
    fn test_single_item_loop_replays_under_new_generation() {
        let before = state(0, true, true);
        let after = apply(&before, 1, CanonicalEvent::Ended);

        assert_eq!(after.current_index(), 0);
        assert!(changes_item(&before, &after));
    }

    #[test]
    fn test_skips_wrap_in_both_directions() {
        let first = state(0, true, false);
        assert_eq!(skip_previous(&first, 3).current_index(), 2);

        let last = state(2, true, false);
        let wrapped = skip_next(&last, 3);
        assert_eq!(wrapped.current_index(), 0);
        assert_eq!(wrapped.generation, last.generation.next());
    }

    #[test]
    fn test_skips_are_noops_for_short_playlists() {
        let only = state(0, true, true);

        assert_eq!(skip_next(&only, 1), only);
        assert_eq!(skip_previous(&only, 1), only);
        assert_eq!(skip_next(&only, 0), only);
    }

    #[test]
    fn test_toggles_keep_generation() {
        let before = state(1, true, true);

        let toggled = toggle_play_pause(&toggle_loop(&before));
        assert!(!toggled.is_playing);
        assert!(!toggled.loop_enabled);
        assert_eq!(toggled.generation, before.generation);
    }
}
