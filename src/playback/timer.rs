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

//! Fallback countdown for items that cannot report their own end.
//!
//! The countdown is driven by the host calling [`TimerGuard::poll`] with the
//! current time, there is no background timer thread to leak. Cancelling is
//! simply dropping the live countdown.

use std::time::{Duration, Instant};

use crate::{model::SourceKind, playback::Generation};

pub(crate) const COUNTDOWN_UNIT: Duration = Duration::from_secs(1);

/// Returns the fallback countdown, in seconds, for an item of `kind`.
///
/// PUSH items wait for their real end-of-playback notice, however long it
/// takes.
pub(crate) fn fallback_duration(kind: SourceKind, slide_duration_secs: u64) -> Option<u64> {
    match kind {
        SourceKind::Push => None,
        SourceKind::Timed => Some(slide_duration_secs),
    }
}

#[derive(Debug)]
struct Countdown {
    generation: Generation,
    remaining: u64,
    next_tick: Instant,
}

/// Owns at most one live countdown.
#[derive(Debug, Default)]
pub(crate) struct TimerGuard {
    live: Option<Countdown>,
}

impl TimerGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Starts a countdown of `seconds` for `generation`.
    ///
    /// Any countdown already running is cancelled first.
    pub(crate) fn arm(&mut self, generation: Generation, seconds: u64, now: Instant) {
        self.cancel();
        self.live = Some(Countdown {
            generation,
            remaining: seconds,
            next_tick: now + COUNTDOWN_UNIT,
        });
    }

    /// Cancels the live countdown, returning the seconds it had left.
    ///
    /// Calling this with nothing armed is a no-op.
    pub(crate) fn cancel(&mut self) -> Option<u64> {
        self.live.take().map(|countdown| countdown.remaining)
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.live.is_some()
    }

    pub(crate) fn remaining(&self) -> Option<u64> {
        self.live.as_ref().map(|countdown| countdown.remaining)
    }

    #[cfg(test)]
    pub(crate) fn generation(&self) -> Option<Generation> {
        self.live.as_ref().map(|countdown| countdown.generation)
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.live.as_ref().map(|countdown| countdown.next_tick)
    }

    /// Applies every countdown unit elapsed by `now`.
    ///
    /// Returns the generation of the countdown if it reached zero, in which
    /// case the countdown is gone and will never fire again.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<Generation> {
        let countdown = self.live.as_mut()?;

        while countdown.remaining > 0 && now >= countdown.next_tick {
            countdown.remaining -= 1;
            countdown.next_tick += COUNTDOWN_UNIT;
        }

        if countdown.remaining == 0 {
            return self.live.take().map(|countdown| countdown.generation);
        }

        None
    }
}
