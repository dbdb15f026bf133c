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

//! The playback orchestrator.
//!
//! [`Orchestrator`] owns the canonical [`PlaybackState`], the
//! [`EventAdapter`] subscription and the [`TimerGuard`] countdown for the
//! current item. It is driven serially by the host event loop through three
//! kinds of input:
//!
//! * **Surface notices**: raw lifecycle payloads from the embed surface
//!   ([`Orchestrator::handle_notice`]).
//! * **Time**: countdown ticks, countdown expiry and the settle delay
//!   ([`Orchestrator::poll`]).
//! * **Control calls**: play, pause, skip and so on from the UI.
//!
//! Anything the host has to act on is reported as a [`PlaybackNotice`] on the
//! channel supplied at construction.
//!
//! Whenever the current item changes, the old subscription and countdown are
//! torn down before the new ones are armed, in the same call.

use std::{
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::{
    model::{Cursor, Playlist, PlaylistItem, SourceKind},
    playback::{
        CanonicalEvent, Generation, PlaybackNotice, PlaybackSettings, PlaybackSnapshot,
        PlaybackState, StampedEvent,
        policy,
        signals::{EventAdapter, SurfaceNotice},
        timer::{self, TimerGuard},
    },
};

/// Where a state change came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Origin {
    /// The control surface, the surface has to be told.
    Control,
    /// A surface notice, countdown or settle commit, the surface already knows.
    Signal,
}

/// An end-of-item decision waiting out the settle delay.
#[derive(Clone, Copy, Debug)]
struct PendingAdvance {
    due: Instant,
    target: PlaybackState,
}

pub(crate) struct Orchestrator {
    settings: PlaybackSettings,
    playlist: Playlist,
    state: Option<PlaybackState>,

    /// Survives playlist replacement so generations stay monotonic.
    last_generation: Generation,
    /// Survives playlist replacement so the loop setting is not lost.
    loop_enabled: bool,

    adapter: EventAdapter,
    timer: TimerGuard,
    /// Seconds left on a countdown suspended by a pause.
    frozen_remaining: Option<u64>,
    pending: Option<PendingAdvance>,

    notice_tx: Sender<PlaybackNotice>,
}

impl Orchestrator {
    /// Creates an orchestrator with no playlist.
    ///
    /// # Arguments
    ///
    /// * `settings` - Settle delay, slide duration and initial flags.
    /// * `notice_tx` - Channel used to report state changes to the host.
    pub(crate) fn new(settings: PlaybackSettings, notice_tx: Sender<PlaybackNotice>) -> Self {
        Self {
            settings,
            playlist: Playlist::default(),
            state: None,
            last_generation: Generation::default(),
            loop_enabled: settings.loop_enabled,
            adapter: EventAdapter::new(),
            timer: TimerGuard::new(),
            frozen_remaining: None,
            pending: None,
            notice_tx,
        }
    }

    /// Replaces the playlist wholesale and starts from its first item.
    ///
    /// Everything belonging to the previous playlist is torn down first. An
    /// empty playlist is reported once with [`PlaybackNotice::Empty`] and
    /// leaves the orchestrator inert.
    pub(crate) fn load(&mut self, playlist: Playlist, now: Instant) {
        let was_playing = self.is_playing();
        self.unload();

        self.playlist = playlist;
        self.last_generation = self.last_generation.next();

        if self.playlist.is_empty() {
            info!("Playlist is empty, nothing to play");
            if was_playing {
                self.notify_play_state(false, None);
            }
            self.notify(PlaybackNotice::Empty);
            return;
        }

        let state = PlaybackState {
            cursor: Cursor::default(),
            is_playing: self.settings.autoplay,
            loop_enabled: self.loop_enabled,
            generation: self.last_generation,
        };
        self.state = Some(state);

        info!("Loaded playlist of {} items", self.playlist.len());
        self.enter_current(now);

        if was_playing != state.is_playing {
            self.notify_play_state(state.is_playing, None);
        }
    }

    /// Tears down the current item and forgets the playlist.
    pub(crate) fn dispose(&mut self) {
        let was_playing = self.is_playing();
        self.unload();
        self.playlist = Playlist::default();

        if was_playing {
            self.notify_play_state(false, None);
        }
    }

    pub(crate) fn play(&mut self, now: Instant) {
        self.control(now, |state, _| policy::set_playing(state, true));
    }

    pub(crate) fn pause(&mut self, now: Instant) {
        self.control(now, |state, _| policy::set_playing(state, false));
    }

    pub(crate) fn toggle(&mut self, now: Instant) {
        self.control(now, |state, _| policy::toggle_play_pause(state));
    }

    pub(crate) fn skip_next(&mut self, now: Instant) {
        self.control(now, policy::skip_next);
    }

    pub(crate) fn skip_previous(&mut self, now: Instant) {
        self.control(now, policy::skip_previous);
    }

    /// Flips looping.
    ///
    /// An advance already decided and waiting out the settle delay still
    /// happens.
    pub(crate) fn toggle_loop(&mut self) {
        let Some(state) = self.state else {
            return;
        };

        let next = policy::toggle_loop(&state);
        self.loop_enabled = next.loop_enabled;
        self.state = Some(next);
        if let Some(pending) = self.pending.as_mut() {
            pending.target.loop_enabled = next.loop_enabled;
        }

        self.notify(PlaybackNotice::LoopChanged(next.loop_enabled));
    }

    /// Feeds a raw notice from the embed surface.
    pub(crate) fn handle_notice(&mut self, notice: &SurfaceNotice, now: Instant) {
        if self.state.is_none() {
            return;
        }

        if let Some(event) = self.adapter.translate(notice) {
            self.handle_event(event, now);
        }
    }

    /// Advances time: commits a settled advance, ticks the countdown and
    /// handles its expiry.
    pub(crate) fn poll(&mut self, now: Instant) {
        if self.state.is_none() {
            return;
        }

        if self.pending.is_some_and(|pending| now >= pending.due) {
            if let Some(pending) = self.pending.take() {
                self.commit(pending.target, now, Origin::Signal);
            }
        }

        if let Some(generation) = self.timer.poll(now) {
            let event = self.adapter.timer_expired(generation);
            self.handle_event(event, now);
        }
    }

    pub(crate) fn current_item(&self) -> Option<&PlaylistItem> {
        self.state
            .and_then(|state| self.playlist.item_at(state.current_index()))
    }

    pub(crate) fn current_index(&self) -> Option<usize> {
        self.state.map(|state| state.current_index())
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.state.is_some_and(|state| state.is_playing)
    }

    pub(crate) fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Seconds left on the current slide, only while it is playing.
    pub(crate) fn remaining_time(&self) -> Option<u64> {
        if !self.is_playing() {
            return None;
        }

        self.timer.remaining()
    }

    pub(crate) fn generation(&self) -> Option<Generation> {
        self.state.map(|state| state.generation)
    }

    pub(crate) fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// The earliest time at which [`Orchestrator::poll`] has work to do.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        let pending = self.pending.map(|pending| pending.due);
        match (pending, self.timer.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub(crate) fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_item: self.current_item().cloned(),
            current_index: self.current_index(),
            is_playing: self.is_playing(),
            loop_enabled: self.loop_enabled,
            remaining_time: self.remaining_time(),
            len: self.playlist.len(),
        }
    }

    /// Runs a control-surface transition.
    ///
    /// A call that changes nothing leaves any pending advance alone, anything
    /// else supersedes it.
    fn control<F>(&mut self, now: Instant, transition: F)
    where
        F: FnOnce(&PlaybackState, usize) -> PlaybackState,
    {
        let Some(state) = self.state else {
            return;
        };

        let next = transition(&state, self.playlist.len());
        if next == state {
            return;
        }

        self.cancel_pending();
        self.commit(next, now, Origin::Control);
    }

    fn handle_event(&mut self, stamped: StampedEvent, now: Instant) {
        let Some(state) = self.state else {
            return;
        };

        if stamped.generation != state.generation {
            debug!(
                "Discarding stale {:?} from {}, current is {}",
                stamped.event, stamped.generation, state.generation
            );
            return;
        }

        let next = policy::apply(&state, self.playlist.len(), stamped.event);
        if next == state {
            return;
        }

        if self.pending.is_some() {
            self.fold_into_pending(stamped.event, next, now);
            return;
        }

        let settles = matches!(stamped.event, CanonicalEvent::Ended | CanonicalEvent::Errored)
            && policy::changes_item(&state, &next)
            && self.settings.settle_delay > Duration::ZERO;

        if settles {
            debug!("{:?} on item {}, advancing after settle", stamped.event, state.current_index());
            self.pending = Some(PendingAdvance {
                due: now + self.settings.settle_delay,
                target: next,
            });
            return;
        }

        self.commit(next, now, Origin::Signal);

        let finished = stamped.event == CanonicalEvent::Ended
            && !next.is_playing
            && !policy::changes_item(&state, &next);
        if finished {
            info!("Reached the end of the playlist");
            self.notify(PlaybackNotice::Finished);
        }
    }

    /// Applies an event that arrives while an advance is settling.
    ///
    /// The advance already decided the fate of the current item, so a later
    /// end or error for it changes nothing. Play-state changes apply now and
    /// carry over to the item being advanced to.
    fn fold_into_pending(&mut self, event: CanonicalEvent, next: PlaybackState, now: Instant) {
        match event {
            CanonicalEvent::Ended | CanonicalEvent::Errored => {
                debug!("Ignoring {:?}, already advancing", event);
            }
            CanonicalEvent::Resumed | CanonicalEvent::PausedExternally => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.target.is_playing = next.is_playing;
                }
                self.commit(next, now, Origin::Signal);
            }
        }
    }

    /// Makes `next` the canonical state and applies its side effects.
    fn commit(&mut self, next: PlaybackState, now: Instant, origin: Origin) {
        let Some(before) = self.state else {
            return;
        };

        let changes_item = policy::changes_item(&before, &next);
        if changes_item {
            self.leave_current();
            self.state = Some(next);
            self.last_generation = next.generation;
            self.enter_current(now);
        } else {
            self.state = Some(next);
            self.sync_countdown(now);
        }

        self.loop_enabled = next.loop_enabled;

        if before.is_playing != next.is_playing {
            // A freshly loaded item already starts in the right state
            let surface = if origin == Origin::Control && !changes_item {
                self.current_item()
                    .filter(|item| item.source_kind == SourceKind::Push)
                    .map(|_| next.generation)
            } else {
                None
            };
            self.notify_play_state(next.is_playing, surface);
        }
    }

    /// Arms the subscription and countdown for the current item and asks the
    /// host to render it.
    fn enter_current(&mut self, now: Instant) {
        let Some(state) = self.state else {
            return;
        };
        let Some(item) = self.playlist.item_at(state.current_index()).cloned() else {
            return;
        };

        info!("Now on item {} '{}' ({})", state.current_index(), item.title, state.generation);

        self.adapter.subscribe(item.source_kind, state.generation);
        self.sync_countdown(now);

        self.notify(PlaybackNotice::Load {
            item,
            generation: state.generation,
            should_play: state.is_playing,
        });
    }

    /// Cancels everything bound to the current generation.
    fn leave_current(&mut self) {
        self.timer.cancel();
        self.frozen_remaining = None;
        self.adapter.detach();
    }

    /// Starts, resumes or freezes the countdown to match the play state.
    fn sync_countdown(&mut self, now: Instant) {
        let Some(state) = self.state else {
            return;
        };
        let Some(item) = self.playlist.item_at(state.current_index()) else {
            return;
        };
        let Some(full) = timer::fallback_duration(item.source_kind, self.settings.slide_duration_secs)
        else {
            return;
        };

        if state.is_playing {
            if !self.timer.is_armed() {
                let seconds = self.frozen_remaining.take().unwrap_or(full);
                self.timer.arm(state.generation, seconds, now);
            }
        } else if let Some(remaining) = self.timer.cancel() {
            self.frozen_remaining = Some(remaining);
        }
    }

    fn cancel_pending(&mut self) {
        if self.pending.take().is_some() {
            debug!("Pending advance superseded");
        }
    }

    fn unload(&mut self) {
        self.cancel_pending();
        self.leave_current();

        if self.state.take().is_some() {
            self.notify(PlaybackNotice::Unloaded);
        }
    }

    fn notify_play_state(&self, is_playing: bool, surface: Option<Generation>) {
        self.notify(PlaybackNotice::PlayStateChanged { is_playing, surface });
    }

    fn notify(&self, notice: PlaybackNotice) {
        // The host going away is not our problem
        let _ = self.notice_tx.send(notice);
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.cancel_pending();
        self.leave_current();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{self, Receiver};

    use super::*;
    use crate::model::{SourceKind, item};

    struct Harness {
        orchestrator: Orchestrator,
        notices: Receiver<PlaybackNotice>,
        now: Instant,
    }

    impl Harness {
        fn new(settings: PlaybackSettings) -> Self {
            let (notice_tx, notices) = mpsc::channel();
            Self {
                orchestrator: Orchestrator::new(settings, notice_tx),
                notices,
                now: Instant::now(),
            }
        }

        fn with_items(loop_enabled: bool, kinds: &[SourceKind]) -> Self {
            let mut harness = Self::new(PlaybackSettings {
                loop_enabled,
                ..PlaybackSettings::default()
            });
            let items = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| item(i as i64 + 1, *kind))
                .collect::<Vec<_>>();
            harness.orchestrator.load(Playlist::new(items), harness.now);
            harness
        }

        fn scenario(loop_enabled: bool) -> Self {
            Self::with_items(loop_enabled, &[SourceKind::Push, SourceKind::Timed, SourceKind::Push])
        }

        fn advance(&mut self, duration: Duration) {
            self.now += duration;
            self.orchestrator.poll(self.now);
        }

        fn settle(&mut self) {
            self.advance(Duration::from_millis(300));
        }

        fn notify(&mut self, notice: SurfaceNotice) {
            self.orchestrator.handle_notice(&notice, self.now);
        }

        fn current_generation(&self) -> Generation {
            self.orchestrator.generation().unwrap()
        }

        fn end_current(&mut self) {
            let generation = self.current_generation();
            self.notify(SurfaceNotice::ended(generation));
            self.settle();
        }

        fn drain(&self) -> Vec<PlaybackNotice> {
            self.notices.try_iter().collect()
        }

        fn loads(&self) -> usize {
            self.drain()
                .iter()
                .filter(|n| matches!(n, PlaybackNotice::Load { .. }))
                .count()
        }
    }

    #[test]
    fn test_scenario_looping_playlist() {
        let mut h = Harness::scenario(true);
        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert!(h.orchestrator.is_playing());
        assert_eq!(h.orchestrator.remaining_time(), None);

        h.end_current();
        assert_eq!(h.orchestrator.current_index(), Some(1));
        assert_eq!(h.orchestrator.remaining_time(), Some(30));

        h.advance(Duration::from_secs(10));
        assert_eq!(h.orchestrator.remaining_time(), Some(20));

        h.advance(Duration::from_secs(20));
        assert_eq!(h.orchestrator.current_index(), Some(1));
        h.settle();
        assert_eq!(h.orchestrator.current_index(), Some(2));
        assert_eq!(h.orchestrator.remaining_time(), None);

        h.end_current();
        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert!(h.orchestrator.is_playing());
    }

    #[test]
    fn test_scenario_non_looping_playlist_stops_at_end() {
        let mut h = Harness::scenario(false);

        h.end_current();
        h.advance(Duration::from_secs(30));
        h.settle();
        assert_eq!(h.orchestrator.current_index(), Some(2));
        h.drain();

        let generation = h.current_generation();
        h.notify(SurfaceNotice::ended(generation));

        assert_eq!(h.orchestrator.current_index(), Some(2));
        assert!(!h.orchestrator.is_playing());
        assert_eq!(h.current_generation(), generation);
        assert_eq!(
            h.drain(),
            vec![
                PlaybackNotice::PlayStateChanged {
                    is_playing: false,
                    surface: None
                },
                PlaybackNotice::Finished
            ]
        );
    }

    #[test]
    fn test_scenario_empty_playlist() {
        let mut h = Harness::new(PlaybackSettings::default());
        h.orchestrator.load(Playlist::default(), h.now);

        assert!(h.orchestrator.current_item().is_none());
        assert_eq!(h.drain(), vec![PlaybackNotice::Empty]);

        h.orchestrator.skip_next(h.now);
        h.orchestrator.toggle(h.now);
        h.orchestrator.toggle_loop();
        h.notify(SurfaceNotice::ended(Generation::new(1)));
        h.advance(Duration::from_secs(60));

        assert!(h.orchestrator.current_item().is_none());
        assert!(!h.orchestrator.is_playing());
        assert!(!h.orchestrator.timer.is_armed());
        assert_eq!(h.orchestrator.next_deadline(), None);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn test_loop_wrap_after_len_ended_events() {
        let mut h = Harness::with_items(true, &[SourceKind::Push; 4]);

        for _ in 0..4 {
            h.end_current();
        }

        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert!(h.orchestrator.is_playing());
    }

    #[test]
    fn test_stale_ended_after_skip_is_discarded() {
        let mut h = Harness::with_items(true, &[SourceKind::Push; 3]);
        let first = h.current_generation();

        h.orchestrator.skip_next(h.now);
        let second = h.current_generation();
        assert_ne!(first, second);
        h.drain();

        // Delayed notice from the item that was skipped
        h.notify(SurfaceNotice::ended(first));
        h.settle();

        assert_eq!(h.orchestrator.current_index(), Some(1));
        assert_eq!(h.current_generation(), second);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn test_duplicate_ended_advances_once() {
        let mut h = Harness::with_items(true, &[SourceKind::Push; 3]);
        let generation = h.current_generation();

        h.notify(SurfaceNotice::ended(generation));
        h.advance(Duration::from_millis(100));
        h.notify(SurfaceNotice::ended(generation));
        h.settle();
        h.notify(SurfaceNotice::ended(generation));
        h.settle();

        assert_eq!(h.orchestrator.current_index(), Some(1));
    }

    #[test]
    fn test_error_advances_past_non_looping_boundary() {
        let mut h = Harness::with_items(false, &[SourceKind::Push; 3]);
        h.orchestrator.skip_previous(h.now);
        assert_eq!(h.orchestrator.current_index(), Some(2));

        let generation = h.current_generation();
        h.notify(SurfaceNotice::error(generation, 150));
        h.settle();

        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert!(h.orchestrator.is_playing());
    }

    #[test]
    fn test_malformed_notice_changes_nothing() {
        let mut h = Harness::scenario(true);
        let generation = h.current_generation();
        h.drain();

        h.notify(SurfaceNotice::new(generation, "{\"event\":\"onStateChange\",\"info\":\"0\"}"));
        h.notify(SurfaceNotice::new(generation, "<script>"));
        h.settle();

        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert_eq!(h.current_generation(), generation);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn test_rapid_skips_leave_one_countdown() {
        let mut h = Harness::with_items(true, &[SourceKind::Timed; 3]);

        for _ in 0..5 {
            h.orchestrator.skip_next(h.now);
            h.advance(Duration::from_millis(400));
        }

        let generation = h.current_generation();
        assert_eq!(h.orchestrator.current_index(), Some(2));
        assert_eq!(h.orchestrator.timer.generation(), Some(generation));
        h.drain();

        h.advance(Duration::from_secs(30));
        h.settle();
        h.advance(Duration::from_secs(1));

        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert_eq!(h.current_generation(), generation.next());
        assert_eq!(h.loads(), 1);
    }

    #[test]
    fn test_skip_supersedes_pending_advance() {
        let mut h = Harness::with_items(true, &[SourceKind::Push; 3]);
        let generation = h.current_generation();

        h.notify(SurfaceNotice::ended(generation));
        h.orchestrator.skip_next(h.now);
        h.settle();
        h.settle();

        assert_eq!(h.orchestrator.current_index(), Some(1));
        assert_eq!(h.current_generation(), generation.next());
    }

    #[test]
    fn test_pause_freezes_countdown() {
        let mut h = Harness::with_items(true, &[SourceKind::Timed, SourceKind::Push]);

        h.advance(Duration::from_secs(12));
        assert_eq!(h.orchestrator.remaining_time(), Some(18));

        h.orchestrator.pause(h.now);
        assert_eq!(h.orchestrator.remaining_time(), None);
        assert!(!h.orchestrator.timer.is_armed());

        h.advance(Duration::from_secs(120));
        assert_eq!(h.orchestrator.current_index(), Some(0));

        h.orchestrator.play(h.now);
        assert_eq!(h.orchestrator.remaining_time(), Some(18));

        h.advance(Duration::from_secs(18));
        h.settle();
        assert_eq!(h.orchestrator.current_index(), Some(1));
    }

    #[test]
    fn test_external_pause_and_resume_keep_generation() {
        let mut h = Harness::scenario(true);
        let generation = h.current_generation();
        h.drain();

        h.notify(SurfaceNotice::paused(generation));
        assert!(!h.orchestrator.is_playing());

        h.notify(SurfaceNotice::playing(generation));
        assert!(h.orchestrator.is_playing());
        assert_eq!(h.current_generation(), generation);
        assert_eq!(
            h.drain(),
            vec![
                PlaybackNotice::PlayStateChanged {
                    is_playing: false,
                    surface: None
                },
                PlaybackNotice::PlayStateChanged {
                    is_playing: true,
                    surface: None
                }
            ]
        );
    }

    #[test]
    fn test_index_change_emits_load_with_new_generation() {
        let mut h = Harness::scenario(true);
        h.drain();

        h.orchestrator.skip_next(h.now);
        let generation = h.current_generation();

        match h.drain().as_slice() {
            [PlaybackNotice::Load { item, generation: loaded, should_play }] => {
                assert_eq!(item.source_kind, SourceKind::Timed);
                assert_eq!(*loaded, generation);
                assert!(*should_play);
            }
            other => panic!("unexpected notices {:?}", other),
        }
    }

    #[test]
    fn test_replacing_playlist_resets_and_invalidates() {
        let mut h = Harness::scenario(true);
        h.orchestrator.skip_next(h.now);
        h.orchestrator.toggle_loop();
        let old = h.current_generation();

        h.orchestrator
            .load(Playlist::new(vec![item(10, SourceKind::Push), item(11, SourceKind::Push)]), h.now);

        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert!(h.current_generation() > old);
        assert!(!h.orchestrator.loop_enabled());
        assert!(!h.orchestrator.timer.is_armed());

        h.notify(SurfaceNotice::ended(old));
        h.settle();
        assert_eq!(h.orchestrator.current_index(), Some(0));
    }

    #[test]
    fn test_dispose_cancels_everything() {
        let mut h = Harness::with_items(true, &[SourceKind::Timed, SourceKind::Push]);
        let generation = h.current_generation();
        h.advance(Duration::from_secs(30));
        assert!(h.orchestrator.pending.is_some());

        h.orchestrator.dispose();

        assert!(h.orchestrator.current_item().is_none());
        assert!(h.orchestrator.pending.is_none());
        assert!(!h.orchestrator.timer.is_armed());
        assert!(!h.orchestrator.adapter.is_subscribed());

        h.notify(SurfaceNotice::ended(generation));
        h.settle();
        assert!(h.orchestrator.current_item().is_none());
    }

    #[test]
    fn test_zero_settle_delay_commits_immediately() {
        let mut h = Harness::new(PlaybackSettings {
            settle_delay: Duration::ZERO,
            ..PlaybackSettings::default()
        });
        h.orchestrator.load(
            Playlist::new(vec![item(1, SourceKind::Push), item(2, SourceKind::Push)]),
            h.now,
        );

        let generation = h.current_generation();
        h.notify(SurfaceNotice::ended(generation));

        assert_eq!(h.orchestrator.current_index(), Some(1));
    }

    #[test]
    fn test_next_deadline_tracks_countdown_and_settle() {
        let mut h = Harness::with_items(true, &[SourceKind::Timed, SourceKind::Push]);
        let start = h.now;
        assert_eq!(h.orchestrator.next_deadline(), Some(start + Duration::from_secs(1)));

        h.orchestrator.skip_next(h.now);
        assert_eq!(h.orchestrator.next_deadline(), None);

        let generation = h.current_generation();
        h.notify(SurfaceNotice::ended(generation));
        assert_eq!(h.orchestrator.next_deadline(), Some(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_error_then_ended_at_boundary_still_advances() {
        let mut h = Harness::with_items(false, &[SourceKind::Push; 2]);
        h.orchestrator.skip_next(h.now);
        let generation = h.current_generation();

        h.notify(SurfaceNotice::error(generation, 150));
        h.notify(SurfaceNotice::ended(generation));
        h.advance(Duration::from_secs(1));

        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert!(h.orchestrator.is_playing());
        assert_eq!(h.current_generation(), generation.next());
    }

    #[test]
    fn test_external_pause_during_settle_carries_over() {
        let mut h = Harness::with_items(true, &[SourceKind::Push; 3]);
        let generation = h.current_generation();

        h.notify(SurfaceNotice::ended(generation));
        h.notify(SurfaceNotice::paused(generation));
        assert!(!h.orchestrator.is_playing());
        assert!(h.orchestrator.pending.is_some());
        h.drain();

        h.settle();

        assert_eq!(h.orchestrator.current_index(), Some(1));
        assert!(!h.orchestrator.is_playing());
        assert!(h.drain().contains(&PlaybackNotice::Load {
            item: item(2, SourceKind::Push),
            generation: generation.next(),
            should_play: false,
        }));
    }

    #[test]
    fn test_external_pause_then_resume_during_settle() {
        let mut h = Harness::with_items(true, &[SourceKind::Push; 3]);
        let generation = h.current_generation();

        h.notify(SurfaceNotice::ended(generation));
        h.advance(Duration::from_millis(100));
        h.notify(SurfaceNotice::paused(generation));
        h.notify(SurfaceNotice::playing(generation));
        h.advance(Duration::from_millis(200));

        assert_eq!(h.orchestrator.current_index(), Some(1));
        assert!(h.orchestrator.is_playing());
    }

    #[test]
    fn test_control_call_during_settle_cancels_advance() {
        let mut h = Harness::with_items(true, &[SourceKind::Push; 3]);
        let generation = h.current_generation();

        h.notify(SurfaceNotice::ended(generation));
        h.orchestrator.pause(h.now);
        h.orchestrator.play(h.now);
        h.settle();

        assert_eq!(h.orchestrator.current_index(), Some(0));
        assert_eq!(h.current_generation(), generation);
        assert!(h.orchestrator.is_playing());
    }

    #[test]
    fn test_only_control_changes_command_the_surface() {
        let mut h = Harness::with_items(true, &[SourceKind::Push, SourceKind::Timed]);
        let generation = h.current_generation();
        h.drain();

        h.orchestrator.pause(h.now);
        h.notify(SurfaceNotice::playing(generation));

        assert_eq!(
            h.drain(),
            vec![
                PlaybackNotice::PlayStateChanged {
                    is_playing: false,
                    surface: Some(generation)
                },
                PlaybackNotice::PlayStateChanged {
                    is_playing: true,
                    surface: None
                }
            ]
        );

        h.orchestrator.skip_next(h.now);
        h.drain();
        h.orchestrator.pause(h.now);

        assert_eq!(
            h.drain(),
            vec![PlaybackNotice::PlayStateChanged {
                is_playing: false,
                surface: None
            }]
        );
    }
}
