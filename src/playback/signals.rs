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

//! Lifecycle signal normalization.
//!
//! Embed surfaces for PUSH items report their state with small JSON
//! payloads in the embed lifecycle format:
//!
//! ```text
//! {"event":"onStateChange","info":0}
//! {"event":"infoDelivery","info":{"playerState":2}}
//! {"event":"onError","info":150}
//! ```
//!
//! The surface is untrusted, so anything that does not parse into one of
//! the shapes above is dropped without complaint. TIMED items have no
//! surface signals at all, their only signal is countdown expiry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::{
    model::SourceKind,
    playback::{CanonicalEvent, Generation, StampedEvent},
};

const STATE_ENDED: i64 = 0;
const STATE_PLAYING: i64 = 1;
const STATE_PAUSED: i64 = 2;

/// A raw notice from an embed surface, tagged with the generation the
/// surface was loaded under.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SurfaceNotice {
    pub(crate) generation: Generation,
    pub(crate) payload: String,
}

impl SurfaceNotice {
    pub(crate) fn new(generation: Generation, payload: impl Into<String>) -> Self {
        Self {
            generation,
            payload: payload.into(),
        }
    }

    /// Encodes a player state change, as sent by well-behaved surfaces.
    pub(crate) fn state_change(generation: Generation, state: i64) -> Self {
        let message = LifecycleMessage::StateChange { info: state };
        Self::new(generation, encode(&message))
    }

    pub(crate) fn error(generation: Generation, code: i64) -> Self {
        let message = LifecycleMessage::Error {
            info: Value::from(code),
        };
        Self::new(generation, encode(&message))
    }

    pub(crate) fn ended(generation: Generation) -> Self {
        Self::state_change(generation, STATE_ENDED)
    }

    pub(crate) fn playing(generation: Generation) -> Self {
        Self::state_change(generation, STATE_PLAYING)
    }

    pub(crate) fn paused(generation: Generation) -> Self {
        Self::state_change(generation, STATE_PAUSED)
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "event")]
enum LifecycleMessage {
    #[serde(rename = "onStateChange")]
    StateChange { info: i64 },
    #[serde(rename = "infoDelivery")]
    InfoDelivery { info: DeliveryInfo },
    #[serde(rename = "onError")]
    Error { info: Value },
}

#[derive(Debug, Deserialize, Serialize)]
struct DeliveryInfo {
    #[serde(rename = "playerState")]
    player_state: i64,
}

fn encode(message: &LifecycleMessage) -> String {
    // Serializing a plain tagged enum cannot fail.
    serde_json::to_string(message).unwrap_or_default()
}

fn map_player_state(state: i64) -> Option<CanonicalEvent> {
    match state {
        STATE_ENDED => Some(CanonicalEvent::Ended),
        STATE_PLAYING => Some(CanonicalEvent::Resumed),
        STATE_PAUSED => Some(CanonicalEvent::PausedExternally),
        // unstarted, buffering, cued
        _ => None,
    }
}

/// Parses a raw payload into a canonical event, failing closed.
pub(crate) fn parse_payload(payload: &str) -> Option<CanonicalEvent> {
    let message = match serde_json::from_str::<LifecycleMessage>(payload) {
        Ok(message) => message,
        Err(e) => {
            trace!("Dropping malformed surface notice: {}", e);
            return None;
        }
    };

    match message {
        LifecycleMessage::StateChange { info } => map_player_state(info),
        LifecycleMessage::InfoDelivery { info } => map_player_state(info.player_state),
        LifecycleMessage::Error { .. } => Some(CanonicalEvent::Errored),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Subscription {
    generation: Generation,
}

/// Translates source-specific signals for the current item.
///
/// Only PUSH items hold a subscription. While detached every surface notice
/// is dropped.
#[derive(Debug, Default)]
pub(crate) struct EventAdapter {
    subscription: Option<Subscription>,
}

impl EventAdapter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the surface of an item, replacing any earlier
    /// subscription.
    pub(crate) fn subscribe(&mut self, kind: SourceKind, generation: Generation) {
        self.subscription = match kind {
            SourceKind::Push => Some(Subscription { generation }),
            SourceKind::Timed => None,
        };
    }

    pub(crate) fn detach(&mut self) {
        self.subscription = None;
    }

    #[cfg(test)]
    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub(crate) fn subscribed_generation(&self) -> Option<Generation> {
        self.subscription.map(|s| s.generation)
    }

    /// Normalizes a surface notice.
    ///
    /// Only notices stamped with the generation this adapter subscribed under
    /// are translated, and the event carries that generation. Anything else
    /// belongs to a surface load that has since been replaced.
    pub(crate) fn translate(&self, notice: &SurfaceNotice) -> Option<StampedEvent> {
        let Some(generation) = self.subscribed_generation() else {
            trace!("Dropping surface notice for {}, not subscribed", notice.generation);
            return None;
        };

        if notice.generation != generation {
            trace!("Dropping surface notice for {}, subscribed under {}", notice.generation, generation);
            return None;
        }

        parse_payload(&notice.payload).map(|event| StampedEvent::new(generation, event))
    }

    /// Maps countdown expiry onto the canonical end-of-item event.
    pub(crate) fn timer_expired(&self, generation: Generation) -> StampedEvent {
        StampedEvent::new(generation, CanonicalEvent::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscribed(generation: Generation) -> EventAdapter {
        let mut adapter = EventAdapter::new();
        adapter.subscribe(SourceKind::Push, generation);
        adapter
    }

    #[test]
    fn test_state_changes_map_to_canonical_events() {
        assert_eq!(parse_payload(r#"{"event":"onStateChange","info":0}"#), Some(CanonicalEvent::Ended));
        assert_eq!(parse_payload(r#"{"event":"onStateChange","info":1}"#), Some(CanonicalEvent::Resumed));
        assert_eq!(
            parse_payload(r#"{"event":"infoDelivery","info":{"playerState":2,"currentTime":12.5}}"#),
            Some(CanonicalEvent::PausedExternally)
        );
        assert_eq!(parse_payload(r#"{"event":"onError","info":150}"#), Some(CanonicalEvent::Errored));
        assert_eq!(parse_payload(r#"{"event":"onError","info":"blocked"}"#), Some(CanonicalEvent::Errored));
    }

    #[test]
    fn test_ignored_player_states() {
        for state in [-1, 3, 5] {
            let payload = format!(r#"{{"event":"onStateChange","info":{}}}"#, state);
            assert_eq!(parse_payload(&payload), None);
        }
    }

    #[test]
    fn test_malformed_payloads_are_dropped() {
        let payloads = [
            "",
            "ended",
            "null",
            "[0]",
            r#"{"event":"onStateChange"}"#,
            r#"{"event":"onStateChange","info":"0"}"#,
            r#"{"event":"onReady","info":null}"#,
            r#"{"info":0}"#,
            r#"{"event":"infoDelivery","info":{"volume":50}}"#,
        ];

        for payload in payloads {
            assert_eq!(parse_payload(payload), None, "payload {:?}", payload);
        }
    }

    #[test]
    fn test_translate_stamps_subscription_generation() {
        let adapter = subscribed(Generation::new(4));

        let event = adapter.translate(&SurfaceNotice::ended(Generation::new(4))).unwrap();

        assert_eq!(event, StampedEvent::new(Generation::new(4), CanonicalEvent::Ended));
    }

    #[test]
    fn test_notices_from_other_generations_are_dropped() {
        let adapter = subscribed(Generation::new(4));

        assert_eq!(adapter.translate(&SurfaceNotice::ended(Generation::new(3))), None);
        assert_eq!(adapter.translate(&SurfaceNotice::error(Generation::new(5), 150)), None);
        assert_eq!(adapter.subscribed_generation(), Some(Generation::new(4)));
    }

    #[test]
    fn test_detached_adapter_drops_notices() {
        let mut adapter = subscribed(Generation::new(1));
        adapter.detach();
        adapter.detach();

        assert!(!adapter.is_subscribed());
        assert_eq!(adapter.translate(&SurfaceNotice::ended(Generation::new(1))), None);
    }

    #[test]
    fn test_timed_items_hold_no_subscription() {
        let mut adapter = subscribed(Generation::new(1));
        adapter.subscribe(SourceKind::Timed, Generation::new(2));

        assert!(!adapter.is_subscribed());
        assert_eq!(
            adapter.timer_expired(Generation::new(2)),
            StampedEvent::new(Generation::new(2), CanonicalEvent::Ended)
        );
    }

    #[test]
    fn test_encoded_notices_round_trip() {
        let generation = Generation::new(9);
        let adapter = subscribed(generation);

        assert_eq!(adapter.translate(&SurfaceNotice::playing(generation)).map(|e| e.event), Some(CanonicalEvent::Resumed));
        assert_eq!(adapter.translate(&SurfaceNotice::paused(generation)).map(|e| e.event), Some(CanonicalEvent::PausedExternally));
        assert_eq!(adapter.translate(&SurfaceNotice::error(generation, 2)).map(|e| e.event), Some(CanonicalEvent::Errored));
    }
}
