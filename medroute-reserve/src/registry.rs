//! Sessions, facility rooms and event delivery.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use dashmap::DashMap;
use log::{debug, warn};
use medroute_core::{Event, FacilityId, SessionId};

/// The receiving end of a connected session.
#[derive(Debug)]
pub struct Subscription {
    id: SessionId,
    receiver: Receiver<Event>,
}

impl Subscription {
    /// Identifier other parties use to address this session.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Channel carrying events addressed to this session.
    #[must_use]
    pub const fn receiver(&self) -> &Receiver<Event> {
        &self.receiver
    }

    /// Take every event already delivered without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<Event> {
        self.receiver.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `None` on timeout or once the session has been disconnected
    /// and its queue is empty.
    #[must_use]
    pub fn next_event(&self, timeout: Duration) -> Option<Event> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Publish/subscribe registry keyed by session and by facility.
///
/// Each session owns an unbounded channel. Operators of a facility join its
/// room to receive forwarded reservation requests and `slotTaken` notices.
/// Delivery is best effort: events for sessions that have gone away are
/// dropped and logged.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    sessions: DashMap<SessionId, Sender<Event>>,
    rooms: DashMap<FacilityId, BTreeSet<SessionId>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session.
    #[must_use]
    pub fn connect(&self) -> Subscription {
        let id = SessionId::new();
        let (sender, receiver) = channel::unbounded();
        self.sessions.insert(id, sender);
        debug!("session {id} connected");
        Subscription { id, receiver }
    }

    /// Subscribe `session` to events about `facility`.
    ///
    /// Returns `false` when the session is not connected.
    #[must_use]
    pub fn join(&self, session: SessionId, facility: &FacilityId) -> bool {
        if !self.sessions.contains_key(&session) {
            return false;
        }
        self.rooms
            .entry(facility.clone())
            .or_default()
            .insert(session);
        debug!("session {session} joined facility {facility}");
        true
    }

    /// Unsubscribe `session` from `facility`.
    pub fn leave(&self, session: SessionId, facility: &FacilityId) {
        self.rooms
            .remove_if_mut(facility, |_, members| {
                members.remove(&session);
                members.is_empty()
            });
    }

    /// Close a session and drop it from every room.
    pub fn disconnect(&self, session: SessionId) {
        self.sessions.remove(&session);
        self.rooms.retain(|_, members| {
            members.remove(&session);
            !members.is_empty()
        });
        debug!("session {session} disconnected");
    }

    /// Number of connected sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sessions subscribed to `facility`.
    #[must_use]
    pub fn members(&self, facility: &FacilityId) -> Vec<SessionId> {
        self.rooms
            .get(facility)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Deliver `event` to one session, reporting whether it was accepted.
    #[must_use]
    pub fn send_to(&self, session: SessionId, event: Event) -> bool {
        let name = event.name();
        let delivered = self
            .sessions
            .get(&session)
            .is_some_and(|sender| sender.send(event).is_ok());
        if !delivered {
            warn!("dropped {name} for vanished session {session}");
            self.disconnect(session);
        }
        delivered
    }

    /// Deliver `event` to every connected session. Returns the number reached.
    #[must_use]
    pub fn broadcast_all(&self, event: &Event) -> usize {
        let targets: Vec<SessionId> = self.sessions.iter().map(|entry| *entry.key()).collect();
        self.deliver(targets, event)
    }

    /// Deliver `event` to the sessions in `facility`'s room.
    #[must_use]
    pub fn broadcast_to_facility(&self, facility: &FacilityId, event: &Event) -> usize {
        self.deliver(self.members(facility), event)
    }

    fn deliver(&self, targets: Vec<SessionId>, event: &Event) -> usize {
        targets
            .into_iter()
            .filter(|session| self.send_to(*session, event.clone()))
            .count()
    }
}
