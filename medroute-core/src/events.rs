//! Reservation protocol messages and the events fanned out to sessions.
//!
//! Inbound messages ([`ReservationRequest`], [`ReservationResponse`],
//! [`InstantBooking`]) drive the reservation coordinator. Outbound traffic is
//! an [`Event`], which serialises with an internally tagged `event` field:
//!
//! ```
//! # #[cfg(feature = "serde")]
//! # {
//! use medroute_core::{CapacityChanged, Event};
//!
//! let event = Event::CapacityChanged(CapacityChanged { facility_id: "h-1".into() });
//! let json = serde_json::to_string(&event).unwrap();
//! assert_eq!(json, r#"{"event":"capacityChanged","facilityId":"h-1"}"#);
//! # }
//! ```

use std::fmt;

use uuid::Uuid;

use crate::{FacilityId, ReservationOutcome, ResourceCategory, Severity};

/// Identifier of one connected session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SessionId(Uuid);

impl SessionId {
    /// Allocate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing identifier.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque handle routing an operator's decision back to the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CorrelationHandle(SessionId);

impl CorrelationHandle {
    /// The session the handle routes to.
    #[must_use]
    pub const fn session(self) -> SessionId {
        self.0
    }
}

impl From<SessionId> for CorrelationHandle {
    fn from(session: SessionId) -> Self {
        Self(session)
    }
}

impl fmt::Display for CorrelationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A requester asks a facility's operators to hold a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReservationRequest {
    /// Target facility.
    pub facility_id: FacilityId,
    /// Category to hold.
    pub category: ResourceCategory,
    /// Patient condition, if known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<Severity>,
    /// Requester identity, e.g. a vehicle call sign.
    pub requester_id: String,
}

impl ReservationRequest {
    /// Attach the correlation handle used to route the operator's answer.
    #[must_use]
    pub fn forwarded(self, correlation: CorrelationHandle) -> IncomingReservation {
        IncomingReservation {
            facility_id: self.facility_id,
            category: self.category,
            condition: self.condition,
            requester_id: self.requester_id,
            correlation,
        }
    }
}

/// A [`ReservationRequest`] as delivered to the facility's operators.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct IncomingReservation {
    /// Target facility.
    pub facility_id: FacilityId,
    /// Category to hold.
    pub category: ResourceCategory,
    /// Patient condition, if known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<Severity>,
    /// Requester identity.
    pub requester_id: String,
    /// Handle to quote in the [`ReservationResponse`].
    pub correlation: CorrelationHandle,
}

/// An operator's decision on an [`IncomingReservation`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReservationResponse {
    /// Handle copied from the incoming request.
    pub correlation: CorrelationHandle,
    /// Whether the operator approved.
    pub approved: bool,
    /// Facility the decision applies to.
    pub facility_id: FacilityId,
    /// Category the decision applies to.
    pub category: ResourceCategory,
}

/// A claim that skips operator approval.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct InstantBooking {
    /// Target facility.
    pub facility_id: FacilityId,
    /// Category to claim.
    pub category: ResourceCategory,
    /// Requester identity.
    pub requester_id: String,
    /// Patient condition, if known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<Severity>,
}

/// Notice that a facility's figures changed and should be re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CapacityChanged {
    /// Facility whose figures changed.
    pub facility_id: FacilityId,
}

/// Notice to a facility's operators that a unit was claimed automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SlotTaken {
    /// Facility the unit belongs to.
    pub facility_id: FacilityId,
    /// Who claimed it.
    pub requester_id: String,
    /// What was claimed.
    pub category: ResourceCategory,
    /// Patient condition, if known.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<Severity>,
    /// Units left after the claim.
    pub remaining: u32,
}

/// Messages delivered to sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "camelCase"))]
pub enum Event {
    /// A reservation request awaiting an operator's decision.
    IncomingReservation(IncomingReservation),
    /// Broadcast to every session after a committed mutation.
    CapacityChanged(CapacityChanged),
    /// Sent to a facility's subscribers after an instant claim.
    SlotTaken(SlotTaken),
    /// Sent to the requester only.
    BookingResult(ReservationOutcome),
}

impl Event {
    /// Wire name of the event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::IncomingReservation(_) => "incomingReservation",
            Self::CapacityChanged(_) => "capacityChanged",
            Self::SlotTaken(_) => "slotTaken",
            Self::BookingResult(_) => "bookingResult",
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::{ReservationFailure, SpecialistKind};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn booking_result_uses_wire_names() {
        let event = Event::BookingResult(ReservationOutcome::rejected(
            "h-9".into(),
            SpecialistKind::GeneralSurgeon.into(),
            ReservationFailure::CapacityExhausted,
            "none left",
        ));
        let value = serde_json::to_value(&event).expect("serialise");
        assert_eq!(
            value,
            json!({
                "event": "bookingResult",
                "approved": false,
                "facilityId": "h-9",
                "category": "generalSurgeon",
                "message": "none left",
                "failure": "capacityExhausted",
            })
        );
    }

    #[rstest]
    fn incoming_reservation_round_trips() {
        let request = ReservationRequest {
            facility_id: "h-2".into(),
            category: crate::ResourceCategory::IcuBeds,
            condition: Some(Severity::Critical),
            requester_id: "AMB-7".into(),
        };
        let event = Event::IncomingReservation(request.forwarded(SessionId::new().into()));
        let json = serde_json::to_string(&event).expect("serialise");
        let back: Event = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, event);
        assert_eq!(back.name(), "incomingReservation");
    }
}
