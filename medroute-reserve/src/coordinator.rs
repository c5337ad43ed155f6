//! Instant and operator-mediated reservation protocols.

#![forbid(unsafe_code)]

use std::sync::Arc;

use log::{debug, info, warn};
use medroute_core::{
    CapacityChanged, CapacityStore, Event, Facility, FacilityId, InstantBooking, LiveUpdate,
    ReservationFailure, ReservationOutcome, ReservationRequest, ReservationResponse,
    ResourceCategory, SessionId, SlotTaken,
};

use crate::{ReservationError, SubscriberRegistry};

const APPROVED: &str = "Slot Successfully Booked!";
const DENIED: &str = "Slot Request Denied by Hospital Admin.";
const AUTO_BOOKED: &str = "Slot Booked Automatically! You are clear for dispatch.";
const STORE_FAILURE: &str = "Error processing booking. Please try again.";

/// Runs the reservation protocols against one store and one registry.
///
/// The coordinator never caches availability. Every grant goes through
/// [`CapacityStore::conditional_decrement`], and notifications are sent only
/// after the store has committed the claim.
#[derive(Debug)]
pub struct ReservationCoordinator<S> {
    store: S,
    registry: Arc<SubscriberRegistry>,
}

impl<S> ReservationCoordinator<S>
where
    S: CapacityStore,
{
    /// Construct a coordinator.
    #[must_use]
    pub const fn new(store: S, registry: Arc<SubscriberRegistry>) -> Self {
        Self { store, registry }
    }

    /// The registry notifications go through.
    #[must_use]
    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Forward a reservation request to the facility's operators.
    ///
    /// Nothing is claimed yet. The forwarded event carries a correlation
    /// handle for `requester` so the operator's answer can be routed back.
    /// Returns the number of operators reached.
    pub fn request_reservation(&self, requester: SessionId, request: ReservationRequest) -> usize {
        let facility_id = request.facility_id.clone();
        let event = Event::IncomingReservation(request.forwarded(requester.into()));
        let reached = self.registry.broadcast_to_facility(&facility_id, &event);
        info!("forwarded reservation request for {facility_id} to {reached} operators");
        reached
    }

    /// Apply an operator's answer to a forwarded request.
    ///
    /// An approval claims one unit. The requester always receives a
    /// `bookingResult`; an approval that finds nothing left is reported as
    /// capacity exhausted.
    pub fn respond(&self, response: ReservationResponse) -> ReservationOutcome {
        let ReservationResponse {
            correlation,
            approved,
            facility_id,
            category,
        } = response;

        let outcome = if approved {
            match self.claim(&facility_id, category) {
                Ok(remaining) => {
                    ReservationOutcome::granted(facility_id, category, remaining, APPROVED)
                }
                Err(err) => rejection(facility_id, category, &err),
            }
        } else {
            ReservationOutcome::rejected(
                facility_id,
                category,
                ReservationFailure::DeniedByOperator,
                DENIED,
            )
        };

        let delivered = self
            .registry
            .send_to(correlation.session(), Event::BookingResult(outcome.clone()));
        debug!("booking result for {correlation} delivered: {delivered}");
        outcome
    }

    /// Claim a unit without operator involvement.
    ///
    /// On success everyone is told the facility changed, the facility's
    /// operators receive `slotTaken`, and the requester receives an approved
    /// `bookingResult`. On failure only the requester hears back.
    pub fn instant_booking(&self, requester: SessionId, booking: InstantBooking) -> ReservationOutcome {
        let InstantBooking {
            facility_id,
            category,
            requester_id,
            condition,
        } = booking;

        let outcome = match self.claim(&facility_id, category) {
            Ok(remaining) => {
                let operators = self.registry.broadcast_to_facility(
                    &facility_id,
                    &Event::SlotTaken(SlotTaken {
                        facility_id: facility_id.clone(),
                        requester_id,
                        category,
                        condition,
                        remaining,
                    }),
                );
                debug!("slot taken at {facility_id} shown to {operators} operators");
                ReservationOutcome::granted(facility_id, category, remaining, AUTO_BOOKED)
            }
            Err(err) => rejection(facility_id, category, &err),
        };

        let delivered = self
            .registry
            .send_to(requester, Event::BookingResult(outcome.clone()));
        debug!("booking result for {requester} delivered: {delivered}");
        outcome
    }

    /// Overwrite a facility's live figures on behalf of its operator.
    ///
    /// # Errors
    ///
    /// [`ReservationError::MalformedRequest`] when a value exceeds its total
    /// or oxygen exceeds 100, and the usual store failures otherwise.
    pub fn apply_operator_update(
        &self,
        facility_id: &FacilityId,
        update: &LiveUpdate,
    ) -> Result<Facility, ReservationError> {
        let facility = self.store.overwrite(facility_id, update)?;
        info!("operator updated live figures for {facility_id}");
        self.announce_change(facility_id);
        Ok(facility)
    }

    fn claim(
        &self,
        facility_id: &FacilityId,
        category: ResourceCategory,
    ) -> Result<u32, ReservationError> {
        let facility = self.store.conditional_decrement(facility_id, category)?;
        let remaining = facility.available(category).unwrap_or_default();
        info!("granted {category} at {facility_id}, {remaining} left");
        self.announce_change(facility_id);
        Ok(remaining)
    }

    fn announce_change(&self, facility_id: &FacilityId) {
        let reached = self
            .registry
            .broadcast_all(&Event::CapacityChanged(CapacityChanged {
                facility_id: facility_id.clone(),
            }));
        debug!("capacity change at {facility_id} announced to {reached} sessions");
    }
}

fn rejection(
    facility_id: FacilityId,
    category: ResourceCategory,
    err: &ReservationError,
) -> ReservationOutcome {
    let reason = match err {
        ReservationError::CapacityExhausted { .. } => format!(
            "Booking failed: No {} slots available at this moment.",
            category.label()
        ),
        ReservationError::FacilityNotFound { .. } => {
            format!("Booking failed: facility {facility_id} not found.")
        }
        ReservationError::MalformedRequest { .. } | ReservationError::StoreUnavailable { .. } => {
            warn!("booking at {facility_id} failed: {err}");
            STORE_FAILURE.to_owned()
        }
    };
    ReservationOutcome::rejected(facility_id, category, err.kind(), reason)
}
