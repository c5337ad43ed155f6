//! Unit coverage for the reservation protocols.
#![forbid(unsafe_code)]

use std::sync::Arc;

use geo::Coord;
use medroute_core::{
    Capacity, CapacityChanged, CapacityStore, Event, InstantBooking, LiveUpdate, LiveValue,
    MemoryCapacityStore, ReservationFailure, ReservationRequest, ReservationResponse,
    ResourceCategory, Severity, SpecialistKind,
    test_support::{UnavailableStore, stocked_facility},
};
use rstest::{fixture, rstest};

use crate::{ReservationCoordinator, ReservationError, SubscriberRegistry};

const CARDIOLOGIST: ResourceCategory = ResourceCategory::Specialist(SpecialistKind::Cardiologist);

#[fixture]
fn coordinator() -> ReservationCoordinator<MemoryCapacityStore> {
    let facility = stocked_facility("h-1", Coord { x: 78.4, y: 17.4 })
        .with_specialist(SpecialistKind::Cardiologist, Capacity::new(3, 1));
    let store = MemoryCapacityStore::with_facilities([facility]).expect("valid facility");
    ReservationCoordinator::new(store, Arc::new(SubscriberRegistry::new()))
}

fn booking(facility: &str) -> InstantBooking {
    InstantBooking {
        facility_id: facility.into(),
        category: CARDIOLOGIST,
        requester_id: "AMB-1".into(),
        condition: Some(Severity::Critical),
    }
}

fn request() -> ReservationRequest {
    ReservationRequest {
        facility_id: "h-1".into(),
        category: CARDIOLOGIST,
        condition: Some(Severity::Urgent),
        requester_id: "AMB-2".into(),
    }
}

#[rstest]
fn instant_booking_notifies_in_order(coordinator: ReservationCoordinator<MemoryCapacityStore>) {
    let registry = coordinator.registry();
    let operator = registry.connect();
    let ambulance = registry.connect();
    assert!(registry.join(operator.id(), &"h-1".into()));

    let outcome = coordinator.instant_booking(ambulance.id(), booking("h-1"));

    assert!(outcome.granted);
    assert_eq!(outcome.remaining, Some(0));
    let operator_events: Vec<_> = operator.drain().iter().map(Event::name).collect();
    assert_eq!(operator_events, ["capacityChanged", "slotTaken"]);
    let ambulance_events = ambulance.drain();
    let names: Vec<_> = ambulance_events.iter().map(Event::name).collect();
    assert_eq!(names, ["capacityChanged", "bookingResult"]);
    assert_eq!(
        ambulance_events.last(),
        Some(&Event::BookingResult(outcome))
    );
}

#[rstest]
fn exhausted_instant_booking_only_answers_requester(
    coordinator: ReservationCoordinator<MemoryCapacityStore>,
) {
    let registry = coordinator.registry();
    let first = registry.connect();
    let second = registry.connect();
    assert!(coordinator.instant_booking(first.id(), booking("h-1")).granted);
    assert_eq!(first.drain().len(), 2);
    assert_eq!(second.drain().len(), 1);

    let outcome = coordinator.instant_booking(second.id(), booking("h-1"));

    assert!(!outcome.granted);
    assert_eq!(outcome.failure, Some(ReservationFailure::CapacityExhausted));
    assert_eq!(
        outcome.reason,
        "Booking failed: No cardiologist slots available at this moment."
    );
    assert!(first.drain().is_empty());
    assert_eq!(second.drain(), [Event::BookingResult(outcome)]);
}

#[rstest]
fn unknown_facility_is_reported(coordinator: ReservationCoordinator<MemoryCapacityStore>) {
    let ambulance = coordinator.registry().connect();
    let outcome = coordinator.instant_booking(ambulance.id(), booking("nowhere"));
    assert_eq!(outcome.failure, Some(ReservationFailure::FacilityNotFound));
}

#[rstest]
fn store_outage_is_retryable() {
    let coordinator =
        ReservationCoordinator::new(UnavailableStore, Arc::new(SubscriberRegistry::new()));
    let ambulance = coordinator.registry().connect();
    let outcome = coordinator.instant_booking(ambulance.id(), booking("h-1"));
    assert!(outcome.is_retryable());
    assert_eq!(outcome.reason, "Error processing booking. Please try again.");
}

#[rstest]
fn request_is_forwarded_without_claiming(coordinator: ReservationCoordinator<MemoryCapacityStore>) {
    let registry = coordinator.registry();
    let operator = registry.connect();
    let ambulance = registry.connect();
    assert!(registry.join(operator.id(), &"h-1".into()));

    assert_eq!(coordinator.request_reservation(ambulance.id(), request()), 1);

    let events = operator.drain();
    let Some(Event::IncomingReservation(incoming)) = events.first() else {
        panic!("expected a forwarded request, got {events:?}");
    };
    assert_eq!(incoming.correlation.session(), ambulance.id());
    assert_eq!(incoming.requester_id, "AMB-2");
    let facility = coordinator.store().get(&"h-1".into()).expect("facility");
    assert_eq!(facility.available(CARDIOLOGIST), Some(1));
}

#[rstest]
#[case(true, true, "Slot Successfully Booked!")]
#[case(false, false, "Slot Request Denied by Hospital Admin.")]
fn operator_answer_reaches_requester(
    coordinator: ReservationCoordinator<MemoryCapacityStore>,
    #[case] approved: bool,
    #[case] granted: bool,
    #[case] message: &str,
) {
    let ambulance = coordinator.registry().connect();
    let outcome = coordinator.respond(ReservationResponse {
        correlation: ambulance.id().into(),
        approved,
        facility_id: "h-1".into(),
        category: CARDIOLOGIST,
    });

    assert_eq!(outcome.granted, granted);
    assert_eq!(outcome.reason, message);
    assert_eq!(ambulance.drain().last(), Some(&Event::BookingResult(outcome)));
    let facility = coordinator.store().get(&"h-1".into()).expect("facility");
    let expected = if granted { 0 } else { 1 };
    assert_eq!(facility.available(CARDIOLOGIST), Some(expected));
}

#[rstest]
fn approval_after_exhaustion_reports_exhausted(
    coordinator: ReservationCoordinator<MemoryCapacityStore>,
) {
    let registry = coordinator.registry();
    let instant = registry.connect();
    let mediated = registry.connect();
    assert!(coordinator.instant_booking(instant.id(), booking("h-1")).granted);

    let outcome = coordinator.respond(ReservationResponse {
        correlation: mediated.id().into(),
        approved: true,
        facility_id: "h-1".into(),
        category: CARDIOLOGIST,
    });

    assert!(!outcome.granted);
    assert_eq!(outcome.failure, Some(ReservationFailure::CapacityExhausted));
}

#[rstest]
fn answer_to_vanished_requester_is_dropped(
    coordinator: ReservationCoordinator<MemoryCapacityStore>,
) {
    let ambulance = coordinator.registry().connect();
    let correlation = ambulance.id().into();
    coordinator.registry().disconnect(ambulance.id());

    let outcome = coordinator.respond(ReservationResponse {
        correlation,
        approved: true,
        facility_id: "h-1".into(),
        category: CARDIOLOGIST,
    });

    // The claim still commits; only the notification is lost.
    assert!(outcome.granted);
    assert_eq!(coordinator.registry().session_count(), 0);
}

#[rstest]
fn operator_update_is_validated(coordinator: ReservationCoordinator<MemoryCapacityStore>) {
    let watcher = coordinator.registry().connect();
    let update = LiveUpdate {
        oxygen_percentage: LiveValue::Live(120),
        ..LiveUpdate::default()
    };

    let err = coordinator
        .apply_operator_update(&"h-1".into(), &update)
        .expect_err("oxygen above 100");

    assert!(matches!(err, ReservationError::MalformedRequest { .. }));
    assert_eq!(err.kind(), ReservationFailure::MalformedRequest);
    assert!(watcher.drain().is_empty());
}

#[rstest]
fn operator_update_is_announced(coordinator: ReservationCoordinator<MemoryCapacityStore>) {
    let watcher = coordinator.registry().connect();
    let update = LiveUpdate {
        icu_available: LiveValue::Live(2),
        general_available: LiveValue::Live(40),
        oxygen_percentage: LiveValue::Live(75),
        specialists: [(SpecialistKind::Cardiologist, 3)].into_iter().collect(),
    };

    let facility = coordinator
        .apply_operator_update(&"h-1".into(), &update)
        .expect("valid update");

    assert_eq!(facility.available(CARDIOLOGIST), Some(3));
    assert_eq!(
        watcher.drain(),
        [Event::CapacityChanged(CapacityChanged {
            facility_id: "h-1".into()
        })]
    );
}
