//! Property tests for concurrent instant bookings.

use std::sync::Arc;
use std::thread;

use geo::Coord;
use medroute_core::{
    Capacity, CapacityStore, InstantBooking, MemoryCapacityStore, ResourceCategory,
    SpecialistKind, test_support::stocked_facility,
};
use medroute_reserve::{ReservationCoordinator, SubscriberRegistry};
use proptest::prelude::*;

fn specialist() -> impl Strategy<Value = SpecialistKind> {
    prop::sample::select(SpecialistKind::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn concurrent_bookings_never_oversell(
        kind in specialist(),
        free in 0_u32..6,
        spare in 0_u32..4,
        requesters in 1_usize..12,
    ) {
        let category = ResourceCategory::Specialist(kind);
        let facility = stocked_facility("h-1", Coord { x: 77.6, y: 12.9 })
            .with_specialist(kind, Capacity::new(free + spare, free));
        let store = MemoryCapacityStore::with_facilities([facility]).expect("valid facility");
        let coordinator = ReservationCoordinator::new(store, Arc::new(SubscriberRegistry::new()));
        let sessions: Vec<_> = (0..requesters).map(|_| coordinator.registry().connect()).collect();

        let coordinator_ref = &coordinator;
        let outcomes = thread::scope(|scope| {
            let handles: Vec<_> = sessions
                .iter()
                .map(|session| {
                    let id = session.id();
                    scope.spawn(move || {
                        coordinator_ref.instant_booking(
                            id,
                            InstantBooking {
                                facility_id: "h-1".into(),
                                category,
                                requester_id: id.to_string(),
                                condition: None,
                            },
                        )
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("booking thread panicked"))
                .collect::<Vec<_>>()
        });

        let granted = outcomes.iter().filter(|outcome| outcome.granted).count();
        let expected = requesters.min(usize::try_from(free).expect("small count"));
        prop_assert_eq!(granted, expected);

        // Each grant observed a distinct count, so together they cover left..free.
        let left = free - u32::try_from(granted).expect("small count");
        let mut remaining: Vec<u32> = outcomes.iter().filter_map(|outcome| outcome.remaining).collect();
        remaining.sort_unstable();
        prop_assert_eq!(remaining, (left..free).collect::<Vec<_>>());

        let facility = coordinator.store().get(&"h-1".into()).expect("facility");
        prop_assert_eq!(facility.available(category), Some(left));
    }
}
