//! Unit coverage for filtering, resolution and ordering.
#![forbid(unsafe_code)]

use chrono::NaiveDate;
use geo::Coord;
use medroute_core::{
    Capacity, DailySample, DispatchRequest, Facility, HistoryWindow, LiveValue,
    MemoryCapacityStore, Recommender, SpecialistKind,
    test_support::{UnavailableStore, kilometres_north, stocked_facility},
};
use rstest::{fixture, rstest};

use crate::{
    CandidateRanker, Exclusion, HistoryField, ResolvedResources, check, estimate,
    rank_facilities,
};

#[fixture]
fn origin() -> Coord<f64> {
    Coord { x: 78.4867, y: 17.3850 }
}

fn window(icu: &[Option<u32>]) -> HistoryWindow {
    let first = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap_or_default();
    HistoryWindow::from_samples(icu.iter().zip(0_u64..).map(|(value, offset)| DailySample {
        date: first + chrono::Days::new(offset),
        icu_available: *value,
        general_available: None,
        oxygen_percentage: Some(40),
    }))
}

#[rstest]
#[case(&[Some(5), Some(7), Some(9)], 7)]
#[case(&[Some(1), Some(2)], 2)]
#[case(&[Some(5), None, Some(8)], 7)]
#[case(&[None, None], 0)]
#[case(&[], 0)]
fn estimates_round_half_up(#[case] icu: &[Option<u32>], #[case] expected: u32) {
    assert_eq!(estimate(&window(icu), HistoryField::IcuAvailable), expected);
}

#[rstest]
fn live_zero_is_not_replaced_by_history(origin: Coord<f64>) {
    let facility = stocked_facility("h-1", origin)
        .with_icu_beds(10, LiveValue::Live(0))
        .with_history(window(&[Some(9), Some(9)]));
    let resolved = ResolvedResources::of(&facility);
    assert_eq!(resolved.icu_available, 0);
    assert!(!resolved.icu_estimated);
}

#[rstest]
fn unknown_live_value_uses_history(origin: Coord<f64>) {
    let facility = stocked_facility("h-1", origin)
        .with_icu_beds(10, LiveValue::Unknown)
        .with_oxygen(LiveValue::Unknown)
        .with_history(window(&[Some(5), Some(7), Some(9)]));
    let resolved = ResolvedResources::of(&facility);
    assert_eq!(resolved.icu_available, 7);
    assert_eq!(resolved.oxygen_percentage, 40);
    assert!(resolved.icu_estimated && resolved.oxygen_estimated);
    assert!(!resolved.general_estimated);
}

#[rstest]
#[case(None, true)]
#[case(Some(Capacity::new(3, 0)), false)]
#[case(Some(Capacity::new(3, 1)), true)]
fn specialist_constraint(
    origin: Coord<f64>,
    #[case] capacity: Option<Capacity>,
    #[case] staffed_request_passes: bool,
) {
    let mut facility = stocked_facility("h-1", origin);
    facility.specialists.remove(&SpecialistKind::Orthopedist);
    if let Some(capacity) = capacity {
        facility = facility.with_specialist(SpecialistKind::Orthopedist, capacity);
    }
    let resolved = ResolvedResources::of(&facility);
    let request = DispatchRequest::at(origin).with_specialist(SpecialistKind::Orthopedist);
    let expected = if staffed_request_passes && capacity.is_some() {
        Ok(())
    } else {
        Err(Exclusion::SpecialistUnavailable(SpecialistKind::Orthopedist))
    };
    assert_eq!(check(&facility, &resolved, &request), expected);
    // Without the requirement the facility is never excluded on this ground.
    assert_eq!(check(&facility, &resolved, &DispatchRequest::at(origin)), Ok(()));
}

#[rstest]
#[case(19, false)]
#[case(20, true)]
fn oxygen_threshold_is_inclusive(origin: Coord<f64>, #[case] level: u32, #[case] passes: bool) {
    let facility = stocked_facility("h-1", origin).with_oxygen(LiveValue::Live(level));
    let resolved = ResolvedResources::of(&facility);
    let request = DispatchRequest::at(origin).needing_oxygen();
    assert_eq!(check(&facility, &resolved, &request).is_ok(), passes);
}

#[rstest]
fn icu_requirement_uses_resolved_value(origin: Coord<f64>) {
    let facility = stocked_facility("h-1", origin)
        .with_icu_beds(10, LiveValue::Unknown)
        .with_history(window(&[Some(0), Some(1)]));
    let resolved = ResolvedResources::of(&facility);
    let request = DispatchRequest::at(origin).needing_icu();
    // mean 0.5 rounds up to 1
    assert_eq!(check(&facility, &resolved, &request), Ok(()));
}

#[rstest]
fn equal_scores_break_ties_by_id(origin: Coord<f64>) {
    let here = kilometres_north(origin, 3.0);
    let facilities = [stocked_facility("b", here), stocked_facility("a", here)];
    let ranked = rank_facilities(&facilities, &DispatchRequest::at(origin));
    let ids: Vec<_> = ranked.iter().map(|c| c.facility_id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert!(ranked.iter().all(|c| !c.refinement_applied));
}

#[rstest]
fn candidate_carries_display_fields(origin: Coord<f64>) {
    let facility: Facility = stocked_facility("h-1", kilometres_north(origin, 4.27));
    let ranked = rank_facilities(std::slice::from_ref(&facility), &DispatchRequest::at(origin));
    let candidate = ranked.first().expect("one candidate");
    assert_eq!(candidate.distance_label, "4.27 km");
    assert_eq!(candidate.name, facility.name);
    assert_eq!(candidate.specialists, facility.specialists);
    assert_eq!(candidate.icu_available, 5);
    assert_eq!(candidate.general_beds_available, 20);
    assert_eq!(candidate.oxygen_percentage, 90);
}

#[rstest]
fn ranker_reads_the_store(origin: Coord<f64>) {
    let store = MemoryCapacityStore::with_facilities([
        stocked_facility("h-1", kilometres_north(origin, 2.0)),
        stocked_facility("h-2", kilometres_north(origin, 8.0))
            .with_oxygen(LiveValue::Live(10)),
    ])
    .expect("valid facilities");
    let ranker = CandidateRanker::new(store);
    let request = DispatchRequest::at(origin).needing_oxygen();
    let recommendation = ranker.recommend(&request).expect("ranking succeeds");
    assert_eq!(recommendation.candidates.len(), 1);
    assert_eq!(recommendation.diagnostics.facilities_considered, 2);
    assert_eq!(recommendation.diagnostics.candidates_eligible, 1);
}

#[rstest]
fn store_outage_is_surfaced_as_retryable(origin: Coord<f64>) {
    let ranker = CandidateRanker::new(UnavailableStore);
    let err = ranker
        .recommend(&DispatchRequest::at(origin))
        .expect_err("store is down");
    assert!(err.is_retryable());
}
