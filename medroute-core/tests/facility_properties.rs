//! Property tests for facility capacity bookkeeping.

use chrono::{NaiveDate, Utc};
use geo::Coord;
use medroute_core::{
    Capacity, DailySample, Facility, HistoryWindow, LiveUpdate, LiveValue, MAX_HISTORY_DAYS,
    ResourceCategory, SpecialistKind,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Claim,
    Overwrite(u32),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Claim),
        1 => (0_u32..40).prop_map(Step::Overwrite),
    ]
}

proptest! {
    #[test]
    fn availability_stays_within_bounds(
        total in 0_u32..20,
        start in 0_u32..20,
        steps in prop::collection::vec(step(), 0..60),
    ) {
        let start = start.min(total);
        let category = ResourceCategory::Specialist(SpecialistKind::Pediatrician);
        let mut facility = Facility::new("p", "Prop Hospital", "Nellore", Coord { x: 80.0, y: 14.4 })
            .with_specialist(SpecialistKind::Pediatrician, Capacity::new(total, start));
        let mut grants = 0_u32;
        let mut restocked = 0_u32;

        for step in steps {
            match step {
                Step::Claim => {
                    if facility.try_claim(category, Utc::now()).is_some() {
                        grants += 1;
                    }
                }
                Step::Overwrite(value) => {
                    let update = LiveUpdate {
                        specialists: [(SpecialistKind::Pediatrician, value)].into(),
                        ..LiveUpdate::default()
                    };
                    if facility.apply_update(&update, Utc::now()).is_ok() {
                        restocked += 1;
                        grants = 0;
                    } else {
                        prop_assert!(value > total);
                    }
                }
            }
            let available = facility.available(category).unwrap_or_default();
            prop_assert!(available <= total);
            prop_assert!(facility.validate().is_ok());
            if restocked == 0 {
                prop_assert!(grants <= start);
                prop_assert_eq!(available, start - grants);
            }
        }
    }

    #[test]
    fn history_window_keeps_the_newest_days(len in 0_usize..80) {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let window = HistoryWindow::from_samples((0..len).map(|offset| DailySample {
            date: first + chrono::Days::new(offset as u64),
            icu_available: Some(1),
            general_available: None,
            oxygen_percentage: None,
        }));
        prop_assert_eq!(window.len(), len.min(MAX_HISTORY_DAYS));
        if let Some(last) = window.samples().last() {
            prop_assert_eq!(last.date, first + chrono::Days::new(len as u64 - 1));
        }
    }
}

#[test]
fn unknown_beds_never_become_claimable_by_accident() {
    let mut facility = Facility::new("u", "Unknown Beds", "Ongole", Coord { x: 80.0, y: 15.5 })
        .with_icu_beds(4, LiveValue::Unknown);
    assert_eq!(facility.try_claim(ResourceCategory::IcuBeds, Utc::now()), None);
    assert_eq!(facility.icu_beds.available, LiveValue::Unknown);
}
