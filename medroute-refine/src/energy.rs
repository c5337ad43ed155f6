//! Cost of sending a patient to a candidate. Lower is better.

use medroute_core::{DispatchRequest, RankedCandidate};

use crate::EntropySource;

/// Distance multiplier for critical patients.
pub const CRITICAL_DISTANCE_WEIGHT: f64 = 15.0;
/// Distance multiplier for everyone else.
pub const DISTANCE_WEIGHT: f64 = 10.0;
/// Penalty when an ICU bed is required and none is free.
pub const NO_ICU_PENALTY: f64 = 1000.0;

/// Deterministic part of the energy.
///
/// `distance × weight + icu shortage + oxygen shortage`, where the ICU term is
/// `1000` with no free bed and `50 / free` otherwise, and the oxygen term is
/// `(100 − oxygen) × 2`. Each shortage only counts when the request needs it.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "energy is a weighted sum of distance and shortage penalties"
)]
pub fn base_energy(candidate: &RankedCandidate, request: &DispatchRequest) -> f64 {
    let distance_weight = if request.is_critical() {
        CRITICAL_DISTANCE_WEIGHT
    } else {
        DISTANCE_WEIGHT
    };
    let icu_shortage = match (request.needs_icu, candidate.icu_available) {
        (false, _) => 0.0,
        (true, 0) => NO_ICU_PENALTY,
        (true, free) => 50.0 / f64::from(free),
    };
    let oxygen_shortage = if request.needs_oxygen {
        (100.0 - f64::from(candidate.oxygen_percentage)) * 2.0
    } else {
        0.0
    };
    candidate.distance_km * distance_weight + icu_shortage + oxygen_shortage
}

/// One energy evaluation: the base energy plus a fresh interference draw.
#[expect(
    clippy::float_arithmetic,
    reason = "interference is added to the base energy"
)]
pub fn energy<E>(candidate: &RankedCandidate, request: &DispatchRequest, entropy: &mut E) -> f64
where
    E: EntropySource + ?Sized,
{
    base_energy(candidate, request) + entropy.interference()
}
