//! The static first-pass desirability score.
#![forbid(unsafe_code)]

use crate::ResolvedResources;

/// Score a facility at `distance_km` with the given resolved figures.
///
/// `(1000 - 10·distance) + 10·icu + general + 2·oxygen`. Distant facilities
/// can score below zero.
///
/// ```
/// use medroute_ranker::{ResolvedResources, heuristic_score};
///
/// let resources = ResolvedResources {
///     icu_available: 3,
///     general_available: 12,
///     oxygen_percentage: 80,
///     ..ResolvedResources::default()
/// };
/// assert_eq!(heuristic_score(2.5, &resources), 975.0 + 30.0 + 12.0 + 160.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the score is a linear combination of distance and counts"
)]
pub fn heuristic_score(distance_km: f64, resources: &ResolvedResources) -> f64 {
    let icu = f64::from(resources.icu_available);
    let general = f64::from(resources.general_available);
    let oxygen = f64::from(resources.oxygen_percentage);
    (1000.0 - 10.0 * distance_km) + 10.0 * icu + general + 2.0 * oxygen
}
