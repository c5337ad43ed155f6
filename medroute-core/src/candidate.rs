//! Ranked facility candidates returned to the requester.

use std::collections::BTreeMap;

use geo::Coord;

use crate::{Capacity, FacilityId, SpecialistKind};

/// One facility that survived the hard constraints, with the figures used to
/// rank it.
///
/// The resolved figures are the live values when reported and the history
/// estimate otherwise; the matching `*_estimated` flag records which.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RankedCandidate {
    /// Facility identifier.
    pub facility_id: FacilityId,
    /// Facility display name.
    pub name: String,
    /// City the facility serves.
    pub city: String,
    /// Facility position.
    #[cfg_attr(feature = "serde", serde(with = "crate::latlng"))]
    pub location: Coord<f64>,
    /// Great-circle distance from the requester.
    pub distance_km: f64,
    /// Distance rendered as e.g. `"4.27 km"`.
    #[cfg_attr(feature = "serde", serde(rename = "distance"))]
    pub distance_label: String,
    /// Resolved ICU availability.
    pub icu_available: u32,
    /// Resolved general bed availability.
    pub general_beds_available: u32,
    /// Resolved oxygen level.
    pub oxygen_percentage: u32,
    /// ICU figure came from history.
    pub icu_estimated: bool,
    /// General bed figure came from history.
    pub general_beds_estimated: bool,
    /// Oxygen figure came from history.
    pub oxygen_estimated: bool,
    /// Specialist capacities at ranking time.
    pub specialists: BTreeMap<SpecialistKind, Capacity>,
    /// Heuristic desirability; may be negative for distant facilities.
    pub score: f64,
    /// Set once the stochastic refinement pass has ordered this candidate.
    pub refinement_applied: bool,
}

impl RankedCandidate {
    /// Report whether any resolved figure was estimated from history.
    #[must_use]
    pub const fn has_estimates(&self) -> bool {
        self.icu_estimated || self.general_beds_estimated || self.oxygen_estimated
    }
}
