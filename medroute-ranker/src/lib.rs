//! Heuristic ranking of facilities for a dispatch request.
//!
//! Ranking resolves each facility's figures (live values, or history
//! estimates when a live value is unknown), drops facilities that fail the
//! request's hard constraints and orders the rest by [`heuristic_score`].
//!
//! # Examples
//!
//! ```
//! use geo::Coord;
//! use medroute_core::{DispatchRequest, test_support::{kilometres_north, stocked_facility}};
//! use medroute_ranker::rank_facilities;
//!
//! let origin = Coord { x: 78.4867, y: 17.3850 };
//! let facilities = [
//!     stocked_facility("far", kilometres_north(origin, 50.0)),
//!     stocked_facility("near", kilometres_north(origin, 1.0)),
//! ];
//! let ranked = rank_facilities(&facilities, &DispatchRequest::at(origin));
//! let ids: Vec<_> = ranked.iter().map(|c| c.facility_id.as_str()).collect();
//! assert_eq!(ids, ["near", "far"]);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::cmp::Ordering;
use std::time::Instant;

use log::{debug, info};
use medroute_core::{
    CapacityStore, Diagnostics, DispatchRequest, Facility, RankedCandidate, RecommendError,
    Recommendation, Recommender, format_km, haversine_km,
};

mod filter;
mod resolve;
mod score;
mod shortfall;

pub use filter::{Exclusion, OXYGEN_THRESHOLD, check};
pub use resolve::ResolvedResources;
pub use score::heuristic_score;
pub use shortfall::{HistoryField, estimate};

/// Filter and score `facilities` for `request`, best first.
///
/// Equal scores are ordered by ascending distance and then by facility id,
/// so the result is fully deterministic. An empty result means no facility
/// satisfied the hard constraints.
#[must_use]
pub fn rank_facilities(facilities: &[Facility], request: &DispatchRequest) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = facilities
        .iter()
        .filter_map(|facility| evaluate(facility, request))
        .collect();
    candidates.sort_by(compare_candidates);
    candidates
}

fn evaluate(facility: &Facility, request: &DispatchRequest) -> Option<RankedCandidate> {
    let resources = ResolvedResources::of(facility);
    if let Err(exclusion) = check(facility, &resources, request) {
        debug!("excluding {}: {exclusion}", facility.id);
        return None;
    }
    let distance_km = haversine_km(request.location, facility.location);
    Some(RankedCandidate {
        facility_id: facility.id.clone(),
        name: facility.name.clone(),
        city: facility.city.clone(),
        location: facility.location,
        distance_km,
        distance_label: format_km(distance_km),
        icu_available: resources.icu_available,
        general_beds_available: resources.general_available,
        oxygen_percentage: resources.oxygen_percentage,
        icu_estimated: resources.icu_estimated,
        general_beds_estimated: resources.general_estimated,
        oxygen_estimated: resources.oxygen_estimated,
        specialists: facility.specialists.clone(),
        score: heuristic_score(distance_km, &resources),
        refinement_applied: false,
    })
}

/// Order candidates by descending score, then distance, then id.
#[must_use]
pub fn compare_candidates(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.facility_id.cmp(&b.facility_id))
}

/// [`Recommender`] that returns the heuristic order without refinement.
///
/// Every call reads a fresh snapshot from the store.
#[derive(Debug, Clone)]
pub struct CandidateRanker<S> {
    store: S,
}

impl<S> CandidateRanker<S>
where
    S: CapacityStore,
{
    /// Rank against `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Read the current snapshot and rank it, returning the number of
    /// facilities considered alongside the candidates.
    pub fn rank(
        &self,
        request: &DispatchRequest,
    ) -> Result<(usize, Vec<RankedCandidate>), RecommendError> {
        request.validate()?;
        let facilities = self.store.all()?;
        let candidates = rank_facilities(&facilities, request);
        info!(
            "{} of {} facilities satisfy the request",
            candidates.len(),
            facilities.len()
        );
        Ok((facilities.len(), candidates))
    }
}

impl<S> Recommender for CandidateRanker<S>
where
    S: CapacityStore,
{
    fn recommend(&self, request: &DispatchRequest) -> Result<Recommendation, RecommendError> {
        let started = Instant::now();
        let (considered, candidates) = self.rank(request)?;
        Ok(Recommendation {
            diagnostics: Diagnostics {
                facilities_considered: considered,
                candidates_eligible: candidates.len(),
                elapsed: started.elapsed(),
                ..Diagnostics::default()
            },
            candidates,
        })
    }
}

#[cfg(test)]
mod tests;
