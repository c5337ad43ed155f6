//! Annealing-style re-ordering of the heuristic shortlist.
//!
//! The pass runs in two stages. A random walk over the shortlist accepts a
//! move when it lowers the energy or, independently of the energy delta,
//! with probability `exp(-1 / temperature)`; the temperature cools after every
//! step. The walk only feeds diagnostics. The ordering comes from a second
//! stage that evaluates every candidate once more, each with a fresh
//! interference draw, and sorts ascending by that energy.

use std::cmp::Ordering;

use log::debug;
use medroute_core::{DispatchRequest, RankedCandidate};

use crate::{EntropySource, energy::energy};

/// Tunables for [`refine`] and the annealing recommender.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementConfig {
    /// Heuristic candidates handed to the refinement pass.
    pub top_k: usize,
    /// Steps of the random walk.
    pub iterations: u32,
    /// Temperature at the first step.
    pub initial_temperature: f64,
    /// Factor applied to the temperature after each step.
    pub cooling_rate: f64,
    /// Candidates returned to the requester.
    pub result_size: usize,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            top_k: 15,
            iterations: 50,
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            result_size: 10,
        }
    }
}

/// Output of [`refine`].
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// Candidates in refined order.
    pub candidates: Vec<RankedCandidate>,
    /// Moves the walk accepted.
    pub accepted_moves: u32,
    /// Temperature after the last step, or `None` when the walk was skipped.
    pub final_temperature: Option<f64>,
}

/// Probability of accepting a move regardless of its energy.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "tunnelling probability is exp(-1 / T)"
)]
pub fn tunnelling_probability(temperature: f64) -> f64 {
    (-1.0 / temperature).exp()
}

/// Re-order `candidates` by energy.
///
/// Lists of zero or one candidate are returned untouched without drawing
/// any randomness. Otherwise every returned candidate has
/// `refinement_applied` set.
pub fn refine<E>(
    candidates: Vec<RankedCandidate>,
    request: &DispatchRequest,
    config: &RefinementConfig,
    entropy: &mut E,
) -> Refinement
where
    E: EntropySource + ?Sized,
{
    let Some(first) = candidates.first() else {
        return untouched(candidates);
    };
    if candidates.len() == 1 {
        return untouched(candidates);
    }

    let (accepted_moves, final_temperature) = walk(first, &candidates, request, config, entropy);

    let mut scored: Vec<(f64, RankedCandidate)> = candidates
        .into_iter()
        .map(|candidate| (energy(&candidate, request, entropy), candidate))
        .collect();
    scored.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let ordered = scored
        .into_iter()
        .map(|(_, mut candidate)| {
            candidate.refinement_applied = true;
            candidate
        })
        .collect();

    Refinement {
        candidates: ordered,
        accepted_moves,
        final_temperature: Some(final_temperature),
    }
}

const fn untouched(candidates: Vec<RankedCandidate>) -> Refinement {
    Refinement {
        candidates,
        accepted_moves: 0,
        final_temperature: None,
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "the walk compares energies and cools the temperature"
)]
fn walk<E>(
    first: &RankedCandidate,
    candidates: &[RankedCandidate],
    request: &DispatchRequest,
    config: &RefinementConfig,
    entropy: &mut E,
) -> (u32, f64)
where
    E: EntropySource + ?Sized,
{
    let mut current = first;
    let mut current_energy = energy(current, request, entropy);
    let mut temperature = config.initial_temperature;
    let mut accepted = 0_u32;

    for _ in 0..config.iterations {
        let index = entropy.pick(candidates.len());
        let Some(next) = candidates.get(index) else {
            continue;
        };
        let next_energy = energy(next, request, entropy);
        if next_energy < current_energy || entropy.tunnel(tunnelling_probability(temperature)) {
            current = next;
            current_energy = next_energy;
            accepted = accepted.saturating_add(1);
        }
        temperature *= config.cooling_rate;
    }

    debug!(
        "walk settled on {} at energy {current_energy:.2} after {accepted} accepted moves",
        current.facility_id
    );
    (accepted, temperature)
}

#[cfg(test)]
mod tests;
