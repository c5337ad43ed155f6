//! Unit coverage for the refinement pass.
#![forbid(unsafe_code)]

use geo::Coord;
use medroute_core::{
    DispatchRequest, RankedCandidate,
    test_support::{kilometres_north, stocked_facility},
};
use medroute_ranker::rank_facilities;
use rstest::{fixture, rstest};

use crate::{
    RefinementConfig, refine, test_support::ScriptedEntropy, tunnelling_probability,
};

#[fixture]
fn origin() -> Coord<f64> {
    Coord { x: 78.4867, y: 17.3850 }
}

fn shortlist(origin: Coord<f64>, distances: &[f64]) -> Vec<RankedCandidate> {
    let facilities: Vec<_> = distances
        .iter()
        .zip(1_u32..)
        .map(|(km, n)| stocked_facility(&format!("h-{n}"), kilometres_north(origin, *km)))
        .collect();
    rank_facilities(&facilities, &DispatchRequest::at(origin))
}

fn ids(candidates: &[RankedCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.facility_id.as_str()).collect()
}

#[rstest]
#[case(&[])]
#[case(&[2.0])]
fn short_lists_are_untouched(origin: Coord<f64>, #[case] distances: &[f64]) {
    let candidates = shortlist(origin, distances);
    let mut entropy = ScriptedEntropy::new();
    let refinement = refine(
        candidates.clone(),
        &DispatchRequest::at(origin),
        &RefinementConfig::default(),
        &mut entropy,
    );
    assert_eq!(refinement.candidates, candidates);
    assert_eq!(refinement.final_temperature, None);
    assert_eq!(refinement.accepted_moves, 0);
    assert_eq!(entropy.interference_draws(), 0);
    assert_eq!(entropy.pick_draws(), 0);
}

#[rstest]
fn final_order_follows_the_last_interference_draws(origin: Coord<f64>) {
    // Base energies are 10, 11 and 12; the final draws reverse them.
    let candidates = shortlist(origin, &[1.0, 1.1, 1.2]);
    let config = RefinementConfig::default();
    let walk = std::iter::repeat_n(0.0, 51);
    let mut entropy = ScriptedEntropy::new().with_interference(walk.chain([4.0, 2.0, 0.0]));

    let refinement = refine(
        candidates,
        &DispatchRequest::at(origin),
        &config,
        &mut entropy,
    );

    assert_eq!(ids(&refinement.candidates), ["h-3", "h-2", "h-1"]);
    assert!(refinement.candidates.iter().all(|c| c.refinement_applied));
    assert_eq!(entropy.interference_draws(), 1 + 50 + 3);
    assert_eq!(entropy.pick_draws(), 50);
}

#[rstest]
fn equal_energy_moves_are_accepted_only_by_tunnelling(origin: Coord<f64>) {
    let candidates = shortlist(origin, &[1.0, 3.0]);
    // Every pick lands on the current candidate, so no move lowers energy.
    let mut entropy = ScriptedEntropy::new().with_tunnels([true, false, true]);

    let refinement = refine(
        candidates,
        &DispatchRequest::at(origin),
        &RefinementConfig::default(),
        &mut entropy,
    );

    assert_eq!(refinement.accepted_moves, 2);
    assert_eq!(entropy.tunnel_probabilities().len(), 50);
}

#[rstest]
fn lower_energy_moves_skip_the_tunnelling_draw(origin: Coord<f64>) {
    let candidates = shortlist(origin, &[1.0, 3.0]);
    let config = RefinementConfig {
        iterations: 1,
        ..RefinementConfig::default()
    };
    // The walk starts on the 1 km candidate with a high draw, so revisiting
    // it without interference lowers the energy.
    let mut entropy = ScriptedEntropy::new()
        .with_interference([4.9, 0.0])
        .with_picks([0]);

    let refinement = refine(
        candidates,
        &DispatchRequest::at(origin),
        &config,
        &mut entropy,
    );

    assert_eq!(refinement.accepted_moves, 1);
    assert!(entropy.tunnel_probabilities().is_empty());
}

#[rstest]
#[expect(
    clippy::float_arithmetic,
    reason = "test compares the cooling schedule numerically"
)]
fn temperature_cools_geometrically(origin: Coord<f64>) {
    let candidates = shortlist(origin, &[1.0, 3.0]);
    let mut entropy = ScriptedEntropy::new();

    let refinement = refine(
        candidates,
        &DispatchRequest::at(origin),
        &RefinementConfig::default(),
        &mut entropy,
    );

    let expected = 100.0 * 0.95_f64.powi(50);
    let temperature = refinement.final_temperature.expect("walk ran");
    assert!((temperature - expected).abs() < 1e-9);

    let probabilities = entropy.tunnel_probabilities();
    let first = probabilities.first().copied().expect("first step");
    let last = probabilities.last().copied().expect("last step");
    assert!((first - tunnelling_probability(100.0)).abs() < 1e-12);
    assert!((last - tunnelling_probability(100.0 * 0.95_f64.powi(49))).abs() < 1e-12);
}

#[rstest]
#[case(100.0, 0.990_049_833_749_168)]
#[case(1.0, 0.367_879_441_171_442_3)]
#[expect(
    clippy::float_arithmetic,
    reason = "test compares probabilities with a tolerance"
)]
fn tunnelling_probability_is_exp_of_negative_inverse(
    #[case] temperature: f64,
    #[case] expected: f64,
) {
    assert!((tunnelling_probability(temperature) - expected).abs() < 1e-12);
}
