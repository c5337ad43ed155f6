//! Stochastic refinement of heuristic hospital rankings.
//!
//! This crate provides [`AnnealingRecommender`], the default implementation of
//! the [`Recommender`](medroute_core::Recommender) trait. It takes the
//! heuristic shortlist from [`medroute_ranker`], re-orders it by an urgency
//! and shortage energy with an annealing-style pass, and returns the head of
//! the refined order.
//!
//! Randomness is injected through [`EntropySource`], which every
//! [`rand::Rng`] implements, so runs can be seeded or scripted.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod annealer;
mod energy;
mod entropy;
mod recommender;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use annealer::{Refinement, RefinementConfig, refine, tunnelling_probability};
pub use energy::{
    CRITICAL_DISTANCE_WEIGHT, DISTANCE_WEIGHT, NO_ICU_PENALTY, base_energy, energy,
};
pub use entropy::{EntropySource, MAX_INTERFERENCE};
pub use recommender::AnnealingRecommender;
