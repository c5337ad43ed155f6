//! The full ranking pipeline: heuristic shortlist, then refinement.

use std::time::Instant;

use log::info;
use medroute_core::{
    CapacityStore, Diagnostics, DispatchRequest, RecommendError, Recommendation, Recommender,
};
use medroute_ranker::CandidateRanker;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{EntropySource, RefinementConfig, refine};

/// [`Recommender`] that refines the heuristic shortlist by energy.
///
/// The best [`RefinementConfig::top_k`] heuristic candidates are refined and
/// the first [`RefinementConfig::result_size`] are returned, all flagged
/// `refinement_applied`. The entropy source sits behind a mutex so one
/// recommender can serve many sessions; the store is never locked while
/// refining.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use medroute_core::{
///     DispatchRequest, MemoryCapacityStore, Recommender,
///     test_support::{kilometres_north, stocked_facility},
/// };
/// use medroute_refine::AnnealingRecommender;
///
/// let origin = Coord { x: 78.4867, y: 17.3850 };
/// let store = MemoryCapacityStore::with_facilities(
///     (1..=20).map(|km| stocked_facility(&format!("h-{km}"), kilometres_north(origin, f64::from(km)))),
/// )
/// .unwrap();
/// let recommender = AnnealingRecommender::seeded(store, 7);
/// let recommendation = recommender.recommend(&DispatchRequest::at(origin)).unwrap();
/// assert_eq!(recommendation.candidates.len(), 10);
/// assert!(recommendation.candidates.iter().all(|c| c.refinement_applied));
/// ```
#[derive(Debug)]
pub struct AnnealingRecommender<S, E> {
    ranker: CandidateRanker<S>,
    config: RefinementConfig,
    entropy: Mutex<E>,
}

impl<S, E> AnnealingRecommender<S, E>
where
    S: CapacityStore,
    E: EntropySource + Send,
{
    /// Construct a recommender using default configuration.
    #[must_use]
    pub fn new(store: S, entropy: E) -> Self {
        Self::with_config(store, entropy, RefinementConfig::default())
    }

    /// Construct a recommender with explicit configuration.
    #[must_use]
    pub fn with_config(store: S, entropy: E, config: RefinementConfig) -> Self {
        Self {
            ranker: CandidateRanker::new(store),
            config,
            entropy: Mutex::new(entropy),
        }
    }

    /// Replace the configuration while returning `self` for chaining.
    #[must_use]
    pub fn with_refinement(mut self, config: RefinementConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RefinementConfig {
        &self.config
    }
}

impl<S> AnnealingRecommender<S, ChaCha8Rng>
where
    S: CapacityStore,
{
    /// Construct a recommender whose randomness is reproducible from `seed`.
    #[must_use]
    pub fn seeded(store: S, seed: u64) -> Self {
        Self::new(store, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Construct a recommender seeded from operating-system randomness.
    #[must_use]
    pub fn from_entropy(store: S) -> Self {
        Self::new(store, ChaCha8Rng::from_entropy())
    }
}

impl<S, E> Recommender for AnnealingRecommender<S, E>
where
    S: CapacityStore,
    E: EntropySource + Send,
{
    fn recommend(&self, request: &DispatchRequest) -> Result<Recommendation, RecommendError> {
        let started = Instant::now();
        let (considered, mut shortlist) = self.ranker.rank(request)?;
        let eligible = shortlist.len();
        shortlist.truncate(self.config.top_k);
        let refined_count = shortlist.len();

        let refinement = {
            let mut entropy = self.entropy.lock();
            refine(shortlist, request, &self.config, &mut *entropy)
        };

        let mut candidates = refinement.candidates;
        candidates.truncate(self.config.result_size);
        for candidate in &mut candidates {
            candidate.refinement_applied = true;
        }
        info!(
            "recommending {} of {eligible} eligible facilities",
            candidates.len()
        );

        Ok(Recommendation {
            candidates,
            diagnostics: Diagnostics {
                facilities_considered: considered,
                candidates_eligible: eligible,
                candidates_refined: refined_count,
                accepted_moves: refinement.accepted_moves,
                final_temperature: refinement.final_temperature,
                elapsed: started.elapsed(),
            },
        })
    }
}
