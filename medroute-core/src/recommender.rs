//! The seam between requesters and the ranking pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::{DispatchRequest, DispatchRequestValidationError, RankedCandidate, StoreError};

/// Ranked facilities for one request plus how they were produced.
///
/// An empty `candidates` list means no facility satisfied the hard
/// constraints. That is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Recommendation {
    /// Best facility first.
    pub candidates: Vec<RankedCandidate>,
    /// Statistics about the run.
    pub diagnostics: Diagnostics,
}

/// Diagnostic information about a recommendation run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Diagnostics {
    /// Facilities read from the store.
    pub facilities_considered: usize,
    /// Facilities that passed the hard constraints.
    pub candidates_eligible: usize,
    /// Candidates handed to the refinement pass.
    pub candidates_refined: usize,
    /// Moves the annealing walk accepted.
    pub accepted_moves: u32,
    /// Temperature when the walk stopped, if it ran.
    pub final_temperature: Option<f64>,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// Errors returned by [`Recommender::recommend`].
#[derive(Debug, Error)]
pub enum RecommendError {
    /// The request could not be evaluated.
    #[error("invalid dispatch request: {0}")]
    InvalidRequest(#[from] DispatchRequestValidationError),
    /// Reading the facility snapshot failed.
    #[error("failed to read facilities: {0}")]
    Store(#[from] StoreError),
}

impl RecommendError {
    /// Report whether the caller may retry the whole request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidRequest(_) => false,
            Self::Store(err) => err.is_retryable(),
        }
    }
}

/// Rank facilities for a dispatch request.
///
/// Implementations read a fresh snapshot for every call and must be
/// `Send + Sync` so one instance can serve many sessions.
pub trait Recommender: Send + Sync {
    /// Produce the ordered candidates for `request`.
    fn recommend(&self, request: &DispatchRequest) -> Result<Recommendation, RecommendError>;
}
