//! Facade crate for the medroute hospital recommendation engine.
//!
//! This crate re-exports the core domain types and the heuristic ranker, and
//! exposes the refinement pass and reservation coordinator behind feature
//! flags.

#![forbid(unsafe_code)]

pub use medroute_core::{
    CapacityStore, Diagnostics, DispatchRequest, Event, Facility, FacilityId, InstantBooking,
    LiveUpdate, LiveValue, MemoryCapacityStore, RankedCandidate, RecommendError, Recommendation,
    Recommender, ReservationFailure, ReservationOutcome, ReservationRequest, ReservationResponse,
    ResourceCategory, Severity, SpecialistKind, StoreError,
};
pub use medroute_ranker::{CandidateRanker, rank_facilities};

#[cfg(feature = "store-sqlite")]
pub use medroute_core::{SqliteCapacityStore, SqliteCapacityStoreError};

#[cfg(feature = "refine")]
pub use medroute_refine::{AnnealingRecommender, RefinementConfig};

#[cfg(feature = "reserve")]
pub use medroute_reserve::{
    ReservationCoordinator, ReservationError, SubscriberRegistry, Subscription,
};
