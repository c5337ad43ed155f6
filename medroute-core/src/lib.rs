//! Core domain types for the medroute engine.
//!
//! Facilities, dispatch requests, ranked candidates and reservation events
//! live here together with the [`CapacityStore`] and [`Recommender`] seams
//! that the ranking, refinement and reservation crates build on.
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod candidate;
pub mod distance;
pub mod events;
pub mod facility;
#[cfg(feature = "serde")]
mod latlng;
pub mod outcome;
pub mod recommender;
pub mod request;
pub mod resource;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use candidate::RankedCandidate;
pub use distance::{EARTH_RADIUS_KM, format_km, haversine_km};
pub use events::{
    CapacityChanged, CorrelationHandle, Event, IncomingReservation, InstantBooking,
    ReservationRequest, ReservationResponse, SessionId, SlotTaken,
};
pub use facility::{
    BedCapacity, Capacity, CapacityError, DailySample, Facility, FacilityId, HistoryWindow,
    LiveUpdate, LiveValue, MAX_HISTORY_DAYS, MAX_OXYGEN_PERCENTAGE,
};
pub use outcome::{ReservationFailure, ReservationOutcome};
pub use recommender::{Diagnostics, RecommendError, Recommendation, Recommender};
pub use request::{DispatchRequest, DispatchRequestValidationError, ParseSeverityError, Severity};
pub use resource::{ParseCategoryError, ResourceCategory, SpecialistKind};
pub use store::{CapacityStore, MemoryCapacityStore, StoreError};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteCapacityStore, SqliteCapacityStoreError};
