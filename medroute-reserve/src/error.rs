//! Failures of the reservation protocols.

use medroute_core::{CapacityError, FacilityId, ReservationFailure, ResourceCategory, StoreError};
use thiserror::Error;

/// Why a reservation or operator update did not go through.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// The category had no free unit when the claim ran.
    #[error("no {} available at facility {facility_id}", .category.label())]
    CapacityExhausted {
        /// Facility that was asked.
        facility_id: FacilityId,
        /// Category with no free unit.
        category: ResourceCategory,
    },
    /// The facility does not exist.
    #[error("facility {facility_id} not found")]
    FacilityNotFound {
        /// Identifier that failed to resolve.
        facility_id: FacilityId,
    },
    /// An operator update broke the capacity invariant.
    #[error("malformed update for facility {facility_id}: {source}")]
    MalformedRequest {
        /// Facility the update targeted.
        facility_id: FacilityId,
        /// The violated constraint.
        #[source]
        source: CapacityError,
    },
    /// The store could not be reached. The request may be retried.
    #[error("capacity store unavailable: {source}")]
    StoreUnavailable {
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },
}

impl ReservationError {
    /// Classify the error as reported to the requester.
    #[must_use]
    pub const fn kind(&self) -> ReservationFailure {
        match self {
            Self::CapacityExhausted { .. } => ReservationFailure::CapacityExhausted,
            Self::FacilityNotFound { .. } => ReservationFailure::FacilityNotFound,
            Self::MalformedRequest { .. } => ReservationFailure::MalformedRequest,
            Self::StoreUnavailable { .. } => ReservationFailure::StoreUnavailable,
        }
    }

    /// Report whether retrying may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl From<StoreError> for ReservationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { facility_id } => Self::FacilityNotFound { facility_id },
            StoreError::CapacityExhausted {
                facility_id,
                category,
            } => Self::CapacityExhausted {
                facility_id,
                category,
            },
            StoreError::InvalidUpdate {
                facility_id,
                source,
            } => Self::MalformedRequest {
                facility_id,
                source,
            },
            source @ StoreError::Unavailable { .. } => Self::StoreUnavailable { source },
        }
    }
}
