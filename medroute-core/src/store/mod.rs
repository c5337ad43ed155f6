//! Access to facility capacity counters.
//!
//! [`CapacityStore`] is the single source of truth for availability. The
//! conditional decrement is part of the contract: reading the current value
//! and decrementing it when positive must be one indivisible step per
//! facility and category, so callers never lock around it.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::{CapacityError, Facility, FacilityId, LiveUpdate, ResourceCategory};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryCapacityStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteCapacityStore, SqliteCapacityStoreError};

/// Errors returned by [`CapacityStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No facility has this identifier.
    #[error("facility {facility_id} not found")]
    NotFound {
        /// Identifier that failed to resolve.
        facility_id: FacilityId,
    },
    /// The conditional decrement found nothing to take.
    #[error("no {} available at facility {facility_id}", .category.label())]
    CapacityExhausted {
        /// Facility that was asked.
        facility_id: FacilityId,
        /// Category with no free unit.
        category: ResourceCategory,
    },
    /// An overwrite or a loaded record breaks `0 ≤ available ≤ total`, or
    /// a loaded record repeats a facility id.
    #[error("rejected update for facility {facility_id}: {source}")]
    InvalidUpdate {
        /// Facility the update targeted.
        facility_id: FacilityId,
        /// The violated constraint.
        #[source]
        source: CapacityError,
    },
    /// The backing store failed. Retrying may succeed.
    #[error("capacity store unavailable during {operation}: {source}")]
    Unavailable {
        /// Store operation that failed.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl StoreError {
    /// Wrap a backend failure as [`StoreError::Unavailable`].
    pub fn unavailable<E>(operation: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Unavailable {
            operation,
            source: Box::new(source),
        }
    }

    /// Report whether the failure is transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Shared, mutable facility records.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use medroute_core::{
///     Capacity, CapacityStore, Facility, FacilityId, MemoryCapacityStore, SpecialistKind,
///     StoreError,
/// };
///
/// let facility = Facility::new("h-1", "Sunrise Hospital", "Guntur", Coord { x: 80.4, y: 16.3 })
///     .with_specialist(SpecialistKind::Cardiologist, Capacity::new(2, 1));
/// let store = MemoryCapacityStore::with_facilities([facility]).unwrap();
/// let id = FacilityId::new("h-1");
///
/// let claimed = store
///     .conditional_decrement(&id, SpecialistKind::Cardiologist.into())
///     .unwrap();
/// assert_eq!(claimed.specialist(SpecialistKind::Cardiologist), Some(Capacity::new(2, 0)));
/// assert!(matches!(
///     store.conditional_decrement(&id, SpecialistKind::Cardiologist.into()),
///     Err(StoreError::CapacityExhausted { .. })
/// ));
/// ```
pub trait CapacityStore: Send + Sync {
    /// Snapshot every facility.
    fn all(&self) -> Result<Vec<Facility>, StoreError>;

    /// Snapshot one facility.
    fn get(&self, id: &FacilityId) -> Result<Facility, StoreError>;

    /// Take one unit of `category` if one is free, atomically.
    ///
    /// Succeeds only when the category's live availability is known and
    /// positive at the moment of mutation. The decrement and the
    /// `last_updated` stamp commit together. Returns the facility as it
    /// stands after the claim.
    fn conditional_decrement(
        &self,
        id: &FacilityId,
        category: ResourceCategory,
    ) -> Result<Facility, StoreError>;

    /// Replace the live figures of a facility, atomically with respect to
    /// [`conditional_decrement`](Self::conditional_decrement).
    fn overwrite(&self, id: &FacilityId, update: &LiveUpdate) -> Result<Facility, StoreError>;
}

impl<S> CapacityStore for Arc<S>
where
    S: CapacityStore + ?Sized,
{
    fn all(&self) -> Result<Vec<Facility>, StoreError> {
        (**self).all()
    }

    fn get(&self, id: &FacilityId) -> Result<Facility, StoreError> {
        (**self).get(id)
    }

    fn conditional_decrement(
        &self,
        id: &FacilityId,
        category: ResourceCategory,
    ) -> Result<Facility, StoreError> {
        (**self).conditional_decrement(id, category)
    }

    fn overwrite(&self, id: &FacilityId, update: &LiveUpdate) -> Result<Facility, StoreError> {
        (**self).overwrite(id, update)
    }
}
