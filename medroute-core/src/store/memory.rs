//! In-memory capacity store with one lock per facility.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use log::debug;
use parking_lot::{Mutex, RwLock};

use crate::{CapacityError, Facility, FacilityId, LiveUpdate, ResourceCategory};

use super::{CapacityStore, StoreError};

/// Capacity store holding facilities in process memory.
///
/// The outer map is only write-locked to add facilities. Every mutation
/// takes the facility's own mutex, so claims against different facilities
/// never contend and a test-and-decrement on one facility cannot interleave
/// with another mutation of it.
#[derive(Debug, Default)]
pub struct MemoryCapacityStore {
    facilities: RwLock<BTreeMap<FacilityId, Arc<Mutex<Facility>>>>,
}

impl MemoryCapacityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from validated facilities.
    ///
    /// Fails on the first facility whose figures break
    /// `0 ≤ available ≤ total`, and on any id seen twice.
    pub fn with_facilities<I>(facilities: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = Facility>,
    {
        let store = Self::new();
        for facility in facilities {
            if store.facilities.read().contains_key(&facility.id) {
                return Err(StoreError::InvalidUpdate {
                    facility_id: facility.id,
                    source: CapacityError::DuplicateId,
                });
            }
            store.insert(facility)?;
        }
        Ok(store)
    }

    /// Add or replace a facility after validating it.
    pub fn insert(&self, facility: Facility) -> Result<(), StoreError> {
        facility
            .validate()
            .map_err(|source| StoreError::InvalidUpdate {
                facility_id: facility.id.clone(),
                source,
            })?;
        self.facilities
            .write()
            .insert(facility.id.clone(), Arc::new(Mutex::new(facility)));
        Ok(())
    }

    /// Number of facilities held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.read().len()
    }

    /// Report whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.read().is_empty()
    }

    fn entry(&self, id: &FacilityId) -> Result<Arc<Mutex<Facility>>, StoreError> {
        self.facilities
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                facility_id: id.clone(),
            })
    }
}

impl CapacityStore for MemoryCapacityStore {
    fn all(&self) -> Result<Vec<Facility>, StoreError> {
        let entries: Vec<_> = self.facilities.read().values().cloned().collect();
        Ok(entries.iter().map(|entry| entry.lock().clone()).collect())
    }

    fn get(&self, id: &FacilityId) -> Result<Facility, StoreError> {
        Ok(self.entry(id)?.lock().clone())
    }

    fn conditional_decrement(
        &self,
        id: &FacilityId,
        category: ResourceCategory,
    ) -> Result<Facility, StoreError> {
        let entry = self.entry(id)?;
        let mut facility = entry.lock();
        match facility.try_claim(category, Utc::now()) {
            Some(remaining) => {
                debug!("claimed {category} at {id}, {remaining} left");
                Ok(facility.clone())
            }
            None => Err(StoreError::CapacityExhausted {
                facility_id: id.clone(),
                category,
            }),
        }
    }

    fn overwrite(&self, id: &FacilityId, update: &LiveUpdate) -> Result<Facility, StoreError> {
        let entry = self.entry(id)?;
        let mut facility = entry.lock();
        facility
            .apply_update(update, Utc::now())
            .map_err(|source| StoreError::InvalidUpdate {
                facility_id: id.clone(),
                source,
            })?;
        Ok(facility.clone())
    }
}
