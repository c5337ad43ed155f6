//! Fixtures shared by unit and behaviour tests across the workspace.

use std::io;

use geo::Coord;

use crate::{
    Capacity, CapacityStore, Facility, FacilityId, LiveUpdate, LiveValue, ResourceCategory,
    SpecialistKind, StoreError, distance::EARTH_RADIUS_KM,
};

/// A facility with every figure reported and every specialist on staff.
///
/// ICU 10/5, general 50/20, oxygen 90 % and each specialist 2/1.
pub fn stocked_facility(id: &str, location: Coord<f64>) -> Facility {
    SpecialistKind::ALL.into_iter().fold(
        Facility::new(id, format!("{id} hospital"), "Testville", location)
            .with_icu_beds(10, LiveValue::Live(5))
            .with_general_beds(50, LiveValue::Live(20))
            .with_oxygen(LiveValue::Live(90)),
        |facility, kind| facility.with_specialist(kind, Capacity::new(2, 1)),
    )
}

/// The point `km` kilometres due north of `origin` along its meridian.
///
/// Moving along a meridian makes the haversine distance exactly
/// proportional to the latitude offset, which keeps distance assertions
/// free of projection error.
#[must_use]
pub fn kilometres_north(origin: Coord<f64>, km: f64) -> Coord<f64> {
    Coord {
        x: origin.x,
        y: origin.y + (km / EARTH_RADIUS_KM).to_degrees(),
    }
}

/// A store whose backend is permanently down.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn outage(operation: &'static str) -> StoreError {
        StoreError::unavailable(
            operation,
            io::Error::new(io::ErrorKind::ConnectionRefused, "store offline"),
        )
    }
}

impl CapacityStore for UnavailableStore {
    fn all(&self) -> Result<Vec<Facility>, StoreError> {
        Err(Self::outage("all"))
    }

    fn get(&self, _id: &FacilityId) -> Result<Facility, StoreError> {
        Err(Self::outage("get"))
    }

    fn conditional_decrement(
        &self,
        _id: &FacilityId,
        _category: ResourceCategory,
    ) -> Result<Facility, StoreError> {
        Err(Self::outage("conditional_decrement"))
    }

    fn overwrite(&self, _id: &FacilityId, _update: &LiveUpdate) -> Result<Facility, StoreError> {
        Err(Self::outage("overwrite"))
    }
}
