//! Hard constraints that exclude a facility outright.
#![forbid(unsafe_code)]

use std::fmt;

use medroute_core::{Capacity, DispatchRequest, Facility, SpecialistKind};

use crate::ResolvedResources;

/// Minimum resolved oxygen level accepted when oxygen is required.
pub const OXYGEN_THRESHOLD: u32 = 20;

/// Why a facility was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// The required specialist is not staffed or has no free slot.
    SpecialistUnavailable(SpecialistKind),
    /// An ICU bed is required and none is free.
    NoIcuBed,
    /// Oxygen is required and the level is below [`OXYGEN_THRESHOLD`].
    OxygenBelowThreshold(u32),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpecialistUnavailable(kind) => write!(f, "no {} available", kind.label()),
            Self::NoIcuBed => f.write_str("no ICU bed available"),
            Self::OxygenBelowThreshold(level) => {
                write!(f, "oxygen at {level}% is below {OXYGEN_THRESHOLD}%")
            }
        }
    }
}

/// Apply the hard constraints of `request` to one facility.
///
/// Constraints the request does not ask for never exclude.
pub fn check(
    facility: &Facility,
    resources: &ResolvedResources,
    request: &DispatchRequest,
) -> Result<(), Exclusion> {
    if let Some(kind) = request.required_specialist {
        let staffed = facility
            .specialist(kind)
            .is_some_and(Capacity::has_vacancy);
        if !staffed {
            return Err(Exclusion::SpecialistUnavailable(kind));
        }
    }
    if request.needs_icu && resources.icu_available == 0 {
        return Err(Exclusion::NoIcuBed);
    }
    if request.needs_oxygen && resources.oxygen_percentage < OXYGEN_THRESHOLD {
        return Err(Exclusion::OxygenBelowThreshold(resources.oxygen_percentage));
    }
    Ok(())
}
