//! Resolution of the figures used for filtering and scoring.
#![forbid(unsafe_code)]

use log::debug;
use medroute_core::{Facility, HistoryWindow, LiveValue};

use crate::shortfall::{HistoryField, estimate};

/// Figures for one facility with live values preferred over estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedResources {
    /// ICU beds free.
    pub icu_available: u32,
    /// General beds free.
    pub general_available: u32,
    /// Oxygen level.
    pub oxygen_percentage: u32,
    /// `icu_available` came from history.
    pub icu_estimated: bool,
    /// `general_available` came from history.
    pub general_estimated: bool,
    /// `oxygen_percentage` came from history.
    pub oxygen_estimated: bool,
}

impl ResolvedResources {
    /// Resolve every figure of `facility`.
    ///
    /// A reported zero stays zero; only [`LiveValue::Unknown`] falls back to
    /// the history estimate.
    #[must_use]
    pub fn of(facility: &Facility) -> Self {
        let history = &facility.history;
        let (icu_available, icu_estimated) = resolve(
            facility.icu_beds.available,
            history,
            HistoryField::IcuAvailable,
        );
        let (general_available, general_estimated) = resolve(
            facility.general_beds.available,
            history,
            HistoryField::GeneralAvailable,
        );
        let (oxygen_percentage, oxygen_estimated) = resolve(
            facility.oxygen_percentage,
            history,
            HistoryField::OxygenPercentage,
        );
        if icu_estimated || general_estimated || oxygen_estimated {
            debug!(
                "estimated figures for {}: icu={icu_available}, general={general_available}, oxygen={oxygen_percentage}",
                facility.id
            );
        }
        Self {
            icu_available,
            general_available,
            oxygen_percentage,
            icu_estimated,
            general_estimated,
            oxygen_estimated,
        }
    }
}

fn resolve(live: LiveValue, history: &HistoryWindow, field: HistoryField) -> (u32, bool) {
    match live {
        LiveValue::Live(value) => (value, false),
        LiveValue::Unknown => (estimate(history, field), true),
    }
}
