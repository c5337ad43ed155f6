//! Facilities and their capacity counters.
//!
//! A [`Facility`] carries bed and specialist capacities, an oxygen level and a
//! bounded [`HistoryWindow`]. Live figures that may be missing are modelled as
//! [`LiveValue`] so "reported as zero" never collapses into "not reported".

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use geo::Coord;
use thiserror::Error;

use crate::{ResourceCategory, SpecialistKind};

/// Maximum number of daily samples kept in a [`HistoryWindow`].
pub const MAX_HISTORY_DAYS: usize = 30;

/// Upper bound of an oxygen percentage.
pub const MAX_OXYGEN_PERCENTAGE: u32 = 100;

/// Stable identifier of a facility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FacilityId(String);

impl FacilityId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FacilityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FacilityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A live figure that may not have been reported.
///
/// # Examples
/// ```
/// use medroute_core::LiveValue;
///
/// assert_eq!(LiveValue::Live(0).value(), Some(0));
/// assert_eq!(LiveValue::Unknown.value(), None);
/// assert_eq!(LiveValue::from(None), LiveValue::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Option<u32>", into = "Option<u32>"))]
pub enum LiveValue {
    /// The operator reported this value.
    Live(u32),
    /// No live value is available.
    #[default]
    Unknown,
}

impl LiveValue {
    /// Return the reported value, if any.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Live(value) => Some(value),
            Self::Unknown => None,
        }
    }

    /// Report whether the value is missing.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<Option<u32>> for LiveValue {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Unknown, Self::Live)
    }
}

impl From<LiveValue> for Option<u32> {
    fn from(value: LiveValue) -> Self {
        value.value()
    }
}

/// Total and currently available units of a specialist slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capacity {
    /// Configured number of units.
    pub total: u32,
    /// Units free right now.
    pub available: u32,
}

impl Capacity {
    /// Construct a capacity.
    #[must_use]
    pub const fn new(total: u32, available: u32) -> Self {
        Self { total, available }
    }

    /// Report whether at least one unit is free.
    #[must_use]
    pub const fn has_vacancy(self) -> bool {
        self.available > 0
    }
}

/// Bed capacity whose live availability may be unreported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BedCapacity {
    /// Configured number of beds.
    pub total: u32,
    /// Beds free right now, if reported.
    #[cfg_attr(feature = "serde", serde(default))]
    pub available: LiveValue,
}

impl BedCapacity {
    /// Construct a bed capacity.
    #[must_use]
    pub const fn new(total: u32, available: LiveValue) -> Self {
        Self { total, available }
    }
}

/// One day of observed availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DailySample {
    /// Day the observations belong to.
    pub date: NaiveDate,
    /// ICU beds free that day.
    #[cfg_attr(feature = "serde", serde(default))]
    pub icu_available: Option<u32>,
    /// General beds free that day.
    #[cfg_attr(feature = "serde", serde(default))]
    pub general_available: Option<u32>,
    /// Oxygen level that day.
    #[cfg_attr(feature = "serde", serde(default))]
    pub oxygen_percentage: Option<u32>,
}

/// Chronologically ordered daily samples, capped at [`MAX_HISTORY_DAYS`].
///
/// Recording beyond the cap evicts the oldest sample.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use medroute_core::{DailySample, HistoryWindow, MAX_HISTORY_DAYS};
///
/// let mut window = HistoryWindow::default();
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// for day in 0..40 {
///     window.record(DailySample {
///         date: start + chrono::Days::new(day),
///         icu_available: Some(u32::try_from(day).unwrap()),
///         general_available: None,
///         oxygen_percentage: None,
///     });
/// }
/// assert_eq!(window.len(), MAX_HISTORY_DAYS);
/// assert_eq!(window.samples().next().and_then(|s| s.icu_available), Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(from = "Vec<DailySample>", into = "Vec<DailySample>")
)]
pub struct HistoryWindow {
    samples: VecDeque<DailySample>,
}

impl HistoryWindow {
    /// Build a window from samples in chronological order, keeping the most
    /// recent [`MAX_HISTORY_DAYS`].
    pub fn from_samples<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = DailySample>,
    {
        let mut window = Self::default();
        for sample in samples {
            window.record(sample);
        }
        window
    }

    /// Append the newest sample, evicting the oldest past the cap.
    ///
    /// A sample for a date already held replaces that day's observations,
    /// so the window never carries two samples for one date.
    pub fn record(&mut self, sample: DailySample) {
        if let Some(existing) = self.samples.iter_mut().find(|s| s.date == sample.date) {
            *existing = sample;
            return;
        }
        if self.samples.len() == MAX_HISTORY_DAYS {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Iterate samples from oldest to newest.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &DailySample> + '_ {
        self.samples.iter()
    }

    /// Number of samples held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Report whether the window holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<DailySample>> for HistoryWindow {
    fn from(samples: Vec<DailySample>) -> Self {
        Self::from_samples(samples)
    }
}

impl From<HistoryWindow> for Vec<DailySample> {
    fn from(window: HistoryWindow) -> Self {
        window.samples.into()
    }
}

/// Facility records a store refuses, chiefly violations of the capacity
/// invariant `0 ≤ available ≤ total`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// More units reported free than exist.
    #[error("{category} reports {available} available but only {total} in total")]
    AvailableExceedsTotal {
        /// Category carrying the bad figure.
        category: ResourceCategory,
        /// Reported availability.
        available: u32,
        /// Configured total.
        total: u32,
    },
    /// Oxygen level outside `0..=100`.
    #[error("oxygen percentage {value} is outside 0..=100")]
    OxygenOutOfRange {
        /// Reported percentage.
        value: u32,
    },
    /// An update named a specialist the facility does not staff.
    #[error("facility has no {kind} capacity to update")]
    UnknownSpecialist {
        /// Specialist named by the update.
        kind: SpecialistKind,
    },
    /// The facility id appears more than once in one batch of records.
    #[error("facility id appears more than once")]
    DuplicateId,
}

/// Full overwrite of a facility's live figures from an operator.
///
/// Bed and oxygen fields replace the current values outright, including
/// resetting them to [`LiveValue::Unknown`]. Specialist entries replace the
/// availability of the listed kinds; unlisted kinds keep their value. Totals
/// are never changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LiveUpdate {
    /// New ICU availability.
    #[cfg_attr(feature = "serde", serde(default))]
    pub icu_available: LiveValue,
    /// New general bed availability.
    #[cfg_attr(feature = "serde", serde(default))]
    pub general_available: LiveValue,
    /// New oxygen level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub oxygen_percentage: LiveValue,
    /// New specialist availability keyed by kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub specialists: BTreeMap<SpecialistKind, u32>,
}

/// A hospital with location, capacities and recent history.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use medroute_core::{Capacity, Facility, LiveValue, ResourceCategory, SpecialistKind};
///
/// let facility = Facility::new("h-1", "Lotus Medical Center", "Kurnool", Coord { x: 78.03, y: 15.82 })
///     .with_icu_beds(20, LiveValue::Live(4))
///     .with_specialist(SpecialistKind::Cardiologist, Capacity::new(3, 1));
///
/// assert_eq!(facility.available(ResourceCategory::IcuBeds), Some(4));
/// assert!(facility.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Facility {
    /// Stable identifier.
    pub id: FacilityId,
    /// Display name.
    pub name: String,
    /// City the facility serves.
    pub city: String,
    /// Geographic position.
    #[cfg_attr(feature = "serde", serde(with = "crate::latlng"))]
    pub location: Coord<f64>,
    /// Intensive care beds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub icu_beds: BedCapacity,
    /// General ward beds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub general_beds: BedCapacity,
    /// Oxygen supply level in percent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub oxygen_percentage: LiveValue,
    /// Specialist slots keyed by kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub specialists: BTreeMap<SpecialistKind, Capacity>,
    /// Recent daily observations.
    #[cfg_attr(feature = "serde", serde(default))]
    pub history: HistoryWindow,
    /// Time of the last mutation.
    #[cfg_attr(feature = "serde", serde(default = "Utc::now"))]
    pub last_updated: DateTime<Utc>,
}

impl Facility {
    /// Create a facility without capacity or history.
    pub fn new(
        id: impl Into<FacilityId>,
        name: impl Into<String>,
        city: impl Into<String>,
        location: Coord<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            city: city.into(),
            location,
            icu_beds: BedCapacity::default(),
            general_beds: BedCapacity::default(),
            oxygen_percentage: LiveValue::Unknown,
            specialists: BTreeMap::new(),
            history: HistoryWindow::default(),
            last_updated: Utc::now(),
        }
    }

    /// Set ICU capacity while returning `self` for chaining.
    #[must_use]
    pub const fn with_icu_beds(mut self, total: u32, available: LiveValue) -> Self {
        self.icu_beds = BedCapacity::new(total, available);
        self
    }

    /// Set general bed capacity while returning `self` for chaining.
    #[must_use]
    pub const fn with_general_beds(mut self, total: u32, available: LiveValue) -> Self {
        self.general_beds = BedCapacity::new(total, available);
        self
    }

    /// Set the oxygen level while returning `self` for chaining.
    #[must_use]
    pub const fn with_oxygen(mut self, percentage: LiveValue) -> Self {
        self.oxygen_percentage = percentage;
        self
    }

    /// Add or replace a specialist capacity while returning `self`.
    #[must_use]
    pub fn with_specialist(mut self, kind: SpecialistKind, capacity: Capacity) -> Self {
        self.specialists.insert(kind, capacity);
        self
    }

    /// Replace the history window while returning `self`.
    #[must_use]
    pub fn with_history(mut self, history: HistoryWindow) -> Self {
        self.history = history;
        self
    }

    /// Capacity of a specialist kind, if staffed.
    #[must_use]
    pub fn specialist(&self, kind: SpecialistKind) -> Option<Capacity> {
        self.specialists.get(&kind).copied()
    }

    /// Live availability of a category.
    ///
    /// Returns `None` when the category is not offered or its live value is
    /// unknown.
    #[must_use]
    pub fn available(&self, category: ResourceCategory) -> Option<u32> {
        match category {
            ResourceCategory::IcuBeds => self.icu_beds.available.value(),
            ResourceCategory::GeneralBeds => self.general_beds.available.value(),
            ResourceCategory::Specialist(kind) => self.specialist(kind).map(|c| c.available),
        }
    }

    /// Configured total of a category, if offered.
    #[must_use]
    pub fn total(&self, category: ResourceCategory) -> Option<u32> {
        match category {
            ResourceCategory::IcuBeds => Some(self.icu_beds.total),
            ResourceCategory::GeneralBeds => Some(self.general_beds.total),
            ResourceCategory::Specialist(kind) => self.specialist(kind).map(|c| c.total),
        }
    }

    /// Check `0 ≤ available ≤ total` for every category and the oxygen range.
    pub fn validate(&self) -> Result<(), CapacityError> {
        check_bed(ResourceCategory::IcuBeds, self.icu_beds)?;
        check_bed(ResourceCategory::GeneralBeds, self.general_beds)?;
        check_oxygen(self.oxygen_percentage)?;
        for (kind, capacity) in &self.specialists {
            check_units(
                ResourceCategory::Specialist(*kind),
                capacity.available,
                capacity.total,
            )?;
        }
        Ok(())
    }

    /// Take one unit of `category` if one is free, stamping `now`.
    ///
    /// Returns the remaining count on success. Unknown live values and
    /// categories the facility does not offer are never claimable. Callers
    /// must hold whatever lock makes this test-and-decrement indivisible.
    pub fn try_claim(&mut self, category: ResourceCategory, now: DateTime<Utc>) -> Option<u32> {
        let remaining = match category {
            ResourceCategory::IcuBeds => take_bed(&mut self.icu_beds)?,
            ResourceCategory::GeneralBeds => take_bed(&mut self.general_beds)?,
            ResourceCategory::Specialist(kind) => {
                let capacity = self.specialists.get_mut(&kind)?;
                capacity.available = capacity.available.checked_sub(1)?;
                capacity.available
            }
        };
        self.last_updated = now;
        Some(remaining)
    }

    /// Apply an operator overwrite, all or nothing.
    ///
    /// The update is validated against the current totals before any field
    /// changes, so a rejected update leaves the facility untouched.
    pub fn apply_update(
        &mut self,
        update: &LiveUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), CapacityError> {
        check_bed(
            ResourceCategory::IcuBeds,
            BedCapacity::new(self.icu_beds.total, update.icu_available),
        )?;
        check_bed(
            ResourceCategory::GeneralBeds,
            BedCapacity::new(self.general_beds.total, update.general_available),
        )?;
        check_oxygen(update.oxygen_percentage)?;
        for (kind, available) in &update.specialists {
            let capacity = self
                .specialist(*kind)
                .ok_or(CapacityError::UnknownSpecialist { kind: *kind })?;
            check_units(
                ResourceCategory::Specialist(*kind),
                *available,
                capacity.total,
            )?;
        }

        self.icu_beds.available = update.icu_available;
        self.general_beds.available = update.general_available;
        self.oxygen_percentage = update.oxygen_percentage;
        for (kind, available) in &update.specialists {
            if let Some(capacity) = self.specialists.get_mut(kind) {
                capacity.available = *available;
            }
        }
        self.last_updated = now;
        Ok(())
    }
}

fn take_bed(beds: &mut BedCapacity) -> Option<u32> {
    let current = beds.available.value()?;
    let remaining = current.checked_sub(1)?;
    beds.available = LiveValue::Live(remaining);
    Some(remaining)
}

fn check_bed(category: ResourceCategory, beds: BedCapacity) -> Result<(), CapacityError> {
    match beds.available {
        LiveValue::Live(available) => check_units(category, available, beds.total),
        LiveValue::Unknown => Ok(()),
    }
}

const fn check_units(
    category: ResourceCategory,
    available: u32,
    total: u32,
) -> Result<(), CapacityError> {
    if available > total {
        return Err(CapacityError::AvailableExceedsTotal {
            category,
            available,
            total,
        });
    }
    Ok(())
}

const fn check_oxygen(value: LiveValue) -> Result<(), CapacityError> {
    match value {
        LiveValue::Live(value) if value > MAX_OXYGEN_PERCENTAGE => {
            Err(CapacityError::OxygenOutOfRange { value })
        }
        _ => Ok(()),
    }
}
