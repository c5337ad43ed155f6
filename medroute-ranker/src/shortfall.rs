//! Estimates for live figures that were not reported.
#![forbid(unsafe_code)]

use medroute_core::{DailySample, HistoryWindow};

/// A history column that can stand in for a missing live value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryField {
    /// Free ICU beds.
    IcuAvailable,
    /// Free general beds.
    GeneralAvailable,
    /// Oxygen level.
    OxygenPercentage,
}

impl HistoryField {
    const fn read(self, sample: &DailySample) -> Option<u32> {
        match self {
            Self::IcuAvailable => sample.icu_available,
            Self::GeneralAvailable => sample.general_available,
            Self::OxygenPercentage => sample.oxygen_percentage,
        }
    }
}

/// Mean of `field` over the samples that record it, rounded half up.
///
/// Samples missing the field are skipped. Returns `0` when no sample records
/// it.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use medroute_core::{DailySample, HistoryWindow};
/// use medroute_ranker::{HistoryField, estimate};
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let window = HistoryWindow::from_samples([5, 7, 9].map(|icu| DailySample {
///     date: day,
///     icu_available: Some(icu),
///     general_available: None,
///     oxygen_percentage: None,
/// }));
/// assert_eq!(estimate(&window, HistoryField::IcuAvailable), 7);
/// assert_eq!(estimate(&window, HistoryField::GeneralAvailable), 0);
/// ```
#[must_use]
pub fn estimate(history: &HistoryWindow, field: HistoryField) -> u32 {
    let (sum, count) = history
        .samples()
        .filter_map(|sample| field.read(sample))
        .fold((0_u64, 0_u64), |(sum, count), value| {
            (sum.saturating_add(u64::from(value)), count.saturating_add(1))
        });
    // floor((2 * sum + count) / (2 * count)) rounds the mean half up.
    let rounded = sum
        .saturating_mul(2)
        .saturating_add(count)
        .checked_div(count.saturating_mul(2))
        .unwrap_or(0);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
