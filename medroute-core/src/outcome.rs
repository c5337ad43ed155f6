//! Results of reservation attempts.

use crate::{FacilityId, ResourceCategory};

/// Why a reservation was not granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ReservationFailure {
    /// No unit was free when the decrement ran.
    CapacityExhausted,
    /// The facility identifier did not resolve.
    FacilityNotFound,
    /// The store failed; the caller may retry.
    StoreUnavailable,
    /// An operator declined the request.
    DeniedByOperator,
    /// The request was missing or carried invalid fields.
    MalformedRequest,
}

impl ReservationFailure {
    /// Report whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::StoreUnavailable)
    }
}

/// The answer delivered to a requester for one reservation attempt.
///
/// # Examples
/// ```
/// use medroute_core::{ReservationFailure, ReservationOutcome, ResourceCategory};
///
/// let outcome = ReservationOutcome::rejected(
///     "h-1".into(),
///     ResourceCategory::IcuBeds,
///     ReservationFailure::CapacityExhausted,
///     "no ICU bed left",
/// );
/// assert!(!outcome.granted);
/// assert_eq!(outcome.remaining, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReservationOutcome {
    /// Whether a unit was claimed.
    #[cfg_attr(feature = "serde", serde(rename = "approved"))]
    pub granted: bool,
    /// Facility the request targeted.
    pub facility_id: FacilityId,
    /// Category the request targeted.
    pub category: ResourceCategory,
    /// Units left after a successful claim.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub remaining: Option<u32>,
    /// Human-readable explanation.
    #[cfg_attr(feature = "serde", serde(rename = "message"))]
    pub reason: String,
    /// Machine-readable failure kind when not granted.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub failure: Option<ReservationFailure>,
}

impl ReservationOutcome {
    /// A successful claim leaving `remaining` units.
    pub fn granted(
        facility_id: FacilityId,
        category: ResourceCategory,
        remaining: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            granted: true,
            facility_id,
            category,
            remaining: Some(remaining),
            reason: reason.into(),
            failure: None,
        }
    }

    /// A refusal of the given kind.
    pub fn rejected(
        facility_id: FacilityId,
        category: ResourceCategory,
        failure: ReservationFailure,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            granted: false,
            facility_id,
            category,
            remaining: None,
            reason: reason.into(),
            failure: Some(failure),
        }
    }

    /// Report whether the requester may retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.failure.is_some_and(ReservationFailure::is_retryable)
    }
}
