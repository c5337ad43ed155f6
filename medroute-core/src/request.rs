//! Dispatch requests describing what a patient needs and where they are.

use std::fmt;
use std::str::FromStr;

use geo::Coord;
use thiserror::Error;

use crate::SpecialistKind;

/// Patient condition reported by the crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Life-threatening; distance weighs more heavily during refinement.
    Critical,
    /// Needs prompt attention.
    Urgent,
    /// Stable but requires admission.
    Stable,
    /// Routine transfer.
    Normal,
}

impl Severity {
    /// Return the display label, e.g. `"Critical"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Urgent => "Urgent",
            Self::Stable => "Stable",
            Self::Normal => "Normal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown severity label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown condition '{label}'")]
pub struct ParseSeverityError {
    /// The rejected input.
    pub label: String,
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "urgent" => Ok(Self::Urgent),
            "stable" => Ok(Self::Stable),
            "normal" => Ok(Self::Normal),
            _ => Err(ParseSeverityError {
                label: s.to_owned(),
            }),
        }
    }
}

/// A request to rank facilities for one patient.
///
/// `location` uses `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use medroute_core::{DispatchRequest, Severity, SpecialistKind};
///
/// let request = DispatchRequest::at(Coord { x: 78.48, y: 17.38 })
///     .with_condition(Severity::Critical)
///     .with_specialist(SpecialistKind::Neurologist)
///     .needing_icu();
/// assert!(request.needs_icu);
/// assert!(!request.needs_oxygen);
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DispatchRequest {
    /// Reported condition, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<Severity>,
    /// Specialist the patient must see.
    #[cfg_attr(feature = "serde", serde(default))]
    pub required_specialist: Option<SpecialistKind>,
    /// Whether an ICU bed is mandatory.
    #[cfg_attr(
        feature = "serde",
        serde(default, rename = "needsICU", alias = "needsIcu")
    )]
    pub needs_icu: bool,
    /// Whether a working oxygen supply is mandatory.
    #[cfg_attr(feature = "serde", serde(default))]
    pub needs_oxygen: bool,
    /// Where the patient is.
    #[cfg_attr(feature = "serde", serde(with = "crate::latlng"))]
    pub location: Coord<f64>,
}

/// Errors returned by [`DispatchRequest::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DispatchRequestValidationError {
    /// A coordinate component was NaN or infinite.
    #[error("request location must be finite")]
    NonFiniteLocation,
    /// Latitude outside `-90..=90`.
    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    /// Longitude outside `-180..=180`.
    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
}

impl DispatchRequest {
    /// A request at `location` with no condition and no hard requirements.
    #[must_use]
    pub const fn at(location: Coord<f64>) -> Self {
        Self {
            condition: None,
            required_specialist: None,
            needs_icu: false,
            needs_oxygen: false,
            location,
        }
    }

    /// Set the condition while returning `self` for chaining.
    #[must_use]
    pub const fn with_condition(mut self, condition: Severity) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Require a specialist while returning `self` for chaining.
    #[must_use]
    pub const fn with_specialist(mut self, kind: SpecialistKind) -> Self {
        self.required_specialist = Some(kind);
        self
    }

    /// Require an ICU bed.
    #[must_use]
    pub const fn needing_icu(mut self) -> Self {
        self.needs_icu = true;
        self
    }

    /// Require oxygen.
    #[must_use]
    pub const fn needing_oxygen(mut self) -> Self {
        self.needs_oxygen = true;
        self
    }

    /// Report whether the patient is in critical condition.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.condition == Some(Severity::Critical)
    }

    /// Check the location is a usable WGS84 coordinate.
    pub fn validate(&self) -> Result<(), DispatchRequestValidationError> {
        let Coord { x: lng, y: lat } = self.location;
        if !lng.is_finite() || !lat.is_finite() {
            return Err(DispatchRequestValidationError::NonFiniteLocation);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DispatchRequestValidationError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(DispatchRequestValidationError::LongitudeOutOfRange(lng));
        }
        Ok(())
    }
}
