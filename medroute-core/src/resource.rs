//! Resource categories a facility can offer.
//!
//! Specialist kinds form a fixed enumerated set. Reservable categories are the
//! countable resources: ICU beds, general beds and one slot per specialist
//! kind. Oxygen is a percentage level and is deliberately absent here.
//!
//! # Examples
//! ```
//! use medroute_core::{ResourceCategory, SpecialistKind};
//!
//! assert_eq!(SpecialistKind::GeneralSurgeon.as_str(), "generalSurgeon");
//! assert_eq!(SpecialistKind::GeneralSurgeon.label(), "general surgeon");
//! let category: ResourceCategory = "cardiologist".parse().unwrap();
//! assert_eq!(category, ResourceCategory::Specialist(SpecialistKind::Cardiologist));
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Specialist disciplines tracked per facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SpecialistKind {
    /// Heart specialists.
    Cardiologist,
    /// Brain and nervous system specialists.
    Neurologist,
    /// Bone and joint specialists.
    Orthopedist,
    /// Paediatric specialists.
    Pediatrician,
    /// General surgery.
    GeneralSurgeon,
}

impl SpecialistKind {
    /// Every specialist kind in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Cardiologist,
        Self::Neurologist,
        Self::Orthopedist,
        Self::Pediatrician,
        Self::GeneralSurgeon,
    ];

    /// Return the wire identifier, e.g. `"generalSurgeon"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cardiologist => "cardiologist",
            Self::Neurologist => "neurologist",
            Self::Orthopedist => "orthopedist",
            Self::Pediatrician => "pediatrician",
            Self::GeneralSurgeon => "generalSurgeon",
        }
    }

    /// Return a human-readable label, e.g. `"general surgeon"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GeneralSurgeon => "general surgeon",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for SpecialistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown specialist or category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource category '{name}'")]
pub struct ParseCategoryError {
    /// The rejected input.
    pub name: String,
}

impl FromStr for SpecialistKind {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalised.as_str() {
            "cardiologist" => Ok(Self::Cardiologist),
            "neurologist" => Ok(Self::Neurologist),
            "orthopedist" => Ok(Self::Orthopedist),
            "pediatrician" => Ok(Self::Pediatrician),
            "generalsurgeon" => Ok(Self::GeneralSurgeon),
            _ => Err(ParseCategoryError { name: s.to_owned() }),
        }
    }
}

/// A countable resource that can be claimed one unit at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum ResourceCategory {
    /// Intensive care beds.
    IcuBeds,
    /// General ward beds.
    GeneralBeds,
    /// A slot with the named specialist.
    Specialist(SpecialistKind),
}

impl ResourceCategory {
    /// Return the wire identifier used in events and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IcuBeds => "icuBeds",
            Self::GeneralBeds => "generalBeds",
            Self::Specialist(kind) => kind.as_str(),
        }
    }

    /// Return a human-readable label for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::IcuBeds => "ICU bed",
            Self::GeneralBeds => "general bed",
            Self::Specialist(kind) => kind.label(),
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalised.as_str() {
            "icubeds" | "icu" => Ok(Self::IcuBeds),
            "generalbeds" | "general" => Ok(Self::GeneralBeds),
            _ => SpecialistKind::from_str(s).map(Self::Specialist),
        }
    }
}

impl TryFrom<String> for ResourceCategory {
    type Error = ParseCategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceCategory> for String {
    fn from(value: ResourceCategory) -> Self {
        value.as_str().to_owned()
    }
}

impl From<SpecialistKind> for ResourceCategory {
    fn from(kind: SpecialistKind) -> Self {
        Self::Specialist(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cardiologist", SpecialistKind::Cardiologist)]
    #[case("generalSurgeon", SpecialistKind::GeneralSurgeon)]
    #[case("general_surgeon", SpecialistKind::GeneralSurgeon)]
    #[case("General Surgeon", SpecialistKind::GeneralSurgeon)]
    fn specialist_parsing_accepts_common_spellings(
        #[case] input: &str,
        #[case] expected: SpecialistKind,
    ) {
        assert_eq!(input.parse::<SpecialistKind>(), Ok(expected));
    }

    #[rstest]
    fn specialist_round_trips_through_wire_name() {
        for kind in SpecialistKind::ALL {
            assert_eq!(kind.as_str().parse::<SpecialistKind>(), Ok(kind));
        }
    }

    #[rstest]
    #[case("icuBeds", ResourceCategory::IcuBeds)]
    #[case("generalBeds", ResourceCategory::GeneralBeds)]
    #[case("neurologist", ResourceCategory::Specialist(SpecialistKind::Neurologist))]
    fn category_parsing(#[case] input: &str, #[case] expected: ResourceCategory) {
        assert_eq!(input.parse::<ResourceCategory>(), Ok(expected));
    }

    #[rstest]
    fn oxygen_is_not_a_reservable_category() {
        let err = "oxygen".parse::<ResourceCategory>().unwrap_err();
        assert_eq!(err.name, "oxygen");
    }

    #[rstest]
    fn labels_are_human_readable() {
        assert_eq!(ResourceCategory::IcuBeds.label(), "ICU bed");
        assert_eq!(
            ResourceCategory::Specialist(SpecialistKind::GeneralSurgeon).label(),
            "general surgeon"
        );
    }
}
