//! Fine table - violation kinds, prayer names and the fine charged for each kind.
//!
//! Stored records keep prayer and type as strings; these enums are the typed view used
//! when recording. A stored fine never changes when this table does.

use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Sentinel stored in the prayer column of non-prayer violations.
pub const NOT_APPLICABLE: &str = "N/A";

/// The five daily prayers in display order.
pub const PRAYERS: [Prayer; 5] = [
    Prayer::Subh,
    Prayer::Luhar,
    Prayer::Asar,
    Prayer::Magrib,
    Prayer::Isha,
];

/// Violation kinds that are recorded against a specific prayer.
pub const PRAYER_VIOLATION_TYPES: [ViolationType; 3] = [
    ViolationType::Absent,
    ViolationType::Masbooq,
    ViolationType::NoCap,
];

/// Prayer a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prayer {
    /// Dawn prayer
    Subh,
    /// Midday prayer
    Luhar,
    /// Afternoon prayer
    Asar,
    /// Sunset prayer
    Magrib,
    /// Night prayer
    Isha,
    /// Not tied to a prayer (stored as `"N/A"`)
    NotApplicable,
}

impl Prayer {
    /// Name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subh => "Subh",
            Self::Luhar => "Luhar",
            Self::Asar => "Asar",
            Self::Magrib => "Magrib",
            Self::Isha => "Isha",
            Self::NotApplicable => NOT_APPLICABLE,
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prayer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed == NOT_APPLICABLE {
            return Ok(Self::NotApplicable);
        }
        PRAYERS
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::validation(format!("Unknown prayer '{trimmed}'")))
    }
}

/// Kind of infraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationType {
    /// Missed the prayer entirely
    Absent,
    /// Joined the congregation late
    Masbooq,
    /// Attended without a cap
    NoCap,
    /// Arrived at school late; not tied to a prayer
    LateToSchool,
}

impl ViolationType {
    /// Name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "Absent",
            Self::Masbooq => "Masbooq",
            Self::NoCap => "No Cap",
            Self::LateToSchool => "Late to School",
        }
    }

    /// Fine charged for this kind.
    #[must_use]
    pub const fn fine(self) -> i64 {
        match self {
            Self::Absent => 50,
            Self::Masbooq | Self::NoCap | Self::LateToSchool => 25,
        }
    }

    /// Whether this kind is recorded against a prayer.
    #[must_use]
    pub const fn is_prayer_violation(self) -> bool {
        !matches!(self, Self::LateToSchool)
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        [
            Self::Absent,
            Self::Masbooq,
            Self::NoCap,
            Self::LateToSchool,
        ]
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| Error::validation(format!("Unknown violation type '{trimmed}'")))
    }
}

/// Fine for a stored violation type name, 0 when the name is not recognized.
#[must_use]
pub fn fine_for(violation_type: &str) -> i64 {
    violation_type
        .parse::<ViolationType>()
        .map_or(0, ViolationType::fine)
}

/// The (prayer, type) half of a violation's duplicate key, already normalized.
///
/// Late to School always carries the `"N/A"` prayer; prayer violations must name one of
/// the five prayers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViolationSlot {
    prayer: Prayer,
    kind: ViolationType,
}

impl ViolationSlot {
    /// Builds a slot, forcing `"N/A"` for non-prayer kinds.
    ///
    /// # Errors
    /// Returns a validation error when a prayer violation has no prayer.
    pub fn new(prayer: Prayer, kind: ViolationType) -> Result<Self> {
        if !kind.is_prayer_violation() {
            return Ok(Self {
                prayer: Prayer::NotApplicable,
                kind,
            });
        }
        if prayer == Prayer::NotApplicable {
            return Err(Error::validation(format!(
                "'{kind}' must be recorded against a prayer"
            )));
        }
        Ok(Self { prayer, kind })
    }

    /// Slot for a Late to School violation.
    #[must_use]
    pub const fn late_to_school() -> Self {
        Self {
            prayer: Prayer::NotApplicable,
            kind: ViolationType::LateToSchool,
        }
    }

    /// Prayer part of the key.
    #[must_use]
    pub const fn prayer(self) -> Prayer {
        self.prayer
    }

    /// Type part of the key.
    #[must_use]
    pub const fn kind(self) -> ViolationType {
        self.kind
    }

    /// Fine charged for a violation in this slot.
    #[must_use]
    pub const fn fine(self) -> i64 {
        self.kind.fine()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_fixed_fines() {
        assert_eq!(fine_for("Absent"), 50);
        assert_eq!(fine_for("Masbooq"), 25);
        assert_eq!(fine_for("No Cap"), 25);
        assert_eq!(fine_for("Late to School"), 25);
    }

    #[test]
    fn test_unknown_type_has_no_fine() {
        assert_eq!(fine_for("Talking in class"), 0);
        assert_eq!(fine_for(""), 0);
    }

    #[test]
    fn test_prayer_order() {
        let names: Vec<&str> = PRAYERS.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, ["Subh", "Luhar", "Asar", "Magrib", "Isha"]);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("N/A".parse::<Prayer>().unwrap(), Prayer::NotApplicable);
        assert_eq!("magrib".parse::<Prayer>().unwrap(), Prayer::Magrib);
        assert_eq!(
            "no cap".parse::<ViolationType>().unwrap(),
            ViolationType::NoCap
        );
        assert!("Fajr".parse::<Prayer>().is_err());
        assert!("Late".parse::<ViolationType>().is_err());
    }

    #[test]
    fn test_late_to_school_forces_not_applicable() {
        let slot = ViolationSlot::new(Prayer::Asar, ViolationType::LateToSchool).unwrap();
        assert_eq!(slot.prayer(), Prayer::NotApplicable);
        assert_eq!(slot, ViolationSlot::late_to_school());
        assert_eq!(slot.fine(), 25);
    }

    #[test]
    fn test_prayer_violation_requires_prayer() {
        let result = ViolationSlot::new(Prayer::NotApplicable, ViolationType::Absent);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }
}
