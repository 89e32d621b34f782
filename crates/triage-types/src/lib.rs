//! Validated attribute primitives for triage admissions.
//!
//! Every value in this crate is checked once, at construction. Once you hold a
//! [`PatientName`], an [`Age`] or an [`AffiliationTier`] it is known to be valid, so the
//! scoring and queueing code in `triage-core` never has to re-check raw input.
//!
//! Raw values come from whatever collects them (a form, a request body, a test). Parsing
//! failures are reported as [`AttributeError`] and the caller is expected to re-prompt;
//! nothing here substitutes a default for a bad value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised when a raw attribute cannot be turned into a validated type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// The name was empty or contained only whitespace
    #[error("patient name cannot be empty")]
    EmptyName,
    /// A negative age was supplied
    #[error("age cannot be negative (got {0})")]
    NegativeAge(i64),
    /// The age does not fit the supported range
    #[error("age {0} is out of range")]
    AgeOutOfRange(i64),
    /// The affiliation code was neither `POS` nor `PC`
    #[error("unrecognised affiliation tier {0:?} (expected POS or PC)")]
    UnknownTier(String),
}

// ============================================================================
// Patient name
// ============================================================================

/// A display name that is guaranteed to contain at least one non-whitespace character.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatientName(String);

impl PatientName {
    /// Creates a new `PatientName` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::EmptyName`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, AttributeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AttributeError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for PatientName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PatientName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientName::new(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Age
// ============================================================================

/// Age in completed years.
///
/// Negative ages are unrepresentable; use [`Age::try_from`] on a signed value coming from
/// user input to get the [`AttributeError::NegativeAge`] rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Age(u32);

impl Age {
    /// Wraps a number of years.
    pub const fn new(years: u32) -> Self {
        Self(years)
    }

    /// Returns the age in years.
    pub const fn years(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Age {
    type Error = AttributeError;

    fn try_from(years: i64) -> Result<Self, Self::Error> {
        if years < 0 {
            return Err(AttributeError::NegativeAge(years));
        }
        u32::try_from(years)
            .map(Self)
            .map_err(|_| AttributeError::AgeOutOfRange(years))
    }
}

impl From<u32> for Age {
    fn from(years: u32) -> Self {
        Self(years)
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Affiliation tier
// ============================================================================

/// Health-plan affiliation category.
///
/// On input the tier is given by its plan code: `POS` for the standard plan and `PC` for
/// the complementary plan. Codes are matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffiliationTier {
    /// Standard plan (`POS`).
    Standard,
    /// Complementary plan (`PC`).
    Complementary,
}

impl AffiliationTier {
    /// Canonical plan code for this tier.
    pub fn code(self) -> &'static str {
        match self {
            AffiliationTier::Standard => "POS",
            AffiliationTier::Complementary => "PC",
        }
    }

    /// Parse a plan code, ignoring case and surrounding whitespace.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.eq_ignore_ascii_case("POS") {
            Some(AffiliationTier::Standard)
        } else if code.eq_ignore_ascii_case("PC") {
            Some(AffiliationTier::Complementary)
        } else {
            None
        }
    }
}

impl FromStr for AffiliationTier {
    type Err = AttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| AttributeError::UnknownTier(s.to_owned()))
    }
}

impl fmt::Display for AffiliationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for AffiliationTier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for AffiliationTier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
