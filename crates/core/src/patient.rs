//! Patient values handed to the turn queue.
//!
//! A [`Patient`] is immutable: its priority is computed once, in the constructor, from the
//! other four attributes and can never drift from them. Re-admitting someone whose
//! circumstances changed means building a new `Patient`.

use crate::priority;
use crate::TriageResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use triage_types::{AffiliationTier, Age, AttributeError, PatientName};

/// A scored patient, ready to be admitted.
///
/// Serialises as a flat record including the computed `priority`. Deserialising goes
/// through [`PatientAttributes`], so any `priority` in the input is ignored and recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PatientAttributes")]
pub struct Patient {
    name: PatientName,
    age: Age,
    affiliation_tier: AffiliationTier,
    pregnant: bool,
    limited_mobility: bool,
    priority: u8,
}

/// Raw, unvalidated patient attributes as a collaborator collects them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatientAttributes {
    pub name: String,
    pub age: i64,
    pub affiliation_tier: String,
    #[serde(default)]
    pub pregnant: bool,
    #[serde(default)]
    pub limited_mobility: bool,
}

impl Patient {
    /// Builds a patient from already-validated attributes and scores it.
    pub fn new(
        name: PatientName,
        age: Age,
        affiliation_tier: AffiliationTier,
        pregnant: bool,
        limited_mobility: bool,
    ) -> Self {
        let priority = priority::score(age, pregnant, limited_mobility, affiliation_tier);
        Self {
            name,
            age,
            affiliation_tier,
            pregnant,
            limited_mobility,
            priority,
        }
    }

    /// Validates raw attributes and builds a scored patient.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TriageError::InvalidAttribute`] if the name is blank, the age is
    /// negative, or the tier code is not `POS`/`PC`.
    pub fn from_raw(
        name: &str,
        age: i64,
        affiliation_tier: &str,
        pregnant: bool,
        limited_mobility: bool,
    ) -> TriageResult<Self> {
        let attributes = PatientAttributes {
            name: name.to_owned(),
            age,
            affiliation_tier: affiliation_tier.to_owned(),
            pregnant,
            limited_mobility,
        };
        Ok(Self::try_from(attributes)?)
    }

    pub fn name(&self) -> &PatientName {
        &self.name
    }

    pub fn age(&self) -> Age {
        self.age
    }

    pub fn affiliation_tier(&self) -> AffiliationTier {
        self.affiliation_tier
    }

    pub fn is_pregnant(&self) -> bool {
        self.pregnant
    }

    pub fn has_limited_mobility(&self) -> bool {
        self.limited_mobility
    }

    /// Computed priority score; higher is served first.
    pub fn priority(&self) -> u8 {
        self.priority
    }
}

impl TryFrom<PatientAttributes> for Patient {
    type Error = AttributeError;

    fn try_from(raw: PatientAttributes) -> Result<Self, Self::Error> {
        let name = PatientName::new(&raw.name)?;
        let age = Age::try_from(raw.age)?;
        let affiliation_tier = raw.affiliation_tier.parse::<AffiliationTier>()?;
        Ok(Self::new(
            name,
            age,
            affiliation_tier,
            raw.pregnant,
            raw.limited_mobility,
        ))
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (priority: {})", self.name, self.priority)
    }
}
