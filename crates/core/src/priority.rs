//! Priority scoring for queued patients.
//!
//! The score is additive: each condition contributes its weight independently and the
//! contributions are summed, so a patient may collect all four. See
//! [`crate::constants`] for the weights.

use crate::constants::{
    AGE_WEIGHT, CHILD_AGE_LIMIT_YEARS, COMPLEMENTARY_TIER_WEIGHT, ELDERLY_AGE_YEARS,
    LIMITED_MOBILITY_WEIGHT, PREGNANCY_WEIGHT,
};
use triage_types::{AffiliationTier, Age};

/// Computes the priority score for a set of patient attributes.
///
/// Higher is more urgent. The result is always within `0..=MAX_PRIORITY`.
pub fn score(age: Age, pregnant: bool, limited_mobility: bool, tier: AffiliationTier) -> u8 {
    let mut priority = 0;
    if in_priority_age_band(age) {
        priority += AGE_WEIGHT;
    }
    if pregnant {
        priority += PREGNANCY_WEIGHT;
    }
    if limited_mobility {
        priority += LIMITED_MOBILITY_WEIGHT;
    }
    if tier == AffiliationTier::Complementary {
        priority += COMPLEMENTARY_TIER_WEIGHT;
    }
    priority
}

/// Older adults and young children share one age weight.
pub fn in_priority_age_band(age: Age) -> bool {
    age.years() >= ELDERLY_AGE_YEARS || age.years() < CHILD_AGE_LIMIT_YEARS
}
