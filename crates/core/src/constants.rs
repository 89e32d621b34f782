//! Constants used throughout the triage core crate.
//!
//! The priority weights live here so the scoring rule reads as a table and the
//! upper bound of the score stays in step with the weights.

use std::time::Duration;

/// Patients at or above this age receive the age weight.
pub const ELDERLY_AGE_YEARS: u32 = 60;

/// Patients strictly below this age receive the age weight.
pub const CHILD_AGE_LIMIT_YEARS: u32 = 12;

/// Contribution for patients in either age band.
pub const AGE_WEIGHT: u8 = 3;

/// Contribution for pregnancy.
pub const PREGNANCY_WEIGHT: u8 = 2;

/// Contribution for limited mobility.
pub const LIMITED_MOBILITY_WEIGHT: u8 = 2;

/// Contribution for complementary-plan affiliation.
pub const COMPLEMENTARY_TIER_WEIGHT: u8 = 1;

/// Highest score a patient can reach.
pub const MAX_PRIORITY: u8 =
    AGE_WEIGHT + PREGNANCY_WEIGHT + LIMITED_MOBILITY_WEIGHT + COMPLEMENTARY_TIER_WEIGHT;

/// Cadence of the periodic driver when no interval is configured.
pub const DEFAULT_ADVANCE_INTERVAL: Duration = Duration::from_secs(5);

/// Longest accepted cadence for the periodic driver.
pub const MAX_ADVANCE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Capacity of the dispatcher command channel when none is configured.
pub const DEFAULT_COMMAND_BUFFER: usize = 64;
