//! Dispatcher runtime configuration.
//!
//! Configuration is resolved once, before the dispatcher starts, and then passed into
//! [`crate::Dispatcher::spawn`]. The core never reads process-wide environment variables
//! itself; a host that wants env-driven settings reads them and hands the raw values to
//! [`DispatchConfig::from_values`].

use crate::constants::{DEFAULT_ADVANCE_INTERVAL, DEFAULT_COMMAND_BUFFER, MAX_ADVANCE_INTERVAL};
use crate::{TriageError, TriageResult};
use std::time::Duration;

/// Dispatcher configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    advance_interval: Duration,
    command_buffer: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            advance_interval: DEFAULT_ADVANCE_INTERVAL,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl DispatchConfig {
    /// Create a new `DispatchConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::InvalidConfig`] if the interval is zero or longer than
    /// [`MAX_ADVANCE_INTERVAL`], or the command buffer is empty.
    pub fn new(advance_interval: Duration, command_buffer: usize) -> TriageResult<Self> {
        if advance_interval.is_zero() {
            return Err(TriageError::InvalidConfig(
                "advance interval must be greater than zero".into(),
            ));
        }

        if advance_interval > MAX_ADVANCE_INTERVAL {
            return Err(TriageError::InvalidConfig(format!(
                "advance interval must not exceed {}s",
                MAX_ADVANCE_INTERVAL.as_secs()
            )));
        }

        if command_buffer == 0 {
            return Err(TriageError::InvalidConfig(
                "command buffer must hold at least one command".into(),
            ));
        }

        Ok(Self {
            advance_interval,
            command_buffer,
        })
    }

    /// Build a configuration from optional raw string values.
    ///
    /// `interval_secs` is a number of seconds and may be fractional (`"2.5"`).
    /// `command_buffer` is a positive integer. A missing or blank value falls back to
    /// the default for that field.
    pub fn from_values(
        interval_secs: Option<String>,
        command_buffer: Option<String>,
    ) -> TriageResult<Self> {
        let advance_interval = match non_blank(interval_secs) {
            Some(raw) => parse_interval_secs(&raw)?,
            None => DEFAULT_ADVANCE_INTERVAL,
        };

        let command_buffer = match non_blank(command_buffer) {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                TriageError::InvalidConfig(format!("command buffer {raw:?} is not a count: {e}"))
            })?,
            None => DEFAULT_COMMAND_BUFFER,
        };

        Self::new(advance_interval, command_buffer)
    }

    pub fn advance_interval(&self) -> Duration {
        self.advance_interval
    }

    pub fn command_buffer(&self) -> usize {
        self.command_buffer
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_interval_secs(raw: &str) -> TriageResult<Duration> {
    let secs = raw.parse::<f64>().map_err(|e| {
        TriageError::InvalidConfig(format!("advance interval {raw:?} is not a number: {e}"))
    })?;

    Duration::try_from_secs_f64(secs).map_err(|e| {
        TriageError::InvalidConfig(format!("advance interval {raw:?} is out of range: {e}"))
    })
}
