//! # Triage Core
//!
//! Priority turn dispatching for a single service point.
//!
//! Patients are scored from their attributes ([`priority::score`]), admitted into a
//! [`TurnQueue`], and promoted to the current turn one at a time by
//! [`TurnQueue::advance`], highest priority first and first-come-first-served within a
//! priority. In a running process the queue is owned by a [`Dispatcher`] task and
//! advanced on a fixed cadence by the periodic driver.
//!
//! **No presentation concerns**: forms, displays and process startup belong to the host
//! application. The host collects raw attributes, builds a [`Patient`], and reads
//! [`Board`] snapshots back for rendering.

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod patient;
pub mod priority;
pub mod queue;

pub use config::DispatchConfig;
pub use dispatch::{spawn_periodic_advance, Dispatcher, DispatcherHandle};
pub use error::{TriageError, TriageResult};
pub use patient::{Patient, PatientAttributes};
pub use queue::{Board, Ticket, TurnQueue, TurnState};

// Re-export the validated attribute types so callers need only one dependency.
pub use triage_types::{AffiliationTier, Age, AttributeError, PatientName};
