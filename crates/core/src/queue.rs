//! The priority turn queue for a single dispatch point.
//!
//! Patients wait in `pending` until [`TurnQueue::advance`] promotes one of them to the
//! current turn. Selection is by priority (highest first) and, among equal priorities, by
//! admission order. `BinaryHeap` is not stable, so the admission number is part of the
//! heap ordering rather than left to chance.
//!
//! State machine:
//!
//! | From      | Event                    | To        |
//! |-----------|--------------------------|-----------|
//! | `Idle`    | admit                    | `Idle`    |
//! | `Idle`    | advance, pending present | `Serving` |
//! | `Idle`    | advance, pending empty   | `Idle`    |
//! | `Serving` | admit                    | `Serving` |
//! | `Serving` | advance, pending present | `Serving` |
//! | `Serving` | advance, pending empty   | `Idle`    |
//!
//! Nothing here is fallible and nothing depends on wall-clock timing; an empty line is
//! reported as `None`.

use crate::Patient;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A patient together with their place in line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    number: u64,
    admitted_at: DateTime<Utc>,
    patient: Patient,
}

impl Ticket {
    /// Turn number, assigned in admission order starting at 1.
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn admitted_at(&self) -> DateTime<Utc> {
        self.admitted_at
    }

    pub fn patient(&self) -> &Patient {
        &self.patient
    }
}

/// Whether a turn is currently being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    Serving,
}

/// Everything a display needs to render the current and next turn panels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Board {
    pub current: Option<Ticket>,
    pub next: Option<Ticket>,
    pub pending: usize,
}

/// Heap entry. Orders by priority, then by lower admission number.
#[derive(Debug)]
struct Queued(Ticket);

impl Queued {
    fn key(&self) -> (u8, u64) {
        (self.0.patient.priority(), self.0.number)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    // BinaryHeap is a max-heap: the greater entry is served first.
    fn cmp(&self, other: &Self) -> Ordering {
        let (priority, number) = self.key();
        let (other_priority, other_number) = other.key();
        priority
            .cmp(&other_priority)
            .then_with(|| other_number.cmp(&number))
    }
}

/// Priority-ordered waiting line with a current turn.
#[derive(Debug, Default)]
pub struct TurnQueue {
    pending: BinaryHeap<Queued>,
    current: Option<Ticket>,
    last_number: u64,
}

impl TurnQueue {
    /// Creates an empty queue in the `Idle` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a patient to the line and returns the ticket issued for them.
    pub fn admit(&mut self, patient: Patient) -> Ticket {
        self.last_number += 1;
        let ticket = Ticket {
            number: self.last_number,
            admitted_at: Utc::now(),
            patient,
        };
        self.pending.push(Queued(ticket.clone()));

        tracing::debug!(
            ticket = ticket.number,
            patient = %ticket.patient.name(),
            priority = ticket.patient.priority(),
            pending = self.pending.len(),
            "admitted patient"
        );

        ticket
    }

    /// Promotes the highest-priority pending patient to the current turn.
    ///
    /// The previous current turn is discarded. With nobody waiting, the current turn is
    /// cleared and `None` is returned.
    pub fn advance(&mut self) -> Option<Ticket> {
        self.current = self.pending.pop().map(|Queued(ticket)| ticket);

        match &self.current {
            Some(ticket) => tracing::debug!(
                ticket = ticket.number,
                patient = %ticket.patient.name(),
                priority = ticket.patient.priority(),
                pending = self.pending.len(),
                "advanced to next turn"
            ),
            None => tracing::trace!("advance on empty line"),
        }

        self.current.clone()
    }

    /// The ticket the next [`advance`](Self::advance) would select.
    pub fn peek_next(&self) -> Option<Ticket> {
        self.pending.peek().map(|Queued(ticket)| ticket.clone())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn current_turn(&self) -> Option<Ticket> {
        self.current.clone()
    }

    pub fn state(&self) -> TurnState {
        if self.current.is_some() {
            TurnState::Serving
        } else {
            TurnState::Idle
        }
    }

    pub fn board(&self) -> Board {
        Board {
            current: self.current_turn(),
            next: self.peek_next(),
            pending: self.pending_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use triage_types::{AffiliationTier, Age, PatientName};

    /// Builds a patient whose priority equals `priority` (0..=8).
    fn patient_with_priority(name: &str, priority: u8) -> Patient {
        let mut rest = priority;
        let age = if rest >= 3 {
            rest -= 3;
            70
        } else {
            30
        };
        let pregnant = rest >= 2;
        if pregnant {
            rest -= 2;
        }
        let limited_mobility = rest >= 2;
        if limited_mobility {
            rest -= 2;
        }
        let tier = if rest >= 1 {
            AffiliationTier::Complementary
        } else {
            AffiliationTier::Standard
        };
        let p = Patient::new(
            PatientName::new(name).unwrap(),
            Age::new(age),
            tier,
            pregnant,
            limited_mobility,
        );
        assert_eq!(p.priority(), priority, "helper could not build priority {priority}");
        p
    }

    fn drain_names(queue: &mut TurnQueue) -> Vec<String> {
        std::iter::from_fn(|| queue.advance())
            .map(|t| t.patient().name().to_string())
            .collect()
    }

    #[test]
    fn fresh_queue_is_idle_and_empty() {
        let mut queue = TurnQueue::new();
        assert_eq!(queue.state(), TurnState::Idle);
        assert_eq!(queue.pending_count(), 0);
        assert!(queue.peek_next().is_none());

        assert!(queue.advance().is_none());
        assert_eq!(queue.state(), TurnState::Idle);
        assert!(queue.current_turn().is_none());
    }

    #[test]
    fn equal_priorities_keep_admission_order() {
        let mut queue = TurnQueue::new();
        queue.admit(patient_with_priority("first-3", 3));
        queue.admit(patient_with_priority("zero", 0));
        queue.admit(patient_with_priority("second-3", 3));
        queue.admit(patient_with_priority("two", 2));

        assert_eq!(
            drain_names(&mut queue),
            vec!["first-3", "second-3", "two", "zero"]
        );
    }

    #[test]
    fn higher_priority_overtakes_earlier_admission() {
        let mut queue = TurnQueue::new();
        queue.admit(Patient::from_raw("Ana", 65, "POS", false, false).unwrap());
        queue.admit(Patient::from_raw("Luis", 30, "PC", true, true).unwrap());

        let first = queue.advance().unwrap();
        assert_eq!(first.patient().name().as_str(), "Luis");
        assert_eq!(first.patient().priority(), 5);

        let second = queue.advance().unwrap();
        assert_eq!(second.patient().name().as_str(), "Ana");
        assert_eq!(second.patient().priority(), 3);
    }

    #[test]
    fn identical_attributes_are_served_first_come_first_served() {
        let mut queue = TurnQueue::new();
        queue.admit(Patient::from_raw("X", 30, "POS", false, false).unwrap());
        queue.admit(Patient::from_raw("Y", 30, "POS", false, false).unwrap());

        assert_eq!(drain_names(&mut queue), vec!["X", "Y"]);
    }

    #[test]
    fn tickets_are_numbered_in_admission_order() {
        let mut queue = TurnQueue::new();
        let a = queue.admit(patient_with_priority("a", 0));
        let b = queue.admit(patient_with_priority("b", 8));
        assert_eq!(a.number(), 1);
        assert_eq!(b.number(), 2);
        assert!(a.admitted_at() <= b.admitted_at());
    }

    #[test]
    fn is_empty_follows_pending_set() {
        let mut queue = TurnQueue::new();
        assert!(queue.is_empty());

        queue.admit(patient_with_priority("a", 2));
        assert!(!queue.is_empty());

        queue.advance();
        assert!(queue.is_empty());
        assert_eq!(queue.state(), TurnState::Serving);
    }

    #[test]
    fn queries_are_idempotent() {
        let mut queue = TurnQueue::new();
        queue.admit(patient_with_priority("a", 1));
        queue.admit(patient_with_priority("b", 4));

        let peeked = queue.peek_next();
        let count = queue.pending_count();
        for _ in 0..5 {
            assert_eq!(queue.peek_next(), peeked);
            assert_eq!(queue.pending_count(), count);
        }
        assert_eq!(peeked.unwrap().patient().name().as_str(), "b");
    }

    #[test]
    fn pending_count_tracks_admit_and_advance() {
        let mut queue = TurnQueue::new();
        let before = queue.pending_count();
        queue.admit(patient_with_priority("a", 2));
        assert_eq!(queue.pending_count(), before + 1);

        let before = queue.pending_count();
        queue.advance();
        assert_eq!(queue.pending_count(), before - 1);
    }

    #[test]
    fn peek_matches_following_advance() {
        let mut queue = TurnQueue::new();
        queue.admit(patient_with_priority("a", 2));
        queue.admit(patient_with_priority("b", 6));
        queue.admit(patient_with_priority("c", 6));

        while let Some(peeked) = queue.peek_next() {
            assert_eq!(queue.advance(), Some(peeked));
        }
    }

    #[test]
    fn current_is_never_pending() {
        let mut queue = TurnQueue::new();
        queue.admit(patient_with_priority("a", 3));
        queue.admit(patient_with_priority("b", 3));

        let current = queue.advance().unwrap();
        assert_eq!(queue.current_turn(), Some(current.clone()));
        assert_ne!(queue.peek_next().map(|t| t.number()), Some(current.number()));
    }

    #[test]
    fn state_machine_cycles_between_idle_and_serving() {
        let mut queue = TurnQueue::new();

        queue.admit(patient_with_priority("a", 0));
        assert_eq!(queue.state(), TurnState::Idle);

        queue.advance();
        assert_eq!(queue.state(), TurnState::Serving);

        queue.admit(patient_with_priority("b", 0));
        assert_eq!(queue.state(), TurnState::Serving);

        queue.advance();
        assert_eq!(queue.state(), TurnState::Serving);
        assert_eq!(queue.current_turn().unwrap().patient().name().as_str(), "b");

        assert!(queue.advance().is_none());
        assert_eq!(queue.state(), TurnState::Idle);
        assert!(queue.current_turn().is_none());

        queue.admit(patient_with_priority("c", 0));
        assert_eq!(queue.advance().unwrap().patient().name().as_str(), "c");
        assert_eq!(queue.state(), TurnState::Serving);
    }

    #[test]
    fn board_reflects_current_next_and_count() {
        let mut queue = TurnQueue::new();
        assert_eq!(queue.board(), Board::default());

        queue.admit(patient_with_priority("a", 1));
        queue.admit(patient_with_priority("b", 5));
        queue.admit(patient_with_priority("c", 0));
        queue.advance();

        let board = queue.board();
        assert_eq!(board.current.unwrap().patient().name().as_str(), "b");
        assert_eq!(board.next.unwrap().patient().name().as_str(), "a");
        assert_eq!(board.pending, 2);
    }

    proptest! {
        #[test]
        fn dispatch_order_is_priority_desc_then_admission_asc(
            priorities in proptest::collection::vec(0u8..=8, 0..40)
        ) {
            let mut queue = TurnQueue::new();
            for (i, p) in priorities.iter().enumerate() {
                queue.admit(patient_with_priority(&format!("p{i}"), *p));
            }

            let served: Vec<(u8, u64)> = std::iter::from_fn(|| queue.advance())
                .map(|t| (t.patient().priority(), t.number()))
                .collect();

            let mut expected = served.clone();
            expected.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            prop_assert_eq!(served.len(), priorities.len());
            prop_assert_eq!(served, expected);
        }
    }
}
