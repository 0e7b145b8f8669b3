//! Request sequencing
//!
//! Only the most recent query of a session may publish its result. Every
//! query takes a ticket; a newer query or any filter mutation advances the
//! sequence, and a ticket that is no longer current marks its result stale.

use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket identifying one in-flight query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct RequestSequencer {
    current: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a query, superseding every earlier ticket
    pub fn issue(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Supersede in-flight queries without starting a new one
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::Acquire) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_ticket_is_current() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue();
        assert!(sequencer.is_current(first));

        let second = sequencer.issue();
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn test_invalidate_supersedes_in_flight() {
        let sequencer = RequestSequencer::new();
        let ticket = sequencer.issue();
        sequencer.invalidate();
        assert!(!sequencer.is_current(ticket));
        assert!(sequencer.is_current(sequencer.issue()));
    }

    #[test]
    fn test_concurrent_issue_leaves_one_current() {
        let sequencer = std::sync::Arc::new(RequestSequencer::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sequencer = sequencer.clone();
                std::thread::spawn(move || sequencer.issue())
            })
            .collect();
        let tickets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(tickets.iter().filter(|t| sequencer.is_current(**t)).count(), 1);
    }
}
