//! Time-ordered queue of pending events.
//!
//! Events are kept sorted by `(time, insertion sequence)`, so events sharing
//! a timestamp come out in the order they were inserted.

use sorted_vec::SortedVec;
use std::cmp::{Ordering, Reverse};

use super::event::Event;
use super::types::SimTime;

#[derive(Debug, Clone)]
struct Pending {
    seq: u64,
    event: Event,
}

impl Pending {
    fn key(&self) -> (SimTime, u64) {
        (self.event.time, self.seq)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Pending events, earliest last in the backing vector so popping is cheap
pub struct EventQueue {
    pending: SortedVec<Reverse<Pending>>,
    next_seq: u64,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            pending: SortedVec::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(Reverse(Pending { seq, event }));
    }

    /// Insert events in the order given
    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.push(event);
        }
    }

    /// Remove the earliest event
    pub fn pop(&mut self) -> Option<Event> {
        self.pending.pop().map(|Reverse(pending)| pending.event)
    }

    /// Time of the earliest event without removing it
    pub fn peek_time(&self) -> Option<SimTime> {
        self.pending.last().map(|Reverse(pending)| pending.event.time)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
