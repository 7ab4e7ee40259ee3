//! Signal rings
//!
//! A ring is a fixed cyclic group of signals stored as an array; the
//! member after position `i` is `(i + 1) % len`. Advancing any member flips
//! every member of the ring exactly once. Membership never changes after
//! construction, only the open flags do.
//!
//! The engine does not enforce "one approach open at a time": that is a
//! property of how the initial flags are chosen.

use super::types::{RingId, SignalId};

#[derive(Debug, Clone)]
pub struct SignalRing {
    id: RingId,
    name: String,
    members: Vec<String>,
    open: Vec<bool>,
}

impl SignalRing {
    /// Build a ring from `(member name, initially open)` pairs in ring order
    pub fn new(id: RingId, name: impl Into<String>, members: Vec<(String, bool)>) -> Self {
        let (members, open): (Vec<String>, Vec<bool>) = members.into_iter().unzip();
        Self {
            id,
            name: name.into(),
            members,
            open,
        }
    }

    pub fn id(&self) -> RingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn member_name(&self, position: usize) -> Option<&str> {
        self.members.get(position).map(String::as_str)
    }

    pub fn position_of(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|name| name == member)
    }

    pub fn is_open(&self, position: usize) -> Option<bool> {
        self.open.get(position).copied()
    }

    pub fn states(&self) -> &[bool] {
        &self.open
    }

    /// Flip every member, walking the ring from `start` until it wraps
    pub fn advance_from(&mut self, start: usize) {
        let len = self.open.len();
        for step in 0..len {
            let position = (start + step) % len;
            self.open[position] = !self.open[position];
        }
    }

    pub fn signal(&self, position: usize) -> SignalId {
        SignalId::new(self.id, position)
    }
}

/// All signal rings of a network
#[derive(Debug, Clone, Default)]
pub struct SignalRings {
    rings: Vec<SignalRing>,
}

impl SignalRings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ring and return its id
    pub fn add_ring(&mut self, name: impl Into<String>, members: Vec<(String, bool)>) -> RingId {
        let id = RingId(self.rings.len());
        self.rings.push(SignalRing::new(id, name, members));
        id
    }

    pub fn ring(&self, id: RingId) -> Option<&SignalRing> {
        self.rings.get(id.0)
    }

    pub fn rings(&self) -> impl Iterator<Item = &SignalRing> {
        self.rings.iter()
    }

    pub fn contains(&self, signal: SignalId) -> bool {
        self.is_open(signal).is_some()
    }

    pub fn is_open(&self, signal: SignalId) -> Option<bool> {
        self.ring(signal.ring)?.is_open(signal.position)
    }

    /// Advance the whole ring `signal` belongs to
    ///
    /// Returns `false` when the signal does not exist.
    pub fn advance_ring(&mut self, signal: SignalId) -> bool {
        match self.rings.get_mut(signal.ring.0) {
            Some(ring) if signal.position < ring.len() => {
                ring.advance_from(signal.position);
                true
            }
            _ => false,
        }
    }

    /// Find a signal by ring name and member name
    pub fn find(&self, ring: &str, member: &str) -> Option<SignalId> {
        self.rings
            .iter()
            .find(|r| r.name() == ring)
            .and_then(|r| r.position_of(member).map(|position| r.signal(position)))
    }
}
