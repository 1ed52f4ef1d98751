//! Rosters of enriched monster records

use std::sync::Arc;

use super::Checksum;

/// An enriched record together with the checksum it was enriched from
#[derive(Debug)]
pub struct RosterSlot<E> {
    checksum: Checksum,
    record: Arc<E>,
}

impl<E> RosterSlot<E> {
    /// Create a slot from a freshly enriched record
    pub fn new(checksum: Checksum, record: E) -> Self {
        Self { checksum, record: Arc::new(record) }
    }

    /// Checksum of the raw record this slot was enriched from
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    /// The enriched record
    pub fn record(&self) -> &E {
        &self.record
    }

    /// Shared handle to the enriched record
    pub fn shared(&self) -> &Arc<E> {
        &self.record
    }

    /// Whether this slot still matches a raw record with `checksum`
    pub fn matches(&self, checksum: &Checksum) -> bool {
        self.checksum == *checksum
    }
}

impl<E> Clone for RosterSlot<E> {
    fn clone(&self) -> Self {
        Self { checksum: self.checksum.clone(), record: Arc::clone(&self.record) }
    }
}

/// Ordered, fixed-length sequence of optional enriched records.
///
/// Cloning is cheap: slots share their enriched records.
#[derive(Debug)]
pub struct Roster<E> {
    slots: Vec<Option<RosterSlot<E>>>,
}

impl<E> Roster<E> {
    /// Roster with no slots
    pub fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    /// Roster of `len` empty slots
    pub fn with_len(len: usize) -> Self {
        Self { slots: (0..len).map(|_| None).collect() }
    }

    /// Number of slots, empty or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the roster has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Get a filled slot
    pub fn get(&self, index: usize) -> Option<&RosterSlot<E>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Get the enriched record at `index`
    pub fn record(&self, index: usize) -> Option<&E> {
        self.get(index).map(RosterSlot::record)
    }

    /// Iterate over all slots in order
    pub fn slots(&self) -> impl Iterator<Item = Option<&RosterSlot<E>>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Number of filled slots
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub(crate) fn set(&mut self, index: usize, slot: RosterSlot<E>) {
        self.slots[index] = Some(slot);
    }
}

impl<E> Clone for Roster<E> {
    fn clone(&self) -> Self {
        Self { slots: self.slots.clone() }
    }
}

impl<E> Default for Roster<E> {
    fn default() -> Self {
        Self::empty()
    }
}
