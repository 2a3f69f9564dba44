//! Committed selection of cylinders a submission acts on.

use std::collections::HashSet;

use cylinder_core::{SerialNumber, TargetQuantity};
use cylinder_scanning::Membership;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Adding would exceed the target quantity; nothing changed.
    AtCapacity,
}

/// Ordered set of serial numbers plus an independent per-serial flag.
///
/// The flag marks a received cylinder as "not empty"; it is not tied to
/// membership, so a cylinder can be flagged before it is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    capacity: Option<TargetQuantity>,
    members: Vec<SerialNumber>,
    flagged: HashSet<SerialNumber>,
}

impl SelectionSet {
    pub fn new(capacity: Option<TargetQuantity>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> Option<TargetQuantity> {
        self.capacity
    }

    /// Manual adds are bounded by the capacity; `None` leaves them unbounded.
    pub fn set_capacity(&mut self, capacity: Option<TargetQuantity>) {
        self.capacity = capacity;
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, serial: &SerialNumber) -> bool {
        self.members.contains(serial)
    }

    pub fn members(&self) -> &[SerialNumber] {
        &self.members
    }

    pub fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|cap| self.members.len() >= cap.as_usize())
    }

    pub fn toggle(&mut self, serial: SerialNumber) -> ToggleOutcome {
        if let Some(pos) = self.members.iter().position(|m| *m == serial) {
            self.members.remove(pos);
            return ToggleOutcome::Removed;
        }
        if self.is_full() {
            return ToggleOutcome::AtCapacity;
        }
        self.members.push(serial);
        ToggleOutcome::Added
    }

    pub fn mark_flag(&mut self, serial: SerialNumber, flagged: bool) {
        if flagged {
            self.flagged.insert(serial);
        } else {
            self.flagged.remove(&serial);
        }
    }

    pub fn is_flagged(&self, serial: &SerialNumber) -> bool {
        self.flagged.contains(serial)
    }

    /// Set union with finalized scan results. Ignores capacity; the count is
    /// enforced at submit time. Returns how many serials were new.
    pub fn merge(&mut self, serials: impl IntoIterator<Item = SerialNumber>) -> usize {
        let mut added = 0;
        for serial in serials {
            if !self.contains(&serial) {
                self.members.push(serial);
                added += 1;
            }
        }
        added
    }

    /// Add candidates in order until the capacity is reached.
    pub fn select_all<'a>(&mut self, candidates: impl IntoIterator<Item = &'a SerialNumber>) -> usize {
        let mut added = 0;
        for serial in candidates {
            if self.is_full() {
                break;
            }
            if !self.contains(serial) {
                self.members.push(serial.clone());
                added += 1;
            }
        }
        added
    }

    /// Members split into `(unflagged, flagged)`, each in selection order.
    pub fn split_by_flag(&self) -> (Vec<SerialNumber>, Vec<SerialNumber>) {
        self.members
            .iter()
            .cloned()
            .partition(|serial| !self.flagged.contains(serial))
    }

    /// Clear members and flags. The capacity is kept.
    pub fn reset(&mut self) {
        self.members.clear();
        self.flagged.clear();
    }
}

impl Membership for SelectionSet {
    fn contains_serial(&self, serial: &SerialNumber) -> bool {
        self.contains(serial)
    }
}
