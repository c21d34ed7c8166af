//! Presence ledger.

use std::collections::HashMap;

/// Member id to presence, defaulting to absent for unknown members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceLedger {
    marks: HashMap<i64, bool>,
}

impl PresenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one member's presence. Last write wins.
    pub fn toggle_present(&mut self, member_id: i64, present: bool) {
        self.marks.insert(member_id, present);
    }

    /// Replace the whole mapping with `present` for every member in `eligible`.
    ///
    /// Marks for members outside `eligible` are dropped.
    pub fn set_all_present<I>(&mut self, eligible: I, present: bool)
    where
        I: IntoIterator<Item = i64>,
    {
        self.marks = eligible.into_iter().map(|id| (id, present)).collect();
    }

    pub fn is_present(&self, member_id: i64) -> bool {
        self.marks.get(&member_id).copied().unwrap_or(false)
    }

    /// Number of members explicitly marked present.
    pub fn selected_count(&self) -> usize {
        self.marks.values().filter(|present| **present).count()
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
