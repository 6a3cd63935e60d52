//! Selection tracker for bulk moderation
//!
//! The checked-row state of the pending queue. One console session owns
//! one tracker; it is never shared across sessions. Membership is meant
//! to hold pending students only, so the owner prunes it with
//! [`SelectionTracker::retain`] after every re-fetch, and a successful
//! bulk approval clears it outright.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: HashSet<String>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id in or out
    pub fn toggle(&mut self, student_id: impl Into<String>) {
        let id = student_id.into();
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Toggle between "none selected" and "all of `candidate_ids`"
    ///
    /// If membership already equals the candidate set, clears it;
    /// otherwise replaces membership with exactly the candidates. The
    /// caller passes the current pending subset; no filtering happens
    /// here, and no id outside the candidates can survive the call.
    pub fn select_all(&mut self, candidate_ids: &[String]) {
        let candidates: HashSet<String> = candidate_ids.iter().cloned().collect();
        if self.selected == candidates {
            self.selected.clear();
        } else {
            self.selected = candidates;
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop every id not in `eligible` (students that left pending)
    pub fn retain(&mut self, eligible: &[String]) {
        let keep: HashSet<&String> = eligible.iter().collect();
        self.selected.retain(|id| keep.contains(id));
    }

    pub fn is_selected(&self, student_id: &str) -> bool {
        self.selected.contains(student_id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Current membership, sorted for deterministic request bodies and
    /// logs
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }
}
