//! Selection set with a primary member and a change revision.
//!
//! The primary drives the property panel. Every effective change bumps
//! `revision`; the editor compares revisions after each event to decide
//! whether the panel needs a refresh.

use fb_core::{ElementId, IdList};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    members: IdList,
    primary: Option<ElementId>,
    revision: u64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[ElementId] {
        &self.members
    }

    pub fn primary(&self) -> Option<ElementId> {
        self.primary
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.members.contains(&id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the selection with `id` alone.
    pub fn select_exclusive(&mut self, id: ElementId) {
        if self.members.as_slice() == [id] && self.primary == Some(id) {
            return;
        }
        self.members.clear();
        self.members.push(id);
        self.primary = Some(id);
        self.bump();
    }

    /// Add `id` if absent, remove it if present.
    ///
    /// An added member becomes primary only when the set was empty. Removing
    /// the primary hands the role to the first remaining member.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(idx) = self.members.iter().position(|m| *m == id) {
            self.members.remove(idx);
            if self.primary == Some(id) {
                self.primary = self.members.first().copied();
            }
        } else {
            if self.members.is_empty() {
                self.primary = Some(id);
            }
            self.members.push(id);
        }
        self.bump();
    }

    pub fn clear(&mut self) {
        if self.members.is_empty() && self.primary.is_none() {
            return;
        }
        self.members.clear();
        self.primary = None;
        self.bump();
    }

    /// Drop members for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(ElementId) -> bool) {
        let before = self.members.len();
        self.members.retain(|m| keep(*m));
        if self.members.len() == before {
            return;
        }
        if self.primary.is_some_and(|p| !self.members.contains(&p)) {
            self.primary = self.members.first().copied();
        }
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const A: ElementId = ElementId(1);
    const B: ElementId = ElementId(2);
    const C: ElementId = ElementId(3);

    #[test]
    fn exclusive_replaces_everything() {
        let mut s = Selection::new();
        s.toggle(A);
        s.toggle(B);
        s.select_exclusive(C);
        assert_eq!(s.members(), &[C]);
        assert_eq!(s.primary(), Some(C));
    }

    #[test]
    fn toggle_add_keeps_existing_primary() {
        let mut s = Selection::new();
        s.toggle(A);
        s.toggle(B);
        assert_eq!(s.primary(), Some(A));
        assert_eq!(s.members(), &[A, B]);
    }

    #[test]
    fn toggle_off_primary_promotes_first_remaining() {
        let mut s = Selection::new();
        s.toggle(A);
        s.toggle(B);
        s.toggle(C);
        s.toggle(A);
        assert_eq!(s.primary(), Some(B));
        s.toggle(B);
        s.toggle(C);
        assert!(s.is_empty());
        assert_eq!(s.primary(), None);
    }

    #[test]
    fn revision_only_moves_on_change() {
        let mut s = Selection::new();
        s.clear();
        assert_eq!(s.revision(), 0);
        s.select_exclusive(A);
        s.select_exclusive(A);
        assert_eq!(s.revision(), 1);
        s.retain(|_| true);
        assert_eq!(s.revision(), 1);
        s.retain(|_| false);
        assert_eq!(s.revision(), 2);
        assert_eq!(s.primary(), None);
    }
}
