use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Identifier of a diagram element.
///
/// Ids are small integers handed out by [`IdCounter`]. They are stable for
/// the element's lifetime and survive snapshot/restore unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

/// A short list of element ids, sized for the common one-to-few selection.
pub type IdList = SmallVec<[ElementId; 4]>;

impl ElementId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source owned by the diagram.
///
/// Stores the last id issued; `next` pre-increments, so a fresh counter
/// hands out `1` first. The counter is part of every history snapshot so
/// undo never causes an id to be handed out twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdCounter(u64);

impl IdCounter {
    pub const fn starting_at(last_issued: u64) -> Self {
        Self(last_issued)
    }

    /// Issue the next id.
    pub fn next(&mut self) -> ElementId {
        self.0 += 1;
        ElementId(self.0)
    }

    /// The most recently issued value (0 if none).
    pub const fn last(self) -> u64 {
        self.0
    }

    /// Make sure future ids are strictly greater than `id`.
    ///
    /// Used when loading records whose stored counter lags behind the
    /// element ids actually present.
    pub fn observe(&mut self, id: ElementId) {
        if id.0 > self.0 {
            self.0 = id.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_id_is_one() {
        let mut counter = IdCounter::default();
        assert_eq!(counter.next(), ElementId(1));
        assert_eq!(counter.next(), ElementId(2));
        assert_eq!(counter.last(), 2);
    }

    #[test]
    fn observe_only_moves_forward() {
        let mut counter = IdCounter::starting_at(5);
        counter.observe(ElementId(3));
        assert_eq!(counter.last(), 5);
        counter.observe(ElementId(9));
        assert_eq!(counter.next(), ElementId(10));
    }
}
