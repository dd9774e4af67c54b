//! Marked records and anchor-based range selection.
//!
//! Marks are stored as buffer indices so they survive re-filtering. A range is
//! provisional: while open it is derived from the anchor and the cursor (both
//! positions in the current result) and only lands in the persistent set on commit.

use std::collections::BTreeSet;

/// Whether a range selection is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeState {
    Idle,
    Open { anchor: usize },
}

#[derive(Debug, Clone)]
pub struct Selection {
    marked: BTreeSet<usize>,
    range: RangeState,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self {
            marked: BTreeSet::new(),
            range: RangeState::Idle,
        }
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn contains(&self, buffer_index: usize) -> bool {
        self.marked.contains(&buffer_index)
    }

    /// Marked buffer indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.marked.iter().copied().collect()
    }

    pub fn add(&mut self, buffer_index: usize) {
        self.marked.insert(buffer_index);
    }

    pub fn remove(&mut self, buffer_index: usize) {
        self.marked.remove(&buffer_index);
    }

    /// Flip the mark on one record. Refused (returns false) while a range is open.
    pub fn toggle(&mut self, buffer_index: usize) -> bool {
        if self.is_range_open() {
            return false;
        }
        if !self.marked.remove(&buffer_index) {
            self.marked.insert(buffer_index);
        }
        true
    }

    /// Mark every given record.
    pub fn select_all(&mut self, buffer_indices: impl IntoIterator<Item = usize>) {
        self.marked.extend(buffer_indices);
    }

    /// Drop every mark and any open range.
    pub fn clear(&mut self) {
        self.marked.clear();
        self.range = RangeState::Idle;
    }

    pub fn range_state(&self) -> RangeState {
        self.range
    }

    pub fn is_range_open(&self) -> bool {
        matches!(self.range, RangeState::Open { .. })
    }

    /// Open a range anchored at result position `cursor`. No-op if one is open.
    pub fn start_range(&mut self, cursor: usize) -> bool {
        if self.is_range_open() {
            return false;
        }
        self.range = RangeState::Open { anchor: cursor };
        true
    }

    pub fn cancel_range(&mut self) {
        self.range = RangeState::Idle;
    }

    /// Close the open range, marking every result position between the anchor and
    /// `cursor` inclusive. `resolve` maps a result position to its buffer index.
    ///
    /// Returns how many records were newly marked.
    pub fn commit_range(&mut self, cursor: usize, resolve: impl Fn(usize) -> Option<usize>) -> usize {
        let RangeState::Open { anchor } = self.range else {
            return 0;
        };
        self.range = RangeState::Idle;

        let before = self.marked.len();
        let (low, high) = (anchor.min(cursor), anchor.max(cursor));
        self.marked.extend((low..=high).filter_map(resolve));
        self.marked.len() - before
    }

    /// Whether result position `position` lies in the open range given the cursor.
    pub fn in_pending_range(&self, position: usize, cursor: usize) -> bool {
        match self.range {
            RangeState::Open { anchor } => {
                (anchor.min(cursor)..=anchor.max(cursor)).contains(&position)
            }
            RangeState::Idle => false,
        }
    }

    /// Whether a line should be drawn as selected: persistently marked, or inside
    /// the provisional range.
    pub fn is_marked(&self, position: usize, buffer_index: usize, cursor: usize) -> bool {
        self.contains(buffer_index) || self.in_pending_range(position, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(anchor: usize, cursor: usize) -> Vec<usize> {
        let mut selection = Selection::new();
        assert!(selection.start_range(anchor));
        selection.commit_range(cursor, Some);
        assert_eq!(selection.range_state(), RangeState::Idle);
        selection.indices()
    }

    #[test]
    fn toggle_flips_membership() {
        let mut selection = Selection::new();
        assert!(selection.toggle(4));
        assert!(selection.contains(4));
        assert!(selection.toggle(4));
        assert!(selection.is_empty());
    }

    #[test]
    fn indices_are_sorted_and_unique() {
        let mut selection = Selection::new();
        for i in [9, 2, 5, 2, 9] {
            selection.add(i);
        }
        assert_eq!(selection.indices(), vec![2, 5, 9]);
    }

    #[test]
    fn range_commit_is_symmetric() {
        assert_eq!(committed(3, 7), vec![3, 4, 5, 6, 7]);
        assert_eq!(committed(7, 3), committed(3, 7));
        assert_eq!(committed(5, 5), vec![5]);
    }

    #[test]
    fn range_commit_resolves_through_the_result() {
        // Result positions 0..4 showing buffer records 10, 12, 14, 16
        let shown = [10, 12, 14, 16];
        let mut selection = Selection::new();
        selection.start_range(1);
        let added = selection.commit_range(3, |pos| shown.get(pos).copied());
        assert_eq!(added, 3);
        assert_eq!(selection.indices(), vec![12, 14, 16]);
    }

    #[test]
    fn toggling_is_refused_while_range_is_open() {
        let mut selection = Selection::new();
        selection.start_range(0);
        assert!(!selection.toggle(1));
        assert!(!selection.contains(1));
        assert!(!selection.start_range(2));

        selection.cancel_range();
        assert!(selection.toggle(1));
        assert_eq!(selection.commit_range(5, Some), 0);
    }

    #[test]
    fn pending_range_is_visible_before_commit() {
        let mut selection = Selection::new();
        selection.start_range(6);
        assert!(selection.in_pending_range(4, 3));
        assert!(!selection.in_pending_range(2, 3));
        assert!(selection.is_empty());
        assert!(selection.is_marked(5, 99, 3));
    }

    #[test]
    fn clear_drops_marks_and_range() {
        let mut selection = Selection::new();
        selection.select_all([1, 2, 3]);
        selection.start_range(0);
        selection.clear();
        assert!(selection.is_empty());
        assert!(!selection.is_range_open());
    }
}
