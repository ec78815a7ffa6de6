//! Multi-selection over flat positions.
//!
//! Every helper funnels into [`ViewModel::set_selection`], which reports a
//! single `selection_changed` spanning the lowest to the highest flipped
//! position.

use super::{ModelEvent, ViewModel};
use crate::storage::Bitset;
use crate::types::ModelEntry;

impl<E: ModelEntry> ViewModel<E> {
    pub fn is_selected(&self, position: usize) -> bool {
        self.selection.contains(position)
    }

    pub fn selection(&self) -> &Bitset {
        &self.selection
    }

    /// Selected positions within `start..start + n`.
    pub fn selection_in_range(&self, start: usize, n: usize) -> Bitset {
        self.selection.slice(start, n)
    }

    /// Entries of the selected rows, in flat order.
    pub fn selected_entries(&self) -> impl Iterator<Item = &E> + '_ {
        self.selection
            .iter()
            .filter_map(move |position| self.nodes.get(self.rows[position]))
            .map(|node| &node.entry)
    }

    /// Positions in `mask` take their state from `selected`; the rest keep
    /// theirs. Positions past the last row are ignored.
    ///
    /// Returns true if any position changed state.
    pub fn set_selection(&mut self, selected: &Bitset, mask: &Bitset) -> bool {
        let updated = self
            .selection
            .difference(mask)
            .union(&selected.intersection(mask))
            .slice(0, self.rows.len());

        let flipped = self.selection.symmetric_difference(&updated);
        let (Some(min), Some(max)) = (flipped.min(), flipped.max()) else {
            return false;
        };
        self.selection = updated;
        self.observers.push(ModelEvent::SelectionChanged {
            position: min,
            n: max - min + 1,
        });
        self.observers.flush();
        true
    }

    pub fn select_item(&mut self, position: usize, unselect_rest: bool) -> bool {
        self.select_range(position, 1, unselect_rest)
    }

    pub fn unselect_item(&mut self, position: usize) -> bool {
        self.unselect_range(position, 1)
    }

    pub fn select_range(&mut self, start: usize, n: usize, unselect_rest: bool) -> bool {
        let range = self.clamped_range(start, n);
        let mask = if unselect_rest { self.all_rows() } else { range.clone() };
        self.set_selection(&range, &mask)
    }

    pub fn unselect_range(&mut self, start: usize, n: usize) -> bool {
        let range = self.clamped_range(start, n);
        self.set_selection(&Bitset::new(), &range)
    }

    pub fn select_all(&mut self) -> bool {
        let all = self.all_rows();
        self.set_selection(&all, &all)
    }

    pub fn unselect_all(&mut self) -> bool {
        let all = self.all_rows();
        self.set_selection(&Bitset::new(), &all)
    }

    fn all_rows(&self) -> Bitset {
        Bitset::from_range(0, self.rows.len())
    }

    fn clamped_range(&self, start: usize, n: usize) -> Bitset {
        let end = start.saturating_add(n).min(self.rows.len());
        if start >= end {
            return Bitset::new();
        }
        Bitset::from_range(start, end - start)
    }
}
