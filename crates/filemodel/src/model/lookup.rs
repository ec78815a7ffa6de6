//! Key lookup, positional search and sections.

use super::{SectionRange, ViewModel};
use crate::error::{ModelError, Result};
use crate::storage::NodeId;
use crate::types::ModelEntry;

impl<E: ModelEntry> ViewModel<E> {
    /// Handle of the node holding `key`, visible or not.
    pub fn lookup(&self, key: &E::Key) -> Option<NodeId> {
        let &index = self.entry_to_node.get(key)?;
        self.nodes.id_of(index)
    }

    /// Resolves a handle; `None` once the node has been removed.
    pub fn node(&self, id: NodeId) -> Option<&E> {
        self.nodes.get_by_id(id).map(|node| &node.entry)
    }

    pub fn entry(&self, key: &E::Key) -> Option<&E> {
        let &index = self.entry_to_node.get(key)?;
        self.nodes.get(index).map(|node| &node.entry)
    }

    pub fn contains(&self, key: &E::Key) -> bool {
        self.entry_to_node.contains_key(key)
    }

    /// Flat position of `key`'s row; `None` if absent or hidden.
    pub fn position_of(&self, key: &E::Key) -> Option<usize> {
        let &index = self.entry_to_node.get(key)?;
        self.rows.iter().position(|&row| row == index)
    }

    /// Binary search for `entry` over rows `start..=end`.
    ///
    /// Rows are compared with the active sorter, so the range has to be
    /// ordered by it (true for any flat model and for every single level).
    pub fn checked_binary_search(&self, entry: &E, start: usize, end: usize) -> Result<Option<usize>> {
        let Some(sorter) = self.sorter.as_deref() else {
            return Err(ModelError::NoSorter);
        };
        if start > end {
            return Err(ModelError::InvalidRange { start, end });
        }
        if end >= self.rows.len() {
            return Err(ModelError::OutOfBounds {
                end,
                len: self.rows.len(),
            });
        }

        let (mut lo, mut hi) = (start, end + 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let candidate = &self.nodes[self.rows[mid]].entry;
            match sorter.compare(candidate, entry) {
                std::cmp::Ordering::Equal => return Ok(Some(mid)),
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
            }
        }
        Ok(None)
    }

    /// Like [`checked_binary_search`](Self::checked_binary_search), but a
    /// missing sorter or a bad range is a caller bug.
    ///
    /// # Panics
    /// Panics without a sorter, if `start > end` or if `end` is past the
    /// last row.
    pub fn binary_search(&self, entry: &E, start: usize, end: usize) -> Option<usize> {
        self.checked_binary_search(entry, start, end)
            .unwrap_or_else(|err| panic!("view model binary search: {err}"))
    }

    /// Searches every row for `entry`.
    ///
    /// # Panics
    /// Panics without a sorter.
    pub fn find(&self, entry: &E) -> Option<usize> {
        assert!(self.sorter.is_some(), "view model binary search: {}", ModelError::NoSorter);
        let last = self.rows.len().checked_sub(1)?;
        self.binary_search(entry, 0, last)
    }

    /// Entries held for `keys`, in sort order. Absent keys are skipped.
    pub fn sorted_entries_for<'a, I>(&self, keys: I) -> Vec<&E>
    where
        I: IntoIterator<Item = &'a E::Key>,
        E::Key: 'a,
    {
        let mut entries: Vec<&E> = keys.into_iter().filter_map(|key| self.entry(key)).collect();
        if let Some(sorter) = &self.sorter {
            entries.sort_by(|a, b| sorter.compare(a, b));
        }
        entries
    }

    /// Maximal run of rows around `position` that share its parent.
    pub fn section(&self, position: usize) -> Option<SectionRange> {
        let &index = self.rows.get(position)?;
        let parent = self.nodes[index].parent;
        let same_parent = |row: &usize| self.nodes[self.rows[*row]].parent == parent;

        let start = (0..position)
            .rev()
            .take_while(same_parent)
            .last()
            .unwrap_or(position);
        let end = (position + 1..self.rows.len())
            .take_while(same_parent)
            .last()
            .map_or(position + 1, |last| last + 1);
        Some(SectionRange { start, end })
    }
}
