//! Hierarchical, sorted, multi-selectable view model.
//!
//! `ViewModel` presents a tree of entries as one flat sequence of rows:
//! every level is ordered by the active sorter (insertion order when there
//! is none) and an expanded directory's row is followed by its descendants.
//!
//! ## Structure
//!
//! - a slab of presentation nodes, addressed by `SlabIndex`
//! - `entry_to_node`: entry key to node, for O(1) lookup
//! - `root` and `children`: one sequence per directory, kept in display
//!   order (sorter first, insertion order on ties)
//! - `rows`: the materialized flat order
//!
//! Adding binary-inserts the new nodes into their sequence and splices their
//! rows in; removing splices the rows of each removed run out. Neither
//! re-sorts anything. Only a sorter change re-sorts every sequence, and
//! expansion re-flattens the subtree whose visibility changed; both diff
//! the new segment against the old one, which produces a single
//! `rows_changed` and lets the selection follow its nodes.
//!
//! ## Module Structure
//!
//! - `node` - Node flags, row views and section ranges
//! - `observer` - Change notification contract
//! - `tree` - Structural mutations (add, remove, expand, clear)
//! - `lookup` - Key lookup, binary search and sections
//! - `selection` - Multi-selection over flat positions

mod lookup;
mod node;
mod observer;
mod selection;
mod tree;

#[cfg(test)]
mod testing;

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use fnv::{FnvHashMap, FnvHashSet};
use thin_vec::ThinVec;

use crate::config::ViewModelConfig;
use crate::sort::{FileSorter, Sorter};
use crate::storage::{Bitset, Slab, SlabIndex};
use crate::types::{FileEntry, ModelEntry};

pub use node::{NodeFlags, Row, SectionRange};
pub use observer::{EventLog, ModelEvent, ModelObserver, SubscriptionId};

pub(crate) use node::ViewNode;
use observer::Observers;

type Node<E> = ViewNode<E, <E as ModelEntry>::Key>;

/// Indexed, hierarchical, sorted and selectable collection of entries.
pub struct ViewModel<E: ModelEntry> {
    nodes: Slab<Node<E>>,
    entry_to_node: FnvHashMap<E::Key, SlabIndex>,
    root: ThinVec<SlabIndex>,
    children: FnvHashMap<E::Key, ThinVec<SlabIndex>>,
    rows: Vec<SlabIndex>,
    selection: Bitset,
    sorter: Option<Rc<dyn Sorter<E>>>,
    expand_as_tree: bool,
    cut: FnvHashSet<E::Key>,
    next_order: u64,
    observers: Observers,
}

impl<E: ModelEntry> Default for ViewModel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ModelEntry> ViewModel<E> {
    /// Creates an empty flat model without a sorter.
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            entry_to_node: FnvHashMap::default(),
            root: ThinVec::new(),
            children: FnvHashMap::default(),
            rows: Vec::new(),
            selection: Bitset::new(),
            sorter: None,
            expand_as_tree: false,
            cut: FnvHashSet::default(),
            next_order: 0,
            observers: Observers::default(),
        }
    }

    pub fn subscribe(&mut self, observer: Rc<dyn ModelObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Enables in-place expansion of directory rows.
    ///
    /// Only affects later expansions and additions; rows already expanded
    /// stay expanded.
    pub fn set_expand_as_tree(&mut self, expand_as_tree: bool) {
        self.expand_as_tree = expand_as_tree;
    }

    pub fn expands_as_tree(&self) -> bool {
        self.expand_as_tree
    }

    pub fn sorter(&self) -> Option<Rc<dyn Sorter<E>>> {
        self.sorter.clone()
    }

    /// Replaces the sort rule and reorders every level.
    pub fn set_sorter(&mut self, sorter: Option<Rc<dyn Sorter<E>>>) {
        log::debug!("view model sorter {}", if sorter.is_some() { "set" } else { "cleared" });
        self.sorter = sorter;
        self.reorder();
    }

    /// Re-applies the current sorter, e.g. after entry metadata changed.
    pub fn resort(&mut self) {
        if self.sorter.is_some() {
            self.reorder();
        }
    }

    fn reorder(&mut self) {
        let sorter = self.sorter.as_ref();
        let nodes = &self.nodes;
        self.root.sort_by(|&a, &b| display_order(nodes, sorter, a, b));
        for sequence in self.children.values_mut() {
            sequence.sort_by(|&a, &b| display_order(nodes, sorter, a, b));
        }
        self.refresh_descendants(None);
        if !self.rows.is_empty() {
            self.observers.push(ModelEvent::SectionsChanged {
                start: 0,
                end: self.rows.len(),
            });
        }
        self.observers.flush();
    }

    // -------------------------------------------------------------------------
    // Flat sequence view
    // -------------------------------------------------------------------------

    /// Number of rows in the flattened view.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of entries held, visible or not.
    pub fn entry_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn row(&self, position: usize) -> Option<Row<'_, E>> {
        let &index = self.rows.get(position)?;
        let node = self.nodes.get(index)?;
        Some(Row {
            position,
            id: self.nodes.id_of(index)?,
            entry: &node.entry,
            depth: node.depth as usize,
            flags: node.flags,
            expandable: self.expand_as_tree && node.is_directory(),
            selected: self.selection.contains(position),
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_, E>> + '_ {
        (0..self.rows.len()).filter_map(move |position| self.row(position))
    }

    /// Entries in flat order.
    pub fn entries(&self) -> impl Iterator<Item = &E> + '_ {
        self.rows
            .iter()
            .filter_map(move |&index| self.nodes.get(index).map(|node| &node.entry))
    }

    // -------------------------------------------------------------------------
    // Flattening
    // -------------------------------------------------------------------------

    /// The sequence owned by `parent`, or the root sequence.
    fn sequence(&self, parent: Option<SlabIndex>) -> Option<&ThinVec<SlabIndex>> {
        match parent {
            None => Some(&self.root),
            Some(index) => self.children.get(&self.nodes.get(index)?.key),
        }
    }

    fn sequence_mut(&mut self, parent: Option<SlabIndex>) -> Option<&mut ThinVec<SlabIndex>> {
        match parent {
            None => Some(&mut self.root),
            Some(index) => {
                let node = self.nodes.get(index)?;
                self.children.get_mut(&node.key)
            }
        }
    }

    /// Appends the pre-order flattening of `sequence` to `out`.
    fn flatten_into(&self, sequence: &[SlabIndex], out: &mut Vec<SlabIndex>) {
        for &index in sequence {
            out.push(index);
            let node = &self.nodes[index];
            if node.is_expanded() {
                if let Some(children) = self.children.get(&node.key) {
                    self.flatten_into(children, out);
                }
            }
        }
    }

    /// Flat range currently taken by the descendants of `parent`.
    ///
    /// `None` when `parent` has no row, so nothing below it is visible.
    fn descendant_range(&self, parent: Option<SlabIndex>) -> Option<Range<usize>> {
        let Some(parent) = parent else {
            return Some(0..self.rows.len());
        };
        let position = self.row_position(parent)?;
        Some(position + 1..self.subtree_end(position))
    }

    fn row_position(&self, index: SlabIndex) -> Option<usize> {
        self.rows.iter().position(|&row| row == index)
    }

    /// One past the last row of the subtree rooted at row `position`.
    fn subtree_end(&self, position: usize) -> usize {
        let depth = self.nodes[self.rows[position]].depth;
        let below = self.rows[position + 1..]
            .iter()
            .take_while(|&&index| self.nodes[index].depth > depth)
            .count();
        position + 1 + below
    }

    /// Re-flattens the subtree below `parent` and publishes the difference.
    ///
    /// Every node listed in `rows` must still be alive when this runs.
    fn refresh_descendants(&mut self, parent: Option<SlabIndex>) {
        let Some(range) = self.descendant_range(parent) else {
            return;
        };
        let visible = parent.map_or(true, |index| self.nodes[index].is_expanded());
        let mut fresh = Vec::new();
        if visible {
            if let Some(sequence) = self.sequence(parent) {
                self.flatten_into(sequence, &mut fresh);
            }
        }
        self.replace_rows(range, fresh);
    }

    /// Swaps `range` of the flat rows for `fresh`, emitting one change that
    /// covers only what differs.
    fn replace_rows(&mut self, range: Range<usize>, fresh: Vec<SlabIndex>) {
        let old = &self.rows[range.clone()];
        let prefix = old
            .iter()
            .zip(&fresh)
            .take_while(|(a, b)| a == b)
            .count();
        let max_suffix = old.len().min(fresh.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(fresh.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();
        let removed = old.len() - prefix - suffix;
        let added = fresh.len() - prefix - suffix;
        if removed == 0 && added == 0 {
            return;
        }

        let position = range.start + prefix;
        let reselect: FnvHashSet<SlabIndex> = self
            .selection
            .slice(position, removed)
            .iter()
            .map(|selected| self.rows[selected])
            .collect();

        self.rows.splice(
            position..position + removed,
            fresh[prefix..prefix + added].iter().copied(),
        );
        self.selection.splice(position, removed, added);
        if !reselect.is_empty() {
            for offset in 0..added {
                if reselect.contains(&self.rows[position + offset]) {
                    self.selection.add(position + offset);
                }
            }
        }

        log::trace!("rows changed at {position}: -{removed} +{added}");
        self.observers.push(ModelEvent::RowsChanged {
            position,
            removed,
            added,
        });
    }
}

/// Display order of two siblings: the sorter, then insertion order.
fn display_order<E: ModelEntry>(
    nodes: &Slab<Node<E>>,
    sorter: Option<&Rc<dyn Sorter<E>>>,
    a: SlabIndex,
    b: SlabIndex,
) -> Ordering {
    let (a, b) = (&nodes[a], &nodes[b]);
    sorter
        .map_or(Ordering::Equal, |sorter| sorter.compare(&a.entry, &b.entry))
        .then(a.order.cmp(&b.order))
}

impl ViewModel<FileEntry> {
    /// Builds a model for [`FileEntry`] rows from host preferences.
    pub fn from_config(config: &ViewModelConfig) -> Self {
        let mut model = Self::new();
        model.expand_as_tree = config.expand_as_tree;
        model.sorter = config
            .sort
            .as_ref()
            .map(|sort| Rc::new(FileSorter::from(sort)) as Rc<dyn Sorter<FileEntry>>);
        model
    }
}

impl<E: ModelEntry> fmt::Debug for ViewModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("rows", &self.rows.len())
            .field("entries", &self.nodes.len())
            .field("directories", &self.children.len())
            .field("selected", &self.selection.len())
            .field("sorted", &self.sorter.is_some())
            .field("expand_as_tree", &self.expand_as_tree)
            .finish()
    }
}
