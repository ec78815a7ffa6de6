//! Structural mutations: adding, removing, expanding and clearing.

use std::cmp::Ordering;
use std::mem;

use fnv::FnvHashSet;
use thin_vec::ThinVec;

use super::{display_order, ModelEvent, NodeFlags, ViewModel, ViewNode};
use crate::storage::{Bitset, NodeId, OptionSlabIndex, SlabIndex};
use crate::types::ModelEntry;

impl<E: ModelEntry> ViewModel<E> {
    // -------------------------------------------------------------------------
    // Adding
    // -------------------------------------------------------------------------

    /// Adds one entry to its parent's sequence.
    ///
    /// Returns `None` if an entry with the same key is already held.
    pub fn add(&mut self, entry: E) -> Option<NodeId> {
        let (id, parent) = self.insert_node(entry)?;
        self.insert_into_sequence(parent, &[id.index()]);
        self.observers.flush();
        Some(id)
    }

    /// Adds a batch of entries and returns the key of the anchor entry.
    ///
    /// The batch is sorted with the active sorter before anything is
    /// inserted, so the first inserted entry (the anchor) is the same one
    /// the display would list first. Consecutive entries sharing a parent
    /// are then merged into that parent's sequence in a single splice.
    pub fn add_batch<I>(&mut self, entries: I) -> Option<E::Key>
    where
        I: IntoIterator<Item = E>,
    {
        let mut batch: Vec<E> = entries.into_iter().collect();
        if let Some(sorter) = self.sorter.clone() {
            batch.sort_by(|a, b| sorter.compare(a, b));
        }

        let mut anchor = None;
        let mut pending: Vec<SlabIndex> = Vec::new();
        let mut pending_parent: Option<SlabIndex> = None;
        let mut splices = 0usize;
        let mut inserted = 0usize;

        for entry in batch {
            let Some((id, parent)) = self.insert_node(entry) else {
                continue;
            };
            if !pending.is_empty() && parent != pending_parent {
                // The pending entries share a common parent; flush them.
                self.insert_into_sequence(pending_parent, &pending);
                pending.clear();
                splices += 1;
            }
            if anchor.is_none() {
                anchor = Some(self.nodes[id.index()].key.clone());
            }
            pending_parent = parent;
            pending.push(id.index());
            inserted += 1;
        }

        if !pending.is_empty() {
            self.insert_into_sequence(pending_parent, &pending);
            splices += 1;
        }

        log::debug!("added {inserted} entries to view model in {splices} splices");
        self.observers.flush();
        anchor
    }

    /// Registers a node for `entry` without placing it in a sequence.
    ///
    /// Returns the new handle and the owner of the sequence it belongs in.
    fn insert_node(&mut self, entry: E) -> Option<(NodeId, Option<SlabIndex>)> {
        let key = entry.key();
        if self.entry_to_node.contains_key(&key) {
            log::debug!("ignoring duplicate view model entry {key:?}");
            return None;
        }

        let parent = entry
            .parent_key()
            .and_then(|parent_key| self.sequence_owner(&parent_key));
        let depth = parent.map_or(0, |index| self.nodes[index].depth + 1);
        let mut flags = NodeFlags::empty();
        if entry.is_directory() {
            flags |= NodeFlags::DIRECTORY;
        }

        let id = self.nodes.insert_with_id(ViewNode {
            entry,
            key: key.clone(),
            parent: OptionSlabIndex::from_option(parent),
            depth,
            order: self.next_order,
            flags,
        });
        self.next_order += 1;
        self.entry_to_node.insert(key, id.index());
        Some((id, parent))
    }

    /// Node whose child sequence receives entries under `parent_key`.
    ///
    /// `None` selects the root sequence: the parent is not held, or it has
    /// no child sequence and the model is not expanding as a tree.
    fn sequence_owner(&self, parent_key: &E::Key) -> Option<SlabIndex> {
        let &index = self.entry_to_node.get(parent_key)?;
        let has_sequence = self.children.contains_key(parent_key);
        let can_expand = self.expand_as_tree && self.nodes[index].is_directory();
        (has_sequence || can_expand).then_some(index)
    }

    /// Merges freshly registered nodes into `parent`'s sequence and splices
    /// their rows in.
    ///
    /// `added` must be in display order. Each node costs one binary search
    /// over its siblings; nothing already placed is compared again.
    fn insert_into_sequence(&mut self, parent: Option<SlabIndex>, added: &[SlabIndex]) {
        let old = match parent {
            None => mem::take(&mut self.root),
            Some(owner) => {
                let key = &self.nodes[owner].key;
                self.children.remove(key).unwrap_or_default()
            }
        };

        let sorter = self.sorter.as_ref();
        let nodes = &self.nodes;
        // New nodes carry the newest stamps, so they land after equal siblings.
        let slots: Vec<usize> = added
            .iter()
            .map(|&new| {
                old.partition_point(|&existing| {
                    display_order(nodes, sorter, existing, new) == Ordering::Less
                })
            })
            .collect();

        let mut merged = ThinVec::with_capacity(old.len() + added.len());
        let mut taken = 0;
        for (&new, &slot) in added.iter().zip(&slots) {
            merged.extend(old[taken..slot].iter().copied());
            merged.push(new);
            taken = slot;
        }
        merged.extend(old[taken..].iter().copied());

        let first_row = match parent {
            None => Some(0),
            Some(owner) if self.nodes[owner].is_expanded() => {
                self.row_position(owner).map(|position| position + 1)
            }
            Some(_) => None,
        };
        if let Some(mut cursor) = first_row {
            // Walk the old siblings' row spans up to each slot; the new rows
            // land at the cursor, shifted by the new rows placed before them.
            let mut placed = Vec::with_capacity(added.len());
            let mut walked = 0;
            for (offset, (&new, &slot)) in added.iter().zip(&slots).enumerate() {
                for _ in walked..slot {
                    cursor = self.subtree_end(cursor);
                }
                walked = slot;
                placed.push((cursor + offset, new));
            }
            self.insert_rows(&placed);
        }

        match parent {
            None => self.root = merged,
            Some(owner) => {
                let key = self.nodes[owner].key.clone();
                self.children.insert(key, merged);
            }
        }
    }

    /// Inserts single rows at their final positions, given in ascending
    /// order, and publishes one change per contiguous run.
    fn insert_rows(&mut self, placed: &[(usize, SlabIndex)]) {
        let mut rows = Vec::with_capacity(self.rows.len() + placed.len());
        let mut old = mem::take(&mut self.rows).into_iter();
        for &(position, index) in placed {
            rows.extend(old.by_ref().take(position - rows.len()));
            rows.push(index);
        }
        rows.extend(old);
        self.rows = rows;

        let mut runs: Vec<(usize, usize)> = Vec::new();
        for &(position, _) in placed {
            match runs.last_mut() {
                Some((start, len)) if *start + *len == position => *len += 1,
                _ => runs.push((position, 1)),
            }
        }
        for (position, added) in runs {
            self.selection.splice(position, 0, added);
            log::trace!("rows inserted at {position}: +{added}");
            self.observers.push(ModelEvent::RowsChanged {
                position,
                removed: 0,
                added,
            });
        }
    }

    // -------------------------------------------------------------------------
    // Removing
    // -------------------------------------------------------------------------

    /// Removes entries held in `directory`'s sequence.
    ///
    /// `directory` names the parent whose sequence holds the entries; when it
    /// has none (or is `None`) the root sequence is searched. Positions are
    /// gathered first and removed as maximal contiguous runs, one change
    /// per run, so a large removal costs the display as few updates as
    /// possible. Keys that cannot be resolved are logged and skipped.
    pub fn remove<'a, I>(&mut self, keys: I, directory: Option<&E::Key>)
    where
        I: IntoIterator<Item = &'a E::Key>,
        E::Key: 'a,
    {
        let parent = directory.and_then(|key| {
            if self.children.contains_key(key) {
                self.entry_to_node.get(key).copied()
            } else {
                None
            }
        });

        let mut positions = Bitset::new();
        if let Some(sequence) = self.sequence(parent) {
            for key in keys {
                let position = self
                    .entry_to_node
                    .get(key)
                    .and_then(|index| sequence.iter().position(|candidate| candidate == index));
                match position {
                    Some(position) => {
                        positions.add(position);
                    }
                    None => log::warn!("failed to remove {key:?} from {directory:?}"),
                }
            }
        }

        // Highest run first, so earlier removals never shift the positions
        // that are still to be processed.
        for (start, len) in positions.runs_rev() {
            let removed = self.splice_out(parent, start, len);
            for index in removed {
                self.release_subtree(index);
            }
        }
        self.observers.flush();
    }

    /// Drops every entry, sequence, index, the selection and the cut set.
    pub fn remove_all(&mut self) {
        let old_len = self.rows.len();
        self.root.clear();
        self.children.clear();
        self.entry_to_node.clear();
        self.nodes.clear();
        self.rows.clear();
        self.selection.clear();
        self.cut.clear();
        if old_len > 0 {
            self.observers.push(ModelEvent::RowsChanged {
                position: 0,
                removed: old_len,
                added: 0,
            });
        }
        self.observers.flush();
    }

    /// Takes `start..start + len` out of a sequence and drops its rows.
    fn splice_out(&mut self, parent: Option<SlabIndex>, start: usize, len: usize) -> Vec<SlabIndex> {
        let Some(sequence) = self.sequence_mut(parent) else {
            return Vec::new();
        };
        let removed: Vec<SlabIndex> = sequence.drain(start..start + len).collect();

        // Siblings are held in display order, so a run of them covers one
        // contiguous span of rows: each node followed by its subtree.
        if let Some(first) = removed.first().and_then(|&index| self.row_position(index)) {
            let end = (0..removed.len()).fold(first, |cursor, _| self.subtree_end(cursor));
            self.remove_rows(first, end - first);
        }
        removed
    }

    fn remove_rows(&mut self, position: usize, removed: usize) {
        if removed == 0 {
            return;
        }
        self.rows.drain(position..position + removed);
        self.selection.splice(position, removed, 0);
        log::trace!("rows removed at {position}: -{removed}");
        self.observers.push(ModelEvent::RowsChanged {
            position,
            removed,
            added: 0,
        });
    }

    /// Frees a node and everything below it. Its rows must already be gone.
    fn release_subtree(&mut self, index: SlabIndex) {
        let Some(node) = self.nodes.try_remove(index) else {
            return;
        };
        self.entry_to_node.remove(&node.key);
        self.cut.remove(&node.key);
        if let Some(children) = self.children.remove(&node.key) {
            for child in children {
                self.release_subtree(child);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Tree expansion
    // -------------------------------------------------------------------------

    /// Expands or collapses a directory row.
    ///
    /// Expanding needs tree mode and a directory entry; the child sequence
    /// is created on first expansion and kept across collapses. Returns true
    /// if the entry ends up in the requested state.
    pub fn set_expanded(&mut self, key: &E::Key, expanded: bool) -> bool {
        let Some(&index) = self.entry_to_node.get(key) else {
            return false;
        };
        let node = &self.nodes[index];
        if node.is_expanded() == expanded {
            return true;
        }

        if expanded {
            if !(self.expand_as_tree && node.is_directory()) {
                return false;
            }
            self.children.entry(key.clone()).or_default();
            self.nodes[index].flags.insert(NodeFlags::EXPANDED);
        } else {
            self.nodes[index].flags.remove(NodeFlags::EXPANDED);
        }

        self.refresh_descendants(Some(index));
        self.observers.flush();
        true
    }

    /// Expands or collapses the row at `position`.
    pub fn set_row_expanded(&mut self, position: usize, expanded: bool) -> bool {
        let Some(&index) = self.rows.get(position) else {
            return false;
        };
        let key = self.nodes[index].key.clone();
        self.set_expanded(&key, expanded)
    }

    pub fn is_expanded(&self, key: &E::Key) -> bool {
        self.entry_to_node
            .get(key)
            .is_some_and(|&index| self.nodes[index].is_expanded())
    }

    /// Discards the cached children of a directory, depth first.
    ///
    /// Every directory child is cleared before the directory's own
    /// sequence is dropped, and the dropped entries stop resolving. A
    /// visible expanded directory is collapsed first, so its rows vanish in
    /// one change. Siblings are left alone.
    pub fn clear_subdirectory(&mut self, key: &E::Key) {
        let Some(&index) = self.entry_to_node.get(key) else {
            return;
        };
        if self.nodes[index].is_expanded() {
            self.nodes[index].flags.remove(NodeFlags::EXPANDED);
            self.refresh_descendants(Some(index));
        }
        let discarded = self.discard_children(index);
        log::debug!("cleared subdirectory {key:?}, {discarded} entries dropped");
        self.observers.flush();
    }

    fn discard_children(&mut self, index: SlabIndex) -> usize {
        let key = self.nodes[index].key.clone();
        let Some(sequence) = self.children.get(&key) else {
            return 0;
        };
        let children: Vec<SlabIndex> = sequence.iter().copied().collect();

        let mut discarded = 0;
        for &child in &children {
            if self.nodes[child].is_directory() {
                discarded += self.discard_children(child);
            }
        }
        self.children.remove(&key);
        for child in children {
            self.release_subtree(child);
            discarded += 1;
        }
        discarded
    }

    // -------------------------------------------------------------------------
    // Cut marks
    // -------------------------------------------------------------------------

    /// Replaces the set of entries marked as cut.
    ///
    /// Keys not held by the model are ignored. Visible rows whose mark
    /// flipped are reported as replaced in place, one change per run.
    pub fn set_cut_files<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a E::Key>,
        E::Key: 'a,
    {
        let mut flipped = FnvHashSet::default();
        for key in self.cut.drain() {
            if let Some(&index) = self.entry_to_node.get(&key) {
                self.nodes[index].flags.remove(NodeFlags::CUT);
                flipped.insert(index);
            }
        }
        for key in keys {
            let Some(&index) = self.entry_to_node.get(key) else {
                continue;
            };
            if self.cut.insert(key.clone()) {
                self.nodes[index].flags.insert(NodeFlags::CUT);
                // Marked before and after: not a change.
                if !flipped.remove(&index) {
                    flipped.insert(index);
                }
            }
        }

        if !flipped.is_empty() {
            let positions: Bitset = self
                .rows
                .iter()
                .enumerate()
                .filter(|(_, index)| flipped.contains(*index))
                .map(|(position, _)| position)
                .collect();
            let mut runs: Vec<(usize, usize)> = positions.runs_rev().collect();
            runs.reverse();
            for (position, n) in runs {
                self.observers.push(ModelEvent::RowsChanged {
                    position,
                    removed: n,
                    added: n,
                });
            }
        }
        self.observers.flush();
    }

    pub fn is_cut(&self, key: &E::Key) -> bool {
        self.cut.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use super::super::testing::{names, outline, path, sorted_by_name, tree_model};
    use super::super::{EventLog, ModelEvent, ViewModel};
    use crate::sort::{FileSorter, SortKey};
    use crate::types::FileEntry;

    fn rows_changed(position: usize, removed: usize, added: usize) -> ModelEvent {
        ModelEvent::RowsChanged {
            position,
            removed,
            added,
        }
    }

    fn flat(names: &[&str]) -> ViewModel<FileEntry> {
        let mut model: ViewModel<FileEntry> = ViewModel::new();
        model.add_batch(names.iter().map(|name| FileEntry::file(format!("/d/{name}"))));
        model
    }

    fn keys(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|name| path(&format!("/d/{name}"))).collect()
    }

    #[test]
    fn child_added_before_expansion_shows_under_parent() {
        let mut model: ViewModel<FileEntry> = ViewModel::new();
        model.set_expand_as_tree(true);
        model.add_batch([FileEntry::directory("/r/dir1"), FileEntry::file("/r/file1")]);
        model.add(FileEntry::file("/r/dir1/file2"));
        assert_eq!(names(&model), vec!["dir1", "file1"]);

        assert!(model.set_expanded(&path("/r/dir1"), true));
        assert_eq!(
            outline(&model),
            vec![
                ("dir1".to_string(), 0),
                ("file2".to_string(), 1),
                ("file1".to_string(), 0),
            ]
        );
    }

    #[test]
    fn flat_mode_puts_everything_in_root() {
        let mut model: ViewModel<FileEntry> = ViewModel::new();
        model.add_batch([FileEntry::directory("/r/dir1"), FileEntry::file("/r/file1")]);
        model.add(FileEntry::file("/r/dir1/file2"));
        assert_eq!(names(&model), vec!["dir1", "file1", "file2"]);
        assert!(!model.set_expanded(&path("/r/dir1"), true));
        assert_eq!(model.len(), 3);
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let mut model = flat(&["a"]);
        assert!(model.add(FileEntry::file("/d/a")).is_none());
        assert_eq!(model.add_batch([FileEntry::file("/d/a")]), None);
        assert_eq!(model.len(), 1);
        assert_eq!(model.entry_count(), 1);
    }

    #[test]
    fn batch_anchor_is_first_in_sort_order() {
        let mut model: ViewModel<FileEntry> = ViewModel::new();
        model.set_sorter(Some(sorted_by_name()));
        let anchor = model.add_batch([
            FileEntry::file("/d/c"),
            FileEntry::file("/d/a"),
            FileEntry::file("/d/b"),
        ]);
        assert_eq!(anchor, Some(path("/d/a")));
        assert_eq!(model.position_of(&path("/d/a")), Some(0));

        // A later batch anchors on its own first entry, wherever it lands.
        let anchor = model.add_batch([FileEntry::file("/d/bb"), FileEntry::file("/d/0")]);
        assert_eq!(anchor, Some(path("/d/0")));
        assert_eq!(model.position_of(&path("/d/0")), Some(0));

        let mut descending: ViewModel<FileEntry> = ViewModel::new();
        descending.set_sorter(Some(Rc::new(FileSorter::new(SortKey::Name).reversed(true))));
        let anchor = descending.add_batch([FileEntry::file("/d/a"), FileEntry::file("/d/c")]);
        assert_eq!(anchor, Some(path("/d/c")));
    }

    #[test]
    fn batch_without_sorter_keeps_given_order() {
        let mut model: ViewModel<FileEntry> = ViewModel::new();
        let anchor = model.add_batch([FileEntry::file("/d/z"), FileEntry::file("/d/a")]);
        assert_eq!(anchor, Some(path("/d/z")));
        assert_eq!(names(&model), vec!["z", "a"]);
        assert_eq!(model.add_batch(Vec::<FileEntry>::new()), None);
    }

    #[test]
    fn batch_splices_once_per_parent_run() {
        let mut model = tree_model();
        model.set_expanded(&path("/r/dir1"), true);
        model.set_sorter(Some(sorted_by_name()));
        assert_eq!(names(&model), vec!["dir1", "a", "b", "file1"]);

        let log = EventLog::new();
        model.subscribe(log.clone());
        model.add_batch([
            FileEntry::file("/r/dir1/c"),
            FileEntry::file("/r/dir1/d"),
            FileEntry::file("/r/file0"),
        ]);

        // Sorted batch is [c, d, file0]: one splice into dir1, one into root.
        assert_eq!(log.take(), vec![rows_changed(3, 0, 2), rows_changed(5, 0, 1)]);
        assert_eq!(names(&model), vec!["dir1", "a", "b", "c", "d", "file0", "file1"]);
    }

    #[test]
    fn remove_emits_one_change_per_contiguous_run() {
        let mut model = flat(&["a", "b", "c", "d", "e", "f"]);
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.remove(&keys(&["b", "e", "c"]), Some(&path("/d")));

        assert_eq!(log.take(), vec![rows_changed(4, 1, 0), rows_changed(1, 2, 0)]);
        assert_eq!(names(&model), vec!["a", "d", "f"]);
        for key in keys(&["b", "c", "e"]) {
            assert!(model.lookup(&key).is_none());
        }
        for key in keys(&["a", "d", "f"]) {
            assert!(model.lookup(&key).is_some());
        }
    }

    #[test]
    fn remove_unknown_or_misplaced_is_a_no_op() {
        let mut model = tree_model();
        model.set_expanded(&path("/r/dir1"), true);
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.remove(&[path("/r/ghost")], None);
        // `a` lives under dir1, not in the root sequence.
        model.remove(&[path("/r/dir1/a")], None);

        assert!(log.is_empty());
        assert_eq!(model.len(), 4);
        assert!(model.lookup(&path("/r/dir1/a")).is_some());
    }

    #[test]
    fn remove_from_expanded_directory() {
        let mut model = tree_model();
        model.set_expanded(&path("/r/dir1"), true);
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.remove(&[path("/r/dir1/b")], Some(&path("/r/dir1")));

        assert_eq!(log.take(), vec![rows_changed(2, 1, 0)]);
        assert_eq!(names(&model), vec!["dir1", "a", "file1"]);
    }

    #[test]
    fn removing_a_directory_drops_its_subtree() {
        let mut model = tree_model();
        model.set_expanded(&path("/r/dir1"), true);
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.remove(&[path("/r/dir1")], Some(&path("/r")));

        assert_eq!(log.take(), vec![rows_changed(0, 3, 0)]);
        assert_eq!(names(&model), vec!["file1"]);
        assert_eq!(model.entry_count(), 1);
        assert!(model.lookup(&path("/r/dir1/a")).is_none());
        assert!(!model.is_expanded(&path("/r/dir1")));
    }

    #[test]
    fn stale_handle_resolves_to_nothing() {
        let mut model = flat(&["a"]);
        let id = model.lookup(&path("/d/a")).unwrap();
        model.remove(&keys(&["a"]), None);
        assert!(model.node(id).is_none());

        // The freed slot gets reused by the next entry.
        let new_id = model.add(FileEntry::file("/d/b")).unwrap();
        assert_eq!(new_id.index(), id.index());
        assert!(model.node(id).is_none());
        assert_eq!(model.node(new_id).map(|e| e.name.as_str()), Some("b"));
    }

    #[test]
    fn add_remove_remove_all_round_trip() {
        let mut model = tree_model();
        model.set_expanded(&path("/r/dir1"), true);
        let batch = ["x", "y", "z"].map(|name| FileEntry::file(format!("/r/{name}")));
        let batch_keys: Vec<_> = batch.iter().map(|e| e.path.clone()).collect();

        model.add_batch(batch);
        model.remove(&batch_keys, Some(&path("/r")));
        model.remove_all();

        let fresh: ViewModel<FileEntry> = ViewModel::new();
        assert_eq!(model.len(), fresh.len());
        assert_eq!(model.entry_count(), 0);
        for key in batch_keys
            .iter()
            .chain(&[path("/r/dir1"), path("/r/dir1/a"), path("/r/file1")])
        {
            assert_eq!(model.lookup(key), fresh.lookup(key));
        }
        assert!(model.selection().is_empty());
    }

    #[test]
    fn remove_all_notifies_and_clears_selection() {
        let mut model = flat(&["a", "b"]);
        model.select_all();
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.remove_all();
        assert_eq!(log.take(), vec![rows_changed(0, 2, 0)]);
        assert!(model.selection().is_empty());

        model.remove_all();
        assert!(log.is_empty());
    }

    #[test]
    fn expand_and_collapse_emit_row_changes() {
        let mut model = tree_model();
        let log = EventLog::new();
        model.subscribe(log.clone());

        assert!(model.set_row_expanded(0, true));
        assert!(model.set_expanded(&path("/r/dir1"), true));
        assert!(model.set_expanded(&path("/r/dir1"), false));
        assert!(model.set_expanded(&path("/r/dir1"), true));

        assert_eq!(
            log.take(),
            vec![
                rows_changed(1, 0, 2),
                rows_changed(1, 2, 0),
                rows_changed(1, 0, 2),
            ]
        );
        assert!(!model.set_expanded(&path("/r/file1"), true));
        assert!(!model.set_expanded(&path("/r/missing"), true));
        assert!(!model.set_row_expanded(99, true));
    }

    #[test]
    fn nested_expansion_keeps_preorder() {
        let mut model = tree_model();
        model.set_sorter(Some(sorted_by_name()));
        model.set_expanded(&path("/r/dir1"), true);
        model.add(FileEntry::directory("/r/dir1/sub"));
        model.add(FileEntry::file("/r/dir1/sub/z"));
        model.set_expanded(&path("/r/dir1/sub"), true);

        assert_eq!(
            outline(&model),
            vec![
                ("dir1".to_string(), 0),
                ("a".to_string(), 1),
                ("b".to_string(), 1),
                ("sub".to_string(), 1),
                ("z".to_string(), 2),
                ("file1".to_string(), 0),
            ]
        );

        // Collapsing the outer directory hides the nested rows too.
        model.set_expanded(&path("/r/dir1"), false);
        assert_eq!(names(&model), vec!["dir1", "file1"]);
        model.set_expanded(&path("/r/dir1"), true);
        assert_eq!(model.len(), 6);
    }

    #[test]
    fn descending_sort_keeps_ancestors_first() {
        let mut model = tree_model();
        model.set_sorter(Some(Rc::new(
            FileSorter::new(SortKey::Name)
                .directories_first(false)
                .reversed(true),
        )));
        model.set_expanded(&path("/r/dir1"), true);
        assert_eq!(names(&model), vec!["file1", "dir1", "b", "a"]);
    }

    #[test]
    fn clear_subdirectory_discards_cached_children_depth_first() {
        let mut model = tree_model();
        model.set_expanded(&path("/r/dir1"), true);
        model.add(FileEntry::directory("/r/dir1/sub"));
        model.add(FileEntry::file("/r/dir1/sub/z"));
        model.set_expanded(&path("/r/dir1/sub"), true);
        model.select_item(4, true);
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.clear_subdirectory(&path("/r/dir1"));

        assert_eq!(log.take(), vec![rows_changed(1, 4, 0)]);
        assert_eq!(names(&model), vec!["dir1", "file1"]);
        assert!(!model.is_expanded(&path("/r/dir1")));
        assert!(model.selection().is_empty());
        for gone in ["/r/dir1/a", "/r/dir1/sub", "/r/dir1/sub/z"] {
            assert!(model.lookup(&path(gone)).is_none(), "{gone} still held");
        }
        assert_eq!(model.entry_count(), 2);

        // Re-expanding starts from an empty sequence.
        assert!(model.set_expanded(&path("/r/dir1"), true));
        assert_eq!(model.len(), 2);

        model.clear_subdirectory(&path("/r/nowhere"));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn clear_collapsed_subdirectory_is_silent() {
        let mut model = tree_model();
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.clear_subdirectory(&path("/r/dir1"));

        assert!(log.is_empty());
        assert!(model.lookup(&path("/r/dir1/a")).is_none());
        assert!(model.lookup(&path("/r/file1")).is_some());
    }

    #[test]
    fn cut_marks_are_replaced_symmetrically() {
        let mut model = flat(&["a", "b", "c", "d"]);
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.set_cut_files(&keys(&["a", "b", "ghost"]));
        assert!(model.is_cut(&path("/d/a")));
        assert!(model.is_cut(&path("/d/b")));
        assert!(!model.is_cut(&path("/d/ghost")));
        assert!(model.row(0).unwrap().is_cut());
        assert_eq!(log.take(), vec![rows_changed(0, 2, 2)]);

        // a and b flip off, c and d flip on: one run.
        model.set_cut_files(&keys(&["c", "d"]));
        assert!(!model.is_cut(&path("/d/a")));
        assert!(!model.row(0).unwrap().is_cut());
        assert!(model.row(2).unwrap().is_cut());
        assert_eq!(log.take(), vec![rows_changed(0, 4, 4)]);

        model.set_cut_files(&keys(&["c", "d", "d"]));
        assert!(log.is_empty());

        model.set_cut_files(&keys(&["a", "c"]));
        assert_eq!(log.take(), vec![rows_changed(0, 1, 1), rows_changed(3, 1, 1)]);
        model.set_cut_files(&keys(&["c"]));

        model.remove(&keys(&["c"]), None);
        assert!(!model.is_cut(&path("/d/c")));
    }

    #[test]
    fn hidden_cut_marks_do_not_notify() {
        let mut model = tree_model();
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.set_cut_files(&[path("/r/dir1/a")]);
        assert!(model.is_cut(&path("/r/dir1/a")));
        assert!(log.is_empty());

        model.set_expanded(&path("/r/dir1"), true);
        assert!(model.row(1).unwrap().is_cut());
    }

    #[test]
    fn scattered_batch_reports_each_run() {
        let mut model: ViewModel<FileEntry> = ViewModel::new();
        model.set_sorter(Some(sorted_by_name()));
        model.add_batch([FileEntry::file("/d/b"), FileEntry::file("/d/d")]);
        model.select_item(1, false);
        let log = EventLog::new();
        model.subscribe(log.clone());

        model.add_batch(["e", "c", "a"].map(|name| FileEntry::file(format!("/d/{name}"))));

        assert_eq!(names(&model), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(
            log.take(),
            vec![rows_changed(0, 0, 1), rows_changed(2, 0, 1), rows_changed(4, 0, 1)]
        );
        assert!(model.is_selected(3));
        assert_eq!(model.selection().len(), 1);
    }

    #[test]
    fn structural_changes_only_compare_new_entries() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = calls.clone();
        let mut model: ViewModel<FileEntry> = ViewModel::new();
        model.set_sorter(Some(Rc::new(move |a: &FileEntry, b: &FileEntry| {
            counter.set(counter.get() + 1);
            a.name.cmp(&b.name)
        })));

        for i in 0..1000 {
            model.add(FileEntry::file(format!("/d/{i:04}")));
        }
        // One binary search per entry: at most 10 comparisons below 1024.
        assert!(calls.get() <= 1000 * 10, "{} comparisons", calls.get());
        assert_eq!(model.len(), 1000);

        let before = calls.get();
        let doomed: Vec<PathBuf> = (0..1000)
            .step_by(2)
            .map(|i| path(&format!("/d/{i:04}")))
            .collect();
        model.remove(&doomed, None);

        assert_eq!(calls.get(), before);
        assert_eq!(model.len(), 500);
        assert_eq!(model.position_of(&path("/d/0001")), Some(0));
        assert_eq!(model.position_of(&path("/d/0999")), Some(499));
    }

    #[test]
    fn entries_added_to_a_collapsed_directory_stay_sorted() {
        let mut model = tree_model();
        model.set_sorter(Some(sorted_by_name()));
        model.add(FileEntry::file("/r/dir1/0"));
        model.add(FileEntry::file("/r/dir1/ab"));
        model.set_expanded(&path("/r/dir1"), true);
        assert_eq!(names(&model), vec!["dir1", "0", "a", "ab", "b", "file1"]);

        model.set_sorter(None);
        assert_eq!(names(&model), vec!["dir1", "a", "b", "0", "ab", "file1"]);
    }
}
