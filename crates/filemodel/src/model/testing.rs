//! Shared helpers for the model tests.

use std::path::PathBuf;
use std::rc::Rc;

use super::ViewModel;
use crate::sort::{FileSorter, SortKey, Sorter};
use crate::types::FileEntry;

pub fn path(path: &str) -> PathBuf {
    PathBuf::from(path)
}

/// Entry names in flat order.
pub fn names(model: &ViewModel<FileEntry>) -> Vec<String> {
    model.entries().map(|entry| entry.name.clone()).collect()
}

/// `(name, depth)` pairs in flat order.
pub fn outline(model: &ViewModel<FileEntry>) -> Vec<(String, usize)> {
    model
        .rows()
        .map(|row| (row.entry.name.clone(), row.depth))
        .collect()
}

/// Plain name order, directories mixed with files.
pub fn sorted_by_name() -> Rc<dyn Sorter<FileEntry>> {
    Rc::new(FileSorter::new(SortKey::Name).directories_first(false))
}

/// Model in tree mode holding `/r/dir1` (with `a`, `b`) and `/r/file1`.
pub fn tree_model() -> ViewModel<FileEntry> {
    let mut model = ViewModel::new();
    model.set_expand_as_tree(true);
    model.add_batch([FileEntry::directory("/r/dir1"), FileEntry::file("/r/file1")]);
    model.add_batch([FileEntry::file("/r/dir1/a"), FileEntry::file("/r/dir1/b")]);
    model
}
