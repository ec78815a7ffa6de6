//! Sort rules for the view model.
//!
//! A sorter is a pure total order over entries. The model applies it within
//! each tree level; ancestor-before-descendant order is structural and no
//! sorter can change it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::SortConfig;
use crate::types::{FileEntry, ModelEntry};

/// Total order over entries, injected into the model.
pub trait Sorter<E> {
    fn compare(&self, a: &E, b: &E) -> Ordering;
}

impl<E, F> Sorter<E> for F
where
    F: Fn(&E, &E) -> Ordering,
{
    fn compare(&self, a: &E, b: &E) -> Ordering {
        self(a, b)
    }
}

/// Attribute a [`FileSorter`] orders by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Modified,
    /// File extension.
    Type,
}

/// Stock sorter for [`FileEntry`].
///
/// Ties on the chosen key fall back to the name order, and finally to the
/// full path, so distinct entries never compare equal. `directories_first`
/// is applied before `reversed` and is not flipped by it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileSorter {
    pub key: SortKey,
    pub reversed: bool,
    pub directories_first: bool,
}

impl FileSorter {
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            reversed: false,
            directories_first: true,
        }
    }

    pub fn reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn directories_first(mut self, directories_first: bool) -> Self {
        self.directories_first = directories_first;
        self
    }
}

impl From<&SortConfig> for FileSorter {
    fn from(config: &SortConfig) -> Self {
        Self {
            key: config.key,
            reversed: config.reversed,
            directories_first: config.directories_first,
        }
    }
}

impl Sorter<FileEntry> for FileSorter {
    fn compare(&self, a: &FileEntry, b: &FileEntry) -> Ordering {
        if self.directories_first {
            match (a.is_directory(), b.is_directory()) {
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
        }

        let ordering = match self.key {
            SortKey::Name => compare_names(a, b),
            SortKey::Size => a.size.cmp(&b.size).then_with(|| compare_names(a, b)),
            SortKey::Modified => a
                .modified_at
                .cmp(&b.modified_at)
                .then_with(|| compare_names(a, b)),
            SortKey::Type => compare_extensions(a, b).then_with(|| compare_names(a, b)),
        };

        if self.reversed {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Case-insensitive name order, then bytewise, then by path.
fn compare_names(a: &FileEntry, b: &FileEntry) -> Ordering {
    let folded = a
        .name
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.name.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.path.cmp(&b.path))
}

fn compare_extensions(a: &FileEntry, b: &FileEntry) -> Ordering {
    let a_ext = a.extension().map(str::to_ascii_lowercase);
    let b_ext = b.extension().map(str::to_ascii_lowercase);
    a_ext.cmp(&b_ext)
}
