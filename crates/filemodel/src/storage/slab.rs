//! Generational slab allocator.
//!
//! Presentation nodes and queue links are stored in a slab so that every
//! index structure can refer to them by a 4-byte `SlabIndex` instead of by
//! pointer. Freed slots are threaded onto a freelist and reused; each slot
//! carries a generation counter so stale `NodeId`s can be detected.

use std::fmt;
use std::mem;
use std::ops::{Index, IndexMut};

use super::entry::Entry;
use super::index_types::{NodeId, SlabIndex};

/// Heap-backed slab with a freelist and per-slot generations.
pub struct Slab<T> {
    /// Slot storage; vacant slots form a singly-linked freelist.
    entries: Vec<Entry<T>>,

    /// Logical element count (occupied slots only).
    len: usize,

    /// Head of the freelist (index of the next available slot).
    next: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slab<T> {
    /// Creates a new empty slab.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            len: 0,
            next: 0,
        }
    }

    /// Creates a new slab with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            len: 0,
            next: 0,
        }
    }

    /// Inserts a value, returning its stable index.
    pub fn insert(&mut self, value: T) -> SlabIndex {
        self.insert_with_id(value).index()
    }

    /// Inserts a value, returning a generation-checked handle to it.
    pub fn insert_with_id(&mut self, value: T) -> NodeId {
        let key = self.next;
        let generation = if key == self.entries.len() {
            // Appending to end
            self.entries.push(Entry::Occupied {
                generation: 0,
                value,
            });
            self.next = self.entries.len();
            0
        } else {
            // Reusing a vacant slot from the freelist
            let entry = &mut self.entries[key];
            let (next_free, generation) = match entry {
                Entry::Vacant { next, generation } => (*next, *generation),
                Entry::Occupied { .. } => unreachable!("slot unexpectedly occupied"),
            };
            *entry = Entry::Occupied { generation, value };
            self.next = next_free;
            generation
        };
        self.len += 1;
        NodeId::new(SlabIndex::new(key), generation)
    }

    /// Gets a reference to the value at `index`.
    pub fn get(&self, index: SlabIndex) -> Option<&T> {
        match self.entries.get(index.get())? {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Gets a mutable reference to the value at `index`.
    pub fn get_mut(&mut self, index: SlabIndex) -> Option<&mut T> {
        match self.entries.get_mut(index.get())? {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Resolves a handle, returning `None` if its slot was freed since.
    pub fn get_by_id(&self, id: NodeId) -> Option<&T> {
        match self.entries.get(id.index().get())? {
            Entry::Occupied { generation, value } if *generation == id.generation() => Some(value),
            _ => None,
        }
    }

    /// Returns the current handle for an occupied slot.
    pub fn id_of(&self, index: SlabIndex) -> Option<NodeId> {
        match self.entries.get(index.get())? {
            Entry::Occupied { generation, .. } => Some(NodeId::new(index, *generation)),
            Entry::Vacant { .. } => None,
        }
    }

    /// Removes the value at `index` if it exists, returning it.
    pub fn try_remove(&mut self, index: SlabIndex) -> Option<T> {
        let next_free = self.next;
        let entry = self.entries.get_mut(index.get())?;
        let generation = match entry {
            Entry::Occupied { generation, .. } => *generation,
            Entry::Vacant { .. } => return None,
        };
        let prev = mem::replace(
            entry,
            Entry::Vacant {
                next: next_free,
                generation: generation.wrapping_add(1),
            },
        );
        match prev {
            Entry::Occupied { value, .. } => {
                self.len -= 1;
                self.next = index.get();
                Some(value)
            }
            Entry::Vacant { .. } => unreachable!("slot checked occupied above"),
        }
    }

    /// Drops every value. Slots are released but generations survive so that
    /// handles issued before the clear stay invalid.
    pub fn clear(&mut self) {
        let slots = self.entries.len();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            let generation = match entry {
                Entry::Occupied { generation, .. } => generation.wrapping_add(1),
                Entry::Vacant { generation, .. } => *generation,
            };
            let next = if i + 1 == slots { slots } else { i + 1 };
            *entry = Entry::Vacant { next, generation };
        }
        self.len = 0;
        self.next = 0;
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the slab is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an iterator over occupied entries.
    pub fn iter(&self) -> SlabIter<'_, T> {
        SlabIter {
            slab: self,
            index: 0,
        }
    }
}

impl<T> Index<SlabIndex> for Slab<T> {
    type Output = T;

    fn index(&self, index: SlabIndex) -> &Self::Output {
        self.get(index).expect("invalid slab index")
    }
}

impl<T> IndexMut<SlabIndex> for Slab<T> {
    fn index_mut(&mut self, index: SlabIndex) -> &mut Self::Output {
        self.get_mut(index).expect("invalid slab index")
    }
}

impl<T> fmt::Debug for Slab<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slab")
            .field("len", &self.len)
            .field("next", &self.next)
            .field("slots", &self.entries.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Slab Iterator
// ---------------------------------------------------------------------------

/// Iterator over occupied entries in a Slab.
pub struct SlabIter<'a, T> {
    slab: &'a Slab<T>,
    index: usize,
}

impl<'a, T> Iterator for SlabIter<'a, T> {
    type Item = (SlabIndex, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.slab.entries.len() {
            let idx = SlabIndex::new(self.index);
            self.index += 1;
            if let Some(value) = self.slab.get(idx) {
                return Some((idx, value));
            }
        }
        None
    }
}

impl<'a, T> IntoIterator for &'a Slab<T> {
    type Item = (SlabIndex, &'a T);
    type IntoIter = SlabIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
