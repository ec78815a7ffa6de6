//! Deduplicating FIFO work queue.
//!
//! `WorkQueue` is a FIFO that refuses duplicates and can find, remove or
//! promote any item in constant time. Items live in a doubly-linked list
//! whose links are held in a `Slab`. A `HashTable` of link indices sits next
//! to it and hashes through the linked item, so every item is stored once
//! and membership tests and arbitrary removal never scan the list.
//!
//! Identity is the item's `Hash` + `Eq`. The hashing strategy is injected
//! through the `S: BuildHasher` parameter (FNV by default).

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use fnv::FnvBuildHasher;
use hashbrown::HashTable;

use crate::storage::{OptionSlabIndex, Slab, SlabIndex};

/// Release hook run for every item still queued when the queue is dropped.
pub type ReleaseFn<T> = Box<dyn FnMut(T)>;

struct Link<T> {
    item: T,
    prev: OptionSlabIndex,
    next: OptionSlabIndex,
}

/// FIFO queue of unique items with O(1) removal, peek and move-to-front.
///
/// `dequeue` and `remove` hand ownership of the item back to the caller.
/// Items still queued when the queue is dropped are passed to the release
/// hook, if one was configured, exactly once and in queue order.
pub struct WorkQueue<T, S = FnvBuildHasher> {
    links: Slab<Link<T>>,
    table: HashTable<SlabIndex>,
    hasher: S,
    head: OptionSlabIndex,
    tail: OptionSlabIndex,
    release: Option<ReleaseFn<T>>,
}

impl<T: Hash + Eq> WorkQueue<T> {
    /// Creates an empty queue hashing items with FNV.
    pub fn new() -> Self {
        Self::with_hasher(FnvBuildHasher::default())
    }
}

impl<T: Hash + Eq> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> WorkQueue<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates an empty queue using `hasher` to hash item identities.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            links: Slab::new(),
            table: HashTable::new(),
            hasher,
            head: OptionSlabIndex::none(),
            tail: OptionSlabIndex::none(),
            release: None,
        }
    }

    /// Sets the hook that releases items still queued at drop time.
    pub fn with_release(mut self, release: impl FnMut(T) + 'static) -> Self {
        self.release = Some(Box::new(release));
        self
    }

    /// Adds `item` to the tail unless it is already queued.
    ///
    /// Returns true if the item was inserted.
    pub fn enqueue(&mut self, item: T) -> bool {
        let hash = self.hasher.hash_one(&item);
        let links = &self.links;
        if self.table.find(hash, |&index| links[index].item == item).is_some() {
            return false;
        }
        let index = self.links.insert(Link {
            item,
            prev: OptionSlabIndex::none(),
            next: OptionSlabIndex::none(),
        });
        self.link_back(index);

        let Self { links, table, hasher, .. } = self;
        table.insert_unique(hash, index, |&index| hasher.hash_one(&links[index].item));
        true
    }

    /// Removes and returns the head item, or `None` if the queue is empty.
    pub fn dequeue(&mut self) -> Option<T> {
        let index = self.head.to_option()?;
        let hash = self.hasher.hash_one(&self.links[index].item);
        if let Ok(entry) = self.table.find_entry(hash, |&candidate| candidate == index) {
            entry.remove();
        }
        self.take_link(index).map(|link| link.item)
    }

    /// Removes `item` from wherever it sits in the queue.
    ///
    /// Returns the queued item, or `None` if it was not queued.
    pub fn remove<Q>(&mut self, item: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(item);
        let links = &self.links;
        let (index, _) = self
            .table
            .find_entry(hash, |&index| Borrow::<Q>::borrow(&links[index].item) == item)
            .ok()?
            .remove();
        self.take_link(index).map(|link| link.item)
    }

    /// Returns the head item without removing it.
    pub fn head(&self) -> Option<&T> {
        let index = self.head.to_option()?;
        self.links.get(index).map(|link| &link.item)
    }

    /// Moves an already queued item to the head, reusing its link.
    ///
    /// Returns false if the item is not queued.
    pub fn move_to_head<Q>(&mut self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(index) = self.find_index(item) else {
            return false;
        };
        if self.head.to_option() != Some(index) {
            self.unlink(index);
            self.link_front(index);
        }
        true
    }

    /// Finds the queued item matching a derived key.
    pub fn find<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.find_index(key)?;
        self.links.get(index).map(|link| &link.item)
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find_index(item).is_some()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Iterates queued items from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            links: &self.links,
            cursor: self.head,
        }
    }

    fn find_index<Q>(&self, item: &Q) -> Option<SlabIndex>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(item);
        self.table
            .find(hash, |&index| Borrow::<Q>::borrow(&self.links[index].item) == item)
            .copied()
    }

    fn take_link(&mut self, index: SlabIndex) -> Option<Link<T>> {
        self.unlink(index);
        self.links.try_remove(index)
    }

    fn link_back(&mut self, index: SlabIndex) {
        let old_tail = self.tail;
        {
            let link = &mut self.links[index];
            link.prev = old_tail;
            link.next = OptionSlabIndex::none();
        }
        match old_tail.to_option() {
            Some(tail) => self.links[tail].next = OptionSlabIndex::some(index),
            None => self.head = OptionSlabIndex::some(index),
        }
        self.tail = OptionSlabIndex::some(index);
    }

    fn link_front(&mut self, index: SlabIndex) {
        let old_head = self.head;
        {
            let link = &mut self.links[index];
            link.prev = OptionSlabIndex::none();
            link.next = old_head;
        }
        match old_head.to_option() {
            Some(head) => self.links[head].prev = OptionSlabIndex::some(index),
            None => self.tail = OptionSlabIndex::some(index),
        }
        self.head = OptionSlabIndex::some(index);
    }

    fn unlink(&mut self, index: SlabIndex) {
        let (prev, next) = {
            let link = &self.links[index];
            (link.prev, link.next)
        };
        match prev.to_option() {
            Some(prev) => self.links[prev].next = next,
            None => self.head = next,
        }
        match next.to_option() {
            Some(next) => self.links[next].prev = prev,
            None => self.tail = prev,
        }
        let link = &mut self.links[index];
        link.prev = OptionSlabIndex::none();
        link.next = OptionSlabIndex::none();
    }
}

impl<T, S> Drop for WorkQueue<T, S> {
    fn drop(&mut self) {
        let Some(mut release) = self.release.take() else {
            return;
        };
        self.table.clear();
        let mut cursor = self.head.to_option();
        while let Some(index) = cursor {
            let Some(link) = self.links.try_remove(index) else {
                break;
            };
            cursor = link.next.to_option();
            release(link.item);
        }
    }
}

impl<T: fmt::Debug, S> fmt::Debug for WorkQueue<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut cursor = self.head.to_option();
        while let Some(link) = cursor.and_then(|index| self.links.get(index)) {
            list.entry(&link.item);
            cursor = link.next.to_option();
        }
        list.finish()
    }
}

/// Iterator over a `WorkQueue` from head to tail.
pub struct Iter<'a, T> {
    links: &'a Slab<Link<T>>,
    cursor: OptionSlabIndex,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let link = self.links.get(self.cursor.to_option()?)?;
        self.cursor = link.next;
        Some(&link.item)
    }
}

impl<'a, T, S> IntoIterator for &'a WorkQueue<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
