//! Storage layer for the view model and work queue.
//!
//! This module provides the low-level data storage primitives:
//! - Generational slab allocator addressed by compact `SlabIndex` values
//! - Dense position bitset for selections and batched removals

mod bitset;
mod entry;
mod index_types;
mod slab;

pub use bitset::{Bitset, Iter as BitsetIter, IterRev as BitsetIterRev, RunsRev};
pub use index_types::{NodeId, OptionSlabIndex, SlabIndex};
pub use slab::{Slab, SlabIter};
