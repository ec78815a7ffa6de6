//! Slab index types for type-safe indexing.

use serde::{Deserialize, Serialize};

/// A compact 32-bit index into the slab.
///
/// The u32::MAX value is reserved for `OptionSlabIndex` and used as an
/// invalid/sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SlabIndex(u32);

impl SlabIndex {
    /// Creates a new SlabIndex from a usize.
    ///
    /// # Panics
    /// Panics if `index >= u32::MAX` (reserved for None sentinel).
    #[inline]
    pub fn new(index: usize) -> Self {
        assert!(
            index < u32::MAX as usize,
            "slab index must be less than u32::MAX"
        );
        Self(index as u32)
    }

    /// Returns the index as a usize.
    #[inline]
    pub fn get(&self) -> usize {
        self.0 as usize
    }
}

/// An optional slab index using u32::MAX as the None sentinel.
///
/// Fits in 4 bytes instead of the 8 an `Option<SlabIndex>` takes, which
/// matters for the prev/next links of every queued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct OptionSlabIndex(u32);

impl OptionSlabIndex {
    /// Creates a None value.
    #[inline]
    pub fn none() -> Self {
        Self(u32::MAX)
    }

    /// Creates a Some value from a SlabIndex.
    #[inline]
    pub fn some(index: SlabIndex) -> Self {
        Self(index.0)
    }

    /// Creates from an Option<SlabIndex>.
    #[inline]
    pub fn from_option(index: Option<SlabIndex>) -> Self {
        index.map_or(Self::none(), Self::some)
    }

    /// Converts to an Option<SlabIndex>.
    #[inline]
    pub fn to_option(self) -> Option<SlabIndex> {
        if self.0 == u32::MAX {
            None
        } else {
            Some(SlabIndex(self.0))
        }
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for OptionSlabIndex {
    fn default() -> Self {
        Self::none()
    }
}

/// Generation-checked handle to a presentation node.
///
/// Slots in the slab are reused after removal; the generation tells a
/// handle to a removed node apart from whatever now lives in its slot, so a
/// handle kept past `remove` resolves to nothing instead of to a stranger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub(crate) fn new(index: SlabIndex, generation: u32) -> Self {
        Self {
            index: index.0,
            generation,
        }
    }

    /// Returns the slot this handle points into.
    #[inline]
    pub fn index(&self) -> SlabIndex {
        SlabIndex(self.index)
    }

    /// Returns the generation the slot had when the handle was issued.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}
