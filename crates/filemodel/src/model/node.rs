//! Presentation nodes and the row views handed to the display layer.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::storage::{NodeId, OptionSlabIndex};

// ---------------------------------------------------------------------------
// Node flags
// ---------------------------------------------------------------------------

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        const DIRECTORY = 1 << 0;
        const EXPANDED  = 1 << 1;
        const CUT       = 1 << 2;
    }
}

// ---------------------------------------------------------------------------
// ViewNode
// ---------------------------------------------------------------------------

/// One entry as held by the model.
#[derive(Debug)]
pub(crate) struct ViewNode<E, K> {
    pub entry: E,
    /// Cached `entry.key()`; the child-sequence map is keyed by it.
    pub key: K,
    /// Node whose child sequence holds this one; none for the root sequence.
    pub parent: OptionSlabIndex,
    pub depth: u32,
    /// Insertion stamp; breaks sorter ties and is the order without a sorter.
    pub order: u64,
    pub flags: NodeFlags,
}

impl<E, K> ViewNode<E, K> {
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.flags.contains(NodeFlags::DIRECTORY)
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.flags.contains(NodeFlags::EXPANDED)
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// A row of the flattened view, materialized on demand.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a, E> {
    pub position: usize,
    pub id: NodeId,
    pub entry: &'a E,
    /// Nesting level; 0 for rows of the root sequence.
    pub depth: usize,
    pub(crate) flags: NodeFlags,
    pub(crate) expandable: bool,
    pub(crate) selected: bool,
}

impl<E> Row<'_, E> {
    pub fn is_directory(&self) -> bool {
        self.flags.contains(NodeFlags::DIRECTORY)
    }

    pub fn is_expanded(&self) -> bool {
        self.flags.contains(NodeFlags::EXPANDED)
    }

    /// True for directory rows while the model expands as a tree.
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    pub fn is_cut(&self) -> bool {
        self.flags.contains(NodeFlags::CUT)
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }
}

/// Half-open range of flat positions sharing one parent directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRange {
    pub start: usize,
    pub end: usize,
}

impl SectionRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, position: usize) -> bool {
        (self.start..self.end).contains(&position)
    }
}
