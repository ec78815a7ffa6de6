//! Entry enum for slab slots.

/// Internal entry representation for slab slots.
///
/// Both variants carry the slot generation. It is bumped every time an
/// occupied slot is vacated, so handles issued for the old value stop
/// resolving.
#[derive(Debug, Clone)]
pub enum Entry<T> {
    /// Slot is free; stores the index of the next free slot in the freelist.
    Vacant { next: usize, generation: u32 },
    /// Slot is occupied by a value.
    Occupied { generation: u32, value: T },
}
