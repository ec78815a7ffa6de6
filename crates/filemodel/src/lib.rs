//! Toolkit-independent data model for file manager views.
//!
//! This crate provides the core of a directory view:
//! - An indexed, hierarchical, sorted and selectable collection of entries
//!   exposed to the display as flat rows
//! - A deduplicating FIFO work queue for pending per-file jobs
//! - Pluggable sort rules and serde-backed view configuration

pub mod config;
pub mod error;
pub mod model;
pub mod queue;
pub mod sort;
pub mod storage;
pub mod types;

// Re-export main types
pub use config::{SortConfig, ViewModelConfig};
pub use error::{ModelError, Result};
pub use model::{
    EventLog, ModelEvent, ModelObserver, NodeFlags, Row, SectionRange, SubscriptionId, ViewModel,
};
pub use queue::WorkQueue;
pub use sort::{FileSorter, SortKey, Sorter};
pub use storage::{Bitset, NodeId};
pub use types::{FileEntry, FileType, ModelEntry};
