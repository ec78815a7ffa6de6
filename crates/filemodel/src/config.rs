//! View model configuration.
//!
//! Hosts usually keep these in their preference store and deserialize them
//! before building a model with [`ViewModel::from_config`].
//!
//! [`ViewModel::from_config`]: crate::model::ViewModel::from_config

use serde::{Deserialize, Serialize};

use crate::sort::SortKey;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewModelConfig {
    /// Whether directory rows can be expanded in place.
    pub expand_as_tree: bool,
    /// Initial sort rule; `None` keeps insertion order.
    pub sort: Option<SortConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    pub key: SortKey,
    pub reversed: bool,
    pub directories_first: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::Name,
            reversed: false,
            directories_first: true,
        }
    }
}
