//! Entry types shown by the view model.
//!
//! The model is generic over anything implementing [`ModelEntry`]; entries
//! are owned by whoever enumerates the filesystem and the model only keeps
//! cheap clones plus their keys. [`FileEntry`] is the stock implementation.

use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

/// Something the view model can index and display.
pub trait ModelEntry: Clone {
    /// Stable identity of the underlying filesystem object.
    type Key: Clone + Eq + Hash + fmt::Debug;

    fn key(&self) -> Self::Key;

    /// Identity of the containing directory, `None` for roots.
    fn parent_key(&self) -> Option<Self::Key>;

    fn is_directory(&self) -> bool;
}

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
    Symlink,
    Other,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }
}

impl From<std::fs::FileType> for FileType {
    fn from(file_type: std::fs::FileType) -> Self {
        if file_type.is_file() {
            FileType::File
        } else if file_type.is_dir() {
            FileType::Directory
        } else if file_type.is_symlink() {
            FileType::Symlink
        } else {
            FileType::Other
        }
    }
}

/// A filesystem object as known to the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
    /// Size in bytes; `None` for directories or when unknown.
    pub size: Option<u64>,
    /// Modification time as Unix timestamp (seconds).
    pub modified_at: Option<u64>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, file_type: FileType) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            path,
            name,
            file_type,
            size: None,
            modified_at: None,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileType::File)
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::new(path, FileType::Directory)
    }

    /// Builds an entry from metadata the enumerator already fetched.
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: &std::fs::Metadata) -> Self {
        let file_type = FileType::from(metadata.file_type());
        let modified_at = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());
        let mut entry = Self::new(path, file_type);
        entry.size = (file_type != FileType::Directory).then(|| metadata.len());
        entry.modified_at = modified_at;
        entry
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_modified_at(mut self, modified_at: u64) -> Self {
        self.modified_at = Some(modified_at);
        self
    }

    /// Extracts the file extension from the name, if any.
    ///
    /// Dotfiles such as `.bashrc` have no extension.
    #[inline]
    pub fn extension(&self) -> Option<&str> {
        let dot_pos = self.name.rfind('.')?;
        if dot_pos + 1 >= self.name.len() || dot_pos == 0 {
            return None;
        }
        Some(&self.name[dot_pos + 1..])
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

impl ModelEntry for FileEntry {
    type Key = PathBuf;

    fn key(&self) -> PathBuf {
        self.path.clone()
    }

    fn parent_key(&self) -> Option<PathBuf> {
        self.path.parent().map(Path::to_path_buf)
    }

    fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }
}
