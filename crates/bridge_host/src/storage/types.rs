//! Sandboxed storage data types.

use serde::{Deserialize, Serialize};

/// Extension appended to sanitized names for the on-disk representation.
pub const STORAGE_FILE_EXTENSION: &str = "json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Error tags reported inside storage command results.
pub enum StorageError {
    /// The name sanitizes to nothing or to more than nine letters.
    InvalidName,
    /// No file exists for the sanitized name.
    NotFound,
    /// Writing the file failed.
    WriteFailed,
    /// Reading the file failed.
    ReadFailed,
    /// Removing an existing file failed.
    DeleteFailed,
}

impl StorageError {
    /// Returns the stable wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidName => "invalid_name",
            Self::NotFound => "not_found",
            Self::WriteFailed => "write_failed",
            Self::ReadFailed => "read_failed",
            Self::DeleteFailed => "delete_failed",
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Listing entry for one stored file.
pub struct StoredFileEntry {
    /// Sanitized name without the on-disk extension.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// Last-modified time in unix milliseconds (0 when unavailable).
    pub modified: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Content read back for a sanitized name.
pub struct StoredFile {
    /// Sanitized name.
    pub name: String,
    /// Raw stored content.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Outcome of a delete request that passed name validation.
pub struct DeleteOutcome {
    /// Sanitized name.
    pub name: String,
    /// Whether a file existed and was removed.
    pub removed: bool,
}
