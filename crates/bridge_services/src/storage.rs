//! Sandboxed key/value file store addressed by sanitized names.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bridge_host::{
    sanitize_storage_name, system_time_to_unix_ms, DeleteOutcome, StorageError, StoredFile,
    StoredFileEntry, STORAGE_FILE_EXTENSION,
};
use tracing::warn;

fn name_from_file(path: &Path) -> Option<String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(STORAGE_FILE_EXTENSION) {
        return None;
    }
    Some(path.file_stem()?.to_string_lossy().to_string())
}

fn entry_for(path: &Path) -> Option<StoredFileEntry> {
    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }
    Some(StoredFileEntry {
        name: name_from_file(path)?,
        size: metadata.len(),
        modified: metadata
            .modified()
            .map(system_time_to_unix_ms)
            .unwrap_or_default(),
    })
}

#[derive(Debug, Clone)]
/// File store confined to one private directory.
///
/// Each sanitized name maps to exactly one `<name>.json` file directly under the root; later
/// saves overwrite earlier ones.
pub struct ScopedFileStore {
    root: PathBuf,
}

impl ScopedFileStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, String> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .map_err(|err| format!("failed to create storage dir {}: {err}", root.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn file_for(&self, safe: &str) -> PathBuf {
        self.root.join(format!("{safe}.{STORAGE_FILE_EXTENSION}"))
    }

    /// Writes or overwrites the file for `name` and returns the sanitized name.
    pub fn save(&self, name: &str, content: &str) -> Result<String, StorageError> {
        let safe = sanitize_storage_name(name)?;
        let path = self.file_for(&safe);
        fs::write(&path, content).map_err(|err| {
            warn!(path = %path.display(), error = %err, "storage write failed");
            StorageError::WriteFailed
        })?;
        Ok(safe)
    }

    /// Reads the content stored for `name`.
    pub fn read(&self, name: &str) -> Result<StoredFile, StorageError> {
        let safe = sanitize_storage_name(name)?;
        let path = self.file_for(&safe);
        match fs::read(&path) {
            Ok(bytes) => Ok(StoredFile {
                name: safe,
                content: String::from_utf8_lossy(&bytes).into_owned(),
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "storage read failed");
                Err(StorageError::ReadFailed)
            }
        }
    }

    /// Removes the file for `name`; `removed` is `false` when nothing was stored.
    pub fn delete(&self, name: &str) -> Result<DeleteOutcome, StorageError> {
        let safe = sanitize_storage_name(name)?;
        let path = self.file_for(&safe);
        let removed = match fs::remove_file(&path) {
            Ok(()) => true,
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "storage delete failed");
                return Err(StorageError::DeleteFailed);
            }
        };
        Ok(DeleteOutcome {
            name: safe,
            removed,
        })
    }

    /// Lists stored files sorted by name; enumeration errors yield an empty list.
    pub fn list(&self) -> Vec<StoredFileEntry> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(root = %self.root.display(), error = %err, "storage listing failed");
                return Vec::new();
            }
        };
        let mut files: Vec<StoredFileEntry> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry_for(&entry.path()))
            .collect();
        files.sort_by(|left, right| left.name.cmp(&right.name));
        files
    }
}
