use super::StoreEvent;
use crate::error::Result;
use crate::path::VaultPath;

/// Abstract interface for raw vault I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while the librarian handles the "what" (healing, reconciliation, codexes).
pub trait VaultBackend {
    // --- Discovery ---

    /// Every non-folder entry under `folder`, recursively. Empty when the folder is missing.
    fn list_leaves(&self, folder: &VaultPath) -> Result<Vec<VaultPath>>;

    fn exists(&self, path: &VaultPath) -> bool;

    fn is_folder(&self, path: &VaultPath) -> bool;

    // --- Content ---

    /// Read a document.
    /// Returns Ok(None) if the file does not exist.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read_content(&self, path: &VaultPath) -> Result<Option<String>>;

    /// Write content, creating the file if needed. The parent folder must exist.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_file(&self, path: &VaultPath, content: &str) -> Result<()>;

    // --- Structure ---

    /// Create one folder. The parent must exist.
    fn create_folder(&self, path: &VaultPath) -> Result<()>;

    /// Move a file or folder. Fails when `to` is taken by a different entry.
    fn rename(&self, from: &VaultPath, to: &VaultPath) -> Result<()>;

    /// Move a file or folder out of the vault's visible tree.
    fn trash(&self, path: &VaultPath) -> Result<()>;

    // --- Notifications ---

    /// Change notifications recorded since the last call. Backends whose events arrive
    /// from elsewhere (a file watcher) return nothing here.
    fn drain_events(&self) -> Vec<StoreEvent> {
        Vec::new()
    }
}
