use super::backend::VaultBackend;
use crate::error::{LibraryError, Result};
use crate::path::VaultPath;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Folder (under the vault root) that receives trashed entries.
pub const TRASH_DIR: &str = ".trash";

/// A vault on the local filesystem.
///
/// Entries whose name starts with a dot are invisible to [`VaultBackend::list_leaves`],
/// which keeps the trash, config and editor swap files out of the library.
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn abs(&self, path: &VaultPath) -> PathBuf {
        let mut abs = self.root.clone();
        for part in path.parts() {
            abs.push(part);
        }
        abs
    }

    /// Maps an absolute path back into the vault. `None` for paths outside it.
    pub fn relative(&self, abs: &Path) -> Option<VaultPath> {
        let rel = abs.strip_prefix(&self.root).ok()?;
        let parts = rel
            .components()
            .map(|c| c.as_os_str().to_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        Some(VaultPath::new(parts))
    }

    fn walk(&self, dir: &Path, out: &mut Vec<VaultPath>) -> Result<()> {
        for entry in fs::read_dir(dir).map_err(LibraryError::Io)? {
            let entry = entry.map_err(LibraryError::Io)?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                self.walk(&path, out)?;
            } else if let Some(rel) = self.relative(&path) {
                out.push(rel);
            }
        }
        Ok(())
    }
}

impl VaultBackend for FsBackend {
    fn list_leaves(&self, folder: &VaultPath) -> Result<Vec<VaultPath>> {
        let dir = self.abs(folder);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        self.walk(&dir, &mut out)?;
        out.sort();
        Ok(out)
    }

    fn exists(&self, path: &VaultPath) -> bool {
        self.abs(path).exists()
    }

    fn is_folder(&self, path: &VaultPath) -> bool {
        self.abs(path).is_dir()
    }

    fn read_content(&self, path: &VaultPath) -> Result<Option<String>> {
        let abs = self.abs(path);
        if !abs.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(abs).map_err(LibraryError::Io)?;
        Ok(Some(content))
    }

    fn write_file(&self, path: &VaultPath, content: &str) -> Result<()> {
        let target = self.abs(path);
        let dir = target
            .parent()
            .ok_or_else(|| LibraryError::Store(format!("No parent folder for {}", path)))?;

        // Atomic Write
        let tmp_path = dir.join(format!(".scroll-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(LibraryError::Io)?;
        fs::rename(&tmp_path, &target).map_err(LibraryError::Io)?;
        Ok(())
    }

    fn create_folder(&self, path: &VaultPath) -> Result<()> {
        let abs = self.abs(path);
        if abs.is_dir() {
            return Ok(());
        }
        fs::create_dir(abs).map_err(LibraryError::Io)
    }

    fn rename(&self, from: &VaultPath, to: &VaultPath) -> Result<()> {
        let src = self.abs(from);
        let dst = self.abs(to);
        // A case-only rename on a case-insensitive filesystem sees its own target.
        if dst.exists() && !from.eq_ignore_case(to) {
            return Err(LibraryError::Store(format!("{} already exists", to)));
        }
        fs::rename(src, dst).map_err(LibraryError::Io)
    }

    fn trash(&self, path: &VaultPath) -> Result<()> {
        let src = self.abs(path);
        if !src.exists() {
            return Err(LibraryError::NotFound(path.to_string()));
        }
        let trash_dir = self.root.join(TRASH_DIR);
        fs::create_dir_all(&trash_dir).map_err(LibraryError::Io)?;
        let name = path.basename().unwrap_or("entry");
        let dst = trash_dir.join(format!("{}-{}", Uuid::new_v4(), name));
        fs::rename(src, dst).map_err(LibraryError::Io)
    }
}
