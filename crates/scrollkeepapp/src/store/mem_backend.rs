use super::backend::VaultBackend;
use super::StoreEvent;
use crate::error::{LibraryError, Result};
use crate::path::VaultPath;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// In-memory vault for testing.
///
/// Uses `RefCell` for interior mutability since scrollkeep is single-threaded.
/// Every mutation, whether issued by the library or by a test playing the user,
/// is appended to an event log that [`VaultBackend::drain_events`] hands out, the
/// same way a host would notify about changes.
#[derive(Default)]
pub struct MemBackend {
    folders: RefCell<BTreeSet<VaultPath>>,
    files: RefCell<BTreeMap<VaultPath, String>>,
    trashed: RefCell<Vec<VaultPath>>,
    events: RefCell<Vec<StoreEvent>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Test helper: place a file, creating its folders, without recording events.
    pub fn seed(&self, path: &str, content: &str) {
        let path = VaultPath::parse(path);
        let mut folder = path.parent();
        while let Some(f) = folder {
            if f.is_empty() {
                break;
            }
            self.folders.borrow_mut().insert(f.clone());
            folder = f.parent();
        }
        self.files.borrow_mut().insert(path, content.to_string());
    }

    /// Test helper: create a folder chain without recording events.
    pub fn seed_folder(&self, path: &str) {
        let mut folder = Some(VaultPath::parse(path));
        while let Some(f) = folder {
            if f.is_empty() {
                break;
            }
            self.folders.borrow_mut().insert(f.clone());
            folder = f.parent();
        }
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.borrow().get(&VaultPath::parse(path)).cloned()
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.files.borrow().contains_key(&VaultPath::parse(path))
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.folders.borrow().contains(&VaultPath::parse(path))
    }

    /// All file paths, sorted.
    pub fn file_paths(&self) -> Vec<String> {
        self.files.borrow().keys().map(ToString::to_string).collect()
    }

    pub fn trashed(&self) -> Vec<VaultPath> {
        self.trashed.borrow().clone()
    }

    /// Events recorded so far, without draining them.
    pub fn pending_events(&self) -> Vec<StoreEvent> {
        self.events.borrow().clone()
    }

    fn check_writable(&self) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(LibraryError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }

    fn parent_exists(&self, path: &VaultPath) -> bool {
        match path.parent() {
            Some(parent) if !parent.is_empty() => self.folders.borrow().contains(&parent),
            _ => true,
        }
    }

    fn record(&self, event: StoreEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl VaultBackend for MemBackend {
    fn list_leaves(&self, folder: &VaultPath) -> Result<Vec<VaultPath>> {
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|p| p.starts_with(folder) && *p != folder)
            .cloned()
            .collect())
    }

    fn exists(&self, path: &VaultPath) -> bool {
        self.files.borrow().contains_key(path) || self.folders.borrow().contains(path)
    }

    fn is_folder(&self, path: &VaultPath) -> bool {
        self.folders.borrow().contains(path)
    }

    fn read_content(&self, path: &VaultPath) -> Result<Option<String>> {
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_file(&self, path: &VaultPath, content: &str) -> Result<()> {
        self.check_writable()?;
        if !self.parent_exists(path) {
            return Err(LibraryError::Store(format!("No parent folder for {}", path)));
        }
        if self.folders.borrow().contains(path) {
            return Err(LibraryError::Store(format!("{} is a folder", path)));
        }
        let existed = self
            .files
            .borrow_mut()
            .insert(path.clone(), content.to_string())
            .is_some();
        self.record(if existed {
            StoreEvent::Modified(path.clone())
        } else {
            StoreEvent::Created(path.clone())
        });
        Ok(())
    }

    fn create_folder(&self, path: &VaultPath) -> Result<()> {
        self.check_writable()?;
        if !self.parent_exists(path) {
            return Err(LibraryError::Store(format!("No parent folder for {}", path)));
        }
        if self.files.borrow().contains_key(path) {
            return Err(LibraryError::Store(format!("{} is a file", path)));
        }
        if self.folders.borrow_mut().insert(path.clone()) {
            self.record(StoreEvent::Created(path.clone()));
        }
        Ok(())
    }

    fn rename(&self, from: &VaultPath, to: &VaultPath) -> Result<()> {
        self.check_writable()?;
        if !self.exists(from) {
            return Err(LibraryError::NotFound(from.to_string()));
        }
        if self.exists(to) {
            return Err(LibraryError::Store(format!("{} already exists", to)));
        }
        if !self.parent_exists(to) {
            return Err(LibraryError::Store(format!("No parent folder for {}", to)));
        }

        let moved_file = self.files.borrow_mut().remove(from);
        if let Some(content) = moved_file {
            self.files.borrow_mut().insert(to.clone(), content);
        } else {
            let moved_folders: Vec<VaultPath> = self
                .folders
                .borrow()
                .iter()
                .filter(|p| p.starts_with(from))
                .cloned()
                .collect();
            let mut folders = self.folders.borrow_mut();
            for old in moved_folders {
                folders.remove(&old);
                if let Some(new) = old.rebase(from, to) {
                    folders.insert(new);
                }
            }
            drop(folders);

            let moved_files: Vec<VaultPath> = self
                .files
                .borrow()
                .keys()
                .filter(|p| p.starts_with(from))
                .cloned()
                .collect();
            let mut files = self.files.borrow_mut();
            for old in moved_files {
                if let (Some(content), Some(new)) = (files.remove(&old), old.rebase(from, to)) {
                    files.insert(new, content);
                }
            }
        }
        self.record(StoreEvent::Renamed {
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }

    fn trash(&self, path: &VaultPath) -> Result<()> {
        self.check_writable()?;
        if !self.exists(path) {
            return Err(LibraryError::NotFound(path.to_string()));
        }
        self.files.borrow_mut().retain(|p, _| !p.starts_with(path));
        self.folders.borrow_mut().retain(|p| !p.starts_with(path));
        self.trashed.borrow_mut().push(path.clone());
        self.record(StoreEvent::Deleted(path.clone()));
        Ok(())
    }

    fn drain_events(&self) -> Vec<StoreEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> VaultPath {
        VaultPath::parse(raw)
    }

    #[test]
    fn write_requires_parent_folder() {
        let mem = MemBackend::new();
        assert!(mem.write_file(&p("Library/A/x.md"), "").is_err());
        mem.seed_folder("Library/A");
        mem.write_file(&p("Library/A/x.md"), "hi").unwrap();
        assert_eq!(mem.file("Library/A/x.md").unwrap(), "hi");
    }

    #[test]
    fn mutations_are_recorded_as_events() {
        let mem = MemBackend::new();
        mem.seed_folder("Library");
        mem.write_file(&p("Library/x.md"), "1").unwrap();
        mem.write_file(&p("Library/x.md"), "2").unwrap();
        mem.rename(&p("Library/x.md"), &p("Library/y.md")).unwrap();
        mem.trash(&p("Library/y.md")).unwrap();

        assert_eq!(
            mem.drain_events(),
            vec![
                StoreEvent::Created(p("Library/x.md")),
                StoreEvent::Modified(p("Library/x.md")),
                StoreEvent::Renamed {
                    from: p("Library/x.md"),
                    to: p("Library/y.md")
                },
                StoreEvent::Deleted(p("Library/y.md")),
            ]
        );
        assert!(mem.drain_events().is_empty());
    }

    #[test]
    fn folder_rename_moves_contents() {
        let mem = MemBackend::new();
        mem.seed("Library/A/B/Note-B-A.md", "x");
        mem.rename(&p("Library/A"), &p("Library/X")).unwrap();

        assert!(mem.has_file("Library/X/B/Note-B-A.md"));
        assert!(mem.has_folder("Library/X/B"));
        assert!(!mem.has_folder("Library/A"));
    }

    #[test]
    fn rename_onto_existing_fails() {
        let mem = MemBackend::new();
        mem.seed("Library/a.md", "");
        mem.seed("Library/b.md", "");
        assert!(mem.rename(&p("Library/a.md"), &p("Library/b.md")).is_err());
    }

    #[test]
    fn simulated_write_error() {
        let mem = MemBackend::new();
        mem.seed_folder("Library");
        mem.set_simulate_write_error(true);
        assert!(mem.write_file(&p("Library/x.md"), "").is_err());
    }

    #[test]
    fn list_leaves_is_recursive_and_scoped() {
        let mem = MemBackend::new();
        mem.seed("Library/A/one.md", "");
        mem.seed("Library/A/B/two.md", "");
        mem.seed("Library/C/three.md", "");
        let leaves = mem.list_leaves(&p("Library/A")).unwrap();
        assert_eq!(leaves.len(), 2);
    }
}
