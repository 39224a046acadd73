//! # Vault Discovery
//!
//! A vault is the directory that contains the library folder. Scrollkeep finds it the
//! way `git` finds a repository:
//!
//! 1. Start at `CWD`.
//! 2. Check: does this directory have a `.scrollkeep/` marker folder?
//! 3. **Match**: this is the vault.
//! 4. **No Match**: move to the parent directory.
//! 5. **Stop**: at `HOME` or the filesystem root, fall back to `CWD` itself.
//!
//! An explicit vault path (`--vault`) skips detection.
//!
//! ## Configuration
//!
//! `scrollkeep.toml` is searched in the global config directory, then in
//! `<vault>/.scrollkeep/`, merged with the vault file winning. A missing or unreadable
//! config falls back to defaults. `SCROLLKEEP_GLOBAL_CONFIG` overrides the global
//! directory, which keeps tests away from the user's real config.

use crate::api::ScrollkeepApi;
use crate::config::LibraryConfig;
use crate::error::Result;
use crate::librarian::Librarian;
use crate::store::fs_backend::FsBackend;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::{BaseDirs, ProjectDirs};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Marker folder identifying a vault; also holds the vault's config.
pub const VAULT_MARKER: &str = ".scrollkeep";

pub struct ScrollkeepContext {
    pub api: ScrollkeepApi<FsBackend>,
    pub vault: PathBuf,
    pub config: LibraryConfig,
}

/// Walks up from `cwd` to the nearest directory holding a [`VAULT_MARKER`] folder.
pub fn find_vault_root(cwd: &Path) -> Option<PathBuf> {
    let home_dir = BaseDirs::new().map(|bd| bd.home_dir().to_path_buf());
    let mut current = cwd.to_path_buf();

    loop {
        if current.join(VAULT_MARKER).is_dir() {
            return Some(current);
        }
        if home_dir.as_ref() == Some(&current) {
            return None;
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            _ => return None,
        }
    }
}

fn global_config_dir() -> Option<PathBuf> {
    std::env::var("SCROLLKEEP_GLOBAL_CONFIG")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            ProjectDirs::from("com", "scrollkeep", "scrollkeep")
                .map(|dirs| dirs.config_dir().to_path_buf())
        })
}

pub fn load_config(vault: &Path) -> LibraryConfig {
    let mut search_paths = Vec::new();
    if let Some(global) = global_config_dir() {
        search_paths.push(SearchPath::Path(global));
    }
    search_paths.push(SearchPath::Path(vault.join(VAULT_MARKER)));

    Clapfig::builder()
        .app_name("scrollkeep")
        .file_name("scrollkeep.toml")
        .search_paths(search_paths)
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default()
}

/// Resolves the vault, loads its config and builds the API over the filesystem.
///
/// The tree starts empty; callers run a healing pass before anything else.
pub fn initialize(cwd: &Path, vault_override: Option<PathBuf>) -> Result<ScrollkeepContext> {
    let vault = vault_override
        .or_else(|| find_vault_root(cwd))
        .unwrap_or_else(|| cwd.to_path_buf());
    let config = load_config(&vault);
    debug!(vault = %vault.display(), library = %config.library_root, "Opening vault");

    let librarian = Librarian::from_config(FsBackend::new(&vault), &config)?;
    Ok(ScrollkeepContext {
        api: ScrollkeepApi::new(librarian),
        vault,
        config,
    })
}
