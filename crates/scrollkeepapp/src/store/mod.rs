//! # Storage Layer
//!
//! The vault is owned by someone else: a host application, a sync client, a user in a
//! file manager. Scrollkeep only sees it through [`backend::VaultBackend`], a handful
//! of primitive operations plus a stream of change notifications.
//!
//! ## Contract
//!
//! - Writes are atomic: readers see the old or the new content, never a mix.
//! - Creating something that already exists is not an error for the library; the
//!   dispatcher checks before it writes.
//! - Trashing moves content aside rather than deleting it.
//! - Every mutation, whoever made it, shows up as a [`StoreEvent`]. The library tells its
//!   own writes apart with the self-event tracker.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: a directory on disk.
//! - [`mem_backend::MemBackend`]: in memory, recording its own event stream, for tests.

use crate::path::VaultPath;
use std::fmt;

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

/// A change the store reports, with post-event paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Created(VaultPath),
    Modified(VaultPath),
    Renamed { from: VaultPath, to: VaultPath },
    Deleted(VaultPath),
}

impl StoreEvent {
    pub fn paths(&self) -> Vec<&VaultPath> {
        match self {
            StoreEvent::Created(p) | StoreEvent::Modified(p) | StoreEvent::Deleted(p) => vec![p],
            StoreEvent::Renamed { from, to } => vec![from, to],
        }
    }
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreEvent::Created(p) => write!(f, "created {}", p),
            StoreEvent::Modified(p) => write!(f, "modified {}", p),
            StoreEvent::Renamed { from, to } => write!(f, "renamed {} -> {}", from, to),
            StoreEvent::Deleted(p) => write!(f, "deleted {}", p),
        }
    }
}
