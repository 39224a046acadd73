//! # Configuration
//!
//! Scrollkeep configuration is managed by [`clapfig`], which handles layered loading
//! from TOML files, environment variables, and programmatic overrides.
//!
//! ## Storage Hierarchy
//!
//! Configuration is resolved in priority order:
//! 1. **Environment variables**: `SCROLLKEEP__LIBRARY_ROOT`, `SCROLLKEEP__MAX_BATCHES`, etc.
//! 2. **Vault Config**: `<vault>/.scrollkeep/scrollkeep.toml`.
//! 3. **Global Config**: OS-appropriate config directory (via `directories` crate).
//! 4. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `library_root` | `Library` | Library folder inside the vault, also the root codex suffix |
//! | `scroll_ext` | `md` | Extension of scrolls and codexes |
//! | `untracked_folder` | `_untracked` | Quarantine folder for undecodable leaves |
//! | `self_event_ttl_ms` | `5000` | How long a self-issued write suppresses its store event |
//! | `max_batches` | `16` | Dispatcher batches per settle cycle before the queue is halved |

use confique::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for scrollkeep, stored in `scrollkeep.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Name of the library folder inside the vault
    #[config(default = "Library")]
    pub library_root: String,

    /// Extension for scrolls and codexes, without the dot
    #[config(default = "md")]
    pub scroll_ext: String,

    /// Quarantine folder under the library root
    #[config(default = "_untracked")]
    pub untracked_folder: String,

    /// Lifetime of a self-event registration, in milliseconds
    #[config(default = 5000)]
    pub self_event_ttl_ms: u64,

    /// Dispatcher circuit-breaker ceiling
    #[config(default = 16)]
    pub max_batches: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_root: "Library".to_string(),
            scroll_ext: "md".to_string(),
            untracked_folder: "_untracked".to_string(),
            self_event_ttl_ms: 5000,
            max_batches: 16,
        }
    }
}

impl LibraryConfig {
    pub fn self_event_ttl(&self) -> Duration {
        Duration::from_millis(self.self_event_ttl_ms)
    }

    /// Extension normalized to not start with a dot.
    pub fn scroll_ext(&self) -> &str {
        self.scroll_ext.trim_start_matches('.')
    }
}
