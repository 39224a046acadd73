//! # API Facade
//!
//! A thin layer over the command modules and the [`Librarian`]. Every UI talks to
//! scrollkeep through [`ScrollkeepApi`].
//!
//! ## Role and Responsibilities
//!
//! - **Normalizes inputs**: user-typed paths like `"Projects/Q3 plan"` are parsed into
//!   [`TreePath`]s, each segment sanitized the way folder names are (`Q3_plan`)
//! - **Dispatches** to the matching command function
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs` and the librarian
//! - **Presentation**: no strings meant for a terminal beyond command messages
//!
//! ## Generic Over VaultBackend
//!
//! `ScrollkeepApi<B: VaultBackend>` runs against the filesystem in production
//! (`ScrollkeepApi<FsBackend>`) and in memory in tests (`ScrollkeepApi<MemBackend>`).

use crate::commands::{self, CmdResult};
use crate::error::{LibraryError, Result};
use crate::librarian::Librarian;
use crate::store::backend::VaultBackend;
use crate::store::StoreEvent;
use crate::tree::TreePath;

pub struct ScrollkeepApi<B: VaultBackend> {
    librarian: Librarian<B>,
}

impl<B: VaultBackend> ScrollkeepApi<B> {
    pub fn new(librarian: Librarian<B>) -> Self {
        Self { librarian }
    }

    pub fn librarian(&self) -> &Librarian<B> {
        &self.librarian
    }

    pub fn heal(&mut self) -> Result<CmdResult> {
        commands::heal::run(&mut self.librarian)
    }

    pub fn add_notes<I: AsRef<str>>(&mut self, paths: &[I]) -> Result<CmdResult> {
        let paths = parse_paths(paths)?;
        commands::notes::add(&mut self.librarian, &paths)
    }

    pub fn remove_notes<I: AsRef<str>>(&mut self, paths: &[I]) -> Result<CmdResult> {
        let paths = parse_paths(paths)?;
        commands::notes::remove(&mut self.librarian, &paths)
    }

    pub fn move_note(&mut self, from: &str, to: &str) -> Result<CmdResult> {
        let from = parse_path(from)?;
        let to = parse_path(to)?;
        commands::notes::move_node(&mut self.librarian, &from, &to)
    }

    pub fn complete<I: AsRef<str>>(&mut self, paths: &[I]) -> Result<CmdResult> {
        let paths = parse_paths(paths)?;
        commands::status::complete(&mut self.librarian, &paths)
    }

    pub fn reopen<I: AsRef<str>>(&mut self, paths: &[I]) -> Result<CmdResult> {
        let paths = parse_paths(paths)?;
        commands::status::reopen(&mut self.librarian, &paths)
    }

    pub fn list(&self, under: Option<&str>) -> Result<CmdResult> {
        let under = under.map(parse_path).transpose()?;
        commands::list::run(&self.librarian, under.as_ref())
    }

    pub fn snapshot_json(&self) -> Result<String> {
        commands::list::snapshot_json(&self.librarian)
    }

    /// Feeds externally observed changes (a file watcher) through the event loop.
    pub fn apply_events(&mut self, events: impl IntoIterator<Item = StoreEvent>) -> CmdResult {
        for event in events {
            self.librarian.push_event(event);
        }
        let report = self.librarian.settle();
        let mut result = CmdResult::default();
        result.add_dispatch_report(&report);
        for action in &report.applied {
            result.add_message(commands::CmdMessage::info(action.to_string()));
        }
        result
    }
}

fn parse_path(input: &str) -> Result<TreePath> {
    TreePath::parse(input)
        .map_err(|e| LibraryError::Api(format!("Invalid path '{}': {}", input, e)))
}

fn parse_paths<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<TreePath>> {
    if inputs.is_empty() {
        return Err(LibraryError::Api("No paths given".to_string()));
    }
    inputs.iter().map(|i| parse_path(i.as_ref())).collect()
}
