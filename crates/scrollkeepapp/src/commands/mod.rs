//! # Command Layer
//!
//! User-facing operations over a [`Librarian`](crate::librarian::Librarian). Each command
//! lives in its own submodule as plain functions returning a [`CmdResult`].
//!
//! ## What Commands Do
//!
//! - Validate their inputs against the current tree (missing paths, wrong kinds)
//! - Call into the librarian, which mutates, diffs and dispatches
//! - Translate the outcome, including per-action failures, into structured messages
//!
//! ## What Commands Do NOT Do
//!
//! - **Any terminal I/O**: no stdout, no colors, no prompts
//! - **Argument parsing**: user strings are parsed into [`TreePath`]s by the API facade
//! - **Exit codes**: return `Result`, let the caller decide
//!
//! ## Testing Strategy
//!
//! Command tests run against [`MemBackend`](crate::store::mem_backend::MemBackend) and
//! check both the vault contents and the returned messages.
//!
//! ## Command Modules
//!
//! - [`heal`]: full healing pass
//! - [`notes`]: add, remove and move notes
//! - [`status`]: mark done / reopen
//! - [`list`]: tree listing and snapshot export

use crate::dispatch::DispatchReport;
use crate::tree::{NodeKind, Status, TreePath};
use serde::Serialize;

pub mod heal;
pub mod helpers;
pub mod list;
pub mod notes;
pub mod status;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One row of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedNode {
    pub path: TreePath,
    pub locator: String,
    pub kind: NodeKind,
    /// Stored status for scrolls, aggregate for sections, `None` for files.
    pub status: Option<Status>,
    pub depth: usize,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_nodes: Vec<TreePath>,
    pub listed_nodes: Vec<ListedNode>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_nodes(mut self, nodes: Vec<TreePath>) -> Self {
        self.affected_nodes = nodes;
        self
    }

    pub fn with_listed_nodes(mut self, nodes: Vec<ListedNode>) -> Self {
        self.listed_nodes = nodes;
        self
    }

    /// Surfaces dispatch failures and circuit-breaker drops as messages.
    pub fn add_dispatch_report(&mut self, report: &DispatchReport) {
        for failure in &report.failures {
            self.add_message(CmdMessage::error(format!(
                "Could not {}: {}",
                failure.action, failure.error
            )));
        }
        if report.dropped > 0 {
            self.add_message(CmdMessage::warning(format!(
                "{} queued change(s) were dropped; run `heal` to catch up",
                report.dropped
            )));
        }
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}
