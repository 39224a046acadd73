//! # Scrollkeep Architecture
//!
//! Scrollkeep keeps a folder tree of plain-text notes consistent with itself. Every
//! leaf encodes its position twice: once by the folder it sits in, and once in its own
//! basename, as a suffix listing its ancestors nearest-first:
//!
//! ```text
//! Library/
//!   __-Library.md              root codex
//!   Projects/
//!     __-Projects.md           codex of Projects
//!     Roadmap-Projects.md      scroll "Roadmap"
//!     Q3/
//!       __-Q3-Projects.md
//!       Budget-Q3-Projects.md
//!       chart-Q3-Projects.png  file "chart"
//! ```
//!
//! Users edit either encoding with whatever tools they like. Scrollkeep notices the
//! divergence, decides which side is authoritative, and heals the other one, while
//! keeping a generated index document (a codex) in every folder.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (crates/scrollkeep)                                    │
//! │  - clap parsing, terminal rendering, file watching          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs) + Commands (commands/*.rs)                    │
//! │  - user paths → TreePaths, validation, CmdResult messages   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Librarian (librarian.rs)                                   │
//! │  - owns tree, layout, dispatcher; runs the event loop       │
//! └─────────────────────────────────────────────────────────────┘
//!          │                   │                     │
//!          ▼                   ▼                     ▼
//!   codec/ names/ canon   tree/ diff/ codex/    dispatch/
//!   (decide where things  reconcile (model and  (collapse, order,
//!    belong)              reconciliation)        write, suppress)
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - VaultBackend trait; FsBackend, MemBackend                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing from `api.rs` inward writes to stdout or assumes a terminal.
//!
//! ## Module Overview
//!
//! - [`names`]: node-name sanitizer
//! - [`codec`]: basename suffix codec, basename shapes, node locators
//! - [`path`]: vault paths and the library layout
//! - [`canon`]: path canonicalizer (where a leaf belongs)
//! - [`tree`]: the in-memory library tree and its snapshots
//! - [`diff`]: snapshot differ
//! - [`codex`]: codex generation and checkbox parsing
//! - [`frontmatter`]: scroll status in YAML front matter
//! - [`actions`]: vault actions
//! - [`reconcile`]: tree/store reconciliation and diff-to-action mapping
//! - [`dispatch`]: action queue, collapser and self-event tracker
//! - [`store`]: storage abstraction and implementations
//! - [`librarian`]: composition root and event loop
//! - [`commands`], [`api`]: user-facing operations
//! - [`config`], [`init`]: configuration and vault discovery
//! - [`error`]: error types

pub mod actions;
pub mod api;
pub mod canon;
pub mod codec;
pub mod codex;
pub mod commands;
pub mod config;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod frontmatter;
pub mod init;
pub mod librarian;
pub mod names;
pub mod path;
pub mod reconcile;
pub mod store;
pub mod tree;

#[cfg(test)]
mod test_utils;
