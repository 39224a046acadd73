//! # CLI Behavior
//!
//! This is **one possible UI client** for scrollkeep, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output
//! formatting.
//!
//! ## Heal on Startup
//!
//! Every invocation opens the vault and runs a full healing pass before doing what
//! was asked, so commands always operate on a canonical library. Only `heal` reports
//! the pass in full; other commands surface its renames, warnings and errors.
//!
//! ### Naked Execution (`scrollkeep`)
//!
//! Running `scrollkeep` with no subcommand prints the tree, like `scrollkeep tree`.
//!
//! ### Watching (`scrollkeep watch`)
//!
//! Stays in the foreground, feeding filesystem changes to the librarian until
//! interrupted. Changes made by scrollkeep itself are recognized and ignored.
//!
//! ## Module Structure
//!
//! - `commands`: per-command handlers that call the API and print results
//! - `render`: output formatting (messages, tree)
//! - `setup`: argument parsing via clap
//! - `styles`: terminal styling constants
//! - `watch`: filesystem watcher

mod commands;
mod render;
pub mod setup;
mod styles;
mod watch;

pub use commands::run;
