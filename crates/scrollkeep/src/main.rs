//! # scrollkeep
//!
//! Command-line client for a scrollkeep vault: a `Library/` folder tree of notes whose
//! basenames carry their own ancestry, indexed by a generated codex in every folder.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  main.rs        logging setup, exit codes                    │
//! │  cli/setup.rs   clap definitions                             │
//! │  cli/commands   one handler per subcommand                   │
//! │  cli/render.rs  terminal output                              │
//! │  cli/watch.rs   notify events → store events                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!              scrollkeepapp::api::ScrollkeepApi<FsBackend>
//! ```
//!
//! Everything behind `ScrollkeepApi` is UI agnostic. This crate owns argument
//! parsing, vault initialization, rendering and the process exit code.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing-subscriber`. The filter comes from
//! `SCROLLKEEP_LOG` (same syntax as `RUST_LOG`), defaulting to `warn`, or `debug`
//! with `-v`.
//!
//! ## Testing Approach
//!
//! - **Library (`crates/scrollkeepapp`)**: unit tests per module plus scenario tests
//!   against the in-memory backend.
//! - **CLI (`src/cli/`)**: rendering and watcher translation are unit tested; the
//!   binary is exercised end to end with `assert_cmd` in `tests/`.

mod cli;

use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("SCROLLKEEP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = cli::setup::parse_cli();
    init_tracing(args.verbose);
    if let Err(e) = cli::run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
