//! Shared fixtures for unit tests.

use crate::dispatch::{Dispatcher, SelfEventTracker};
use crate::librarian::Librarian;
use crate::path::layout;
use crate::store::mem_backend::MemBackend;
use std::time::Duration;

/// A librarian over `mem` with the default layout and a generous tracker TTL.
pub fn librarian(mem: MemBackend) -> Librarian<MemBackend> {
    let dispatcher = Dispatcher::new(SelfEventTracker::new(Duration::from_secs(60)), 16);
    Librarian::new(mem, layout(), dispatcher)
}
