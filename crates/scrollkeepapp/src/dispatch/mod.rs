//! # Action Dispatcher
//!
//! Serializes vault writes. Callers enqueue [`VaultAction`]s; [`Dispatcher::drain`] runs
//! them in batches until the queue is empty.
//!
//! ## Batch Pipeline
//!
//! 1. Take the whole queue as one batch.
//! 2. Collapse redundant actions ([`collapse::collapse`]). A write only folds into a
//!    following rename when its target is not in the store yet.
//! 3. Add prerequisites: a folder create for every missing ancestor, and an empty file
//!    for every content update whose target does not exist yet. Callers never sequence
//!    folder creation themselves.
//! 4. Sort by weight ([`collapse::sort`]).
//! 5. Register every touched path with the [`SelfEventTracker`], before the first write.
//!    Registration runs after steps 2-4 so it covers the inserted folder creates and
//!    empty files too; nothing has touched the store yet at that point.
//! 6. Execute in order. A failing action is recorded in the [`DispatchReport`] and the
//!    batch moves on; the next reconciliation re-derives whatever is still missing.
//!
//! An action that turns out to change nothing (the folder exists, the content is
//! identical, the target is already gone) is skipped and its tracker registration is
//! released, since the store will never report it.
//!
//! ## Idle and Executing
//!
//! `drain` takes `&mut self`, so while a batch executes nothing else can enqueue into
//! this dispatcher: the borrow is the Executing state. Work produced in reaction to a
//! batch arrives through [`Dispatcher::enqueue`] after `drain` returns and runs in the
//! next batch, preserving arrival order at batch boundaries.
//!
//! ## Circuit Breaker
//!
//! Batches are counted per settle cycle ([`Dispatcher::begin_cycle`]). Past
//! `max_batches`, the oldest half of the queue is dropped with a warning and the cycle
//! is marked tripped, so a write/notify feedback loop cannot run forever.

pub mod collapse;
pub mod tracker;

use crate::actions::VaultAction;
use crate::error::Result;
use crate::path::VaultPath;
use crate::store::backend::VaultBackend;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};
pub use tracker::SelfEventTracker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    pub action: VaultAction,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Actions that changed the vault, in execution order.
    pub applied: Vec<VaultAction>,
    /// Actions skipped because the vault already matched.
    pub unchanged: usize,
    pub failures: Vec<ActionFailure>,
    pub batches: usize,
    /// Actions discarded by the circuit breaker.
    pub dropped: usize,
}

impl DispatchReport {
    pub fn merge(&mut self, other: DispatchReport) {
        self.applied.extend(other.applied);
        self.unchanged += other.unchanged;
        self.failures.extend(other.failures);
        self.batches += other.batches;
        self.dropped += other.dropped;
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.dropped == 0
    }
}

pub struct Dispatcher {
    queue: VecDeque<VaultAction>,
    tracker: SelfEventTracker,
    max_batches: usize,
    batches_this_cycle: usize,
    tripped: bool,
}

impl Dispatcher {
    pub fn new(tracker: SelfEventTracker, max_batches: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            tracker,
            max_batches: max_batches.max(1),
            batches_this_cycle: 0,
            tripped: false,
        }
    }

    pub fn tracker(&self) -> &SelfEventTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SelfEventTracker {
        &mut self.tracker
    }

    pub fn enqueue(&mut self, actions: impl IntoIterator<Item = VaultAction>) {
        self.queue.extend(actions);
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Resets the batch counter. Called once per settle cycle.
    pub fn begin_cycle(&mut self) {
        self.batches_this_cycle = 0;
        self.tripped = false;
        self.tracker.prune();
    }

    /// True once the circuit breaker fired in the current cycle.
    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    /// Enqueue and run to completion.
    pub fn dispatch<B: VaultBackend>(
        &mut self,
        backend: &B,
        actions: impl IntoIterator<Item = VaultAction>,
    ) -> DispatchReport {
        self.enqueue(actions);
        self.drain(backend)
    }

    /// Runs batches until the queue is empty or the circuit breaker fires.
    pub fn drain<B: VaultBackend>(&mut self, backend: &B) -> DispatchReport {
        let mut report = DispatchReport::default();
        while !self.queue.is_empty() {
            if self.batches_this_cycle >= self.max_batches {
                let drop = self.queue.len().div_ceil(2);
                self.queue.drain(..drop);
                report.dropped += drop;
                self.tripped = true;
                warn!(
                    dropped = drop,
                    remaining = self.queue.len(),
                    "Dispatcher exceeded {} batches; dropped oldest queued actions",
                    self.max_batches
                );
                break;
            }
            self.batches_this_cycle += 1;
            let batch = self.run_batch(backend);
            report.merge(batch);
        }
        report
    }

    fn run_batch<B: VaultBackend>(&mut self, backend: &B) -> DispatchReport {
        let taken: Vec<VaultAction> = self.queue.drain(..).collect();
        let collapsed = collapse::collapse(taken, |p| backend.exists(p));
        let mut batch = with_prerequisites(backend, collapsed);
        collapse::sort(&mut batch);

        for action in &batch {
            for path in action.paths() {
                self.tracker.register(path);
            }
        }

        let mut report = DispatchReport {
            batches: 1,
            ..Default::default()
        };
        for action in batch {
            match execute(backend, &action) {
                Ok(true) => {
                    debug!(action = %action, "Applied");
                    report.applied.push(action);
                }
                Ok(false) => {
                    self.release(&action);
                    report.unchanged += 1;
                }
                Err(e) => {
                    warn!(action = %action, error = %e, "Action failed");
                    self.release(&action);
                    report.failures.push(ActionFailure {
                        action,
                        error: e.to_string(),
                    });
                }
            }
        }
        if !report.applied.is_empty() || !report.failures.is_empty() {
            info!(
                applied = report.applied.len(),
                unchanged = report.unchanged,
                failed = report.failures.len(),
                "Batch executed"
            );
        }
        report
    }

    fn release(&mut self, action: &VaultAction) {
        for path in action.paths() {
            self.tracker.consume(path);
        }
    }
}

/// Runs one action. `Ok(false)` when the vault already matched.
fn execute<B: VaultBackend>(backend: &B, action: &VaultAction) -> Result<bool> {
    match action {
        VaultAction::CreateFolder(path) => {
            if backend.is_folder(path) {
                return Ok(false);
            }
            backend.create_folder(path)?;
        }
        VaultAction::RenameFolder { from, to } | VaultAction::RenameFile { from, to } => {
            if !backend.exists(from) && backend.exists(to) {
                return Ok(false);
            }
            backend.rename(from, to)?;
        }
        VaultAction::TrashFolder(path) | VaultAction::TrashFile(path) => {
            if !backend.exists(path) {
                return Ok(false);
            }
            backend.trash(path)?;
        }
        VaultAction::CreateOrUpdateFile { path, content } => {
            if backend.read_content(path)?.as_deref() == Some(content.as_str()) {
                return Ok(false);
            }
            backend.write_file(path, content)?;
        }
        VaultAction::ProcessFile { path, transform } => {
            let current = backend.read_content(path)?.unwrap_or_default();
            let updated = transform.apply(&current)?;
            if updated == current {
                return Ok(false);
            }
            backend.write_file(path, &updated)?;
        }
    }
    Ok(true)
}

/// Prepends folder creates for missing ancestors and empty files for update targets.
fn with_prerequisites<B: VaultBackend>(backend: &B, actions: Vec<VaultAction>) -> Vec<VaultAction> {
    let mut planned: HashSet<VaultPath> = actions
        .iter()
        .filter_map(|a| match a {
            VaultAction::CreateFolder(p) => Some(p.clone()),
            _ => None,
        })
        .collect();
    let produced: HashSet<&VaultPath> = actions
        .iter()
        .filter_map(|a| match a {
            VaultAction::CreateOrUpdateFile { path, .. } => Some(path),
            VaultAction::RenameFile { to, .. } => Some(to),
            _ => None,
        })
        .collect();
    let renamed: Vec<(&VaultPath, &VaultPath)> = actions
        .iter()
        .filter_map(|a| match a {
            VaultAction::RenameFolder { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();

    let will_exist = |folder: &VaultPath, planned: &HashSet<VaultPath>| {
        planned.contains(folder)
            || backend.is_folder(folder)
            || renamed.iter().any(|(from, to)| {
                folder
                    .rebase(to, from)
                    .is_some_and(|src| backend.is_folder(&src))
            })
    };

    let mut prerequisites = Vec::new();
    for action in &actions {
        if action.is_trash() {
            continue;
        }
        let target = action.target();
        let parts = target.parts();
        for depth in 1..parts.len() {
            let folder = VaultPath::new(parts[..depth].to_vec());
            if !will_exist(&folder, &planned) {
                planned.insert(folder.clone());
                prerequisites.push(VaultAction::CreateFolder(folder));
            }
        }
        if let VaultAction::ProcessFile { path, .. } = action {
            if !backend.exists(path) && !produced.contains(path) {
                prerequisites.push(VaultAction::CreateOrUpdateFile {
                    path: path.clone(),
                    content: String::new(),
                });
            }
        }
    }

    prerequisites.extend(actions);
    prerequisites
}
