//! # Librarian
//!
//! The composition root: one value owning everything the library needs at runtime.
//!
//! | Field | Role |
//! |-------|------|
//! | `backend` | the vault, read and written through [`VaultBackend`] |
//! | `layout` | naming rules derived from [`LibraryConfig`] |
//! | `tree` | the in-memory [`LibraryTree`] |
//! | `dispatcher` | write queue plus the self-event tracker |
//! | `inbox` | store events waiting to be handled |
//!
//! Nothing here is global; callers hold a `Librarian` and pass it around.
//!
//! ## Event Loop
//!
//! [`Librarian::settle`] is the whole reactive side, written as a plain loop:
//!
//! 1. Pull events the backend recorded into the inbox.
//! 2. Drop events the tracker claims as our own writes.
//! 3. React to the rest: heal what arrived, reconcile the sections involved, regenerate
//!    their codexes.
//! 4. When the inbox is empty, drain the dispatcher, whose writes produce new events.
//!
//! The loop ends when there are no events and no queued actions, or when the
//! dispatcher's circuit breaker fires for this cycle.
//!
//! ## Commands
//!
//! [`Librarian::add_notes`], [`Librarian::delete_notes`], [`Librarian::set_status`] and
//! [`Librarian::move_notes`] all go through the same sequence: reconcile the parents the
//! command touches, snapshot, mutate, snapshot, diff, dispatch. Reconciling first folds
//! in any out-of-band edit, so the diff never overwrites it.

use crate::actions::VaultAction;
use crate::canon::{self, Authority, Canonicalized, QuarantinedFile};
use crate::codex;
use crate::config::LibraryConfig;
use crate::dispatch::{DispatchReport, Dispatcher, SelfEventTracker};
use crate::error::Result;
use crate::path::{LibraryLayout, VaultPath};
use crate::reconcile::{
    self, actions_for_diff, codex_write, plan_heal, reconcile_leaf, DiffMode, ReconcileStats,
};
use crate::store::backend::VaultBackend;
use crate::store::StoreEvent;
use crate::tree::{LibraryTree, NodeKind, NoteEntry, Snapshot, Status, TreeNode, TreePath};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info, trace, warn};

/// Outcome of a full healing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealReport {
    pub renamed: Vec<(VaultPath, VaultPath)>,
    pub quarantined: Vec<QuarantinedFile>,
    pub codexes_written: usize,
    pub dispatch: DispatchReport,
}

pub struct Librarian<B: VaultBackend> {
    backend: B,
    layout: LibraryLayout,
    tree: LibraryTree,
    dispatcher: Dispatcher,
    inbox: VecDeque<StoreEvent>,
}

impl<B: VaultBackend> Librarian<B> {
    pub fn new(backend: B, layout: LibraryLayout, dispatcher: Dispatcher) -> Self {
        let tree = LibraryTree::new(layout.root.clone());
        Self {
            backend,
            layout,
            tree,
            dispatcher,
            inbox: VecDeque::new(),
        }
    }

    pub fn from_config(backend: B, config: &LibraryConfig) -> Result<Self> {
        let layout = LibraryLayout::from_config(config)?;
        let tracker = SelfEventTracker::new(config.self_event_ttl());
        Ok(Self::new(
            backend,
            layout,
            Dispatcher::new(tracker, config.max_batches),
        ))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    pub fn tree(&self) -> &LibraryTree {
        &self.tree
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tree.snapshot()
    }

    /// Rebuilds the tree from the vault after renaming every misplaced leaf into its
    /// canonical location, then writes every codex and trashes stale ones.
    pub fn heal_all(&mut self) -> Result<HealReport> {
        self.dispatcher.begin_cycle();
        let root = self.layout.root_path();
        let plan = plan_heal(&self.backend, &self.layout, &root)?;
        let mut dispatch = self.dispatcher.dispatch(&self.backend, plan.actions);

        self.tree = LibraryTree::new(self.layout.root.clone());
        reconcile::reconcile_subtree(&mut self.tree, &self.backend, &self.layout, &TreePath::root())?;

        let mut actions: Vec<VaultAction> = self
            .tree
            .get_all_section_paths()
            .iter()
            .filter_map(|section| codex_write(&self.tree, &self.layout, section))
            .collect();
        actions.extend(self.stale_codexes(&root)?);
        let codexes = self.dispatcher.dispatch(&self.backend, actions);
        let codexes_written = codexes
            .applied
            .iter()
            .filter(|a| matches!(a, VaultAction::CreateOrUpdateFile { .. }))
            .count();
        dispatch.merge(codexes);
        dispatch.merge(self.settle());

        info!(
            renamed = plan.renamed.len(),
            quarantined = plan.quarantined.len(),
            codexes = codexes_written,
            notes = self.tree.len(),
            "Library healed"
        );
        Ok(HealReport {
            renamed: plan.renamed,
            quarantined: plan.quarantined,
            codexes_written,
            dispatch,
        })
    }

    /// Codex files under `folder` that index no section, or not under their own name.
    fn stale_codexes(&self, folder: &VaultPath) -> Result<Vec<VaultAction>> {
        Ok(self
            .backend
            .list_leaves(folder)?
            .into_iter()
            .filter(|path| self.layout.is_codex_path(path) && !self.layout.is_untracked(path))
            .filter(|path| {
                let canonical = match canon::canonicalize(&self.layout, path, Authority::Folder) {
                    Canonicalized::Canonical(c) => c,
                    Canonicalized::Quarantined(_) => return false,
                };
                let indexed = self
                    .tree
                    .get_node(&canonical.tree_path)
                    .is_some_and(TreeNode::is_section);
                !indexed || !canon::is_canonical(path, &self.layout.codex_path(&canonical.tree_path))
            })
            .inspect(|path| debug!(path = %path, "Trashing stale codex"))
            .map(VaultAction::TrashFile)
            .collect())
    }

    pub fn reconcile_subtree(&mut self, subtree: &TreePath) -> Result<ReconcileStats> {
        reconcile::reconcile_subtree(&mut self.tree, &self.backend, &self.layout, subtree)
    }

    /// Runs a precomputed batch, folds what it changed into the tree and settles the
    /// events it causes.
    ///
    /// The batch's own events are claimed by the tracker, so the settle loop never sees
    /// them. Every path an applied action touched is reconciled here instead, and the
    /// codexes of the sections that changed are written.
    pub fn dispatch(&mut self, actions: impl IntoIterator<Item = VaultAction>) -> DispatchReport {
        self.dispatcher.begin_cycle();
        let mut report = self.dispatcher.dispatch(&self.backend, actions);
        let touched: BTreeSet<VaultPath> = report
            .applied
            .iter()
            .flat_map(VaultAction::paths)
            .filter(|path| self.watches(path) && !self.layout.is_codex_path(path))
            .cloned()
            .collect();

        let before = self.tree.snapshot();
        for path in &touched {
            if let Err(e) = self.reconcile_path(path) {
                warn!(path = %path, error = %e, "Failed to reconcile dispatched path");
            }
        }
        let after = self.tree.snapshot();
        let codexes =
            actions_for_diff(&self.tree, &self.layout, &before, &after, DiffMode::CodexOnly);
        if !codexes.is_empty() {
            debug!(count = codexes.len(), "Writing codexes for dispatched batch");
            self.dispatcher.enqueue(codexes);
        }
        report.merge(self.settle());
        report
    }

    /// Queues an event reported from outside the backend, e.g. by a file watcher.
    pub fn push_event(&mut self, event: StoreEvent) {
        self.inbox.push_back(event);
    }

    /// Handles every pending event and queued action until the library is quiet.
    pub fn settle(&mut self) -> DispatchReport {
        self.dispatcher.begin_cycle();
        let mut report = DispatchReport::default();
        loop {
            self.inbox.extend(self.backend.drain_events());
            if self.dispatcher.is_tripped() {
                warn!(
                    discarded = self.inbox.len(),
                    "Settle cycle stopped by the circuit breaker; discarding pending events"
                );
                self.inbox.clear();
                break;
            }
            if let Some(event) = self.inbox.pop_front() {
                if self.claim_self_event(&event) {
                    trace!(event = %event, "Ignoring self event");
                    continue;
                }
                match self.react(event.clone()) {
                    Ok(reaction) => report.merge(reaction),
                    Err(e) => warn!(event = %event, error = %e, "Failed to react to store event"),
                }
                continue;
            }
            if self.dispatcher.is_idle() {
                break;
            }
            report.merge(self.dispatcher.drain(&self.backend));
        }
        report
    }

    fn claim_self_event(&mut self, event: &StoreEvent) -> bool {
        let tracker = self.dispatcher.tracker_mut();
        event
            .paths()
            .into_iter()
            .map(|path| tracker.consume(path))
            .fold(false, |claimed, consumed| claimed | consumed)
    }

    fn watches(&self, path: &VaultPath) -> bool {
        self.layout.in_library(path) && !self.layout.is_untracked(path)
    }

    fn react(&mut self, event: StoreEvent) -> Result<DispatchReport> {
        debug!(event = %event, "Reacting to store event");
        match event {
            StoreEvent::Created(path) => self.react_paths(Vec::new(), vec![path]),
            StoreEvent::Deleted(path) => self.react_paths(vec![path], Vec::new()),
            StoreEvent::Renamed { from, to } => self.react_paths(vec![from], vec![to]),
            StoreEvent::Modified(path) => self.react_modified(&path),
        }
    }

    fn react_paths(&mut self, gone: Vec<VaultPath>, arrived: Vec<VaultPath>) -> Result<DispatchReport> {
        let gone: Vec<VaultPath> = gone.into_iter().filter(|p| self.watches(p)).collect();
        let arrived: Vec<VaultPath> = arrived.into_iter().filter(|p| self.watches(p)).collect();
        let mut report = DispatchReport::default();
        if gone.is_empty() && arrived.is_empty() {
            return Ok(report);
        }

        let mut landed = Vec::with_capacity(arrived.len());
        for path in arrived {
            let plan = plan_heal(&self.backend, &self.layout, &path)?;
            if !plan.is_empty() {
                info!(
                    path = %path,
                    renamed = plan.renamed.len(),
                    quarantined = plan.quarantined.len(),
                    "Healing arrival"
                );
            }
            landed.push(plan.destination_of(&path));
            report.merge(self.dispatcher.dispatch(&self.backend, plan.actions));
        }

        let before = self.tree.snapshot();
        for path in gone.iter().chain(&landed) {
            self.reconcile_path(path)?;
        }
        let after = self.tree.snapshot();
        let mut actions =
            actions_for_diff(&self.tree, &self.layout, &before, &after, DiffMode::CodexOnly);
        for path in &gone {
            if let Some(section) = self.codex_section(path) {
                debug!(section = %section, "Restoring deleted codex");
                actions.extend(codex_write(&self.tree, &self.layout, &section));
            }
        }
        report.merge(self.dispatcher.dispatch(&self.backend, actions));
        Ok(report)
    }

    fn reconcile_path(&mut self, path: &VaultPath) -> Result<()> {
        let section = self
            .layout
            .section_of_folder(path)
            .filter(|s| {
                self.backend.is_folder(path) || self.tree.get_node(s).is_some_and(TreeNode::is_section)
            });
        match section {
            Some(section) => {
                reconcile::reconcile_subtree(&mut self.tree, &self.backend, &self.layout, &section)?;
            }
            None => {
                reconcile_leaf(&mut self.tree, &self.backend, &self.layout, path)?;
            }
        }
        Ok(())
    }

    /// The section a codex path indexes, when the path is that section's canonical codex.
    fn codex_section(&self, path: &VaultPath) -> Option<TreePath> {
        if !self.layout.is_codex_path(path) {
            return None;
        }
        match canon::canonicalize(&self.layout, path, Authority::Folder) {
            Canonicalized::Canonical(c)
                if c.kind == NodeKind::Codex && canon::is_canonical(path, &c.canonical_path) =>
            {
                self.tree
                    .get_node(&c.tree_path)
                    .is_some_and(TreeNode::is_section)
                    .then_some(c.tree_path)
            }
            _ => None,
        }
    }

    fn react_modified(&mut self, path: &VaultPath) -> Result<DispatchReport> {
        if !self.watches(path) {
            return Ok(DispatchReport::default());
        }
        if let Some(section) = self.codex_section(path) {
            return self.react_codex_edit(path, section);
        }
        let before = self.tree.snapshot();
        if !reconcile_leaf(&mut self.tree, &self.backend, &self.layout, path)? {
            return Ok(DispatchReport::default());
        }
        let after = self.tree.snapshot();
        let actions =
            actions_for_diff(&self.tree, &self.layout, &before, &after, DiffMode::CodexOnly);
        Ok(self.dispatcher.dispatch(&self.backend, actions))
    }

    /// Applies checkbox changes the user made in a codex to the children it lists.
    fn react_codex_edit(&mut self, path: &VaultPath, section: TreePath) -> Result<DispatchReport> {
        let Some(content) = self.backend.read_content(path)? else {
            return Ok(DispatchReport::default());
        };
        let changes: Vec<(TreePath, Status)> = codex::read_checkboxes(&content)
            .into_iter()
            .filter_map(|item| {
                let child = codex::resolve_target(&self.layout, &section, &item.target)?;
                let current = match self.tree.get_node(&child)? {
                    TreeNode::Scroll(scroll) => scroll.status,
                    TreeNode::Section(_) => self.tree.aggregate_status(&child),
                    TreeNode::File(_) => return None,
                };
                let wanted = if item.checked {
                    Status::Done
                } else {
                    Status::NotStarted
                };
                (current != wanted).then_some((child, wanted))
            })
            .collect();

        if !changes.is_empty() {
            info!(section = %section, changes = changes.len(), "Applying codex checkbox edits");
            self.apply_mutation(std::slice::from_ref(&section), DiffMode::Full, |tree, _| {
                for (child, status) in &changes {
                    tree.set_status(child, *status);
                }
                ((), Vec::new())
            })?;
        }
        self.dispatcher
            .enqueue(codex_write(&self.tree, &self.layout, &section));
        Ok(self.dispatcher.drain(&self.backend))
    }

    /// Reconcile the affected sections, mutate, and queue the actions the diff implies.
    fn apply_mutation<R>(
        &mut self,
        affected: &[TreePath],
        mode: DiffMode,
        mutation: impl FnOnce(&mut LibraryTree, &LibraryLayout) -> (R, Vec<VaultAction>),
    ) -> Result<R> {
        let baseline = self.tree.snapshot();
        for section in affected {
            reconcile::reconcile_subtree(&mut self.tree, &self.backend, &self.layout, section)?;
        }
        let reconciled = self.tree.snapshot();
        let (result, explicit) = mutation(&mut self.tree, &self.layout);
        let mutated = self.tree.snapshot();

        let mut actions = actions_for_diff(
            &self.tree,
            &self.layout,
            &baseline,
            &reconciled,
            DiffMode::CodexOnly,
        );
        actions.extend(explicit);
        actions.extend(actions_for_diff(
            &self.tree,
            &self.layout,
            &reconciled,
            &mutated,
            mode,
        ));
        self.dispatcher.enqueue(actions);
        Ok(result)
    }

    /// Reconcile-then-mutate-then-diff, followed by a full settle.
    pub fn with_diff<R>(
        &mut self,
        affected: &[TreePath],
        mutation: impl FnOnce(&mut LibraryTree) -> R,
    ) -> Result<(R, DispatchReport)> {
        let result = self.apply_mutation(affected, DiffMode::Full, |tree, _| {
            (mutation(tree), Vec::new())
        })?;
        Ok((result, self.settle()))
    }

    pub fn add_notes(&mut self, entries: Vec<NoteEntry>) -> Result<(usize, DispatchReport)> {
        let affected = parents(entries.iter().map(NoteEntry::path));
        self.with_diff(&affected, |tree| tree.add_notes(entries))
    }

    pub fn delete_notes(&mut self, paths: &[TreePath]) -> Result<(usize, DispatchReport)> {
        let affected = parents(paths.iter());
        self.with_diff(&affected, |tree| {
            let removed = tree.delete_notes(paths);
            for parent in &affected {
                tree.prune_empty_sections(parent, |_| false);
            }
            removed
        })
    }

    /// Sets the status of scrolls, or of every scroll under a section.
    /// Returns how many paths accepted the status.
    pub fn set_status(
        &mut self,
        paths: &[TreePath],
        status: Status,
    ) -> Result<(usize, DispatchReport)> {
        let affected = parents(paths.iter());
        self.with_diff(&affected, |tree| {
            paths.iter().filter(|p| tree.set_status(p, status)).count()
        })
    }

    /// Moves a leaf or a whole section. Returns false when the tree refused the move.
    pub fn move_notes(&mut self, from: &TreePath, to: &TreePath) -> Result<(bool, DispatchReport)> {
        let affected = parents([from, to].into_iter());
        let moved = self.apply_mutation(&affected, DiffMode::CodexOnly, |tree, layout| {
            let Some(node) = tree.get_node(from) else {
                return (false, Vec::new());
            };
            let is_section = node.is_section();
            let extension = node.extension().map(str::to_string);
            if !tree.move_node(from, to) {
                return (false, Vec::new());
            }
            let mut actions = if is_section {
                reconcile::section_move_actions(tree, layout, from, to)
            } else {
                let src = layout.leaf_path(from, extension.as_deref());
                let dst = layout.leaf_path(to, extension.as_deref());
                src.zip(dst)
                    .map(|(from, to)| VaultAction::RenameFile { from, to })
                    .into_iter()
                    .collect()
            };
            let pruned = from
                .parent()
                .map(|parent| tree.prune_empty_sections(&parent, |_| false))
                .unwrap_or_default();
            if let Some(top) = pruned.last() {
                actions.push(VaultAction::TrashFolder(layout.folder_path(top)));
            }
            (true, actions)
        })?;
        if !moved {
            warn!(from = %from, to = %to, "Move refused");
        }
        Ok((moved, self.settle()))
    }
}

/// Distinct parent sections of `paths`, the root for root-level nodes.
fn parents<'a>(paths: impl Iterator<Item = &'a TreePath>) -> Vec<TreePath> {
    paths
        .map(|p| p.parent().unwrap_or_default())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter;
    use crate::store::mem_backend::MemBackend;
    use crate::test_utils::librarian;
    use crate::tree::path;

    fn p(raw: &str) -> VaultPath {
        VaultPath::parse(raw)
    }

    #[test]
    fn heal_all_builds_tree_and_codexes() {
        let mem = MemBackend::new();
        mem.seed("Library/A/Note-A.md", "---\nstatus: done\n---\n");
        mem.seed("Library/A/__-Old.md", "stale");
        let mut lib = librarian(mem);
        let report = lib.heal_all().unwrap();

        assert!(report.dispatch.is_clean(), "{:?}", report.dispatch.failures);
        assert!(lib.tree().get_node(&path("A/Note")).is_some());
        let mem = lib.backend();
        assert!(mem.has_file("Library/__-Library.md"));
        assert_eq!(
            mem.file("Library/A/__-A.md").unwrap(),
            "[[__-Library|← Library]]\n\n- [x] [[Note-A|Note]]\n"
        );
        assert!(!mem.has_file("Library/A/__-Old.md"));
    }

    #[test]
    fn own_writes_leave_nothing_to_react_to() {
        let mut lib = librarian(MemBackend::new());
        lib.heal_all().unwrap();
        lib.add_notes(vec![NoteEntry::scroll(path("S/Note"), Status::NotStarted)])
            .unwrap();

        assert!(lib.backend().pending_events().is_empty());
        assert!(lib.dispatcher().tracker().is_empty());
        assert!(lib.dispatcher().is_idle());
    }

    #[test]
    fn external_root_level_file_moves_to_its_suffix() {
        let mut lib = librarian(MemBackend::new());
        lib.heal_all().unwrap();
        lib.backend().write_file(&p("Library/Note-X-Y.md"), "").unwrap();
        lib.settle();

        let mem = lib.backend();
        assert!(mem.has_file("Library/Y/X/Note-X-Y.md"));
        assert!(!mem.has_file("Library/Note-X-Y.md"));
        assert!(mem.has_file("Library/Y/X/__-X-Y.md"));
        assert!(mem.has_file("Library/Y/__-Y.md"));
        assert!(lib.tree().get_node(&path("Y/X/Note")).is_some());
    }

    #[test]
    fn external_delete_drops_note_and_rewrites_codex() {
        let mem = MemBackend::new();
        mem.seed("Library/A/One-A.md", "");
        mem.seed("Library/A/Two-A.md", "");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        lib.backend().trash(&p("Library/A/One-A.md")).unwrap();
        lib.settle();

        assert!(lib.tree().get_node(&path("A/One")).is_none());
        let codex = lib.backend().file("Library/A/__-A.md").unwrap();
        assert!(!codex.contains("One"));
        assert!(codex.contains("[[Two-A|Two]]"));
    }

    #[test]
    fn deleted_codex_is_restored() {
        let mem = MemBackend::new();
        mem.seed("Library/A/One-A.md", "");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        lib.backend().trash(&p("Library/A/__-A.md")).unwrap();
        lib.settle();

        assert!(lib.backend().has_file("Library/A/__-A.md"));
    }

    #[test]
    fn ticking_a_codex_checkbox_marks_the_scroll_done() {
        let mem = MemBackend::new();
        mem.seed("Library/A/Note-A.md", "body\n");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        lib.backend()
            .write_file(
                &p("Library/A/__-A.md"),
                "[[__-Library|← Library]]\n\n- [x] [[Note-A|Note]]\n",
            )
            .unwrap();
        lib.settle();

        assert_eq!(
            lib.tree().get_node(&path("A/Note")).unwrap().status(),
            Some(Status::Done)
        );
        let note = lib.backend().file("Library/A/Note-A.md").unwrap();
        assert_eq!(frontmatter::read_status(&note), Status::Done);
        assert!(note.ends_with("body\n"));
        let root = lib.backend().file("Library/__-Library.md").unwrap();
        assert!(root.contains("- [x] [[__-A|A]]"));
    }

    #[test]
    fn editing_front_matter_updates_codex() {
        let mem = MemBackend::new();
        mem.seed("Library/A/Note-A.md", "");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        lib.backend()
            .write_file(&p("Library/A/Note-A.md"), "---\nstatus: done\n---\n")
            .unwrap();
        lib.settle();

        let codex = lib.backend().file("Library/A/__-A.md").unwrap();
        assert!(codex.contains("- [x] [[Note-A|Note]]"));
    }

    #[test]
    fn set_status_on_section_writes_every_scroll() {
        let mem = MemBackend::new();
        mem.seed("Library/A/One-A.md", "");
        mem.seed("Library/A/B/Two-B-A.md", "");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        let (count, report) = lib.set_status(&[path("A")], Status::Done).unwrap();

        assert_eq!(count, 1);
        assert!(report.is_clean());
        for file in ["Library/A/One-A.md", "Library/A/B/Two-B-A.md"] {
            let content = lib.backend().file(file).unwrap();
            assert_eq!(frontmatter::read_status(&content), Status::Done, "{file}");
        }
        assert!(lib
            .backend()
            .file("Library/__-Library.md")
            .unwrap()
            .contains("- [x] [[__-A|A]]"));
    }

    #[test]
    fn delete_section_trashes_folder() {
        let mem = MemBackend::new();
        mem.seed("Library/A/B/Note-B-A.md", "");
        mem.seed("Library/Keep.md", "");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        lib.delete_notes(&[path("A")]).unwrap();

        assert!(!lib.backend().has_folder("Library/A"));
        assert!(lib.tree().get_node(&path("A")).is_none());
        assert!(!lib
            .backend()
            .file("Library/__-Library.md")
            .unwrap()
            .contains("__-A"));
    }

    #[test]
    fn move_leaf_keeps_content() {
        let mem = MemBackend::new();
        mem.seed("Library/A/Note-A.md", "keep me");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        let (moved, report) = lib.move_notes(&path("A/Note"), &path("B/Renamed")).unwrap();

        assert!(moved);
        assert!(report.is_clean(), "{:?}", report.failures);
        assert_eq!(lib.backend().file("Library/B/Renamed-B.md").unwrap(), "keep me");
        assert!(lib.backend().has_file("Library/B/__-B.md"));
        assert!(lib.tree().get_node(&path("A")).is_none());
    }

    #[test]
    fn move_section_renames_folder_and_suffixes() {
        let mem = MemBackend::new();
        mem.seed("Library/A/C/Note-C-A.md", "x");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        let (moved, report) = lib.move_notes(&path("A"), &path("Z")).unwrap();

        assert!(moved);
        assert!(report.is_clean(), "{:?}", report.failures);
        let mem = lib.backend();
        assert_eq!(mem.file("Library/Z/C/Note-C-Z.md").unwrap(), "x");
        assert!(mem.has_file("Library/Z/C/__-C-Z.md"));
        assert!(mem.has_file("Library/Z/__-Z.md"));
        assert!(!mem.has_file("Library/Z/__-A.md"));
        assert!(!mem.has_folder("Library/A"));
    }

    #[test]
    fn dispatched_write_reaches_tree_and_codexes() {
        let mut lib = librarian(MemBackend::new());
        lib.heal_all().unwrap();
        let report = lib.dispatch([VaultAction::CreateOrUpdateFile {
            path: p("Library/S/Note-S.md"),
            content: String::new(),
        }]);

        assert!(report.is_clean(), "{:?}", report.failures);
        assert!(lib.tree().get_node(&path("S/Note")).is_some());
        let mem = lib.backend();
        assert_eq!(
            mem.file("Library/S/__-S.md").as_deref(),
            Some("[[__-Library|← Library]]\n\n- [ ] [[Note-S|Note]]\n")
        );
        assert!(mem
            .file("Library/__-Library.md")
            .unwrap()
            .contains("- [ ] [[__-S|S]]"));
    }

    #[test]
    fn dispatched_trash_drops_the_note() {
        let mem = MemBackend::new();
        mem.seed("Library/A/One-A.md", "");
        mem.seed("Library/A/Two-A.md", "");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        let report = lib.dispatch([VaultAction::TrashFile(p("Library/A/One-A.md"))]);

        assert!(report.is_clean(), "{:?}", report.failures);
        assert!(lib.tree().get_node(&path("A/One")).is_none());
        let codex = lib.backend().file("Library/A/__-A.md").unwrap();
        assert!(!codex.contains("One-A"), "{codex}");
        assert!(codex.contains("[[Two-A|Two]]"));
    }

    #[test]
    fn status_change_keeps_unreadable_front_matter() {
        let mem = MemBackend::new();
        mem.seed("Library/A/Note-A.md", "---\ntitle: [oops\n---\nbody\n");
        mem.seed("Library/A/List-A.md", "---\n- keep\n- me\n---\nbody\n");
        let mut lib = librarian(mem);
        lib.heal_all().unwrap();
        let (count, report) = lib
            .set_status(&[path("A/Note"), path("A/List")], Status::Done)
            .unwrap();

        assert_eq!(count, 2);
        assert!(report.is_clean(), "{:?}", report.failures);
        let note = lib.backend().file("Library/A/Note-A.md").unwrap();
        assert_eq!(frontmatter::read_status(&note), Status::Done);
        assert!(note.ends_with("---\ntitle: [oops\n---\nbody\n"), "{note}");
        let list = lib.backend().file("Library/A/List-A.md").unwrap();
        assert_eq!(frontmatter::read_status(&list), Status::Done);
        assert!(list.contains("- keep\n- me\n"), "{list}");
        assert!(lib
            .backend()
            .file("Library/A/__-A.md")
            .unwrap()
            .contains("- [x] [[Note-A|Note]]"));
    }
}
