//! # Tree Reconciler
//!
//! Keeps the in-memory [`LibraryTree`] in step with the vault, and turns tree changes
//! back into vault actions.
//!
//! ## Reading
//!
//! [`reconcile_subtree`] re-lists the leaves under one section and folds them in:
//! leaves that vanished are deleted, new or status-changed leaves are upserted.
//! Codexes, quarantined files and misplaced leaves are skipped; misplaced leaves are
//! picked up once healing has moved them. Sections only change as a consequence of
//! leaf changes: an emptied section whose folder is gone is pruned.
//!
//! ## Writing
//!
//! [`actions_for_diff`] maps a [`NoteDiff`] to [`VaultAction`]s. In
//! [`DiffMode::Full`] every change becomes a store operation; in
//! [`DiffMode::CodexOnly`] the store already holds the change (it came from the user)
//! and only the affected codexes are regenerated.
//!
//! A codex is touched when one of its children was added, removed, moved or changed
//! status. Section aggregates are part of the snapshot, so a status change bubbles up
//! one codex per level with no special casing.
//!
//! ## Healing
//!
//! [`plan_heal`] canonicalizes every leaf under a folder with the depth policy and
//! emits one rename per leaf that is not where it belongs, plus a folder rename for
//! every folder whose name is not a valid node name.

use crate::actions::{Transform, VaultAction};
use crate::canon::{self, Canonicalized, QuarantinedFile};
use crate::codec::shape::LeafBasename;
use crate::codex;
use crate::diff::{diff, NoteDiff};
use crate::error::Result;
use crate::frontmatter;
use crate::names::{is_sanitized, sanitize, NodeName};
use crate::path::{LibraryLayout, VaultPath};
use crate::store::backend::VaultBackend;
use crate::tree::{LibraryTree, NodeKind, NoteEntry, Snapshot, TreeNode, TreePath};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub upserted: usize,
    pub deleted: usize,
    pub pruned: usize,
}

/// Reads one canonically placed leaf into a tree entry.
pub fn read_leaf<B: VaultBackend>(
    backend: &B,
    layout: &LibraryLayout,
    path: &VaultPath,
) -> Result<Option<NoteEntry>> {
    let Some((tree_path, leaf)) = layout.locate_leaf(path) else {
        return Ok(None);
    };
    match leaf.kind() {
        NodeKind::Scroll => Ok(backend
            .read_content(path)?
            .map(|content| NoteEntry::scroll(tree_path, frontmatter::read_status(&content)))),
        NodeKind::File => {
            if !backend.exists(path) {
                return Ok(None);
            }
            Ok(Some(NoteEntry::file(tree_path, leaf.extension)))
        }
        NodeKind::Section | NodeKind::Codex => Ok(None),
    }
}

fn differs(node: Option<&TreeNode>, entry: &NoteEntry) -> bool {
    match (node, entry) {
        (Some(TreeNode::Scroll(s)), NoteEntry::Scroll { status, .. }) => s.status != *status,
        (Some(TreeNode::File(f)), NoteEntry::File { extension, .. }) => f.extension != *extension,
        _ => true,
    }
}

fn prune_vanished<B: VaultBackend>(
    tree: &mut LibraryTree,
    backend: &B,
    layout: &LibraryLayout,
    from: &TreePath,
) -> usize {
    tree.prune_empty_sections(from, |section| {
        backend.is_folder(&layout.folder_path(section))
    })
    .len()
}

pub fn reconcile_subtree<B: VaultBackend>(
    tree: &mut LibraryTree,
    backend: &B,
    layout: &LibraryLayout,
    subtree: &TreePath,
) -> Result<ReconcileStats> {
    let mut stats = ReconcileStats::default();
    let folder = layout.folder_path(subtree);

    let mut found: BTreeMap<TreePath, NoteEntry> = BTreeMap::new();
    for path in backend.list_leaves(&folder)? {
        let Some(entry) = read_leaf(backend, layout, &path)? else {
            continue;
        };
        if found.contains_key(entry.path()) {
            warn!(path = %path, node = %entry.path(), "Duplicate leaf name; keeping the first");
            continue;
        }
        found.insert(entry.path().clone(), entry);
    }

    let stale: Vec<TreePath> = tree
        .leaves_under(subtree)
        .into_iter()
        .filter(|p| !found.contains_key(p))
        .collect();
    stats.deleted = tree.delete_notes(&stale);

    let changed: Vec<NoteEntry> = found
        .into_values()
        .filter(|e| differs(tree.get_node(e.path()), e))
        .collect();
    for entry in &changed {
        debug!(node = %entry.path(), "Reconciled leaf");
    }
    stats.upserted = tree.add_notes(changed);

    let mut sections: Vec<TreePath> = tree
        .get_all_section_paths()
        .into_iter()
        .filter(|s| s.starts_with(subtree))
        .collect();
    sections.sort_by_key(|s| std::cmp::Reverse(s.depth()));
    for section in sections {
        stats.pruned += prune_vanished(tree, backend, layout, &section);
    }
    for leaf in &stale {
        if let Some(parent) = leaf.parent() {
            stats.pruned += prune_vanished(tree, backend, layout, &parent);
        }
    }

    if stats != ReconcileStats::default() {
        info!(
            section = %subtree,
            upserted = stats.upserted,
            deleted = stats.deleted,
            pruned = stats.pruned,
            "Reconciled subtree"
        );
    }
    Ok(stats)
}

/// Tree path a leaf path names by position, whether or not its suffix is canonical.
fn positional_identity(layout: &LibraryLayout, path: &VaultPath) -> Option<TreePath> {
    let folders = layout.relative_folders(path)?;
    let leaf = LeafBasename::parse(path.basename()?, &layout.scroll_ext).ok()?;
    let core = leaf.core_name()?;
    let section = folders
        .iter()
        .map(|f| sanitize(f).ok())
        .collect::<Option<Vec<NodeName>>>()?;
    Some(TreePath::new(section).child(core))
}

/// Folds a single leaf path into the tree. Returns true when the tree changed.
pub fn reconcile_leaf<B: VaultBackend>(
    tree: &mut LibraryTree,
    backend: &B,
    layout: &LibraryLayout,
    path: &VaultPath,
) -> Result<bool> {
    if let Some(entry) = read_leaf(backend, layout, path)? {
        if differs(tree.get_node(entry.path()), &entry) {
            debug!(node = %entry.path(), "Reconciled leaf");
            return Ok(tree.add_notes([entry]) > 0);
        }
        return Ok(false);
    }

    let Some(tree_path) = positional_identity(layout, path) else {
        return Ok(false);
    };
    let Some(node) = tree.get_node(&tree_path) else {
        return Ok(false);
    };
    if node.is_section() {
        return Ok(false);
    }
    let still_there = layout
        .leaf_path(&tree_path, node.extension())
        .is_some_and(|canonical| backend.exists(&canonical));
    if still_there {
        return Ok(false);
    }
    debug!(node = %tree_path, "Leaf vanished");
    tree.delete_notes([&tree_path]);
    if let Some(parent) = tree_path.parent() {
        prune_vanished(tree, backend, layout, &parent);
    }
    Ok(true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    /// The tree changed first: mirror every change into the vault.
    Full,
    /// The vault changed first: only regenerate codexes.
    CodexOnly,
}

pub fn actions_for_diff(
    tree: &LibraryTree,
    layout: &LibraryLayout,
    before: &Snapshot,
    after: &Snapshot,
    mode: DiffMode,
) -> Vec<VaultAction> {
    let d = diff(before, after);
    let mut actions = Vec::new();
    if mode == DiffMode::Full {
        actions.extend(store_actions(layout, &d, before, after));
    }
    actions.extend(codex_actions(tree, layout, &d));
    actions
}

fn store_actions(
    layout: &LibraryLayout,
    d: &NoteDiff,
    before: &Snapshot,
    after: &Snapshot,
) -> Vec<VaultAction> {
    let mut actions = Vec::new();
    let is_section = |snap: &Snapshot, p: &TreePath| {
        snap.get(p).is_some_and(|e| e.kind == NodeKind::Section)
    };

    for (from, to) in &d.moved {
        let src = layout.leaf_path(from, before.extension(from));
        let dst = layout.leaf_path(to, after.extension(to));
        if let (Some(from), Some(to)) = (src, dst) {
            actions.push(VaultAction::RenameFile { from, to });
        }
    }

    for path in &d.added {
        let Some(entry) = after.get(path) else {
            continue;
        };
        let content = match entry.kind {
            NodeKind::Scroll => frontmatter::new_scroll(entry.status),
            NodeKind::File => String::new(),
            NodeKind::Section => {
                actions.push(VaultAction::CreateFolder(layout.folder_path(path)));
                continue;
            }
            NodeKind::Codex => continue,
        };
        if let Some(target) = layout.leaf_path(path, after.extension(path)) {
            actions.push(VaultAction::CreateOrUpdateFile {
                path: target,
                content,
            });
        }
    }

    for path in &d.removed {
        let under_removed_section = path
            .parent()
            .is_some_and(|parent| d.removed.contains(&parent) && is_section(before, &parent));
        if under_removed_section {
            continue;
        }
        if is_section(before, path) {
            actions.push(VaultAction::TrashFolder(layout.folder_path(path)));
        } else if let Some(target) = layout.leaf_path(path, before.extension(path)) {
            actions.push(VaultAction::TrashFile(target));
        }
    }

    for path in &d.status_changed {
        let Some(entry) = after.get(path) else {
            continue;
        };
        if entry.kind != NodeKind::Scroll {
            continue;
        }
        if let Some(target) = layout.leaf_path(path, None) {
            actions.push(VaultAction::ProcessFile {
                path: target,
                transform: Transform::SetStatus(entry.status),
            });
        }
    }
    actions
}

/// Sections whose codex content may have changed.
pub fn touched_sections(tree: &LibraryTree, d: &NoteDiff) -> BTreeSet<TreePath> {
    let mut touched = BTreeSet::new();
    for path in d.touched() {
        if let Some(parent) = path.parent() {
            touched.insert(parent);
        }
    }
    touched.extend(d.added.iter().cloned());
    touched.retain(|s| tree.get_node(s).is_some_and(TreeNode::is_section));
    touched
}

fn codex_actions(tree: &LibraryTree, layout: &LibraryLayout, d: &NoteDiff) -> Vec<VaultAction> {
    touched_sections(tree, d)
        .into_iter()
        .filter_map(|section| codex_write(tree, layout, &section))
        .collect()
}

/// Regenerates one codex. `None` when the section has disappeared.
pub fn codex_write(tree: &LibraryTree, layout: &LibraryLayout, section: &TreePath) -> Option<VaultAction> {
    codex::generate(tree, layout, section).map(|content| VaultAction::CreateOrUpdateFile {
        path: layout.codex_path(section),
        content,
    })
}

/// Store actions for a section that moved from `from` to `to` in `tree`.
///
/// The folder is renamed as a whole; every leaf inside is then renamed to carry its
/// new suffix chain, and the codexes that travelled along under their old names are
/// trashed. Codexes under the new names come from the codex pass.
pub fn section_move_actions(
    tree: &LibraryTree,
    layout: &LibraryLayout,
    from: &TreePath,
    to: &TreePath,
) -> Vec<VaultAction> {
    let old_folder = layout.folder_path(from);
    let new_folder = layout.folder_path(to);
    let mut actions = vec![VaultAction::RenameFolder {
        from: old_folder.clone(),
        to: new_folder.clone(),
    }];

    for leaf in tree.leaves_under(to) {
        let Some(old_leaf) = leaf.rebase(to, from) else {
            continue;
        };
        let ext = tree.get_node(&leaf).and_then(TreeNode::extension);
        let (Some(old_path), Some(new_path)) =
            (layout.leaf_path(&old_leaf, ext), layout.leaf_path(&leaf, ext))
        else {
            continue;
        };
        let Some(moved) = old_path.rebase(&old_folder, &new_folder) else {
            continue;
        };
        actions.push(VaultAction::RenameFile {
            from: moved,
            to: new_path,
        });
    }

    for section in tree.get_all_section_paths() {
        if !section.starts_with(to) {
            continue;
        }
        let Some(old_section) = section.rebase(to, from) else {
            continue;
        };
        let stale = layout.folder_path(&section).join(layout.codex_basename(&old_section));
        if stale != layout.codex_path(&section) {
            actions.push(VaultAction::TrashFile(stale));
        }
    }
    actions
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealPlan {
    pub actions: Vec<VaultAction>,
    pub renamed: Vec<(VaultPath, VaultPath)>,
    pub quarantined: Vec<QuarantinedFile>,
}

impl HealPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Where `path` ends up once the plan has run.
    pub fn destination_of(&self, path: &VaultPath) -> VaultPath {
        for action in &self.actions {
            if let VaultAction::RenameFolder { from, to } | VaultAction::RenameFile { from, to } =
                action
            {
                if let Some(moved) = path.rebase(from, to) {
                    return moved;
                }
            }
        }
        path.clone()
    }
}

/// Plans the renames that bring everything under `folder` into canonical form.
pub fn plan_heal<B: VaultBackend>(
    backend: &B,
    layout: &LibraryLayout,
    folder: &VaultPath,
) -> Result<HealPlan> {
    let mut plan = HealPlan::default();
    if layout.is_untracked(folder) {
        return Ok(plan);
    }
    let leaves: Vec<VaultPath> = if backend.is_folder(folder) {
        backend.list_leaves(folder)?
    } else if backend.exists(folder) {
        vec![folder.clone()]
    } else {
        Vec::new()
    };

    plan_folder_renames(backend, layout, folder, &leaves, &mut plan);

    // Keys are lowercased so a target differing only in case still counts as taken.
    let occupied: HashSet<String> = leaves.iter().map(VaultPath::key).collect();
    let mut claimed: HashSet<String> = HashSet::new();
    for leaf in leaves {
        if !layout.in_library(&leaf) || layout.is_untracked(&leaf) {
            continue;
        }
        let authority = canon::authority_for(layout, &leaf);
        let result = canon::canonicalize(layout, &leaf, authority);
        if result.is_settled() {
            continue;
        }
        let target = result.target_path().clone();
        if matches!(result, Canonicalized::Canonical(_)) {
            let taken = !target.eq_ignore_case(&leaf)
                && (backend.exists(&target) || occupied.contains(&target.key()));
            if taken || !claimed.insert(target.key()) {
                let q = canon::quarantine_collision(layout, &leaf);
                warn!(
                    path = %leaf,
                    taken = %target,
                    to = %q.destination,
                    "Quarantining leaf whose canonical path is taken"
                );
                plan.actions.push(VaultAction::RenameFile {
                    from: leaf,
                    to: q.destination.clone(),
                });
                plan.quarantined.push(q);
                continue;
            }
        }
        debug!(from = %leaf, to = %target, ?authority, "Healing leaf");
        plan.actions.push(VaultAction::RenameFile {
            from: leaf.clone(),
            to: target.clone(),
        });
        match result {
            Canonicalized::Quarantined(q) => {
                warn!(path = %q.current_path, to = %q.destination, "Quarantining undecodable leaf");
                plan.quarantined.push(q);
            }
            Canonicalized::Canonical(_) => plan.renamed.push((leaf, target)),
        }
    }
    Ok(plan)
}

fn plan_folder_renames<B: VaultBackend>(
    backend: &B,
    layout: &LibraryLayout,
    scope: &VaultPath,
    leaves: &[VaultPath],
    plan: &mut HealPlan,
) {
    let root_depth = layout.root_path().parts().len();
    let mut folders: BTreeSet<VaultPath> = BTreeSet::new();
    for leaf in leaves {
        let Some(mut folder) = leaf.parent() else {
            continue;
        };
        while folder.parts().len() > root_depth && folder.starts_with(scope) {
            folders.insert(folder.clone());
            let Some(parent) = folder.parent() else {
                break;
            };
            folder = parent;
        }
    }

    let mut decided: Vec<(VaultPath, VaultPath)> = Vec::new();
    let mut seen = HashSet::new();
    for folder in folders {
        if layout.is_untracked(&folder) {
            continue;
        }
        let Some(raw) = folder.basename() else {
            continue;
        };
        if is_sanitized(raw) {
            continue;
        }
        let Ok(clean) = sanitize(raw) else {
            continue;
        };
        let parent = folder.parent().unwrap_or_default();
        let parent = decided
            .iter()
            .rev()
            .find_map(|(from, to)| parent.rebase(from, to))
            .unwrap_or(parent);
        let to = parent.join(clean.to_string());
        if backend.exists(&to) || !seen.insert(to.clone()) {
            continue;
        }
        debug!(from = %folder, to = %to, "Renaming folder with unsanitized name");
        plan.actions.push(VaultAction::RenameFolder {
            from: folder.clone(),
            to: to.clone(),
        });
        decided.push((folder, to));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::name;
    use crate::path::layout;
    use crate::store::mem_backend::MemBackend;
    use crate::tree::{path, Status};

    fn tree() -> LibraryTree {
        LibraryTree::new(name("Library"))
    }

    #[test]
    fn reconcile_reads_canonical_leaves_and_status() {
        let mem = MemBackend::new();
        mem.seed("Library/A/Note-A.md", "---\nstatus: done\n---\n");
        mem.seed("Library/A/photo-A.png", "");
        mem.seed("Library/A/__-A.md", "codex");
        mem.seed("Library/A/Stray-X.md", "");
        let mut t = tree();
        let stats = reconcile_subtree(&mut t, &mem, &layout(), &TreePath::root()).unwrap();

        assert_eq!(stats.upserted, 2);
        assert_eq!(t.get_node(&path("A/Note")).unwrap().status(), Some(Status::Done));
        assert_eq!(t.get_node(&path("A/photo")).unwrap().kind(), NodeKind::File);
        assert!(t.get_node(&path("A/Stray")).is_none());
    }

    #[test]
    fn reconcile_deletes_vanished_leaves_and_prunes_sections() {
        let mem = MemBackend::new();
        let mut t = tree();
        t.add_notes([
            NoteEntry::scroll(path("A/B/Gone"), Status::NotStarted),
            NoteEntry::scroll(path("Keep"), Status::NotStarted),
        ]);
        mem.seed("Library/Keep.md", "");
        let stats = reconcile_subtree(&mut t, &mem, &layout(), &path("A")).unwrap();

        assert_eq!(stats.deleted, 1);
        assert!(t.get_node(&path("A")).is_none());
        assert!(t.get_node(&path("Keep")).is_some());
    }

    #[test]
    fn reconcile_keeps_empty_section_whose_folder_exists() {
        let mem = MemBackend::new();
        mem.seed_folder("Library/A");
        let mut t = tree();
        t.add_notes([NoteEntry::scroll(path("A/Gone"), Status::NotStarted)]);
        reconcile_subtree(&mut t, &mem, &layout(), &path("A")).unwrap();

        assert!(t.get_node(&path("A")).is_some());
        assert!(t.get_node(&path("A/Gone")).is_none());
    }

    #[test]
    fn reconcile_leaf_handles_arrival_and_removal() {
        let mem = MemBackend::new();
        let l = layout();
        let mut t = tree();
        mem.seed("Library/A/Note-A.md", "");
        assert!(reconcile_leaf(&mut t, &mem, &l, &VaultPath::parse("Library/A/Note-A.md")).unwrap());
        assert!(t.get_node(&path("A/Note")).is_some());

        mem.trash(&VaultPath::parse("Library/A/Note-A.md")).unwrap();
        assert!(reconcile_leaf(&mut t, &mem, &l, &VaultPath::parse("Library/A/Note-A.md")).unwrap());
        assert!(t.get_node(&path("A/Note")).is_none());
    }

    #[test]
    fn full_diff_maps_to_store_actions_and_codexes() {
        let l = layout();
        let mut t = tree();
        t.add_notes([NoteEntry::scroll(path("A/Old"), Status::NotStarted)]);
        let before = t.snapshot();
        t.add_notes([NoteEntry::scroll(path("S/Note"), Status::NotStarted)]);
        t.set_status(&path("A/Old"), Status::Done);
        let actions = actions_for_diff(&t, &l, &before, &t.snapshot(), DiffMode::Full);

        assert!(actions.contains(&VaultAction::CreateFolder(VaultPath::parse("Library/S"))));
        assert!(actions.iter().any(|a| matches!(a,
            VaultAction::CreateOrUpdateFile { path, .. } if path.to_string() == "Library/S/Note-S.md")));
        assert!(actions.iter().any(|a| matches!(a,
            VaultAction::CreateOrUpdateFile { path, .. } if path.to_string() == "Library/S/__-S.md")));
        assert!(actions.iter().any(|a| matches!(a,
            VaultAction::CreateOrUpdateFile { path, .. } if path.to_string() == "Library/__-Library.md")));
        assert!(actions.iter().any(|a| matches!(a,
            VaultAction::ProcessFile { path, transform: Transform::SetStatus(Status::Done) }
                if path.to_string() == "Library/A/Old-A.md")));
    }

    #[test]
    fn removed_section_trashes_only_its_folder() {
        let l = layout();
        let mut t = tree();
        t.add_notes([NoteEntry::scroll(path("A/B/Note"), Status::NotStarted)]);
        let before = t.snapshot();
        t.delete_notes([&path("A")]);
        let actions = actions_for_diff(&t, &l, &before, &t.snapshot(), DiffMode::Full);

        let trashes: Vec<_> = actions.iter().filter(|a| a.is_trash()).collect();
        assert_eq!(trashes, vec![&VaultAction::TrashFolder(VaultPath::parse("Library/A"))]);
    }

    #[test]
    fn codex_only_mode_writes_nothing_but_codexes() {
        let l = layout();
        let mut t = tree();
        let before = t.snapshot();
        t.add_notes([NoteEntry::scroll(path("A/Note"), Status::Done)]);
        let actions = actions_for_diff(&t, &l, &before, &t.snapshot(), DiffMode::CodexOnly);

        assert!(!actions.is_empty());
        assert!(actions.iter().all(|a| matches!(a,
            VaultAction::CreateOrUpdateFile { path, .. } if l.is_codex_path(path))));
    }

    #[test]
    fn heal_plan_applies_depth_policy_and_quarantine() {
        let mem = MemBackend::new();
        mem.seed("Library/Note-X-Y.md", "");
        mem.seed("Library/I3/I4/Untitled.md", "");
        mem.seed("Library/A/Note-A.md", "");
        mem.seed("Library/README", "");
        let plan = plan_heal(&mem, &layout(), &layout().root_path()).unwrap();

        let renames: Vec<(String, String)> = plan
            .renamed
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        assert!(renames.contains(&(
            "Library/Note-X-Y.md".into(),
            "Library/Y/X/Note-X-Y.md".into()
        )));
        assert!(renames.contains(&(
            "Library/I3/I4/Untitled.md".into(),
            "Library/I3/I4/Untitled-I4-I3.md".into()
        )));
        assert_eq!(renames.len(), 2);
        assert_eq!(plan.quarantined.len(), 1);
        assert_eq!(
            plan.quarantined[0].destination.to_string(),
            "Library/_untracked/README"
        );
    }

    #[test]
    fn heal_plan_renames_unsanitized_folders() {
        let mem = MemBackend::new();
        mem.seed("Library/My Folder/Note-My_Folder.md", "");
        let plan = plan_heal(&mem, &layout(), &layout().root_path()).unwrap();

        assert!(plan.actions.contains(&VaultAction::RenameFolder {
            from: VaultPath::parse("Library/My Folder"),
            to: VaultPath::parse("Library/My_Folder"),
        }));
        assert_eq!(
            plan.destination_of(&VaultPath::parse("Library/My Folder")),
            VaultPath::parse("Library/My_Folder")
        );
    }

    #[test]
    fn heal_plan_quarantines_leaves_whose_target_is_taken() {
        let mem = MemBackend::new();
        mem.seed("Library/A/Note.md", "loose");
        mem.seed("Library/A/Note-A.md", "kept");
        mem.seed("Library/B/Other.md", "");
        mem.seed("Library/B/other-B.md", "");
        let plan = plan_heal(&mem, &layout(), &layout().root_path()).unwrap();

        let quarantined: Vec<String> = plan
            .quarantined
            .iter()
            .map(|q| q.destination.to_string())
            .collect();
        assert!(quarantined.contains(&"Library/_untracked/A/Note.md".to_string()));
        assert!(plan
            .quarantined
            .iter()
            .all(|q| q.reason == canon::QuarantineReason::Collision));
        assert!(plan
            .actions
            .iter()
            .all(|a| a.target().to_string() != "Library/A/Note-A.md"));
    }

    #[test]
    fn heal_plan_never_sends_two_leaves_to_one_path() {
        let mem = MemBackend::new();
        mem.seed("Library/Twin-A-B.md", "first");
        mem.seed("Library/twin-a-b.md", "second");
        let plan = plan_heal(&mem, &layout(), &layout().root_path()).unwrap();

        assert_eq!(plan.renamed.len(), 1);
        assert_eq!(plan.quarantined.len(), 1);
        let targets: HashSet<String> = plan.actions.iter().map(|a| a.target().key()).collect();
        assert_eq!(targets.len(), plan.actions.len());
    }

    #[test]
    fn section_move_renames_folder_then_leaves() {
        let l = layout();
        let mut t = tree();
        t.add_notes([NoteEntry::scroll(path("A/C/Note"), Status::NotStarted)]);
        t.move_node(&path("A"), &path("X/A2"));
        let actions = section_move_actions(&t, &l, &path("A"), &path("X/A2"));

        assert_eq!(
            actions[0],
            VaultAction::RenameFolder {
                from: VaultPath::parse("Library/A"),
                to: VaultPath::parse("Library/X/A2"),
            }
        );
        assert!(actions.contains(&VaultAction::RenameFile {
            from: VaultPath::parse("Library/X/A2/C/Note-C-A.md"),
            to: VaultPath::parse("Library/X/A2/C/Note-C-A2-X.md"),
        }));
        assert!(actions.contains(&VaultAction::TrashFile(VaultPath::parse(
            "Library/X/A2/C/__-C-A.md"
        ))));
        assert!(actions.contains(&VaultAction::TrashFile(VaultPath::parse(
            "Library/X/A2/__-A.md"
        ))));
    }
}
