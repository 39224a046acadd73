//! Batch collapsing and ordering.
//!
//! Rules, applied in arrival order:
//!
//! | Sequence on one path | Becomes |
//! |----------------------|---------|
//! | rename `a → a` | dropped |
//! | write `p`, write `p` | the later write |
//! | create `p`, rename `p → q` | create `q` |
//! | update existing `p`, rename `p → q` | both, the update runs first |
//! | rename `a → b`, rename `b → c` | rename `a → c` |
//! | create or update `p`, trash `p` | trash `p` |
//! | rename folder `f → g`, then any file action under `f` | the file action rebased under `g` |
//!
//! [`sort`] then orders the survivors by weight: folder creates, folder renames, file
//! creates, file renames, content updates, trashes.

use crate::actions::VaultAction;
use crate::path::VaultPath;

/// `exists` reports whether a path is already in the store; only a write to a path
/// that is not there yet counts as a create.
pub fn collapse(
    actions: Vec<VaultAction>,
    exists: impl Fn(&VaultPath) -> bool,
) -> Vec<VaultAction> {
    let actions = rebase_under_folder_renames(actions);
    let mut out: Vec<VaultAction> = Vec::with_capacity(actions.len());

    for action in actions {
        match action {
            VaultAction::RenameFile { ref from, ref to }
            | VaultAction::RenameFolder { ref from, ref to } => {
                let is_folder = matches!(action, VaultAction::RenameFolder { .. });
                if from == to {
                    continue;
                }
                if let Some(prev) = out.iter_mut().rev().find(|a| a.target() == from) {
                    match prev {
                        VaultAction::CreateOrUpdateFile { path, .. }
                            if !is_folder && !exists(from) =>
                        {
                            *path = to.clone();
                            continue;
                        }
                        VaultAction::CreateFolder(path) if is_folder => {
                            *path = to.clone();
                            continue;
                        }
                        VaultAction::RenameFile { from: first, to: mid }
                        | VaultAction::RenameFolder { from: first, to: mid }
                            if mid == from =>
                        {
                            if first == to {
                                let first = first.clone();
                                out.retain(|a| !is_rename(a, &first, from));
                            } else {
                                *mid = to.clone();
                            }
                            continue;
                        }
                        _ => {}
                    }
                }
                out.push(action);
            }
            VaultAction::CreateOrUpdateFile { ref path, .. } => {
                out.retain(|a| {
                    !matches!(a, VaultAction::CreateOrUpdateFile { path: p, .. } if p == path)
                });
                out.push(action);
            }
            VaultAction::TrashFile(ref path) => {
                out.retain(|a| {
                    !matches!(
                        a,
                        VaultAction::CreateOrUpdateFile { path: p, .. }
                            | VaultAction::ProcessFile { path: p, .. } if p == path
                    )
                });
                out.push(action);
            }
            VaultAction::TrashFolder(ref path) => {
                out.retain(|a| !matches!(a, VaultAction::CreateFolder(p) if p == path));
                out.push(action);
            }
            VaultAction::CreateFolder(ref path) => {
                if !out
                    .iter()
                    .any(|a| matches!(a, VaultAction::CreateFolder(p) if p == path))
                {
                    out.push(action);
                }
            }
            VaultAction::ProcessFile { .. } => out.push(action),
        }
    }
    out
}

fn is_rename(action: &VaultAction, from: &VaultPath, to: &VaultPath) -> bool {
    matches!(
        action,
        VaultAction::RenameFile { from: f, to: t } | VaultAction::RenameFolder { from: f, to: t }
            if f == from && t == to
    )
}

/// Rewrites pre-rename paths of file actions that follow a folder rename.
fn rebase_under_folder_renames(actions: Vec<VaultAction>) -> Vec<VaultAction> {
    let mut renames: Vec<(VaultPath, VaultPath)> = Vec::new();
    let mut out = Vec::with_capacity(actions.len());

    for action in actions {
        let rebase = |p: &VaultPath| -> VaultPath {
            renames
                .iter()
                .rev()
                .find_map(|(from, to)| p.rebase(from, to))
                .unwrap_or_else(|| p.clone())
        };
        let action = match action {
            VaultAction::RenameFolder { from, to } => {
                let from = rebase(&from);
                renames.push((from.clone(), to.clone()));
                VaultAction::RenameFolder { from, to }
            }
            VaultAction::RenameFile { from, to } => VaultAction::RenameFile {
                from: rebase(&from),
                to,
            },
            VaultAction::CreateOrUpdateFile { path, content } => VaultAction::CreateOrUpdateFile {
                path: rebase(&path),
                content,
            },
            VaultAction::ProcessFile { path, transform } => VaultAction::ProcessFile {
                path: rebase(&path),
                transform,
            },
            VaultAction::TrashFile(path) => VaultAction::TrashFile(rebase(&path)),
            other => other,
        };
        out.push(action);
    }
    out
}

/// Stable sort by weight; folder creates and renames go parents first.
pub fn sort(actions: &mut [VaultAction]) {
    actions.sort_by_key(|a| {
        let depth = match a {
            VaultAction::CreateFolder(p) | VaultAction::RenameFolder { from: p, .. } => {
                p.parts().len()
            }
            _ => 0,
        };
        (a.weight(), depth)
    });
}
