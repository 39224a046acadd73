//! # Note Commands
//!
//! - [`add`]: create empty scrolls, materializing their sections
//! - [`remove`]: trash leaves or whole sections
//! - [`move_node`]: move or rename a leaf or a section

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LibraryError, Result};
use crate::librarian::Librarian;
use crate::store::backend::VaultBackend;
use crate::tree::{NoteEntry, Status, TreeNode, TreePath};

use super::helpers::{kind_name, resolve_nodes};

pub fn add<B: VaultBackend>(lib: &mut Librarian<B>, paths: &[TreePath]) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut entries = Vec::new();

    for path in paths {
        if path.is_root() {
            return Err(LibraryError::Api("A note needs a name".to_string()));
        }
        if let Some(node) = lib.tree().get_node(path) {
            result.add_message(CmdMessage::info(format!(
                "{} already exists as a {}",
                path,
                kind_name(node)
            )));
            continue;
        }
        let parent = path.parent().unwrap_or_default();
        let nearest = lib.tree().get_nearest_section(&parent);
        let blocked = parent
            .parts()
            .iter()
            .enumerate()
            .skip(nearest.depth())
            .map(|(i, _)| TreePath::new(parent.parts()[..=i].to_vec()))
            .any(|ancestor| lib.tree().get_node(&ancestor).is_some());
        if blocked {
            return Err(LibraryError::Api(format!(
                "Cannot add {}: an ancestor is not a section",
                path
            )));
        }
        if !entries.iter().any(|e: &NoteEntry| e.path() == path) {
            entries.push(NoteEntry::scroll(path.clone(), Status::NotStarted));
        }
    }
    if entries.is_empty() {
        return Ok(result);
    }

    let added: Vec<TreePath> = entries.iter().map(|e| e.path().clone()).collect();
    let (_, report) = lib.add_notes(entries)?;
    for path in &added {
        result.add_message(CmdMessage::success(format!("Added {}", path)));
    }
    result.add_dispatch_report(&report);
    Ok(result.with_affected_nodes(added))
}

pub fn remove<B: VaultBackend>(lib: &mut Librarian<B>, paths: &[TreePath]) -> Result<CmdResult> {
    let resolved = resolve_nodes(lib, paths)?;
    let mut result = CmdResult::default();

    let (_, report) = lib.delete_notes(&resolved)?;
    for path in &resolved {
        result.add_message(CmdMessage::success(format!("Removed {}", path)));
    }
    result.add_dispatch_report(&report);
    Ok(result.with_affected_nodes(resolved))
}

/// Moves `from` to `to`. When `to` is an existing section, `from` moves into it.
pub fn move_node<B: VaultBackend>(
    lib: &mut Librarian<B>,
    from: &TreePath,
    to: &TreePath,
) -> Result<CmdResult> {
    resolve_nodes(lib, std::slice::from_ref(from))?;
    let destination = match (lib.tree().get_node(to), from.name()) {
        (Some(TreeNode::Section(_)), Some(name)) => to.child(name.clone()),
        _ => to.clone(),
    };
    if destination.is_root() || destination.starts_with(from) {
        return Err(LibraryError::Api(format!(
            "Cannot move {} into itself",
            from
        )));
    }
    if lib.tree().get_node(&destination).is_some() {
        return Err(LibraryError::Api(format!("{} already exists", destination)));
    }

    let mut result = CmdResult::default();
    let (moved, report) = lib.move_notes(from, &destination)?;
    if !moved {
        return Err(LibraryError::Api(format!(
            "Cannot move {} to {}",
            from, destination
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Moved {} -> {}",
        from, destination
    )));
    result.add_dispatch_report(&report);
    Ok(result.with_affected_nodes(vec![destination]))
}
