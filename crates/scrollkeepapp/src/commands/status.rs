//! # Status Commands
//!
//! - [`complete`]: marks scrolls (or every scroll under a section) done
//! - [`reopen`]: sets them back to not started

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::librarian::Librarian;
use crate::store::backend::VaultBackend;
use crate::tree::{Status, TreeNode, TreePath};

use super::helpers::{resolve_nodes, status_name};

pub fn complete<B: VaultBackend>(lib: &mut Librarian<B>, paths: &[TreePath]) -> Result<CmdResult> {
    set_status(lib, paths, Status::Done)
}

pub fn reopen<B: VaultBackend>(lib: &mut Librarian<B>, paths: &[TreePath]) -> Result<CmdResult> {
    set_status(lib, paths, Status::NotStarted)
}

fn set_status<B: VaultBackend>(
    lib: &mut Librarian<B>,
    paths: &[TreePath],
    status: Status,
) -> Result<CmdResult> {
    let resolved = resolve_nodes(lib, paths)?;
    let mut result = CmdResult::default();

    let mut targets = Vec::new();
    for path in resolved {
        let current = match lib.tree().get_node(&path) {
            Some(TreeNode::File(_)) => {
                result.add_message(CmdMessage::warning(format!(
                    "{} is a file and has no status",
                    path
                )));
                continue;
            }
            _ => lib.tree().aggregate_status(&path),
        };
        if current == status {
            result.add_message(CmdMessage::info(format!(
                "{} is already {}",
                path,
                status_name(status)
            )));
            continue;
        }
        targets.push(path);
    }
    if targets.is_empty() {
        return Ok(result);
    }

    let (_, report) = lib.set_status(&targets, status)?;
    for path in &targets {
        result.add_message(CmdMessage::success(format!(
            "{} marked {}",
            path,
            status_name(status)
        )));
    }
    result.add_dispatch_report(&report);
    Ok(result.with_affected_nodes(targets))
}
