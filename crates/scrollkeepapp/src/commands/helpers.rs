use crate::error::{LibraryError, Result};
use crate::librarian::Librarian;
use crate::store::backend::VaultBackend;
use crate::tree::{Status, TreeNode, TreePath};

/// Checks that every path names an existing node, returning them deduplicated in order.
pub fn resolve_nodes<B: VaultBackend>(
    lib: &Librarian<B>,
    paths: &[TreePath],
) -> Result<Vec<TreePath>> {
    let mut resolved: Vec<TreePath> = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_root() {
            return Err(LibraryError::Api(
                "The library root cannot be targeted directly".to_string(),
            ));
        }
        if lib.tree().get_node(path).is_none() {
            return Err(LibraryError::Api(format!("Note {} not found", path)));
        }
        if !resolved.contains(path) {
            resolved.push(path.clone());
        }
    }
    Ok(resolved)
}

pub fn status_name(status: Status) -> &'static str {
    match status {
        Status::Done => "done",
        Status::NotStarted => "not started",
    }
}

pub fn kind_name(node: &TreeNode) -> &'static str {
    match node {
        TreeNode::Section(_) => "section",
        TreeNode::Scroll(_) => "scroll",
        TreeNode::File(_) => "file",
    }
}
