use crate::commands::{CmdResult, ListedNode};
use crate::error::Result;
use crate::librarian::Librarian;
use crate::store::backend::VaultBackend;
use crate::tree::{LibraryTree, TreeNode, TreePath};

/// Lists the tree depth-first in codex order, optionally below `under`.
pub fn run<B: VaultBackend>(lib: &Librarian<B>, under: Option<&TreePath>) -> Result<CmdResult> {
    let start = under.cloned().unwrap_or_default();
    if lib.tree().get_node(&start).is_none() {
        return Err(crate::error::LibraryError::Api(format!(
            "Section {} not found",
            start
        )));
    }
    let snapshot = lib.snapshot();
    let mut listed = Vec::new();
    walk(lib.tree(), &start, 0, &mut |path, node, depth| {
        let status = match node {
            TreeNode::File(_) => None,
            _ => Some(lib.tree().aggregate_status(path)),
        };
        let locator = snapshot
            .locator(path)
            .map(|l| l.to_string())
            .unwrap_or_default();
        listed.push(ListedNode {
            path: path.clone(),
            locator,
            kind: node.kind(),
            status,
            depth,
        });
    });
    Ok(CmdResult::default().with_listed_nodes(listed))
}

fn walk(
    tree: &LibraryTree,
    section: &TreePath,
    depth: usize,
    visit: &mut dyn FnMut(&TreePath, &TreeNode, usize),
) {
    for (path, node) in tree.children(section) {
        visit(&path, node, depth);
        if node.is_section() {
            walk(tree, &path, depth + 1, visit);
        }
    }
}

/// The current snapshot keyed by locator string, as pretty JSON.
pub fn snapshot_json<B: VaultBackend>(lib: &Librarian<B>) -> Result<String> {
    Ok(serde_json::to_string_pretty(
        &lib.snapshot().to_locator_map(),
    )?)
}
