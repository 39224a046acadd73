//! Store actions: the only way the library writes to the vault.

use crate::error::Result;
use crate::frontmatter;
use crate::path::VaultPath;
use crate::tree::Status;
use std::fmt;

/// A content rewrite applied to an existing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    SetStatus(Status),
    Replace(String),
}

impl Transform {
    pub fn apply(&self, content: &str) -> Result<String> {
        match self {
            Transform::SetStatus(status) => frontmatter::set_status(content, *status),
            Transform::Replace(text) => Ok(text.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultAction {
    CreateFolder(VaultPath),
    RenameFolder { from: VaultPath, to: VaultPath },
    TrashFolder(VaultPath),
    CreateOrUpdateFile { path: VaultPath, content: String },
    RenameFile { from: VaultPath, to: VaultPath },
    TrashFile(VaultPath),
    ProcessFile { path: VaultPath, transform: Transform },
}

impl VaultAction {
    /// Destination of the action: the path that exists afterwards, if any.
    pub fn target(&self) -> &VaultPath {
        match self {
            VaultAction::CreateFolder(path)
            | VaultAction::TrashFolder(path)
            | VaultAction::TrashFile(path)
            | VaultAction::CreateOrUpdateFile { path, .. }
            | VaultAction::ProcessFile { path, .. } => path,
            VaultAction::RenameFolder { to, .. } | VaultAction::RenameFile { to, .. } => to,
        }
    }

    /// Every path the action touches.
    pub fn paths(&self) -> Vec<&VaultPath> {
        match self {
            VaultAction::RenameFolder { from, to } | VaultAction::RenameFile { from, to } => {
                vec![from, to]
            }
            other => vec![other.target()],
        }
    }

    pub fn is_trash(&self) -> bool {
        matches!(self, VaultAction::TrashFolder(_) | VaultAction::TrashFile(_))
    }

    /// Execution weight: lower runs first.
    pub fn weight(&self) -> u8 {
        match self {
            VaultAction::CreateFolder(_) => 0,
            VaultAction::RenameFolder { .. } => 1,
            VaultAction::CreateOrUpdateFile { .. } => 2,
            VaultAction::RenameFile { .. } => 3,
            VaultAction::ProcessFile { .. } => 4,
            VaultAction::TrashFile(_) => 5,
            VaultAction::TrashFolder(_) => 6,
        }
    }
}

impl fmt::Display for VaultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultAction::CreateFolder(p) => write!(f, "create folder {}", p),
            VaultAction::RenameFolder { from, to } => write!(f, "rename folder {} -> {}", from, to),
            VaultAction::TrashFolder(p) => write!(f, "trash folder {}", p),
            VaultAction::CreateOrUpdateFile { path, .. } => write!(f, "write {}", path),
            VaultAction::RenameFile { from, to } => write!(f, "rename {} -> {}", from, to),
            VaultAction::TrashFile(p) => write!(f, "trash {}", p),
            VaultAction::ProcessFile { path, .. } => write!(f, "update {}", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_order_folders_before_files_before_trash() {
        let p = VaultPath::parse("Library/A");
        let actions = [
            VaultAction::CreateFolder(p.clone()),
            VaultAction::RenameFolder {
                from: p.clone(),
                to: p.clone(),
            },
            VaultAction::CreateOrUpdateFile {
                path: p.clone(),
                content: String::new(),
            },
            VaultAction::RenameFile {
                from: p.clone(),
                to: p.clone(),
            },
            VaultAction::ProcessFile {
                path: p.clone(),
                transform: Transform::Replace(String::new()),
            },
            VaultAction::TrashFile(p.clone()),
            VaultAction::TrashFolder(p),
        ];
        let weights: Vec<u8> = actions.iter().map(VaultAction::weight).collect();
        let mut sorted = weights.clone();
        sorted.sort();
        assert_eq!(weights, sorted);
    }

    #[test]
    fn set_status_transform_rewrites_front_matter() {
        let out = Transform::SetStatus(Status::Done).apply("body\n").unwrap();
        assert_eq!(frontmatter::read_status(&out), Status::Done);
    }
}
