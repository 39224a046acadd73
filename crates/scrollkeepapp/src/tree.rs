//! # Library Tree
//!
//! The in-memory model of the library: sections (folders) containing scrolls (documents),
//! files (opaque attachments) and further sections.
//!
//! ## Ownership
//!
//! The tree owns every node in a flat index keyed by [`TreePath`]. A section lists its
//! children by name, in insertion order, and nothing points back up: a node's parent is
//! derived from its path. This gives O(1) lookup without reference cycles.
//!
//! ## Lifecycle
//!
//! Built once from a full store read, mutated in place by [`LibraryTree::add_notes`],
//! [`LibraryTree::delete_notes`], [`LibraryTree::set_status`] and
//! [`LibraryTree::move_node`], and frozen with [`LibraryTree::snapshot`] for diffing.
//!
//! ## Status Aggregation
//!
//! Only scrolls store a status. A section's status is computed on read: `Done` when it
//! has at least one scroll underneath and every one of them is `Done`. Files never count.
//!
//! Codexes are not part of the tree; they are derived from it.

use crate::codec::locator::NodeLocator;
use crate::names::{sanitize, NameError, NodeName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Section,
    Scroll,
    File,
    Codex,
}

impl NodeKind {
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Section => "section",
            NodeKind::Scroll => "scroll",
            NodeKind::File => "file",
            NodeKind::Codex => "codex",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "section" => Some(NodeKind::Section),
            "scroll" => Some(NodeKind::Scroll),
            "file" => Some(NodeKind::File),
            "codex" => Some(NodeKind::Codex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    NotStarted,
    Done,
}

impl Status {
    pub fn is_done(self) -> bool {
        self == Status::Done
    }
}

/// Ancestry of a node, root-exclusive. The empty path is the library root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct TreePath(Vec<NodeName>);

impl TreePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(parts: Vec<NodeName>) -> Self {
        Self(parts)
    }

    /// Parses a user-facing `A/B/Note` string, sanitizing every segment.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        raw.split('/')
            .filter(|s| !s.trim().is_empty())
            .map(sanitize)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn parts(&self) -> &[NodeName] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn name(&self) -> Option<&NodeName> {
        self.0.last()
    }

    pub fn parent(&self) -> Option<TreePath> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, name: NodeName) -> TreePath {
        let mut parts = self.0.clone();
        parts.push(name);
        Self(parts)
    }

    pub fn starts_with(&self, prefix: &TreePath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Ancestor chain nearest first, excluding the path itself and the root.
    pub fn suffix_chain(&self) -> Vec<NodeName> {
        self.0.iter().rev().cloned().collect()
    }

    /// Rewrites the `from` prefix of this path to `to`.
    pub fn rebase(&self, from: &TreePath, to: &TreePath) -> Option<TreePath> {
        let rest = self.0.strip_prefix(from.0.as_slice())?;
        let mut parts = to.0.clone();
        parts.extend(rest.iter().cloned());
        Some(Self(parts))
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(part.as_str())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNode {
    pub name: NodeName,
    pub children: Vec<NodeName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollNode {
    pub name: NodeName,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub name: NodeName,
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Section(SectionNode),
    Scroll(ScrollNode),
    File(FileNode),
}

impl TreeNode {
    pub fn name(&self) -> &NodeName {
        match self {
            TreeNode::Section(s) => &s.name,
            TreeNode::Scroll(s) => &s.name,
            TreeNode::File(f) => &f.name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::Section(_) => NodeKind::Section,
            TreeNode::Scroll(_) => NodeKind::Scroll,
            TreeNode::File(_) => NodeKind::File,
        }
    }

    /// Stored status. Only scrolls have one.
    pub fn status(&self) -> Option<Status> {
        match self {
            TreeNode::Scroll(s) => Some(s.status),
            _ => None,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match self {
            TreeNode::File(f) => Some(&f.extension),
            _ => None,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, TreeNode::Section(_))
    }
}

/// A leaf to insert or update with [`LibraryTree::add_notes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEntry {
    Scroll { path: TreePath, status: Status },
    File { path: TreePath, extension: String },
}

impl NoteEntry {
    pub fn scroll(path: TreePath, status: Status) -> Self {
        NoteEntry::Scroll { path, status }
    }

    pub fn file(path: TreePath, extension: impl Into<String>) -> Self {
        NoteEntry::File {
            path,
            extension: extension.into(),
        }
    }

    pub fn path(&self) -> &TreePath {
        match self {
            NoteEntry::Scroll { path, .. } | NoteEntry::File { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub kind: NodeKind,
    pub status: Status,
}

/// Immutable, flat view of a tree at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<TreePath, (SnapshotEntry, Option<String>)>,
}

impl Snapshot {
    pub fn get(&self, path: &TreePath) -> Option<SnapshotEntry> {
        self.entries.get(path).map(|(entry, _)| *entry)
    }

    pub fn extension(&self, path: &TreePath) -> Option<&str> {
        self.entries.get(path).and_then(|(_, ext)| ext.as_deref())
    }

    pub fn contains(&self, path: &TreePath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TreePath, SnapshotEntry)> {
        self.entries.iter().map(|(path, (entry, _))| (path, *entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn locator(&self, path: &TreePath) -> Option<NodeLocator> {
        let (entry, ext) = self.entries.get(path)?;
        Some(NodeLocator::new(entry.kind, path.clone(), ext.clone()))
    }

    /// Keyed by locator string, for serialization.
    pub fn to_locator_map(&self) -> BTreeMap<String, SnapshotEntry> {
        self.entries
            .iter()
            .map(|(path, (entry, ext))| {
                let locator = NodeLocator::new(entry.kind, path.clone(), ext.clone());
                (locator.to_string(), *entry)
            })
            .collect()
    }
}

pub struct LibraryTree {
    root_name: NodeName,
    nodes: HashMap<TreePath, TreeNode>,
}

impl LibraryTree {
    pub fn new(root_name: NodeName) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            TreePath::root(),
            TreeNode::Section(SectionNode {
                name: root_name.clone(),
                children: Vec::new(),
            }),
        );
        Self { root_name, nodes }
    }

    pub fn root_name(&self) -> &NodeName {
        &self.root_name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn get_node(&self, path: &TreePath) -> Option<&TreeNode> {
        self.nodes.get(path)
    }

    /// Walks up from `path` to the first existing section. The root always qualifies.
    pub fn get_nearest_section(&self, path: &TreePath) -> TreePath {
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            if matches!(self.nodes.get(&candidate), Some(TreeNode::Section(_))) {
                return candidate;
            }
            current = candidate.parent();
        }
        TreePath::root()
    }

    pub fn get_all_section_paths(&self) -> Vec<TreePath> {
        let mut paths: Vec<TreePath> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.is_section())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Children of a section in insertion order. Empty for leaves and missing paths.
    pub fn children(&self, path: &TreePath) -> Vec<(TreePath, &TreeNode)> {
        let Some(TreeNode::Section(section)) = self.nodes.get(path) else {
            return Vec::new();
        };
        section
            .children
            .iter()
            .filter_map(|name| {
                let child = path.child(name.clone());
                self.nodes.get(&child).map(|node| (child, node))
            })
            .collect()
    }

    /// Every leaf at or below `path`.
    pub fn leaves_under(&self, path: &TreePath) -> Vec<TreePath> {
        let mut leaves: Vec<TreePath> = self
            .nodes
            .iter()
            .filter(|(p, node)| !node.is_section() && p.starts_with(path))
            .map(|(p, _)| p.clone())
            .collect();
        leaves.sort();
        leaves
    }

    /// Inserts or updates leaves, materializing missing ancestor sections.
    /// Returns how many entries were applied; conflicting entries are skipped.
    pub fn add_notes(&mut self, entries: impl IntoIterator<Item = NoteEntry>) -> usize {
        let mut applied = 0;
        for entry in entries {
            let path = entry.path().clone();
            let Some(name) = path.name().cloned() else {
                warn!("Cannot add a note at the library root");
                continue;
            };
            let parent = path.parent().unwrap_or_default();
            if !self.ensure_sections(&parent) {
                warn!(path = %path, "Ancestor of note is not a section; skipping");
                continue;
            }

            let node = match entry {
                NoteEntry::Scroll { status, .. } => TreeNode::Scroll(ScrollNode { name, status }),
                NoteEntry::File { extension, .. } => TreeNode::File(FileNode { name, extension }),
            };

            match self.nodes.get_mut(&path) {
                Some(existing) if existing.kind() == node.kind() => *existing = node,
                Some(existing) => {
                    warn!(path = %path, existing = ?existing.kind(), "Name already taken; skipping");
                    continue;
                }
                None => {
                    self.nodes.insert(path.clone(), node);
                    self.link_child(&path);
                }
            }
            applied += 1;
        }
        applied
    }

    /// Removes nodes and, for sections, their whole subtree.
    pub fn delete_notes<'a>(&mut self, paths: impl IntoIterator<Item = &'a TreePath>) -> usize {
        let mut removed = 0;
        for path in paths {
            if path.is_root() || !self.nodes.contains_key(path) {
                continue;
            }
            self.nodes.retain(|p, _| !p.starts_with(path));
            self.unlink_child(path);
            removed += 1;
        }
        removed
    }

    /// Sets the status of a scroll, or of every scroll under a section.
    /// Returns false when nothing at `path` can carry a status.
    pub fn set_status(&mut self, path: &TreePath, status: Status) -> bool {
        match self.nodes.get(path) {
            Some(TreeNode::Scroll(_)) => {
                if let Some(TreeNode::Scroll(scroll)) = self.nodes.get_mut(path) {
                    scroll.status = status;
                }
                true
            }
            Some(TreeNode::Section(_)) => {
                let mut touched = false;
                for (p, node) in self.nodes.iter_mut() {
                    if let TreeNode::Scroll(scroll) = node {
                        if p.starts_with(path) {
                            scroll.status = status;
                            touched = true;
                        }
                    }
                }
                touched
            }
            _ => false,
        }
    }

    /// Moves a node (and its subtree) to `to`, creating missing sections on the way.
    /// Fails when `to` is taken, lies inside `from`, or `from` is missing or the root.
    pub fn move_node(&mut self, from: &TreePath, to: &TreePath) -> bool {
        if from.is_root() || to.is_root() || to.starts_with(from) || self.nodes.contains_key(to) {
            return false;
        }
        if !self.nodes.contains_key(from) {
            return false;
        }
        let parent = to.parent().unwrap_or_default();
        if !self.ensure_sections(&parent) {
            return false;
        }
        let Some(new_name) = to.name().cloned() else {
            return false;
        };

        let moved: Vec<TreePath> = self
            .nodes
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            if let (Some(mut node), Some(new)) = (self.nodes.remove(&old), old.rebase(from, to)) {
                if &old == from {
                    rename_node(&mut node, new_name.clone());
                }
                self.nodes.insert(new, node);
            }
        }
        self.unlink_child(from);
        self.link_child(to);
        true
    }

    /// Removes empty sections from `path` upward, never the root. Stops at the first
    /// section that has children or that `keep` protects.
    pub fn prune_empty_sections(
        &mut self,
        path: &TreePath,
        keep: impl Fn(&TreePath) -> bool,
    ) -> Vec<TreePath> {
        let mut pruned = Vec::new();
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            if candidate.is_root() {
                break;
            }
            match self.nodes.get(&candidate) {
                Some(TreeNode::Section(section))
                    if section.children.is_empty() && !keep(&candidate) =>
                {
                    self.nodes.remove(&candidate);
                    self.unlink_child(&candidate);
                    pruned.push(candidate.clone());
                }
                Some(TreeNode::Section(_)) => break,
                _ => {}
            }
            current = candidate.parent();
        }
        pruned
    }

    /// Stored status for scrolls, aggregate for sections, `NotStarted` otherwise.
    pub fn aggregate_status(&self, path: &TreePath) -> Status {
        match self.nodes.get(path) {
            Some(TreeNode::Scroll(scroll)) => scroll.status,
            Some(TreeNode::Section(_)) => {
                let (total, done) = self.tally(path, &mut None);
                status_from_tally(total, done)
            }
            _ => Status::NotStarted,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut sink = Some(BTreeMap::new());
        self.tally(&TreePath::root(), &mut sink);
        Snapshot {
            entries: sink.unwrap_or_default(),
        }
    }

    /// Counts (scrolls, done scrolls) under `path`, recording snapshot entries when asked.
    fn tally(
        &self,
        path: &TreePath,
        sink: &mut Option<BTreeMap<TreePath, (SnapshotEntry, Option<String>)>>,
    ) -> (usize, usize) {
        let Some(node) = self.nodes.get(path) else {
            return (0, 0);
        };
        let (counts, status) = match node {
            TreeNode::Scroll(scroll) => ((1, usize::from(scroll.status.is_done())), scroll.status),
            TreeNode::File(_) => ((0, 0), Status::NotStarted),
            TreeNode::Section(section) => {
                let mut totals = (0, 0);
                for name in &section.children {
                    let (t, d) = self.tally(&path.child(name.clone()), sink);
                    totals.0 += t;
                    totals.1 += d;
                }
                (totals, status_from_tally(totals.0, totals.1))
            }
        };
        if let Some(entries) = sink.as_mut() {
            entries.insert(
                path.clone(),
                (
                    SnapshotEntry {
                        kind: node.kind(),
                        status,
                    },
                    node.extension().map(str::to_string),
                ),
            );
        }
        counts
    }

    fn ensure_sections(&mut self, path: &TreePath) -> bool {
        let mut current = TreePath::root();
        for part in path.parts() {
            current = current.child(part.clone());
            match self.nodes.get(&current) {
                Some(TreeNode::Section(_)) => {}
                Some(_) => return false,
                None => {
                    self.nodes.insert(
                        current.clone(),
                        TreeNode::Section(SectionNode {
                            name: part.clone(),
                            children: Vec::new(),
                        }),
                    );
                    self.link_child(&current);
                }
            }
        }
        true
    }

    fn link_child(&mut self, path: &TreePath) {
        let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
            return;
        };
        if let Some(TreeNode::Section(section)) = self.nodes.get_mut(&parent) {
            if !section.children.contains(name) {
                section.children.push(name.clone());
            }
        }
    }

    fn unlink_child(&mut self, path: &TreePath) {
        let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
            return;
        };
        if let Some(TreeNode::Section(section)) = self.nodes.get_mut(&parent) {
            section.children.retain(|child| child != name);
        }
    }
}

fn rename_node(node: &mut TreeNode, name: NodeName) {
    match node {
        TreeNode::Section(s) => s.name = name,
        TreeNode::Scroll(s) => s.name = name,
        TreeNode::File(f) => f.name = name,
    }
}

fn status_from_tally(total: usize, done: usize) -> Status {
    if total > 0 && total == done {
        Status::Done
    } else {
        Status::NotStarted
    }
}

#[cfg(test)]
pub(crate) fn path(raw: &str) -> TreePath {
    TreePath::parse(raw).expect("test paths must parse")
}
