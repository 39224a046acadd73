//! # Vault Paths and Library Layout
//!
//! A [`VaultPath`] is a physical, store-relative location as the store reports it:
//! raw segments, possibly unsanitized, possibly in the wrong case. A [`TreePath`] is a
//! logical location in the library. [`LibraryLayout`] maps between the two.
//!
//! ```text
//! <vault>/
//!   Library/                     root section
//!     __-Library.md              root codex
//!     A/
//!       __-A.md                  codex of A
//!       Note-A.md                scroll A/Note
//!       B/
//!         __-B-A.md              codex of A/B
//!         photo-B-A.png          file A/B/photo
//!     _untracked/                quarantine
//! ```

use crate::codec::shape::LeafBasename;
use crate::codec::suffix::{self, SplitBasename};
use crate::codec::CODEX_TOKEN;
use crate::config::LibraryConfig;
use crate::error::{LibraryError, Result};
use crate::names::{sanitize, NodeName};
use crate::tree::{NodeKind, TreePath};
use std::fmt;

/// A store-relative path, `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VaultPath(Vec<String>);

impl VaultPath {
    pub fn new(parts: Vec<String>) -> Self {
        Self(parts)
    }

    /// Splits on `/` and `\`, ignoring empty segments.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(['/', '\\'])
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn basename(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<VaultPath> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn join(&self, segment: impl Into<String>) -> VaultPath {
        let mut parts = self.0.clone();
        parts.push(segment.into());
        Self(parts)
    }

    pub fn starts_with(&self, prefix: &VaultPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Like [`VaultPath::starts_with`], comparing segments case-insensitively.
    pub fn starts_with_ignore_case(&self, prefix: &VaultPath) -> bool {
        prefix.0.len() <= self.0.len()
            && prefix
                .0
                .iter()
                .zip(&self.0)
                .all(|(a, b)| a.to_lowercase() == b.to_lowercase())
    }

    /// Rewrites the `from` prefix of this path to `to`.
    pub fn rebase(&self, from: &VaultPath, to: &VaultPath) -> Option<VaultPath> {
        if !self.starts_with(from) {
            return None;
        }
        let mut parts = to.0.clone();
        parts.extend(self.0[from.0.len()..].iter().cloned());
        Some(Self(parts))
    }

    pub fn eq_ignore_case(&self, other: &VaultPath) -> bool {
        self.0.len() == other.0.len() && self.starts_with_ignore_case(other)
    }

    /// Lowercased string form, used as a case-insensitive key.
    pub fn key(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for VaultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Where the library lives inside the vault and how its documents are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLayout {
    pub root: NodeName,
    pub scroll_ext: String,
    pub untracked: String,
}

impl LibraryLayout {
    pub fn new(root: NodeName, scroll_ext: impl Into<String>, untracked: impl Into<String>) -> Self {
        Self {
            root,
            scroll_ext: scroll_ext.into(),
            untracked: untracked.into(),
        }
    }

    pub fn from_config(config: &LibraryConfig) -> Result<Self> {
        let root = NodeName::parse(&config.library_root).map_err(|e| {
            LibraryError::Config(format!("library_root '{}': {}", config.library_root, e))
        })?;
        let scroll_ext = config.scroll_ext();
        if scroll_ext.is_empty() || scroll_ext.contains(['.', '/', '\\']) {
            return Err(LibraryError::Config(format!(
                "scroll_ext '{}' must be a bare extension",
                config.scroll_ext
            )));
        }
        if config.untracked_folder.is_empty() || config.untracked_folder.contains(['/', '\\']) {
            return Err(LibraryError::Config(format!(
                "untracked_folder '{}' must be a single folder name",
                config.untracked_folder
            )));
        }
        Ok(Self::new(root, scroll_ext, &config.untracked_folder))
    }

    pub fn root_path(&self) -> VaultPath {
        VaultPath::new(vec![self.root.to_string()])
    }

    pub fn untracked_path(&self) -> VaultPath {
        self.root_path().join(self.untracked.clone())
    }

    pub fn folder_path(&self, section: &TreePath) -> VaultPath {
        let mut parts = vec![self.root.to_string()];
        parts.extend(section.parts().iter().map(NodeName::to_string));
        VaultPath::new(parts)
    }

    /// Canonical basename of a leaf. `extension` is `None` for scrolls.
    pub fn leaf_basename(&self, leaf: &TreePath, extension: Option<&str>) -> Option<String> {
        let core = leaf.name()?.clone();
        let chain = leaf.parent().unwrap_or_default().suffix_chain();
        let stem = suffix::encode(&SplitBasename::new(core, chain));
        Some(format!("{}.{}", stem, extension.unwrap_or(&self.scroll_ext)))
    }

    pub fn leaf_path(&self, leaf: &TreePath, extension: Option<&str>) -> Option<VaultPath> {
        let basename = self.leaf_basename(leaf, extension)?;
        let parent = leaf.parent()?;
        Some(self.folder_path(&parent).join(basename))
    }

    /// Ancestor chain a codex basename carries: the section's chain, or the root name.
    pub fn codex_chain(&self, section: &TreePath) -> Vec<NodeName> {
        if section.is_root() {
            vec![self.root.clone()]
        } else {
            section.suffix_chain()
        }
    }

    /// Codex basename without extension, the form used in codex links.
    pub fn codex_stem(&self, section: &TreePath) -> String {
        suffix::join_tokens(
            std::iter::once(CODEX_TOKEN)
                .chain(self.codex_chain(section).iter().map(NodeName::as_str)),
        )
    }

    pub fn codex_basename(&self, section: &TreePath) -> String {
        format!("{}.{}", self.codex_stem(section), self.scroll_ext)
    }

    pub fn codex_path(&self, section: &TreePath) -> VaultPath {
        self.folder_path(section).join(self.codex_basename(section))
    }

    pub fn is_codex_path(&self, path: &VaultPath) -> bool {
        path.basename()
            .and_then(|b| LeafBasename::parse(b, &self.scroll_ext).ok())
            .is_some_and(|leaf| leaf.kind() == NodeKind::Codex)
    }

    pub fn in_library(&self, path: &VaultPath) -> bool {
        path.starts_with_ignore_case(&self.root_path())
    }

    pub fn is_untracked(&self, path: &VaultPath) -> bool {
        path.starts_with_ignore_case(&self.untracked_path())
    }

    /// Folder segments between the library root and `path` (exclusive of `path` itself
    /// when it is a leaf). `None` when `path` lies outside the library.
    pub fn relative_folders<'a>(&self, path: &'a VaultPath) -> Option<&'a [String]> {
        if !self.in_library(path) || path.parts().len() < 2 {
            return None;
        }
        Some(&path.parts()[1..path.parts().len() - 1])
    }

    /// Logical section for a physical folder, sanitizing each segment.
    pub fn section_of_folder(&self, folder: &VaultPath) -> Option<TreePath> {
        if !self.in_library(folder) {
            return None;
        }
        folder.parts()[1..]
            .iter()
            .map(|p| sanitize(p).ok())
            .collect::<Option<Vec<_>>>()
            .map(TreePath::new)
    }

    /// Tree identity of a canonically placed leaf: the folder chain plus the core name.
    /// Returns `None` for codexes, quarantined or misplaced leaves.
    pub fn locate_leaf(&self, path: &VaultPath) -> Option<(TreePath, LeafBasename)> {
        if self.is_untracked(path) {
            return None;
        }
        let folders = self.relative_folders(path)?;
        let leaf = LeafBasename::parse(path.basename()?, &self.scroll_ext).ok()?;
        if leaf.kind() == NodeKind::Codex {
            return None;
        }
        let section = folders
            .iter()
            .map(|f| NodeName::parse(f).ok())
            .collect::<Option<Vec<_>>>()
            .map(TreePath::new)?;
        let expected = section.suffix_chain();
        let matches = expected.len() == leaf.suffix().len()
            && expected
                .iter()
                .zip(leaf.suffix())
                .all(|(a, b)| a.eq_ignore_case(b.as_str()));
        if !matches {
            return None;
        }
        let core = leaf.core_name()?;
        Some((section.child(core), leaf))
    }
}

#[cfg(test)]
pub(crate) fn layout() -> LibraryLayout {
    LibraryLayout::new(crate::names::name("Library"), "md", "_untracked")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::path;

    #[test]
    fn leaf_paths_carry_nearest_first_suffix() {
        let l = layout();
        assert_eq!(
            l.leaf_path(&path("A/B/Note"), None).unwrap().to_string(),
            "Library/A/B/Note-B-A.md"
        );
        assert_eq!(
            l.leaf_path(&path("A/photo"), Some("png")).unwrap().to_string(),
            "Library/A/photo-A.png"
        );
        assert_eq!(
            l.leaf_path(&path("Note"), None).unwrap().to_string(),
            "Library/Note.md"
        );
    }

    #[test]
    fn root_codex_is_suffixed_with_root_name() {
        let l = layout();
        assert_eq!(l.codex_path(&TreePath::root()).to_string(), "Library/__-Library.md");
        assert_eq!(l.codex_path(&path("A/B")).to_string(), "Library/A/B/__-B-A.md");
        assert_eq!(l.codex_stem(&path("S")), "__-S");
    }

    #[test]
    fn locate_leaf_accepts_canonical_and_case_variants() {
        let l = layout();
        let (tree_path, _) = l
            .locate_leaf(&VaultPath::parse("Library/A/B/Note-b-a.md"))
            .unwrap();
        assert_eq!(tree_path, path("A/B/Note"));
    }

    #[test]
    fn locate_leaf_rejects_misplaced_codex_and_untracked() {
        let l = layout();
        assert!(l.locate_leaf(&VaultPath::parse("Library/A/Note-X.md")).is_none());
        assert!(l.locate_leaf(&VaultPath::parse("Library/A/__-A.md")).is_none());
        assert!(l
            .locate_leaf(&VaultPath::parse("Library/_untracked/bad name.md"))
            .is_none());
        assert!(l.locate_leaf(&VaultPath::parse("Other/Note.md")).is_none());
    }

    #[test]
    fn rebase_moves_prefix() {
        let p = VaultPath::parse("Library/A/B/Note-B-A.md");
        let moved = p
            .rebase(&VaultPath::parse("Library/A"), &VaultPath::parse("Library/X"))
            .unwrap();
        assert_eq!(moved.to_string(), "Library/X/B/Note-B-A.md");
    }

    #[test]
    fn layout_rejects_unsanitized_root() {
        let mut config = LibraryConfig::default();
        config.library_root = "My Library".to_string();
        assert!(LibraryLayout::from_config(&config).is_err());
    }
}
