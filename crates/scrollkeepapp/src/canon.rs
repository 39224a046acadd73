//! # Path Canonicalizer
//!
//! Given where a leaf physically sits and what its basename says, decide where it
//! should sit. Two signals can disagree:
//!
//! - the **folder chain**: the folders between the library root and the leaf
//! - the **suffix chain**: the ancestry decoded from the basename
//!
//! The caller picks which one wins with an [`Authority`]. The canonicalizer itself is
//! authority-agnostic; [`authority_for`] is the depth policy the reconciler applies:
//!
//! | Leaf position | Authority | Effect |
//! |---------------|-----------|--------|
//! | direct child of the library root | [`Authority::Basename`] | the suffix says where to move it |
//! | nested in a folder | [`Authority::Folder`] | the folder says what the suffix must be |
//!
//! A root-level leaf has no folder context, so its basename is the only placement
//! signal. A nested leaf has already been placed by the user.
//!
//! ## Quarantine
//!
//! A basename that cannot be decoded, even after sanitizing each token, is never
//! guessed at. It is moved into the untracked folder, keeping its relative folders.
//! The heal planner does the same with a leaf whose canonical path is already taken
//! ([`quarantine_collision`]).

use crate::codec::shape::{split_extension, LeafBasename};
use crate::codec::{CODEX_TOKEN, DELIMITER};
use crate::names::{sanitize, NodeName};
use crate::path::{LibraryLayout, VaultPath};
use crate::tree::{NodeKind, TreePath};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    Folder,
    Basename,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalizedFile {
    pub canonical_path: VaultPath,
    pub current_path: VaultPath,
    pub kind: NodeKind,
    /// For codexes, the section the codex indexes.
    pub tree_path: TreePath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineReason {
    Undecodable,
    /// The canonical path already holds another leaf.
    Collision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantinedFile {
    pub current_path: VaultPath,
    pub destination: VaultPath,
    pub reason: QuarantineReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canonicalized {
    Canonical(CanonicalizedFile),
    Quarantined(QuarantinedFile),
}

impl Canonicalized {
    pub fn current_path(&self) -> &VaultPath {
        match self {
            Canonicalized::Canonical(c) => &c.current_path,
            Canonicalized::Quarantined(q) => &q.current_path,
        }
    }

    /// Where the leaf belongs: its canonical path, or its quarantine destination.
    pub fn target_path(&self) -> &VaultPath {
        match self {
            Canonicalized::Canonical(c) => &c.canonical_path,
            Canonicalized::Quarantined(q) => &q.destination,
        }
    }

    /// True when the leaf is already where it belongs.
    pub fn is_settled(&self) -> bool {
        is_canonical(self.current_path(), self.target_path())
    }
}

/// Depth policy: root children trust their basename, nested leaves trust their folder.
pub fn authority_for(layout: &LibraryLayout, current: &VaultPath) -> Authority {
    match layout.relative_folders(current) {
        Some([]) | None => Authority::Basename,
        Some(_) => Authority::Folder,
    }
}

/// Compares two locations ignoring case, which some stores normalize silently.
pub fn is_canonical(current: &VaultPath, canonical: &VaultPath) -> bool {
    current.eq_ignore_case(canonical)
}

pub fn canonicalize(
    layout: &LibraryLayout,
    current: &VaultPath,
    authority: Authority,
) -> Canonicalized {
    let relative: Vec<String> = layout
        .relative_folders(current)
        .map(<[String]>::to_vec)
        .unwrap_or_default();

    if layout.is_untracked(current) {
        return quarantine_in_place(current);
    }

    let Some(basename) = current.basename() else {
        return quarantine(layout, current, &relative);
    };
    let Some(leaf) = decode_leniently(basename, &layout.scroll_ext) else {
        return quarantine(layout, current, &relative);
    };
    let Some(folder_chain) = relative
        .iter()
        .map(|f| sanitize(f).ok())
        .collect::<Option<Vec<NodeName>>>()
    else {
        return quarantine(layout, current, &relative);
    };

    let is_codex = leaf.kind() == NodeKind::Codex;
    let suffix_chain = if is_codex {
        codex_section_chain(layout, leaf.suffix())
    } else {
        strip_redundant_suffix(leaf.suffix(), &folder_chain)
            .into_iter()
            .rev()
            .collect()
    };

    // Root-first chain of the section the leaf belongs to.
    let chain: Vec<NodeName> = match authority {
        Authority::Folder => folder_chain,
        Authority::Basename => suffix_chain,
    };
    let section = TreePath::new(chain);

    let encoded_suffix = if is_codex {
        layout.codex_chain(&section)
    } else {
        section.suffix_chain()
    };
    let canonical_leaf = leaf.with_suffix(encoded_suffix);
    let canonical_path = layout.folder_path(&section).join(canonical_leaf.encode());

    let tree_path = match canonical_leaf.core_name() {
        Some(core) if !is_codex => section.child(core),
        _ => section,
    };

    Canonicalized::Canonical(CanonicalizedFile {
        canonical_path,
        current_path: current.clone(),
        kind: canonical_leaf.kind(),
        tree_path,
    })
}

/// Removes leading repetitions of the parent's name from a nearest-first suffix when
/// the folder chain does not repeat that name as often.
///
/// `Note-A-A` inside `Library/A/` becomes `Note-A`; inside `Library/A/A/` it stays.
pub fn strip_redundant_suffix(suffix: &[NodeName], folder_chain: &[NodeName]) -> Vec<NodeName> {
    let Some(parent) = folder_chain.last() else {
        return suffix.to_vec();
    };
    let same = |n: &NodeName| n.eq_ignore_case(parent.as_str());
    let in_suffix = suffix.iter().take_while(|n| same(n)).count();
    let in_folders = folder_chain.iter().rev().take_while(|n| same(n)).count();
    let excess = in_suffix.saturating_sub(in_folders);
    suffix[excess..].to_vec()
}

/// Root-first section chain a codex suffix names. A lone root name is the root.
fn codex_section_chain(layout: &LibraryLayout, suffix: &[NodeName]) -> Vec<NodeName> {
    match suffix {
        [only] if only.eq_ignore_case(layout.root.as_str()) => Vec::new(),
        _ => suffix.iter().rev().cloned().collect(),
    }
}

/// Strict decode first, then retry with every token sanitized.
fn decode_leniently(basename: &str, scroll_ext: &str) -> Option<LeafBasename> {
    if let Ok(leaf) = LeafBasename::parse(basename, scroll_ext) {
        return Some(leaf);
    }
    let (stem, ext) = split_extension(basename)?;
    let mut tokens: Vec<String> = Vec::new();
    for (i, token) in stem.split(DELIMITER).enumerate() {
        if i == 0 && token == CODEX_TOKEN {
            tokens.push(token.to_string());
        } else if let Ok(name) = sanitize(token) {
            tokens.push(name.to_string());
        }
    }
    if tokens.is_empty() || tokens == [CODEX_TOKEN] {
        return None;
    }
    let repaired = format!("{}.{}", tokens.join(&DELIMITER.to_string()), ext);
    LeafBasename::parse(&repaired, scroll_ext).ok()
}

fn quarantine(layout: &LibraryLayout, current: &VaultPath, relative: &[String]) -> Canonicalized {
    Canonicalized::Quarantined(untracked(layout, current, relative, QuarantineReason::Undecodable))
}

fn untracked(
    layout: &LibraryLayout,
    current: &VaultPath,
    relative: &[String],
    reason: QuarantineReason,
) -> QuarantinedFile {
    let mut destination = layout.untracked_path();
    for folder in relative {
        destination = destination.join(folder.clone());
    }
    if let Some(basename) = current.basename() {
        destination = destination.join(basename);
    }
    QuarantinedFile {
        current_path: current.clone(),
        destination,
        reason,
    }
}

/// Quarantine entry for a leaf that cannot move to its canonical path because another
/// leaf already sits there. The leaf keeps its basename and relative folders.
pub fn quarantine_collision(layout: &LibraryLayout, current: &VaultPath) -> QuarantinedFile {
    let root_depth = layout.root_path().parts().len();
    let parts = current.parts();
    let relative = parts
        .get(root_depth..parts.len().saturating_sub(1))
        .unwrap_or_default();
    untracked(layout, current, relative, QuarantineReason::Collision)
}

fn quarantine_in_place(current: &VaultPath) -> Canonicalized {
    Canonicalized::Quarantined(QuarantinedFile {
        current_path: current.clone(),
        destination: current.clone(),
        reason: QuarantineReason::Undecodable,
    })
}
