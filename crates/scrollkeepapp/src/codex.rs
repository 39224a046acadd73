//! # Codexes
//!
//! Every section has a generated index document, its codex, listing the section's
//! children in insertion order:
//!
//! ```text
//! [[__-A|← A]]
//!
//! - [ ] [[Note-B-A|Note]]
//! - [x] [[__-C-B-A|C]]
//! - [[photo-B-A.png|photo]]
//! ```
//!
//! The first line links back to the parent's codex and is omitted for the root.
//! Scrolls and sections get a checkbox (sections use their aggregate status), files a
//! plain bullet. Generation is pure: an unchanged tree always yields identical bytes,
//! so the dispatcher can skip writes whose content did not change.
//!
//! The reverse direction, [`read_checkboxes`], picks the task items back out of a codex
//! the user edited, so ticking a box in the index marks the child done.

use crate::codec::shape::LeafBasename;
use crate::codec::suffix;
use crate::names::NodeName;
use crate::path::LibraryLayout;
use crate::tree::{LibraryTree, NodeKind, TreeNode, TreePath};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

pub const BACK_GLYPH: &str = "←";

/// Generates the codex body for `section`. `None` when the section does not exist.
pub fn generate(tree: &LibraryTree, layout: &LibraryLayout, section: &TreePath) -> Option<String> {
    if !tree.get_node(section)?.is_section() {
        return None;
    }
    let mut out = String::new();

    if let Some(parent) = section.parent() {
        let parent_name = parent.name().unwrap_or(tree.root_name());
        out.push_str(&format!(
            "[[{}|{} {}]]\n\n",
            layout.codex_stem(&parent),
            BACK_GLYPH,
            parent_name
        ));
    }

    for (child_path, node) in tree.children(section) {
        let line = match node {
            TreeNode::Section(_) => format!(
                "- {} [[{}|{}]]",
                checkbox(tree.aggregate_status(&child_path).is_done()),
                layout.codex_stem(&child_path),
                node.name()
            ),
            TreeNode::Scroll(scroll) => format!(
                "- {} [[{}|{}]]",
                checkbox(scroll.status.is_done()),
                leaf_stem(&child_path),
                node.name()
            ),
            TreeNode::File(file) => format!(
                "- [[{}.{}|{}]]",
                leaf_stem(&child_path),
                file.extension,
                node.name()
            ),
        };
        out.push_str(&line);
        out.push('\n');
    }
    Some(out)
}

fn checkbox(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

fn leaf_stem(leaf: &TreePath) -> String {
    let core = leaf.name().map(NodeName::as_str).unwrap_or_default();
    let chain = leaf.parent().unwrap_or_default().suffix_chain();
    suffix::join_tokens(std::iter::once(core).chain(chain.iter().map(NodeName::as_str)))
}

/// A task item found in a codex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodexItem {
    /// Link target, e.g. `Note-B-A` or `__-C-B-A`.
    pub target: String,
    pub checked: bool,
}

/// Extracts every checkbox item that links somewhere.
pub fn read_checkboxes(content: &str) -> Vec<CodexItem> {
    let parser = Parser::new_ext(content, Options::ENABLE_TASKLISTS);
    let mut items = Vec::new();
    let mut current: Option<(bool, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::Item) => current = None,
            Event::TaskListMarker(checked) => current = Some((checked, String::new())),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(TagEnd::Item) => {
                if let Some((checked, text)) = current.take() {
                    if let Some(target) = link_target(&text) {
                        items.push(CodexItem { target, checked });
                    }
                }
            }
            _ => {}
        }
    }
    items
}

fn link_target(text: &str) -> Option<String> {
    let start = text.find("[[")? + 2;
    let rest = &text[start..];
    let end = rest.find(['|', ']'])?;
    let target = rest[..end].trim();
    (!target.is_empty()).then(|| target.to_string())
}

/// Resolves a codex link target to the child of `section` it names.
pub fn resolve_target(layout: &LibraryLayout, section: &TreePath, target: &str) -> Option<TreePath> {
    let basename = if target.contains('.') {
        target.to_string()
    } else {
        format!("{}.{}", target, layout.scroll_ext)
    };
    let leaf = LeafBasename::parse(&basename, &layout.scroll_ext).ok()?;
    let name = match leaf.kind() {
        NodeKind::Codex => leaf.suffix().first()?.clone(),
        _ => leaf.core_name()?,
    };
    Some(section.child(name))
}
