//! # Rendering
//!
//! Turns `CmdResult`s into terminal text. Functions return `String`s; the handlers
//! in `commands.rs` decide where they go.
//!
//! Tree rows look like the codexes themselves:
//!
//! ```text
//! [ ] Projects/
//!   [x] Roadmap
//!    -  chart.png
//! ```

use super::styles::{CHECK_DONE, CHECK_OPEN, FILE_BULLET, INDENT, STYLES};
use scrollkeepapp::commands::{CmdMessage, ListedNode, MessageLevel};
use scrollkeepapp::tree::{NodeKind, Status};
use std::fmt::Write;

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let style = match message.level {
            MessageLevel::Info => &STYLES.info,
            MessageLevel::Success => &STYLES.success,
            MessageLevel::Warning => &STYLES.warning,
            MessageLevel::Error => &STYLES.error,
        };
        let _ = writeln!(out, "{}", style.apply_to(&message.content));
    }
    out
}

pub fn render_tree(nodes: &[ListedNode]) -> String {
    if nodes.is_empty() {
        return format!("{}\n", STYLES.muted.apply_to("Library is empty."));
    }
    let mut out = String::new();
    for node in nodes {
        let name = node
            .path
            .name()
            .map(|n| n.to_string())
            .unwrap_or_default();
        let indent = INDENT.repeat(node.depth);
        let line = match (node.kind, node.status) {
            (NodeKind::File, _) => format!(
                "{}{} {}",
                indent,
                FILE_BULLET,
                STYLES.file.apply_to(file_label(&name, &node.locator))
            ),
            (kind, status) => {
                let done = status == Some(Status::Done);
                let check = if done { CHECK_DONE } else { CHECK_OPEN };
                let label = if kind == NodeKind::Section {
                    STYLES.section.apply_to(format!("{}/", name)).to_string()
                } else if done {
                    STYLES.done.apply_to(&name).to_string()
                } else {
                    name
                };
                format!("{}{} {}", indent, check, label)
            }
        };
        let _ = writeln!(out, "{}", line);
    }
    out
}

/// `photo` with its extension, taken from the locator (`file:A/photo.png`).
fn file_label(name: &str, locator: &str) -> String {
    locator
        .rsplit_once('.')
        .map(|(_, ext)| format!("{}.{}", name, ext))
        .unwrap_or_else(|| name.to_string())
}
