//! Node locators: stable, parseable identity strings.
//!
//! `<kind>:<tree path>[.<extension>]`, with codexes addressed through their section:
//!
//! - `section:` (the root), `section:A/B`
//! - `scroll:A/B/Note`
//! - `file:A/photo.png`
//! - `codex:A/B/__`
//!
//! Callers should treat locators as opaque keys; only [`NodeLocator`] parses them.

use super::{CodecError, CODEX_TOKEN};
use crate::names::NodeName;
use crate::tree::{NodeKind, TreePath};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeLocator {
    pub kind: NodeKind,
    pub path: TreePath,
    pub extension: Option<String>,
}

impl NodeLocator {
    pub fn new(kind: NodeKind, path: TreePath, extension: Option<String>) -> Self {
        Self {
            kind,
            path,
            extension,
        }
    }

    pub fn section(path: TreePath) -> Self {
        Self::new(NodeKind::Section, path, None)
    }

    pub fn scroll(path: TreePath) -> Self {
        Self::new(NodeKind::Scroll, path, None)
    }

    /// The codex of the section at `path`.
    pub fn codex(path: TreePath) -> Self {
        Self::new(NodeKind::Codex, path, None)
    }
}

impl fmt::Display for NodeLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.tag(), self.path)?;
        if self.kind == NodeKind::Codex {
            if self.path.is_root() {
                f.write_str(CODEX_TOKEN)?;
            } else {
                write!(f, "/{}", CODEX_TOKEN)?;
            }
        }
        if let Some(ext) = &self.extension {
            write!(f, ".{}", ext)?;
        }
        Ok(())
    }
}

impl FromStr for NodeLocator {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CodecError::BadLocator(s.to_string());
        let (tag, rest) = s.split_once(':').ok_or_else(bad)?;
        let kind = NodeKind::from_tag(tag).ok_or_else(bad)?;

        let (body, extension) = match kind {
            NodeKind::File => {
                let (body, ext) = rest.rsplit_once('.').ok_or_else(bad)?;
                if ext.is_empty() {
                    return Err(bad());
                }
                (body, Some(ext.to_string()))
            }
            _ => (rest, None),
        };

        let body = if kind == NodeKind::Codex {
            let trimmed = body.strip_suffix(CODEX_TOKEN).ok_or_else(bad)?;
            trimmed.strip_suffix('/').unwrap_or(trimmed)
        } else {
            body
        };

        let parts = if body.is_empty() {
            Vec::new()
        } else {
            body.split('/')
                .map(NodeName::parse)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| bad())?
        };
        let path = TreePath::new(parts);

        if path.is_root() && matches!(kind, NodeKind::Scroll | NodeKind::File) {
            return Err(bad());
        }
        Ok(Self::new(kind, path, extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::path;

    #[test]
    fn formats_each_kind() {
        assert_eq!(NodeLocator::section(TreePath::root()).to_string(), "section:");
        assert_eq!(NodeLocator::section(path("A/B")).to_string(), "section:A/B");
        assert_eq!(NodeLocator::scroll(path("A/Note")).to_string(), "scroll:A/Note");
        assert_eq!(
            NodeLocator::new(NodeKind::File, path("A/photo"), Some("png".into())).to_string(),
            "file:A/photo.png"
        );
        assert_eq!(NodeLocator::codex(path("A/B")).to_string(), "codex:A/B/__");
        assert_eq!(NodeLocator::codex(TreePath::root()).to_string(), "codex:__");
    }

    #[test]
    fn parses_what_it_formats() {
        for raw in [
            "section:",
            "section:A/B",
            "scroll:A/Note",
            "file:A/photo.png",
            "codex:A/B/__",
            "codex:__",
        ] {
            let locator: NodeLocator = raw.parse().unwrap();
            assert_eq!(locator.to_string(), raw);
        }
    }

    #[test]
    fn rejects_malformed_locators() {
        for raw in ["", "note:A", "scroll:", "file:A/photo", "codex:A/B", "scroll:A/My Note"] {
            assert!(raw.parse::<NodeLocator>().is_err(), "{raw} should not parse");
        }
    }
}
