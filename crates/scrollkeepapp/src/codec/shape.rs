//! Basename shapes.
//!
//! A leaf basename is classified structurally before its suffix is decoded:
//!
//! | Shape | Example | First token |
//! |-------|---------|-------------|
//! | Codex | `__-B-A.md` | the reserved codex token |
//! | Page  | `Page007-Doc-A.md` | `Page` + zero-padded ordinal |
//! | Scroll | `Note-B-A.md` | core name, scroll extension |
//! | File  | `photo-A.png` | core name, any other extension |
//!
//! Folders (sections) carry no suffix; their basename is a single [`NodeName`].

use super::suffix::{self, SplitBasename};
use super::{CodecError, CODEX_TOKEN, MAX_PAGE, PAGE_PREFIX, PAGE_WIDTH};
use crate::names::NodeName;
use crate::tree::NodeKind;

/// Position of a page inside a paged document, `0..=999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageOrdinal(u16);

impl PageOrdinal {
    /// Builds an ordinal, clamping to the encodable range.
    pub fn new(value: u32) -> Self {
        Self(value.min(MAX_PAGE as u32) as u16)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// The page token, e.g. `Page007`.
    pub fn token(self) -> String {
        format!("{}{:0width$}", PAGE_PREFIX, self.0, width = PAGE_WIDTH)
    }

    /// Parses a page token. Returns `None` when the token is not page-shaped at all.
    pub fn parse(token: &str) -> Option<Result<Self, CodecError>> {
        let digits = token.strip_prefix(PAGE_PREFIX)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if digits.len() != PAGE_WIDTH {
            return Some(Err(CodecError::BadOrdinal(token.to_string())));
        }
        Some(
            digits
                .parse::<u16>()
                .ok()
                .filter(|n| *n <= MAX_PAGE)
                .map(PageOrdinal)
                .ok_or_else(|| CodecError::BadOrdinal(token.to_string())),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Scroll(SplitBasename),
    Page {
        ordinal: PageOrdinal,
        suffix: Vec<NodeName>,
    },
    File(SplitBasename),
    Codex {
        suffix: Vec<NodeName>,
    },
}

/// A decoded leaf basename: its shape plus the extension exactly as found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafBasename {
    pub shape: Shape,
    pub extension: String,
}

/// Splits `stem.ext` at the last dot. Both halves must be non-empty.
pub fn split_extension(basename: &str) -> Option<(&str, &str)> {
    let (stem, ext) = basename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some((stem, ext))
}

impl LeafBasename {
    /// Decodes a leaf basename. Extensions equal to `scroll_ext` (ignoring case) are
    /// documents; anything else is an opaque file.
    pub fn parse(basename: &str, scroll_ext: &str) -> Result<Self, CodecError> {
        let (stem, ext) = split_extension(basename)
            .ok_or_else(|| CodecError::MissingExtension(basename.to_string()))?;
        let is_document = ext.eq_ignore_ascii_case(scroll_ext);

        let shape = if let Some(rest) = stem.strip_prefix(CODEX_TOKEN) {
            if !is_document {
                return Err(CodecError::InvalidToken(
                    basename.to_string(),
                    CODEX_TOKEN.to_string(),
                ));
            }
            let chain = rest
                .strip_prefix(super::DELIMITER)
                .ok_or_else(|| CodecError::BareCodex(basename.to_string()))?;
            Shape::Codex {
                suffix: suffix::decode_tokens(chain)?,
            }
        } else {
            let split = suffix::decode(stem)?;
            match (is_document, PageOrdinal::parse(split.core.as_str())) {
                (true, Some(ordinal)) => Shape::Page {
                    ordinal: ordinal?,
                    suffix: split.suffix,
                },
                (true, None) => Shape::Scroll(split),
                (false, _) => Shape::File(split),
            }
        };

        Ok(Self {
            shape,
            extension: ext.to_string(),
        })
    }

    pub fn encode(&self) -> String {
        let stem = match &self.shape {
            Shape::Scroll(split) | Shape::File(split) => suffix::encode(split),
            Shape::Page { ordinal, suffix } => {
                let token = ordinal.token();
                suffix::join_tokens(
                    std::iter::once(token.as_str()).chain(suffix.iter().map(NodeName::as_str)),
                )
            }
            Shape::Codex { suffix } => suffix::join_tokens(
                std::iter::once(CODEX_TOKEN).chain(suffix.iter().map(NodeName::as_str)),
            ),
        };
        format!("{}.{}", stem, self.extension)
    }

    pub fn kind(&self) -> NodeKind {
        match self.shape {
            Shape::Scroll(_) | Shape::Page { .. } => NodeKind::Scroll,
            Shape::File(_) => NodeKind::File,
            Shape::Codex { .. } => NodeKind::Codex,
        }
    }

    /// The leaf's own name inside its section. Codexes have none.
    pub fn core_name(&self) -> Option<NodeName> {
        match &self.shape {
            Shape::Scroll(split) | Shape::File(split) => Some(split.core.clone()),
            Shape::Page { ordinal, .. } => NodeName::parse(&ordinal.token()).ok(),
            Shape::Codex { .. } => None,
        }
    }

    pub fn suffix(&self) -> &[NodeName] {
        match &self.shape {
            Shape::Scroll(split) | Shape::File(split) => &split.suffix,
            Shape::Page { suffix, .. } | Shape::Codex { suffix } => suffix,
        }
    }

    /// Same shape and extension with a different ancestor chain.
    pub fn with_suffix(&self, chain: Vec<NodeName>) -> Self {
        let shape = match &self.shape {
            Shape::Scroll(split) => Shape::Scroll(SplitBasename::new(split.core.clone(), chain)),
            Shape::File(split) => Shape::File(SplitBasename::new(split.core.clone(), chain)),
            Shape::Page { ordinal, .. } => Shape::Page {
                ordinal: *ordinal,
                suffix: chain,
            },
            Shape::Codex { .. } => Shape::Codex { suffix: chain },
        };
        Self {
            shape,
            extension: self.extension.clone(),
        }
    }
}

/// Validates a folder basename.
pub fn parse_section_name(name: &str) -> Result<NodeName, CodecError> {
    NodeName::parse(name).map_err(|_| CodecError::InvalidToken(name.to_string(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::name;

    fn parse(basename: &str) -> Result<LeafBasename, CodecError> {
        LeafBasename::parse(basename, "md")
    }

    #[test]
    fn classifies_scroll() {
        let leaf = parse("Note-B-A.md").unwrap();
        assert_eq!(leaf.kind(), NodeKind::Scroll);
        assert_eq!(leaf.core_name().unwrap(), "Note");
        assert_eq!(leaf.suffix(), &[name("B"), name("A")]);
    }

    #[test]
    fn classifies_file_by_extension() {
        let leaf = parse("photo-A.png").unwrap();
        assert_eq!(leaf.kind(), NodeKind::File);
        assert_eq!(leaf.extension, "png");
    }

    #[test]
    fn classifies_codex() {
        let leaf = parse("__-B-A.md").unwrap();
        assert_eq!(leaf.kind(), NodeKind::Codex);
        assert!(leaf.core_name().is_none());
        assert_eq!(leaf.suffix(), &[name("B"), name("A")]);
    }

    #[test]
    fn bare_codex_is_undecodable() {
        assert!(matches!(parse("__.md"), Err(CodecError::BareCodex(_))));
    }

    #[test]
    fn classifies_page() {
        let leaf = parse("Page007-Doc-A.md").unwrap();
        assert_eq!(leaf.kind(), NodeKind::Scroll);
        assert_eq!(leaf.core_name().unwrap(), "Page007");
        match leaf.shape {
            Shape::Page { ordinal, ref suffix } => {
                assert_eq!(ordinal.value(), 7);
                assert_eq!(suffix, &vec![name("Doc"), name("A")]);
            }
            ref other => panic!("expected page, got {:?}", other),
        }
    }

    #[test]
    fn page_ordinal_must_be_fixed_width() {
        assert!(matches!(parse("Page07-Doc.md"), Err(CodecError::BadOrdinal(_))));
        assert!(matches!(parse("Page1000-Doc.md"), Err(CodecError::BadOrdinal(_))));
    }

    #[test]
    fn page_prefix_without_digits_is_a_plain_scroll() {
        let leaf = parse("Pages-A.md").unwrap();
        assert!(matches!(leaf.shape, Shape::Scroll(_)));
    }

    #[test]
    fn page_ordinal_clamps_on_encode() {
        assert_eq!(PageOrdinal::new(5).token(), "Page005");
        assert_eq!(PageOrdinal::new(4000).token(), "Page999");
    }

    #[test]
    fn missing_extension_is_undecodable() {
        assert!(matches!(parse("README"), Err(CodecError::MissingExtension(_))));
        assert!(matches!(parse(".hidden"), Err(CodecError::MissingExtension(_))));
    }

    #[test]
    fn decode_then_encode_reproduces_every_shape() {
        for basename in [
            "Note.md",
            "Note-B-A.md",
            "Note-A.MD",
            "photo-A.png",
            "__-Library.md",
            "__-C-B-A.md",
            "Page000-Doc.md",
            "Page123-Doc-A.md",
        ] {
            assert_eq!(parse(basename).unwrap().encode(), basename);
        }
    }

    #[test]
    fn with_suffix_replaces_the_chain_only() {
        let leaf = parse("my-note-E1.md").unwrap();
        assert_eq!(leaf.with_suffix(vec![name("E1")]).encode(), "my-E1.md");
    }

    #[test]
    fn section_names_must_be_sanitized() {
        assert!(parse_section_name("Recipes").is_ok());
        assert!(parse_section_name("My Recipes").is_err());
    }
}
