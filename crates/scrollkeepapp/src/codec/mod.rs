//! # Basename Codec
//!
//! A leaf's basename redundantly encodes its ancestry: `Note-Child-Parent.md` lives in
//! `Parent/Child/`. The tokens after the core name are the ancestor chain, nearest
//! ancestor first. This module converts between basenames and typed values.
//!
//! - [`suffix`]: core name + suffix chain, the positional split
//! - [`shape`]: the structural shapes a basename can take (scroll, page, file, codex)
//! - [`locator`]: opaque, parseable identity strings for nodes
//!
//! Decoding is strictly positional. Since [`crate::names::NodeName`] can never contain
//! the delimiter, every `-` in a basename is a token boundary.

use thiserror::Error;

pub mod locator;
pub mod shape;
pub mod suffix;

/// Token separator inside basenames.
pub const DELIMITER: char = '-';

/// Leading token of every codex basename. Never a valid node name.
pub const CODEX_TOKEN: &str = "__";

/// Prefix of the ordinal token of a paged leaf (`Page007`).
pub const PAGE_PREFIX: &str = "Page";

/// Width of the zero-padded page ordinal.
pub const PAGE_WIDTH: usize = 3;

/// Largest encodable page ordinal.
pub const MAX_PAGE: u16 = 999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("'{0}' has an empty token")]
    EmptyToken(String),
    #[error("'{0}' contains token '{1}' that is not a valid name")]
    InvalidToken(String, String),
    #[error("'{0}' has no extension")]
    MissingExtension(String),
    #[error("'{0}' has a malformed page ordinal")]
    BadOrdinal(String),
    #[error("'{0}' is a codex without an ancestor chain")]
    BareCodex(String),
    #[error("'{0}' is not a valid locator")]
    BadLocator(String),
}
