//! # Node Names
//!
//! Every folder and every token of a leaf basename is a [`NodeName`]: a string over a
//! restricted alphabet that can never contain the basename delimiter or a path separator.
//!
//! ## Sanitizing Rules
//!
//! - Leading and trailing whitespace is trimmed.
//! - Whitespace runs, path separators (`/`, `\`), the delimiter (`-`) and the joiner (`_`)
//!   all collapse into a single joiner `_`.
//! - Characters that are illegal in filenames or meaningful to link syntax
//!   (`: * ? " < > | # ^ [ ] { } .`) and control characters are dropped.
//! - Joiners never lead or trail.
//!
//! Because joiner runs collapse, `__` and every string starting with `_` are never valid
//! names. The codec relies on that for its reserved tokens (the codex marker `__` and the
//! quarantine folder `_untracked`).
//!
//! A valid name round-trips through [`sanitize`] unchanged.

use crate::codec::DELIMITER;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Character that replaces whitespace and separators inside a name.
pub const JOINER: char = '_';

const DROPPED: &[char] = &[
    ':', '*', '?', '"', '<', '>', '|', '#', '^', '[', ']', '{', '}', '.',
];

/// Error type for name sanitizing and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Nothing usable survived sanitizing
    #[error("name is empty after sanitizing")]
    Empty,
    /// The string is not in sanitized form
    #[error("'{0}' is not a valid node name (expected '{1}')")]
    NotSanitized(String, String),
}

/// A delimiter-free, separator-free identifier for a node of the library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeName(String);

impl NodeName {
    /// Validates an already-sanitized name. Use [`sanitize`] for user input.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let clean = sanitize(raw)?;
        if clean.as_str() != raw {
            return Err(NameError::NotSanitized(raw.to_string(), clean.0));
        }
        Ok(clean)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '/' || ch == '\\' || ch == DELIMITER || ch == JOINER
}

/// Normalizes an arbitrary user-typed string into a [`NodeName`].
///
/// # Examples
/// ```
/// use scrollkeepapp::names::sanitize;
///
/// assert_eq!(sanitize("  Green   Curry ").unwrap().as_str(), "Green_Curry");
/// assert_eq!(sanitize("S01-E02").unwrap().as_str(), "S01_E02");
/// assert_eq!(sanitize("what? why!").unwrap().as_str(), "what_why!");
/// assert!(sanitize(" -- ").is_err());
/// ```
pub fn sanitize(raw: &str) -> Result<NodeName, NameError> {
    let mut out = String::with_capacity(raw.len());
    let mut pending_joiner = false;

    for ch in raw.trim().chars() {
        if is_separator(ch) {
            pending_joiner = !out.is_empty();
            continue;
        }
        if ch.is_control() || DROPPED.contains(&ch) {
            continue;
        }
        if pending_joiner {
            out.push(JOINER);
            pending_joiner = false;
        }
        out.push(ch);
    }

    if out.is_empty() {
        return Err(NameError::Empty);
    }
    Ok(NodeName(out))
}

/// Returns true when `raw` is already a valid node name.
pub fn is_sanitized(raw: &str) -> bool {
    NodeName::parse(raw).is_ok()
}

#[cfg(test)]
pub(crate) fn name(raw: &str) -> NodeName {
    NodeName::parse(raw).expect("test names must be sanitized")
}
