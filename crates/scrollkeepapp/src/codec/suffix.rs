use super::{CodecError, DELIMITER};
use crate::names::NodeName;

/// A basename stem split into its core name and suffix chain (nearest ancestor first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBasename {
    pub core: NodeName,
    pub suffix: Vec<NodeName>,
}

impl SplitBasename {
    pub fn new(core: NodeName, suffix: Vec<NodeName>) -> Self {
        Self { core, suffix }
    }
}

/// Joins the core name and each suffix part, in array order.
pub fn encode(split: &SplitBasename) -> String {
    let mut out = split.core.as_str().to_string();
    for part in &split.suffix {
        out.push(DELIMITER);
        out.push_str(part.as_str());
    }
    out
}

/// Splits a stem on the delimiter. The first token is the core name, the rest the suffix.
pub fn decode(stem: &str) -> Result<SplitBasename, CodecError> {
    let mut tokens = decode_tokens(stem)?.into_iter();
    let core = tokens
        .next()
        .ok_or_else(|| CodecError::EmptyToken(stem.to_string()))?;
    Ok(SplitBasename {
        core,
        suffix: tokens.collect(),
    })
}

/// Splits a stem into validated tokens.
pub(crate) fn decode_tokens(stem: &str) -> Result<Vec<NodeName>, CodecError> {
    stem.split(DELIMITER)
        .map(|token| {
            if token.is_empty() {
                return Err(CodecError::EmptyToken(stem.to_string()));
            }
            NodeName::parse(token)
                .map_err(|_| CodecError::InvalidToken(stem.to_string(), token.to_string()))
        })
        .collect()
}

/// Joins tokens with the delimiter.
pub(crate) fn join_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, token) in tokens.into_iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(token);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::name;

    #[test]
    fn encodes_nearest_ancestor_first() {
        let split = SplitBasename::new(name("Note"), vec![name("Child"), name("Parent")]);
        assert_eq!(encode(&split), "Note-Child-Parent");
    }

    #[test]
    fn encodes_bare_core() {
        assert_eq!(encode(&SplitBasename::new(name("Note"), vec![])), "Note");
    }

    #[test]
    fn decode_inverts_encode() {
        let cases = [
            SplitBasename::new(name("a"), vec![]),
            SplitBasename::new(name("Pad_Thai"), vec![name("Noodles")]),
            SplitBasename::new(name("x"), vec![name("y"), name("y"), name("z")]),
        ];
        for split in cases {
            assert_eq!(decode(&encode(&split)).unwrap(), split);
        }
    }

    #[test]
    fn decode_is_positional() {
        let split = decode("my-note-E1").unwrap();
        assert_eq!(split.core, "my");
        assert_eq!(split.suffix, vec![name("note"), name("E1")]);
    }

    #[test]
    fn decode_rejects_empty_tokens() {
        assert!(matches!(decode(""), Err(CodecError::EmptyToken(_))));
        assert!(matches!(decode("a--b"), Err(CodecError::EmptyToken(_))));
        assert!(matches!(decode("-a"), Err(CodecError::EmptyToken(_))));
        assert!(matches!(decode("a-"), Err(CodecError::EmptyToken(_))));
    }

    #[test]
    fn decode_rejects_unsanitized_tokens() {
        assert!(matches!(
            decode("My Note-A"),
            Err(CodecError::InvalidToken(_, _))
        ));
    }
}
