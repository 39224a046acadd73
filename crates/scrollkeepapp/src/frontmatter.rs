//! Scroll status persistence in YAML front matter.
//!
//! ```text
//! ---
//! status: done
//! ---
//! body
//! ```
//!
//! Only the `status` key is owned here; every other key and the body are preserved.
//! A missing block, a missing key, or unreadable YAML all read as `NotStarted`.

use crate::error::Result;
use crate::tree::Status;
use serde_yaml::{Mapping, Value};

const FENCE: &str = "---";
const STATUS_KEY: &str = "status";

/// Splits content into the raw front matter (without fences) and the body.
fn split(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, content)
}

pub fn read_status(content: &str) -> Status {
    let (Some(raw), _) = split(content) else {
        return Status::NotStarted;
    };
    let Ok(Value::Mapping(map)) = serde_yaml::from_str::<Value>(raw) else {
        return Status::NotStarted;
    };
    match map.get(STATUS_KEY) {
        Some(Value::String(s)) if s.eq_ignore_ascii_case("done") => Status::Done,
        Some(Value::Bool(true)) => Status::Done,
        _ => Status::NotStarted,
    }
}

/// Rewrites the `status` key, adding a front matter block when there is none.
///
/// A block that is not a YAML mapping (a list, a scalar, broken syntax) cannot take the
/// key. It is kept verbatim and a separate status block is written in front of it.
pub fn set_status(content: &str, status: Status) -> Result<String> {
    let (raw, body) = split(content);
    let (mut map, rest) = match raw {
        None => (Mapping::new(), body),
        Some(raw) if raw.trim().is_empty() => (Mapping::new(), body),
        Some(raw) => match serde_yaml::from_str::<Value>(raw) {
            Ok(Value::Mapping(map)) => (map, body),
            _ => (Mapping::new(), content),
        },
    };
    map.insert(
        Value::String(STATUS_KEY.to_string()),
        serde_yaml::to_value(status)?,
    );
    let yaml = serde_yaml::to_string(&map)?;
    Ok(format!("{FENCE}\n{yaml}{FENCE}\n{rest}"))
}

/// Content of a freshly created scroll.
pub fn new_scroll(status: Status) -> String {
    set_status("", status).unwrap_or_default()
}
