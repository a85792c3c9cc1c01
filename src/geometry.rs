//! Decoding of tmux `window_layout` strings.
//!
//! tmux describes a window's split tree in a compact form:
//!
//! ```text
//! b37c,210x50,0,0{105x50,0,0,0,104x50,106,0[104x25,106,0,1,104x24,106,26,2]}
//! ```
//!
//! - an optional 4-hex-digit checksum and comma
//! - every cell starts with `WxH,X,Y`
//! - a leaf continues with `,ID` (the pane id without `%`)
//! - `{...}` holds children placed left to right, `[...]` top to bottom
//!
//! Children are comma separated, but so are the fields of each child, so the
//! splitter walks cell by cell: it matches the `WxH,X,Y` token at the cursor,
//! then skips either the `,ID` digits or a balanced bracket span.

use crate::config::LayoutNode;
use crate::error::GeometryError;
use crate::resolver::PaneIds;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static DIMENSIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+x\d+,\d+,\d+").expect("dimension regex is valid"));

static CHECKSUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{4}$").expect("checksum regex is valid"));

/// Parse a `window_layout` string into a layout tree.
///
/// Leaf ids are looked up in `ids`; ids missing from the map decode to a
/// placeholder name instead of failing.
///
/// # Errors
///
/// Returns a [`GeometryError`] describing the first malformed cell.
pub fn decode(layout: &str, ids: &PaneIds) -> Result<LayoutNode, GeometryError> {
    let body = strip_checksum(layout.trim());
    parse_cell(body, ids)
}

/// Remove a leading `xxxx,` checksum, warning when it does not match.
fn strip_checksum(layout: &str) -> &str {
    let Some((prefix, body)) = layout.split_once(',') else {
        return layout;
    };
    if !CHECKSUM.is_match(prefix) {
        return layout;
    }
    let expected = format!("{:04x}", checksum(body));
    if prefix != expected {
        warn!(found = prefix, expected = %expected, "layout checksum mismatch");
    }
    body
}

/// tmux's layout checksum: rotate right one bit, then add each byte.
pub fn checksum(body: &str) -> u16 {
    body.bytes().fold(0u16, |csum, b| {
        ((csum >> 1) | ((csum & 1) << 15)).wrapping_add(u16::from(b))
    })
}

/// Length of the `WxH,X,Y` token at the start of `s`.
fn dimensions_len(s: &str) -> Result<usize, GeometryError> {
    DIMENSIONS
        .find(s)
        .map(|m| m.end())
        .ok_or_else(|| GeometryError::MissingDimensions(s.to_string()))
}

fn parse_cell(cell: &str, ids: &PaneIds) -> Result<LayoutNode, GeometryError> {
    let rest = &cell[dimensions_len(cell)?..];
    let Some(kind) = rest.chars().next() else {
        return Err(GeometryError::UnexpectedEnd);
    };

    match kind {
        ',' => {
            let raw = &rest[1..];
            let id = parse_id(raw)?;
            Ok(LayoutNode::Pane(ids.name_or_placeholder(id)))
        }
        '{' | '[' => {
            let close = matching_close(rest)?;
            if close + 1 != rest.len() {
                return Err(GeometryError::TrailingInput(rest[close + 1..].to_string()));
            }
            let children = split_children(&rest[1..close])?
                .into_iter()
                .map(|child| parse_cell(child, ids))
                .collect::<Result<Vec<_>, _>>()?;
            if kind == '{' {
                Ok(LayoutNode::Columns(children))
            } else {
                Ok(LayoutNode::Rows(children))
            }
        }
        other => Err(GeometryError::UnexpectedChar(other)),
    }
}

fn parse_id(raw: &str) -> Result<u32, GeometryError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GeometryError::InvalidPaneId(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| GeometryError::InvalidPaneId(raw.to_string()))
}

/// Index of the bracket closing the one that starts `s`.
fn matching_close(s: &str) -> Result<usize, GeometryError> {
    let mut open = Vec::new();
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'{' | b'[' => open.push(b),
            b'}' | b']' => {
                let expected = if b == b'}' { b'{' } else { b'[' };
                if open.pop() != Some(expected) {
                    return Err(GeometryError::Unbalanced);
                }
                if open.is_empty() {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(GeometryError::Unbalanced)
}

/// Split a container's inner text into its child cells.
fn split_children(inner: &str) -> Result<Vec<&str>, GeometryError> {
    if inner.is_empty() {
        return Err(GeometryError::EmptyContainer);
    }

    let mut children = Vec::new();
    let mut rest = inner;
    loop {
        let token = dimensions_len(rest)?;
        let end = match rest.as_bytes().get(token) {
            Some(b',') => {
                let digits = rest[token + 1..]
                    .bytes()
                    .take_while(u8::is_ascii_digit)
                    .count();
                if digits == 0 {
                    return Err(GeometryError::InvalidPaneId(rest[token + 1..].to_string()));
                }
                token + 1 + digits
            }
            Some(b'{' | b'[') => token + matching_close(&rest[token..])? + 1,
            Some(&other) => return Err(GeometryError::UnexpectedChar(char::from(other))),
            None => return Err(GeometryError::UnexpectedEnd),
        };

        children.push(&rest[..end]);
        rest = &rest[end..];
        if rest.is_empty() {
            return Ok(children);
        }
        match rest.strip_prefix(',') {
            Some(next) if !next.is_empty() => rest = next,
            _ => return Err(GeometryError::TrailingInput(rest.to_string())),
        }
    }
}
