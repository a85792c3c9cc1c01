//! Pane identity resolution.
//!
//! Maps layout leaf names to pane definitions, and tmux pane ids to names
//! during capture.
//!
//! # Matching
//!
//! Lookups try an exact name match across all panes first. Failing that, a
//! pane matches when the query ends with the pane's identity token:
//!
//! - for names synthesized by capture for this window (`dev-pane-2` in window
//!   `dev`) the token starts at the window name, so a stored `api-dev-pane-2`
//!   has the token `dev-pane-2`
//! - for any other name the token is the whole name
//!
//! The query must equal the token or end with `-<token>`, so a captured
//! `dev-pane-2` still resolves after being decorated as `api-dev-pane-2`, but
//! never as `dev-pane-20` or `other-pane-2`. The window name is part of the
//! token even when it contains dashes: in window `my-win`, `my-win-pane-0`
//! does not resolve `your-win-pane-0`.

use crate::config::{Pane, Window};
use std::collections::HashMap;

/// Find the pane a layout leaf refers to.
///
/// Exact matches win over suffix matches. Returns `None` when nothing
/// matches; callers treat that as "no setup commands".
pub fn find_pane<'a>(window: &'a Window, name: &str) -> Option<&'a Pane> {
    window.panes.iter().find(|p| p.name == name).or_else(|| {
        window
            .panes
            .iter()
            .find(|p| suffix_matches(identity_token(&p.name, &window.name), name))
    })
}

/// The part of a stored pane name that a decorated query must end with.
///
/// A name of the form `[<prefix>-]<window>-pane-<N>` is cut down to
/// `<window>-pane-<N>`; anything else is kept whole.
fn identity_token<'a>(stored: &'a str, window: &str) -> &'a str {
    let Some((head, ordinal)) = stored.rsplit_once("-pane-") else {
        return stored;
    };
    if window.is_empty() || ordinal.is_empty() || !ordinal.bytes().all(|b| b.is_ascii_digit()) {
        return stored;
    }
    match head.strip_suffix(window) {
        Some("") => stored,
        Some(prefix) if prefix.ends_with('-') => &stored[prefix.len()..],
        _ => stored,
    }
}

fn suffix_matches(token: &str, query: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    query == token
        || query
            .strip_suffix(token)
            .is_some_and(|prefix| prefix.ends_with('-'))
}

/// Deterministic name for the `ordinal`-th pane of a captured window.
///
/// # Examples
///
/// ```
/// use gridlock::resolver::synthesize_name;
///
/// assert_eq!(synthesize_name("dev", 2), "dev-pane-2");
/// ```
pub fn synthesize_name(window_name: &str, ordinal: usize) -> String {
    format!("{}-pane-{}", window_name, ordinal)
}

/// tmux pane ids (`%12` -> 12) of one window mapped to their names.
#[derive(Debug, Clone, Default)]
pub struct PaneIds {
    names: HashMap<u32, String>,
}

impl PaneIds {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the name assigned to a pane id.
    pub fn insert(&mut self, id: u32, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// The recorded name for `id`, if any.
    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// The recorded name for `id`, or a placeholder for panes tmux reported
    /// in the geometry but not in the pane listing.
    pub fn name_or_placeholder(&self, id: u32) -> String {
        match self.get(id) {
            Some(name) => name.to_string(),
            None => format!("unknown-pane-{}", id),
        }
    }
}

/// Parse a tmux pane id such as `%12`.
pub fn parse_pane_id(raw: &str) -> Option<u32> {
    raw.trim().trim_start_matches('%').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(names: &[&str]) -> Window {
        Window {
            name: "win".into(),
            working_directory: None,
            panes: names
                .iter()
                .map(|n| Pane {
                    name: n.to_string(),
                    ..Pane::default()
                })
                .collect(),
            layout: None,
        }
    }

    #[test]
    fn test_exact_match() {
        let w = window(&["editor", "server"]);
        assert_eq!(find_pane(&w, "server").unwrap().name, "server");
    }

    #[test]
    fn test_exact_match_wins_over_suffix() {
        let w = window(&["win-pane-1", "anything-win-pane-1"]);
        assert_eq!(
            find_pane(&w, "anything-win-pane-1").unwrap().name,
            "anything-win-pane-1"
        );
    }

    #[test]
    fn test_suffix_match() {
        let w = window(&["win-pane-2"]);
        assert_eq!(
            find_pane(&w, "anything-win-pane-2").unwrap().name,
            "win-pane-2"
        );
    }

    #[test]
    fn test_suffix_requires_full_token() {
        let w = window(&["win-pane-2"]);
        assert!(find_pane(&w, "win-pane-20").is_none());
        assert!(find_pane(&w, "other-pane-2").is_none());
        assert!(find_pane(&w, "xwin-pane-2").is_none());
    }

    #[test]
    fn test_suffix_token_keeps_dashed_window_name() {
        let mut w = window(&["my-win-pane-0"]);
        w.name = "my-win".into();
        assert_eq!(find_pane(&w, "x-my-win-pane-0").unwrap().name, "my-win-pane-0");
        assert!(find_pane(&w, "your-win-pane-0").is_none());
        assert!(find_pane(&w, "x-win-pane-0").is_none());
    }

    #[test]
    fn test_decorated_stored_name_is_cut_at_window() {
        let mut w = window(&["api-dev-pane-2"]);
        w.name = "dev".into();
        assert_eq!(find_pane(&w, "dev-pane-2").unwrap().name, "api-dev-pane-2");
        assert_eq!(find_pane(&w, "web-dev-pane-2").unwrap().name, "api-dev-pane-2");
        assert!(find_pane(&w, "webdev-pane-2").is_none());
        assert!(find_pane(&w, "dev-pane-20").is_none());
    }

    #[test]
    fn test_plain_name_suffix() {
        let w = window(&["bash"]);
        assert!(find_pane(&w, "main-bash").is_some());
        assert!(find_pane(&w, "zbash").is_none());
        assert!(find_pane(&w, "missing").is_none());
    }

    #[test]
    fn test_pane_ids() {
        let mut ids = PaneIds::new();
        ids.insert(parse_pane_id("%7").unwrap(), synthesize_name("dev", 0));
        assert_eq!(ids.name_or_placeholder(7), "dev-pane-0");
        assert_eq!(ids.name_or_placeholder(8), "unknown-pane-8");
        assert_eq!(parse_pane_id("%x"), None);
    }
}
