//! Working directory resolution and `~` handling.
//!
//! The directory for a layout node falls back pane -> window -> session.
//! A container has no directory of its own; it takes the directory of its
//! first descendant leaf, which is the pane a split creates for it.

use crate::config::{LayoutNode, Window};
use crate::resolver;
use std::path::Path;

/// Expand a leading `~` or `~/` to `home`.
///
/// Other paths, and every path when `home` is unknown, pass through.
///
/// # Examples
///
/// ```
/// use gridlock::workdir::expand_home;
/// use std::path::Path;
///
/// let home = Some(Path::new("/home/ada"));
/// assert_eq!(expand_home("~/src", home), "/home/ada/src");
/// assert_eq!(expand_home("~", home), "/home/ada");
/// assert_eq!(expand_home("/tmp", home), "/tmp");
/// assert_eq!(expand_home("~bob/x", home), "~bob/x");
/// ```
pub fn expand_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return path.to_string();
    };
    if path == "~" {
        return home.display().to_string();
    }
    match path.strip_prefix("~/") {
        Some(rest) => home.join(rest).display().to_string(),
        None => path.to_string(),
    }
}

/// Rewrite a path under `home` as `~/...`, the inverse of [`expand_home`].
pub fn abbreviate_home(path: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return path.to_string();
    };
    match Path::new(path).strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.to_string(),
    }
}

/// Directory a pane created for `node` should start in.
///
/// Returns `None` when neither the pane, the window nor the session sets one.
pub fn effective_dir(
    node: &LayoutNode,
    window: &Window,
    session_dir: Option<&str>,
    home: Option<&Path>,
) -> Option<String> {
    let leaf = first_leaf(node);
    let pane_dir = leaf
        .and_then(|name| resolver::find_pane(window, name))
        .and_then(|pane| pane.working_directory.as_deref());

    pane_dir
        .or(window.working_directory.as_deref())
        .or(session_dir)
        .map(|dir| expand_home(dir, home))
}

/// Directory for a window as a whole, ignoring pane overrides.
pub fn window_dir(window: &Window, session_dir: Option<&str>, home: Option<&Path>) -> Option<String> {
    window
        .working_directory
        .as_deref()
        .or(session_dir)
        .map(|dir| expand_home(dir, home))
}

fn first_leaf(node: &LayoutNode) -> Option<&str> {
    match node {
        LayoutNode::Pane(name) => Some(name),
        LayoutNode::Columns(children) | LayoutNode::Rows(children) => {
            children.first().and_then(first_leaf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Pane;

    const HOME: &str = "/home/ada";

    fn window(window_dir: Option<&str>, pane_dir: Option<&str>) -> Window {
        Window {
            name: "w".into(),
            working_directory: window_dir.map(String::from),
            panes: vec![
                Pane {
                    name: "a".into(),
                    working_directory: pane_dir.map(String::from),
                    ..Pane::default()
                },
                Pane {
                    name: "b".into(),
                    ..Pane::default()
                },
            ],
            layout: None,
        }
    }

    fn dir(w: &Window, node: &LayoutNode, session: Option<&str>) -> Option<String> {
        effective_dir(node, w, session, Some(Path::new(HOME)))
    }

    #[test]
    fn test_pane_dir_wins() {
        let w = window(Some("~/win"), Some("~/pane"));
        let leaf = LayoutNode::Pane("a".into());
        assert_eq!(dir(&w, &leaf, Some("~/sess")).as_deref(), Some("/home/ada/pane"));
    }

    #[test]
    fn test_window_dir_fallback() {
        let w = window(Some("~/win"), None);
        let leaf = LayoutNode::Pane("a".into());
        assert_eq!(dir(&w, &leaf, Some("~/sess")).as_deref(), Some("/home/ada/win"));
    }

    #[test]
    fn test_session_dir_fallback() {
        let w = window(None, None);
        let leaf = LayoutNode::Pane("a".into());
        assert_eq!(dir(&w, &leaf, Some("~")).as_deref(), Some("/home/ada"));
        assert_eq!(dir(&w, &leaf, None), None);
    }

    #[test]
    fn test_unknown_pane_uses_window_dir() {
        let w = window(Some("/srv"), Some("/pane"));
        let leaf = LayoutNode::Pane("ghost".into());
        assert_eq!(dir(&w, &leaf, None).as_deref(), Some("/srv"));
    }

    #[test]
    fn test_container_uses_first_child() {
        let w = window(Some("/srv"), Some("/pane"));
        let first_a = LayoutNode::Rows(vec![
            LayoutNode::columns_of(["a", "b"]),
            LayoutNode::Pane("b".into()),
        ]);
        assert_eq!(dir(&w, &first_a, None).as_deref(), Some("/pane"));

        let first_b = LayoutNode::columns_of(["b", "a"]);
        assert_eq!(dir(&w, &first_b, None).as_deref(), Some("/srv"));
    }

    #[test]
    fn test_abbreviate_home() {
        let home = Some(Path::new(HOME));
        assert_eq!(abbreviate_home("/home/ada/src/x", home), "~/src/x");
        assert_eq!(abbreviate_home("/home/ada", home), "~");
        assert_eq!(abbreviate_home("/home/ada2/src", home), "/home/ada2/src");
        assert_eq!(abbreviate_home("/tmp", None), "/tmp");
    }
}
