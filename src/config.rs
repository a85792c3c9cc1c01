//! Configuration types for gridlock.
//!
//! This module defines the data structures that map to the session document.
//! A document describes exactly one tmux session:
//!
//! - `session` holds the session name, an optional base directory and its windows
//! - each window lists its panes and arranges them with a `layout` tree
//! - a layout is either a pane name, or a `columns` / `rows` list of layouts
//!
//! # Config Format
//!
//! ```yaml
//! session:
//!   name: api
//!   working-directory: ~/src/api
//!   windows:
//!     - name: dev
//!       panes:
//!         - name: editor
//!           command: nvim
//!         - name: server
//!           commands: ["cargo build", "cargo run"]
//!         - name: logs
//!           working-directory: /var/log
//!           command: tail -f app.log
//!       layout:
//!         columns:
//!           - editor
//!           - rows: [server, logs]
//! ```

use crate::error::GridlockError;
use crate::resolver;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::warn;

/// Top-level document: a single session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The session to build.
    pub session: Session,
}

/// A named tmux session and its windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Session {
    /// Session name, unique within the tmux server.
    pub name: String,
    /// Base directory for every window and pane that does not override it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Windows in creation order. The first one is created with the session.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<Window>,
}

/// A window: a set of panes arranged by one layout tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Window {
    /// Window name, also used to target the window (`session:name`).
    pub name: String,
    /// Directory override for panes in this window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Pane definitions referenced by name from the layout.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panes: Vec<Pane>,
    /// Split tree. Defaults to one column per pane in declaration order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutNode>,
}

/// A single pane and the commands typed into it after creation.
///
/// Both `command` and `commands` may be given; `command` runs first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Pane {
    /// Pane name, unique within its window.
    pub name: String,
    /// Directory override for this pane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// A single setup command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Setup commands sent in order after `command`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

impl Pane {
    /// All setup commands in the order they are sent.
    pub fn setup_commands(&self) -> impl Iterator<Item = &str> {
        self.command
            .as_deref()
            .into_iter()
            .chain(self.commands.iter().map(String::as_str))
    }
}

/// Split direction of a container node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// Children side by side (`columns`, tmux `split-window -h`).
    Horizontal,
    /// Children stacked (`rows`, tmux `split-window -v`).
    Vertical,
}

impl SplitDirection {
    /// The `split-window` flag for this direction.
    pub fn tmux_flag(self) -> &'static str {
        match self {
            SplitDirection::Horizontal => "-h",
            SplitDirection::Vertical => "-v",
        }
    }
}

/// A node of the layout tree.
///
/// In the document a leaf is a bare pane name and a container is a mapping
/// with exactly one of `columns` or `rows`:
///
/// ```yaml
/// layout:
///   rows:
///     - top
///     - columns: [left, right]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLayout")]
pub enum LayoutNode {
    /// Reference to a pane by name.
    Pane(String),
    /// Children placed left to right.
    Columns(Vec<LayoutNode>),
    /// Children placed top to bottom.
    Rows(Vec<LayoutNode>),
}

impl LayoutNode {
    /// One column per pane, in the given order.
    pub fn columns_of<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        LayoutNode::Columns(
            names
                .into_iter()
                .map(|name| LayoutNode::Pane(name.to_string()))
                .collect(),
        )
    }

    /// Children and direction of a container, `None` for a leaf.
    pub fn split(&self) -> Option<(SplitDirection, &[LayoutNode])> {
        match self {
            LayoutNode::Pane(_) => None,
            LayoutNode::Columns(children) => Some((SplitDirection::Horizontal, children)),
            LayoutNode::Rows(children) => Some((SplitDirection::Vertical, children)),
        }
    }

    /// Leaf pane names in depth-first, left-to-right order.
    ///
    /// This is the order in which tmux numbers the panes after the tree has
    /// been built.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaves(&mut names);
        names
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            LayoutNode::Pane(name) => out.push(name),
            LayoutNode::Columns(children) | LayoutNode::Rows(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl Serialize for LayoutNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (key, children) = match self {
            LayoutNode::Pane(name) => return serializer.serialize_str(name),
            LayoutNode::Columns(children) => ("columns", children),
            LayoutNode::Rows(children) => ("rows", children),
        };
        if children.is_empty() {
            return serializer.serialize_map(Some(0))?.end();
        }
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(key, children)?;
        map.end()
    }
}

/// Document shape of a layout node before the one-of check.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLayout {
    Pane(String),
    Split(RawSplit),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSplit {
    #[serde(default)]
    pane: Option<String>,
    #[serde(default)]
    columns: Option<Vec<LayoutNode>>,
    #[serde(default)]
    rows: Option<Vec<LayoutNode>>,
}

impl TryFrom<RawLayout> for LayoutNode {
    type Error = String;

    fn try_from(raw: RawLayout) -> Result<Self, Self::Error> {
        let split = match raw {
            RawLayout::Pane(name) => return Ok(LayoutNode::Pane(name)),
            RawLayout::Split(split) => split,
        };
        match (split.pane, split.columns, split.rows) {
            (Some(name), None, None) => Ok(LayoutNode::Pane(name)),
            (None, Some(columns), None) if !columns.is_empty() => Ok(LayoutNode::Columns(columns)),
            (None, None, Some(rows)) if !rows.is_empty() => Ok(LayoutNode::Rows(rows)),
            (None, Some(_), None) | (None, None, Some(_)) => {
                Err("layout `columns`/`rows` must list at least one child".to_string())
            }
            (None, None, None) => {
                Err("layout mapping needs one of `pane`, `columns` or `rows`".to_string())
            }
            _ => Err("layout node must use only one of `pane`, `columns` or `rows`".to_string()),
        }
    }
}

impl Window {
    /// The layout to build: the declared one, or one column per pane.
    ///
    /// Returns `None` for a window with neither panes nor layout.
    pub fn effective_layout(&self) -> Option<Cow<'_, LayoutNode>> {
        match &self.layout {
            Some(layout) => Some(Cow::Borrowed(layout)),
            None if self.panes.is_empty() => None,
            None => Some(Cow::Owned(LayoutNode::columns_of(
                self.panes.iter().map(|p| p.name.as_str()),
            ))),
        }
    }
}

impl Config {
    /// The document written by a plain `init`: one window, one pane.
    pub fn starter(session_name: &str) -> Self {
        Config {
            session: Session {
                name: session_name.to_string(),
                working_directory: None,
                windows: vec![Window {
                    name: "main".to_string(),
                    working_directory: None,
                    panes: vec![Pane {
                        name: "bash".to_string(),
                        command: Some("echo Gridlock".to_string()),
                        ..Pane::default()
                    }],
                    layout: Some(LayoutNode::columns_of(["bash"])),
                }],
            },
        }
    }

    /// Check the invariants tmux targeting relies on.
    ///
    /// Layout leaves that name no pane are reported with a warning only;
    /// the compiler skips their setup commands.
    ///
    /// # Errors
    ///
    /// Returns [`GridlockError::InvalidConfig`] for an empty or untargetable
    /// session or window name, and for empty or duplicate window and pane
    /// names. A window name is untargetable when tmux would split it at a
    /// `:` or `.`, or read it as a window index.
    pub fn validate(&self) -> Result<(), GridlockError> {
        let session = &self.session;
        if session.name.is_empty() {
            return Err(GridlockError::InvalidConfig("session name is empty".into()));
        }
        if session.name.contains([':', '.']) {
            return Err(GridlockError::InvalidConfig(format!(
                "session name '{}' must not contain ':' or '.'",
                session.name
            )));
        }

        let mut window_names = HashSet::new();
        for window in &session.windows {
            if window.name.is_empty() {
                return Err(GridlockError::InvalidConfig(format!(
                    "window without a name in session '{}'",
                    session.name
                )));
            }
            if window.name.contains([':', '.']) || window.name.bytes().all(|b| b.is_ascii_digit()) {
                return Err(GridlockError::InvalidConfig(format!(
                    "window name '{}' must not contain ':' or '.' or be all digits",
                    window.name
                )));
            }
            if !window_names.insert(window.name.as_str()) {
                return Err(GridlockError::InvalidConfig(format!(
                    "duplicate window name '{}'",
                    window.name
                )));
            }

            let mut pane_names = HashSet::new();
            for pane in &window.panes {
                if pane.name.is_empty() {
                    return Err(GridlockError::InvalidConfig(format!(
                        "pane without a name in window '{}'",
                        window.name
                    )));
                }
                if !pane_names.insert(pane.name.as_str()) {
                    return Err(GridlockError::InvalidConfig(format!(
                        "duplicate pane name '{}' in window '{}'",
                        pane.name, window.name
                    )));
                }
            }

            if let Some(layout) = &window.layout {
                for leaf in layout.leaf_names() {
                    if resolver::find_pane(window, leaf).is_none() {
                        warn!(window = %window.name, pane = %leaf, "layout references an undefined pane");
                    }
                }
            }
        }

        Ok(())
    }
}
