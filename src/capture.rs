//! Capturing a live session as a document.
//!
//! Each window is read with two queries, `list-windows` for its geometry and
//! `list-panes` for its panes. Panes get synthesized names
//! (`<window>-pane-<N>`) and the geometry is decoded into a layout tree over
//! those names. A window whose geometry cannot be parsed falls back to one
//! column per pane instead of failing the whole capture.
//!
//! Window names are rewritten where tmux could not target them, and repeated
//! names get a numeric suffix, so the captured document always loads again.

use crate::config::{Config, LayoutNode, Pane, Session, Window};
use crate::error::{GridlockError, Result};
use crate::geometry;
use crate::resolver::{self, PaneIds};
use crate::tmux::{self, Runner};
use crate::workdir;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Foreground commands that are just an interactive shell, not worth replaying.
const SHELLS: &[&str] = &["bash", "zsh", "sh", "fish", "dash", "ksh", "tcsh", "nu"];

/// Read the session `name` into a document.
///
/// # Errors
///
/// - [`GridlockError::SessionNotFound`] if the session does not exist
/// - [`GridlockError::TmuxError`] if listing windows or panes fails
pub fn capture_session(runner: &mut dyn Runner, name: &str, home: Option<&Path>) -> Result<Config> {
    if !tmux::has_session(runner, name) {
        return Err(GridlockError::SessionNotFound(name.to_string()));
    }
    info!(session = name, "capturing session");

    let mut windows = Vec::new();
    let mut taken = HashSet::new();
    for info in tmux::list_windows(runner, name)? {
        let panes = tmux::list_panes(runner, &info.id)?;
        let window_name = unique_name(targetable_name(&info.name), &mut taken);
        windows.push(capture_window(&info, window_name, &panes, home));
    }

    let mut session = Session {
        name: name.to_string(),
        working_directory: None,
        windows,
    };
    hoist_common_dirs(&mut session);
    Ok(Config { session })
}

/// Rewrite a tmux window name so that `session:window.pane` targets it.
///
/// `:` and `.` would split the target, and an all-digit name is read as a
/// window index.
fn targetable_name(raw: &str) -> String {
    let name = raw.replace([':', '.'], "_");
    if name.bytes().all(|b| b.is_ascii_digit()) {
        format!("window-{}", name)
    } else {
        name
    }
}

/// `name`, or `name-1`, `name-2`, ... when it is already taken.
///
/// tmux names every plain shell window after the shell, so repeats are common.
fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    let mut candidate = name.clone();
    let mut n = 1;
    while taken.contains(&candidate) {
        candidate = format!("{}-{}", name, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

fn capture_window(
    info: &tmux::WindowInfo,
    name: String,
    live: &[tmux::PaneInfo],
    home: Option<&Path>,
) -> Window {
    let mut ids = PaneIds::new();
    let panes: Vec<Pane> = live
        .iter()
        .enumerate()
        .map(|(ordinal, p)| {
            let pane_name = resolver::synthesize_name(&name, ordinal);
            ids.insert(p.id, pane_name.clone());
            let command = Some(p.current_command.as_str())
                .filter(|c| !c.is_empty() && !SHELLS.contains(c))
                .map(String::from);
            Pane {
                name: pane_name,
                working_directory: Some(workdir::abbreviate_home(&p.current_path, home)),
                command,
                commands: Vec::new(),
            }
        })
        .collect();

    let layout = match geometry::decode(&info.layout, &ids) {
        Ok(layout) => layout,
        Err(e) => {
            warn!(
                window = %name,
                error = %e,
                "failed to parse layout, using simple column layout"
            );
            LayoutNode::columns_of(panes.iter().map(|p| p.name.as_str()))
        }
    };

    Window {
        name,
        working_directory: None,
        panes,
        layout: Some(layout),
    }
}

/// Move a directory shared by every pane of a window up to the window, and
/// one shared by every window up to the session.
fn hoist_common_dirs(session: &mut Session) {
    for window in &mut session.windows {
        if let Some(dir) = common(window.panes.iter().map(|p| p.working_directory.as_deref())) {
            for pane in &mut window.panes {
                pane.working_directory = None;
            }
            window.working_directory = Some(dir);
        }
    }

    if let Some(dir) = common(session.windows.iter().map(|w| w.working_directory.as_deref())) {
        for window in &mut session.windows {
            window.working_directory = None;
        }
        session.working_directory = Some(dir);
    }
}

/// The value every item shares, if there is at least one and all are set.
fn common<'a>(mut dirs: impl Iterator<Item = Option<&'a str>>) -> Option<String> {
    let first = dirs.next()??;
    dirs.all(|d| d == Some(first)).then(|| first.to_string())
}
