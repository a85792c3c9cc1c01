//! Layout compilation: turning a layout tree into tmux splits.
//!
//! tmux numbers panes in a window left to right, top to bottom, and renumbers
//! every later pane whenever one is split. The compiler therefore works top
//! down: for a container it first creates all of its panes by splitting, then
//! configures its children one after another, each call handing the next free
//! pane index to the following sibling.
//!
//! # Even splits
//!
//! A container with `n` children splits its pane `n - 1` times, each time
//! handing the new pane `100 * (n-1-i) / (n-i)` percent of the pane being
//! split. For four columns that is 75%, 66% and 50%, which leaves four
//! columns of (nearly) equal width.

use crate::config::{LayoutNode, Window};
use crate::error::Result;
use crate::resolver;
use crate::tmux::{self, Runner};
use crate::workdir;
use std::path::PathBuf;
use tracing::debug;

/// Size of each new pane, in percent, when splitting a pane into `n` equal parts.
///
/// # Examples
///
/// ```
/// use gridlock::compiler::split_percentages;
///
/// assert_eq!(split_percentages(4), vec![75, 66, 50]);
/// assert!(split_percentages(1).is_empty());
/// ```
pub fn split_percentages(n: usize) -> Vec<usize> {
    (0..n.saturating_sub(1))
        .map(|i| 100 * (n - 1 - i) / (n - i))
        .collect()
}

/// Emits the tmux commands that build a window's layout.
pub struct Compiler<'r> {
    runner: &'r mut dyn Runner,
    home: Option<PathBuf>,
}

impl<'r> Compiler<'r> {
    /// Compile against `runner`, expanding `~` to the user's home directory.
    pub fn new(runner: &'r mut dyn Runner) -> Self {
        Self {
            runner,
            home: dirs::home_dir(),
        }
    }

    /// Use `home` for `~` expansion instead of the user's home directory.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Build `node` starting at pane `start` of `window_target`.
    ///
    /// Returns the index of the first pane after the ones `node` occupies.
    ///
    /// # Errors
    ///
    /// Returns the first failing `split-window` or `send-keys`.
    pub fn apply(
        &mut self,
        window_target: &str,
        start: usize,
        node: &LayoutNode,
        window: &Window,
        session_dir: Option<&str>,
    ) -> Result<usize> {
        let Some((direction, children)) = node.split() else {
            if let LayoutNode::Pane(name) = node {
                self.send_setup(window_target, start, name, window)?;
            }
            return Ok(start + 1);
        };
        if children.is_empty() {
            return Ok(start + 1);
        }

        // Every pane of this container has to exist before any child can
        // address its own pane by index.
        for (i, percent) in split_percentages(children.len()).into_iter().enumerate() {
            let target = format!("{}.{}", window_target, start + i);
            let dir = workdir::effective_dir(
                &children[i + 1],
                window,
                session_dir,
                self.home.as_deref(),
            );
            tmux::split_window(self.runner, &target, direction, percent, dir.as_deref())?;
        }

        let mut next = start;
        for child in children {
            next = self.apply(window_target, next, child, window, session_dir)?;
        }
        Ok(next)
    }

    fn send_setup(&mut self, window_target: &str, index: usize, name: &str, window: &Window) -> Result<()> {
        let Some(pane) = resolver::find_pane(window, name) else {
            debug!(pane = name, window = %window.name, "no pane definition, skipping setup commands");
            return Ok(());
        };
        let target = format!("{}.{}", window_target, index);
        for command in pane.setup_commands() {
            tmux::send_keys(self.runner, &target, command)?;
        }
        Ok(())
    }
}
