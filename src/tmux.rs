//! Tmux command execution and queries.
//!
//! Every interaction with tmux goes through a [`Runner`]. [`Tmux`] runs the
//! real binary; [`DryRun`] prints the command line instead and never touches
//! the server. The free functions in this module wrap the individual tmux
//! commands gridlock needs, on top of whichever runner is in use.
//!
//! # Pane Indices
//!
//! Tmux allows configuring `pane-base-index`, so panes might start at 0 or 1.
//! [`pane_base_index`] queries it so callers can number panes accordingly.

use crate::config::SplitDirection;
use crate::error::{GridlockError, Result};
use crate::resolver::parse_pane_id;
use std::process::Command;
use tracing::debug;

/// Executes tmux commands.
///
/// Commands are issued one at a time and each finishes before the next one
/// starts: pane numbering depends on every earlier split having completed.
pub trait Runner {
    /// Run `tmux <args>` and return its combined output.
    fn run(&mut self, args: &[&str]) -> Result<String>;

    /// Run a command that takes over the terminal, such as `attach-session`.
    fn run_interactive(&mut self, args: &[&str]) -> Result<()> {
        self.run(args).map(|_| ())
    }
}

/// Runs the `tmux` binary found on `PATH`.
#[derive(Debug, Default)]
pub struct Tmux;

impl Runner for Tmux {
    fn run(&mut self, args: &[&str]) -> Result<String> {
        debug!(command = %args.join(" "), "tmux");
        let output = Command::new("tmux")
            .args(args)
            .output()
            .map_err(GridlockError::TmuxLaunch)?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(GridlockError::TmuxError {
                command: args.join(" "),
                output: combined,
            });
        }
        Ok(combined)
    }

    fn run_interactive(&mut self, args: &[&str]) -> Result<()> {
        debug!(command = %args.join(" "), "tmux (interactive)");
        let status = Command::new("tmux")
            .args(args)
            .status()
            .map_err(GridlockError::TmuxLaunch)?;

        if !status.success() {
            return Err(GridlockError::TmuxError {
                command: args.join(" "),
                output: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Prints each command instead of running it.
///
/// Every command succeeds with empty output. The printed lines are also kept
/// in [`DryRun::commands`].
#[derive(Debug, Default)]
pub struct DryRun {
    /// Printed command lines, in order.
    pub commands: Vec<String>,
    quiet: bool,
}

impl DryRun {
    /// A dry runner that prints to stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// A dry runner that only records.
    pub fn quiet() -> Self {
        Self {
            commands: Vec::new(),
            quiet: true,
        }
    }
}

impl Runner for DryRun {
    fn run(&mut self, args: &[&str]) -> Result<String> {
        let line = format!("tmux {}", shell_words(args));
        if !self.quiet {
            println!("{}", line);
        }
        self.commands.push(line);
        Ok(String::new())
    }
}

/// Join arguments for display, quoting the ones a shell would split.
fn shell_words(args: &[&str]) -> String {
    args.iter()
        .map(|arg| {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("'{}'", arg.replace('\'', r"'\''"))
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Target matching exactly the session called `name`, not a prefix of it.
fn exact(name: &str) -> String {
    format!("={}", name)
}

/// A window as reported by `list-windows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    /// Window id such as `@3`.
    pub id: String,
    /// Window name.
    pub name: String,
    /// The `window_layout` geometry string.
    pub layout: String,
}

/// A pane as reported by `list-panes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneInfo {
    /// Numeric pane id (`%12` -> 12).
    pub id: u32,
    /// Current working directory of the pane.
    pub current_path: String,
    /// Command running in the foreground of the pane.
    pub current_command: String,
}

/// Check whether a session named exactly `name` exists.
pub fn has_session(runner: &mut dyn Runner, name: &str) -> bool {
    runner.run(&["has-session", "-t", exact(name).as_str()]).is_ok()
}

/// Name of the session the calling client is attached to or running inside.
///
/// # Errors
///
/// - [`GridlockError::NotInTmux`] if tmux reports no current session
/// - [`GridlockError::TmuxError`] if the query itself fails
pub fn current_session_name(runner: &mut dyn Runner) -> Result<String> {
    let output = runner.run(&["display-message", "-p", "#S"])?;
    let name = output.trim();
    if name.is_empty() {
        return Err(GridlockError::NotInTmux);
    }
    Ok(name.to_string())
}

/// List the windows of a session.
pub fn list_windows(runner: &mut dyn Runner, session: &str) -> Result<Vec<WindowInfo>> {
    let output = runner.run(&[
        "list-windows",
        "-t",
        exact(session).as_str(),
        "-F",
        "#{window_id}\t#{window_name}\t#{window_layout}",
    ])?;

    let windows = output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            Some(WindowInfo {
                id: parts.next()?.to_string(),
                name: parts.next()?.to_string(),
                layout: parts.next()?.to_string(),
            })
        })
        .collect();
    Ok(windows)
}

/// List the panes of a window in tmux's order.
pub fn list_panes(runner: &mut dyn Runner, window_id: &str) -> Result<Vec<PaneInfo>> {
    let output = runner.run(&[
        "list-panes",
        "-t",
        window_id,
        "-F",
        "#{pane_id}\t#{pane_current_path}\t#{pane_current_command}",
    ])?;

    let panes = output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            Some(PaneInfo {
                id: parse_pane_id(parts.next()?)?,
                current_path: parts.next()?.to_string(),
                current_command: parts.next()?.to_string(),
            })
        })
        .collect();
    Ok(panes)
}

/// The global `pane-base-index` window option.
pub fn pane_base_index(runner: &mut dyn Runner) -> Result<usize> {
    let output = runner.run(&["show-options", "-gwv", "pane-base-index"])?;
    output.trim().parse().map_err(|_| GridlockError::TmuxError {
        command: "show-options -gwv pane-base-index".into(),
        output,
    })
}

/// Create a detached session whose first window is `window`.
pub fn new_session(
    runner: &mut dyn Runner,
    name: &str,
    window: Option<&str>,
    dir: Option<&str>,
) -> Result<()> {
    let mut args = vec!["new-session", "-d", "-s", name];
    if let Some(dir) = dir {
        args.extend(["-c", dir]);
    }
    if let Some(window) = window {
        args.extend(["-n", window]);
    }
    runner.run(&args).map(|_| ())
}

/// Append a window to a session without selecting it.
pub fn new_window(runner: &mut dyn Runner, session: &str, name: &str, dir: Option<&str>) -> Result<()> {
    let target = format!("{}:", session);
    let mut args = vec!["new-window", "-d", "-t", target.as_str(), "-n", name];
    if let Some(dir) = dir {
        args.extend(["-c", dir]);
    }
    runner.run(&args).map(|_| ())
}

/// Split `target`, giving the new pane `percent` of its size.
pub fn split_window(
    runner: &mut dyn Runner,
    target: &str,
    direction: SplitDirection,
    percent: usize,
    dir: Option<&str>,
) -> Result<()> {
    let percent = percent.to_string();
    let mut args = vec![
        "split-window",
        direction.tmux_flag(),
        "-p",
        percent.as_str(),
        "-t",
        target,
    ];
    if let Some(dir) = dir {
        args.extend(["-c", dir]);
    }
    runner.run(&args).map(|_| ())
}

/// Type `command` into a pane and press Enter.
pub fn send_keys(runner: &mut dyn Runner, target: &str, command: &str) -> Result<()> {
    runner
        .run(&["send-keys", "-t", target, command, "C-m"])
        .map(|_| ())
}

/// Destroy a session.
pub fn kill_session(runner: &mut dyn Runner, name: &str) -> Result<()> {
    runner.run(&["kill-session", "-t", exact(name).as_str()]).map(|_| ())
}

/// Move the current client to another session.
pub fn switch_client(runner: &mut dyn Runner, name: &str) -> Result<()> {
    runner.run(&["switch-client", "-t", name]).map(|_| ())
}

/// Attach the terminal to a session until the client detaches.
pub fn attach_session(runner: &mut dyn Runner, name: &str) -> Result<()> {
    runner.run_interactive(&["attach-session", "-t", name])
}

/// A runner with canned answers that records every command, for tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Answers commands by their first argument; unscripted commands succeed
    /// with empty output.
    #[derive(Debug, Default)]
    pub struct Scripted {
        responses: Vec<(String, Option<String>)>,
        /// Every command issued, arguments joined by spaces.
        pub calls: Vec<String>,
    }

    impl Scripted {
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer the next `subcommand` call with `output`.
        pub fn ok(mut self, subcommand: &str, output: &str) -> Self {
            self.responses
                .push((subcommand.to_string(), Some(output.to_string())));
            self
        }

        /// Fail the next `subcommand` call.
        pub fn fail(mut self, subcommand: &str) -> Self {
            self.responses.push((subcommand.to_string(), None));
            self
        }

        /// Issued calls starting with `prefix`.
        pub fn calls_to(&self, prefix: &str) -> Vec<&str> {
            self.calls
                .iter()
                .filter(|c| c.starts_with(prefix))
                .map(String::as_str)
                .collect()
        }
    }

    impl Runner for Scripted {
        fn run(&mut self, args: &[&str]) -> Result<String> {
            let line = args.join(" ");
            self.calls.push(line.clone());
            let position = self
                .responses
                .iter()
                .position(|(sub, _)| Some(sub.as_str()) == args.first().copied());
            match position.map(|i| self.responses.remove(i)) {
                Some((_, Some(output))) => Ok(output),
                Some((_, None)) => Err(GridlockError::TmuxError {
                    command: line,
                    output: "scripted failure".into(),
                }),
                None => Ok(String::new()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Scripted;
    use super::*;

    #[test]
    fn test_dry_run_records_quoted_commands() {
        let mut dry = DryRun::quiet();
        send_keys(&mut dry, "s:w.0", "echo hi").unwrap();
        split_window(&mut dry, "s:w.0", SplitDirection::Vertical, 50, Some("/tmp")).unwrap();
        assert_eq!(
            dry.commands,
            vec![
                "tmux send-keys -t s:w.0 'echo hi' C-m",
                "tmux split-window -v -p 50 -t s:w.0 -c /tmp",
            ]
        );
    }

    #[test]
    fn test_shell_words_escapes_single_quotes() {
        assert_eq!(shell_words(&["it's here", ""]), r"'it'\''s here' ''");
    }

    #[test]
    fn test_list_windows_parses_tab_separated() {
        let mut runner = Scripted::new().ok(
            "list-windows",
            "@0\tmy editor\tc26b,210x50,0,0{105x50,0,0,0,104x50,106,0,1}\n@1\tlogs\t8f1e,80x24,0,0,2\nbroken\n",
        );
        let windows = list_windows(&mut runner, "dev").unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].name, "my editor");
        assert_eq!(windows[1].layout, "8f1e,80x24,0,0,2");
        assert!(runner.calls[0].starts_with("list-windows -t =dev -F"));
    }

    #[test]
    fn test_list_panes_parses_ids() {
        let mut runner = Scripted::new().ok(
            "list-panes",
            "%0\t/home/ada/src\tnvim\n%12\t/tmp\tbash\n",
        );
        let panes = list_panes(&mut runner, "@0").unwrap();
        assert_eq!(
            panes[1],
            PaneInfo {
                id: 12,
                current_path: "/tmp".into(),
                current_command: "bash".into(),
            }
        );
    }

    #[test]
    fn test_has_session_uses_exact_target() {
        let mut runner = Scripted::new().fail("has-session");
        assert!(!has_session(&mut runner, "dev"));
        assert!(has_session(&mut runner, "dev"));
        assert_eq!(runner.calls[0], "has-session -t =dev");
    }

    #[test]
    fn test_current_session_name() {
        let mut runner = Scripted::new().ok("display-message", "work\n").ok("display-message", "\n");
        assert_eq!(current_session_name(&mut runner).unwrap(), "work");
        assert!(matches!(
            current_session_name(&mut runner),
            Err(GridlockError::NotInTmux)
        ));
    }

    #[test]
    fn test_pane_base_index() {
        let mut runner = Scripted::new().ok("show-options", "1\n").ok("show-options", "");
        assert_eq!(pane_base_index(&mut runner).unwrap(), 1);
        assert!(pane_base_index(&mut runner).is_err());
    }
}
