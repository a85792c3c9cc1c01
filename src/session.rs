//! Session lifecycle: create or reuse a session, then attach to it.
//!
//! A run moves a session through these states:
//!
//! ```text
//! absent -> created -> configured -> attached | switched | detached
//! ```
//!
//! An existing session is left exactly as it is unless `recreate` is set, in
//! which case it is killed first. Whether to attach, switch the current
//! client, or do nothing depends on the [`Environment`] passed in by the
//! caller rather than on the process environment.

use crate::compiler::Compiler;
use crate::config::{Config, Window};
use crate::error::Result;
use crate::tmux::{self, Runner};
use crate::workdir;
use std::path::PathBuf;
use tracing::{info, warn};

/// Facts about the surroundings of this run.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Running inside a tmux client (`$TMUX` is set).
    pub inside_tmux: bool,
    /// Commands are printed, not executed; the live server is never queried.
    pub dry_run: bool,
    /// Home directory used for `~` expansion.
    pub home: Option<PathBuf>,
}

impl Environment {
    /// Read the environment of the current process.
    pub fn detect(dry_run: bool) -> Self {
        Self {
            inside_tmux: std::env::var_os("TMUX").is_some(),
            dry_run,
            home: dirs::home_dir(),
        }
    }
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Build the session but do not attach or switch to it.
    pub detached: bool,
    /// Kill an existing session of the same name first.
    pub recreate: bool,
}

/// How the session came to exist in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setup {
    /// Created and configured from the document.
    Created,
    /// Already running; left untouched.
    Reused,
}

/// How the run ended for the user's terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Attached this terminal until the client detached.
    Attached,
    /// Moved the surrounding tmux client to the session.
    Switched,
    /// Left running in the background.
    Detached,
}

/// Bring the session described by `config` up and attach to it.
///
/// # Errors
///
/// Fails when the session cannot be created, when a split or `send-keys`
/// fails, and when the final attach or switch fails. Killing an old session
/// and creating additional windows only log on failure.
pub fn launch(
    runner: &mut dyn Runner,
    config: &Config,
    options: Options,
    env: &Environment,
) -> Result<(Setup, Attachment)> {
    let name = config.session.name.as_str();

    let mut exists = !env.dry_run && tmux::has_session(runner, name);
    if exists && options.recreate {
        info!(session = name, "killing existing session");
        if let Err(e) = tmux::kill_session(runner, name) {
            warn!(session = name, error = %e, "failed to kill existing session");
        }
        exists = false;
    }

    let setup = if exists {
        info!(session = name, "session already exists, leaving it untouched");
        Setup::Reused
    } else {
        info!(session = name, "creating session");
        create(runner, config, env)?;
        Setup::Created
    };

    let attachment = if options.detached {
        Attachment::Detached
    } else if env.inside_tmux {
        info!(session = name, "switching to session");
        tmux::switch_client(runner, name)?;
        Attachment::Switched
    } else {
        info!(session = name, "attaching to session");
        tmux::attach_session(runner, name)?;
        Attachment::Attached
    };

    Ok((setup, attachment))
}

/// Create the session and all of its windows, then build each layout.
fn create(runner: &mut dyn Runner, config: &Config, env: &Environment) -> Result<()> {
    let session = &config.session;
    let session_dir = session.working_directory.as_deref();
    let home = env.home.as_deref();

    let first_dir = |window: &Window| match window.effective_layout() {
        Some(layout) => workdir::effective_dir(&layout, window, session_dir, home),
        None => workdir::window_dir(window, session_dir, home),
    };

    let first = session.windows.first();
    let dir = match first {
        Some(window) => first_dir(window),
        None => session_dir.map(|d| workdir::expand_home(d, home)),
    };
    tmux::new_session(
        runner,
        &session.name,
        first.map(|w| w.name.as_str()),
        dir.as_deref(),
    )?;

    let base = if env.dry_run {
        0
    } else {
        tmux::pane_base_index(runner).unwrap_or_else(|e| {
            warn!(error = %e, "could not read pane-base-index, assuming 0");
            0
        })
    };

    for (i, window) in session.windows.iter().enumerate() {
        if i > 0 {
            let dir = first_dir(window);
            if let Err(e) = tmux::new_window(runner, &session.name, &window.name, dir.as_deref()) {
                warn!(window = %window.name, error = %e, "failed to create window, skipping its layout");
                continue;
            }
        }

        let Some(layout) = window.effective_layout() else {
            continue;
        };
        let target = format!("{}:{}", session.name, window.name);
        Compiler::new(runner)
            .with_home(env.home.clone())
            .apply(&target, base, &layout, window, session_dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutNode, Pane, Session};
    use crate::tmux::DryRun;
    use crate::tmux::testing::Scripted;

    fn config() -> Config {
        Config {
            session: Session {
                name: "proj".into(),
                working_directory: Some("~/proj".into()),
                windows: vec![
                    Window {
                        name: "code".into(),
                        working_directory: None,
                        panes: vec![
                            Pane {
                                name: "editor".into(),
                                command: Some("nvim".into()),
                                ..Pane::default()
                            },
                            Pane {
                                name: "shell".into(),
                                working_directory: Some("/tmp".into()),
                                ..Pane::default()
                            },
                        ],
                        layout: Some(LayoutNode::columns_of(["editor", "shell"])),
                    },
                    Window {
                        name: "logs".into(),
                        working_directory: Some("/var/log".into()),
                        panes: vec![Pane {
                            name: "tail".into(),
                            command: Some("tail -f syslog".into()),
                            ..Pane::default()
                        }],
                        layout: None,
                    },
                ],
            },
        }
    }

    fn env(inside_tmux: bool, dry_run: bool) -> Environment {
        Environment {
            inside_tmux,
            dry_run,
            home: Some(PathBuf::from("/home/ada")),
        }
    }

    #[test]
    fn test_dry_run_creates_everything() {
        let mut dry = DryRun::quiet();
        let options = Options {
            detached: false,
            recreate: false,
        };
        let result = launch(&mut dry, &config(), options, &env(false, true)).unwrap();
        assert_eq!(result, (Setup::Created, Attachment::Attached));
        assert_eq!(
            dry.commands,
            vec![
                "tmux new-session -d -s proj -c /home/ada/proj -n code",
                "tmux split-window -h -p 50 -t proj:code.0 -c /tmp",
                "tmux send-keys -t proj:code.0 nvim C-m",
                "tmux new-window -d -t proj: -n logs -c /var/log",
                "tmux send-keys -t proj:logs.0 'tail -f syslog' C-m",
                "tmux attach-session -t proj",
            ]
        );
    }

    #[test]
    fn test_existing_session_is_left_untouched() {
        let mut runner = Scripted::new();
        let result = launch(&mut runner, &config(), Options::default(), &env(true, false)).unwrap();
        assert_eq!(result, (Setup::Reused, Attachment::Switched));
        assert_eq!(runner.calls, vec!["has-session -t =proj", "switch-client -t proj"]);
    }

    #[test]
    fn test_recreate_survives_failed_kill() {
        let mut runner = Scripted::new().fail("kill-session").ok("show-options", "1\n");
        let options = Options {
            detached: true,
            recreate: true,
        };
        let result = launch(&mut runner, &config(), options, &env(false, false)).unwrap();
        assert_eq!(result, (Setup::Created, Attachment::Detached));
        assert_eq!(runner.calls_to("kill-session").len(), 1);
        assert_eq!(runner.calls_to("new-session").len(), 1);
        assert_eq!(
            runner.calls_to("send-keys"),
            vec![
                "send-keys -t proj:code.1 nvim C-m",
                "send-keys -t proj:logs.1 tail -f syslog C-m",
            ]
        );
        assert!(runner.calls_to("attach-session").is_empty());
    }

    #[test]
    fn test_failed_window_is_skipped() {
        let mut runner = Scripted::new().fail("has-session").fail("new-window");
        let options = Options {
            detached: true,
            recreate: false,
        };
        launch(&mut runner, &config(), options, &env(false, false)).unwrap();
        assert!(runner.calls_to("send-keys -t proj:logs").is_empty());
        assert_eq!(runner.calls_to("send-keys -t proj:code").len(), 1);
    }

    #[test]
    fn test_attach_failure_is_fatal() {
        let mut runner = Scripted::new().fail("has-session").fail("attach-session");
        let result = launch(&mut runner, &config(), Options::default(), &env(false, false));
        assert!(result.is_err());
    }
}
