//! Command-line interface for gridlock.
//!
//! Parses arguments using clap and provides the [`Cli`] struct containing
//! all user-specified options.

use crate::session::Options;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for gridlock.
///
/// # Examples
///
/// ```bash
/// # Build and attach to the session in ./.gridlock.yaml
/// gridlock
///
/// # Rebuild from another file without attaching
/// gridlock -f work.toml --recreate -d
///
/// # Show the tmux commands that would run
/// gridlock --dry-run
///
/// # Write the current session to ./.gridlock.yaml
/// gridlock init --save-current
/// ```
#[derive(Parser, Debug)]
#[command(name = "gridlock")]
#[command(version)]
#[command(about = "Declarative tmux sessions - build windows and split layouts from a config file")]
#[command(long_about = "Gridlock creates a tmux session, its windows and nested pane splits from a \
    YAML or TOML document,\nand can capture a running session back into such a document.")]
pub struct Cli {
    /// Path to the session document.
    ///
    /// Defaults to the first of `.gridlock.yaml`, `.gridlock.yml` or
    /// `.gridlock.toml` in the current directory.
    #[arg(short = 'f', long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Do not attach to the session after creating it.
    #[arg(short, long)]
    pub detached: bool,

    /// Kill an existing session with the same name first.
    #[arg(long)]
    pub recreate: bool,

    /// Print tmux commands without executing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Log every tmux command.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a new session document (fails if the file exists).
    Init(InitArgs),
}

/// Arguments for `init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Capture the tmux session this client is attached to.
    #[arg(long)]
    pub save_current: bool,

    /// Capture the named tmux session.
    #[arg(long, value_name = "NAME", conflicts_with = "save_current")]
    pub session: Option<String>,
}

impl Cli {
    /// Session options selected by the flags.
    pub fn options(&self) -> Options {
        Options {
            detached: self.detached,
            recreate: self.recreate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from(["gridlock", "-f", "x.toml", "-d", "--recreate", "--dry-run"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(cli.dry_run);
        let options = cli.options();
        assert!(options.detached && options.recreate);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_init_subcommand() {
        let cli = Cli::try_parse_from(["gridlock", "init", "--save-current", "-f", "out.yaml"]).unwrap();
        let Some(Command::Init(args)) = cli.command else {
            panic!("expected init");
        };
        assert!(args.save_current);
        assert_eq!(cli.config, Some(PathBuf::from("out.yaml")));

        assert!(Cli::try_parse_from(["gridlock", "init", "--save-current", "--session", "x"]).is_err());
    }
}
