//! Gridlock CLI entry point.
//!
//! This binary provides the `gridlock` command for building tmux sessions
//! from a session document and capturing running sessions into one.

use clap::Parser;
use gridlock::cli::{Cli, Command, InitArgs};
use gridlock::config::Config;
use gridlock::error::Result;
use gridlock::session::{self, Environment};
use gridlock::tmux::{self, DryRun, Runner, Tmux};
use gridlock::{capture, loader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout only carries dry-run output and messages.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Main application logic.
fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Command::Init(args)) => init(&cli, args),
        None => launch(&cli),
    }
}

/// Build the session from its document and attach to it.
fn launch(cli: &Cli) -> Result<()> {
    let path = config_path(cli)?;
    let config = loader::load_config(&path)?;

    let env = Environment::detect(cli.dry_run);
    let mut runner: Box<dyn Runner> = if cli.dry_run {
        Box::new(DryRun::new())
    } else {
        Box::new(Tmux)
    };
    session::launch(runner.as_mut(), &config, cli.options(), &env)?;
    Ok(())
}

/// Write a starter document, or one captured from a live session.
fn init(cli: &Cli, args: &InitArgs) -> Result<()> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(loader::DEFAULT_CONFIG));

    let config = if args.save_current || args.session.is_some() {
        let mut runner = Tmux;
        let name = match &args.session {
            Some(name) => name.clone(),
            None => tmux::current_session_name(&mut runner)?,
        };
        println!("Capturing session: {}", name);
        capture::capture_session(&mut runner, &name, dirs::home_dir().as_deref())?
    } else {
        let cwd = std::env::current_dir()?;
        let name = cwd
            .file_name()
            .map(|n| n.to_string_lossy().replace(['.', ':'], "_"))
            .unwrap_or_else(|| "gridlock".to_string());
        Config::starter(&name)
    };

    loader::write_new_config(&path, &config)?;
    println!(
        "Initialized {} with session name: {}",
        path.display(),
        config.session.name
    );
    Ok(())
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Ok(loader::discover(&std::env::current_dir()?)),
    }
}
