//! # Gridlock
//!
//! Declarative tmux sessions: describe a session, its windows, panes and a
//! nested split layout in one document, and gridlock issues the tmux commands
//! that build it. It also works in reverse, capturing a running session's
//! windows and split geometry into a document.
//!
//! ## Quick Example
//!
//! ```yaml
//! # .gridlock.yaml
//! session:
//!   name: api
//!   working-directory: ~/src/api
//!   windows:
//!     - name: dev
//!       panes:
//!         - name: editor
//!           command: nvim
//!         - name: server
//!           command: cargo run
//!         - name: tests
//!           command: cargo watch -x test
//!       layout:
//!         columns:
//!           - editor
//!           - rows: [server, tests]
//! ```
//!
//! ## Architecture
//!
//! The crate is organized into these modules:
//!
//! - [`config`]: Session document data structures and validation
//! - [`loader`]: Document discovery, YAML/TOML loading and writing
//! - [`cli`]: Command-line argument parsing with clap
//! - [`resolver`]: Pane name lookup and synthesized capture names
//! - [`workdir`]: Working directory fallback and `~` handling
//! - [`compiler`]: Layout tree to `split-window` / `send-keys` sequence
//! - [`geometry`]: Parsing tmux `window_layout` strings
//! - [`session`]: Create, reuse or recreate a session, then attach
//! - [`capture`]: Live session to document
//! - [`tmux`]: Command runners and tmux queries
//! - [`error`]: Error types

pub mod capture;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod resolver;
pub mod session;
pub mod tmux;
pub mod workdir;

pub use config::{Config, LayoutNode, Pane, Session, Window};
pub use error::{GeometryError, GridlockError, Result};
