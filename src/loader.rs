//! Document discovery, loading and writing.
//!
//! Documents are YAML unless the file name ends in `.toml`. Without an
//! explicit path the current directory is searched in this order:
//!
//! 1. `.gridlock.yaml`
//! 2. `.gridlock.yml`
//! 3. `.gridlock.toml`

use crate::config::Config;
use crate::error::{GridlockError, Result};
use std::path::{Path, PathBuf};

/// File written by `init` when no path is given.
pub const DEFAULT_CONFIG: &str = ".gridlock.yaml";

const CANDIDATES: &[&str] = &[DEFAULT_CONFIG, ".gridlock.yml", ".gridlock.toml"];

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML, the default.
    Yaml,
    /// TOML, chosen by a `.toml` extension.
    Toml,
}

impl Format {
    /// Pick the format from a file name.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }

    /// Parse and validate a document.
    ///
    /// # Errors
    ///
    /// Returns the parser's error for malformed text, or
    /// [`GridlockError::InvalidConfig`] if validation fails.
    pub fn parse(self, text: &str) -> Result<Config> {
        let config: Config = match self {
            Format::Yaml => serde_yaml::from_str(text)?,
            Format::Toml => toml::from_str(text)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Render a document.
    pub fn render(self, config: &Config) -> Result<String> {
        Ok(match self {
            Format::Yaml => serde_yaml::to_string(config)?,
            Format::Toml => toml::to_string(config)?,
        })
    }
}

/// Find the document to use in `dir` when no path was given.
///
/// Returns the first existing candidate, or `dir/.gridlock.yaml` if none
/// exists (so the not-found error names the expected file).
pub fn discover(dir: &Path) -> PathBuf {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .unwrap_or_else(|| dir.join(DEFAULT_CONFIG))
}

/// Load and validate the document at `path`.
///
/// # Errors
///
/// - [`GridlockError::ConfigNotFound`] if the file doesn't exist
/// - [`GridlockError::IoError`] if reading fails
/// - a parse or validation error if the document is malformed
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(GridlockError::ConfigNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    Format::from_path(path).parse(&contents)
}

/// Write `config` to a new file at `path`.
///
/// # Errors
///
/// Returns [`GridlockError::AlreadyExists`] rather than overwriting.
pub fn write_new_config(path: &Path, config: &Config) -> Result<()> {
    let text = Format::from_path(path).render(config)?;
    if path.exists() {
        return Err(GridlockError::AlreadyExists(path.to_path_buf()));
    }
    std::fs::write(path, text)?;
    Ok(())
}
