// Application state module
// Immutable per-process state shared by every request

use std::io;
use std::path::PathBuf;

use super::types::Config;

/// Application state
///
/// Built once at startup and shared behind an `Arc`. Nothing in it changes
/// afterwards, so requests read it without synchronization.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical form of `config.server.base_path`
    pub base_dir: PathBuf,
}

impl AppState {
    /// Canonicalize the base directory and freeze the configuration
    pub fn new(config: Config) -> io::Result<Self> {
        let base_dir = PathBuf::from(&config.server.base_path)
            .canonicalize()
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("base path '{}': {e}", config.server.base_path),
                )
            })?;

        if !base_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("base path '{}' is not a directory", base_dir.display()),
            ));
        }

        Ok(Self { config, base_dir })
    }
}
