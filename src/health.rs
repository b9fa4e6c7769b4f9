//! Preflight checks
//!
//! Verifies the local environment before any network call is made: the
//! destination base path must be an existing directory and a git executable
//! must be resolvable on `PATH`.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ClonerError;
use crate::git;

/// Outcome of a successful preflight
#[derive(Debug, Clone)]
pub struct Preflight {
    /// Absolute path of the git executable that will be run
    pub git: PathBuf,
}

impl Preflight {
    /// Run all checks, failing on the first one that does not pass
    pub fn run(base_path: &Path) -> Result<Self, ClonerError> {
        Self::check_base_dir(base_path)?;
        let git = Self::check_git()?;
        Ok(Self { git })
    }

    /// Check the destination directory exists
    fn check_base_dir(base_path: &Path) -> Result<(), ClonerError> {
        if !base_path.is_dir() {
            return Err(ClonerError::PathNotFound(base_path.to_path_buf()));
        }
        debug!("path: {}", base_path.display());
        Ok(())
    }

    /// Check git installation
    fn check_git() -> Result<PathBuf, ClonerError> {
        let program = git::locate_git().ok_or(ClonerError::GitNotFound)?;
        debug!("git: {}", program.display());
        Ok(program)
    }
}
