use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error};

use crate::error::GitError;

/// The two git operations a sync needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// `git clone <remote_url> <local_path>`
    async fn clone_repository(&self, remote_url: &str, local_path: &Path) -> Result<(), GitError>;

    /// Update every remote-tracking ref of the checkout at `local_path`
    async fn fetch_repository(&self, local_path: &Path) -> Result<(), GitError>;
}

/// Resolve the git executable on `PATH`
pub fn locate_git() -> Option<PathBuf> {
    which::which("git").ok()
}

/// Git client driving the `git` command line
#[derive(Debug, Clone)]
pub struct GitClient {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl GitClient {
    /// Create a client running `program`, optionally bounding each operation
    pub fn new(program: PathBuf, timeout: Option<Duration>) -> Self {
        Self { program, timeout }
    }

    /// Run git with `args`, capturing output
    ///
    /// The child is killed if the deadline expires or the future is dropped.
    async fn run<I, S>(&self, args: I) -> Result<Output, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = AsyncCommand::new(&self.program);
        command.args(args).kill_on_drop(true);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| GitError::TimedOut(limit))??,
            None => command.output().await?,
        };

        if output.status.success() {
            Ok(output)
        } else {
            Err(GitError::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl SourceControl for GitClient {
    async fn clone_repository(&self, remote_url: &str, local_path: &Path) -> Result<(), GitError> {
        debug!("cloning: {}", remote_url);

        let result = self
            .run([OsStr::new("clone"), OsStr::new(remote_url), local_path.as_os_str()])
            .await;

        if matches!(&result, Err(e) if e.is_permission_denied()) {
            error!("hint: make sure you have SSH keys configured for GitHub");
        }

        result.map(|_| ())
    }

    async fn fetch_repository(&self, local_path: &Path) -> Result<(), GitError> {
        debug!("fetching: {}", local_path.display());

        self.run([
            OsStr::new("-C"),
            local_path.as_os_str(),
            OsStr::new("fetch"),
            OsStr::new("--all"),
        ])
        .await
        .map(|_| ())
    }
}
