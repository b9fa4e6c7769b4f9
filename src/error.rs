//! Error taxonomy and process exit codes
//!
//! Every fatal condition of a run is a [`ClonerError`] variant, and every
//! variant maps to exactly one [`Exit`] code. The lower-level seams use their
//! own error types ([`ApiError`] for the hosting API, [`GitError`] for git
//! subprocesses) which the orchestrator lifts into `ClonerError` together
//! with the stage that produced them.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::Target;

/// Distinct process exit codes, one per failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Exit {
    Success = 0,
    ExecutionError = 1,
    MissingArguments = 2,
    PathError = 10,
    GitNotFound = 20,
    GitCloneError = 21,
    GitFetchError = 22,
    GitHubError = 30,
    AuthError = 40,
}

impl Exit {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<Exit> for std::process::ExitCode {
    fn from(exit: Exit) -> Self {
        std::process::ExitCode::from(exit.code())
    }
}

/// Errors reported by a hosting platform API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bearer credential was rejected
    #[error("bad credentials")]
    BadCredentials,

    /// The requested user or organization does not exist (or is invisible to the token)
    #[error("not found")]
    NotFound,

    /// Any other connectivity or API failure
    #[error("{0}")]
    Other(String),
}

impl From<octocrab::Error> for ApiError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => match source.status_code.as_u16() {
                401 => ApiError::BadCredentials,
                404 => ApiError::NotFound,
                _ => ApiError::Other(source.message.clone()),
            },
            _ => ApiError::Other(err.to_string()),
        }
    }
}

/// Errors reported by a git subprocess
#[derive(Debug, Error)]
pub enum GitError {
    /// git ran and exited non-zero
    #[error("{stderr}")]
    Failed { stderr: String },

    /// git could not be started at all
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// The operation did not finish before the configured deadline
    #[error("timed out after {:.1}s", .0.as_secs_f64())]
    TimedOut(Duration),
}

impl GitError {
    /// Whether git's diagnostics point at a missing or rejected SSH key
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, GitError::Failed { stderr } if stderr.contains("Permission denied"))
    }
}

/// Every fatal condition of a run
#[derive(Debug, Error)]
pub enum ClonerError {
    #[error("destination path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("git executable not installed or not in $PATH")]
    GitNotFound,

    #[error("git clone failed for {}: {source}", path.display())]
    CloneFailed {
        path: PathBuf,
        #[source]
        source: GitError,
    },

    #[error("git fetch failed for {}: {source}", path.display())]
    FetchFailed {
        path: PathBuf,
        #[source]
        source: GitError,
    },

    #[error("GitHub token not provided. use -t or set GITHUB_TOKEN environment variable")]
    MissingToken,

    #[error("authentication failed: invalid token")]
    BadCredentials,

    #[error("{} '{}' not found", .0.kind_title(), .0.name())]
    TargetNotFound(Target),

    #[error("{0}")]
    Api(String),

    #[error("unexpected error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl ClonerError {
    /// Exit code this error terminates the process with
    pub fn exit(&self) -> Exit {
        match self {
            ClonerError::PathNotFound(_) => Exit::PathError,
            ClonerError::GitNotFound => Exit::GitNotFound,
            ClonerError::CloneFailed { .. } => Exit::GitCloneError,
            ClonerError::FetchFailed { .. } => Exit::GitFetchError,
            ClonerError::MissingToken | ClonerError::BadCredentials => Exit::AuthError,
            ClonerError::TargetNotFound(_) | ClonerError::Api(_) => Exit::GitHubError,
            ClonerError::Unexpected(_) => Exit::ExecutionError,
        }
    }

    /// Lift an API error raised while establishing the session
    pub fn from_auth(err: ApiError) -> Self {
        match err {
            ApiError::BadCredentials => ClonerError::BadCredentials,
            other => ClonerError::Api(format!("failed to initialize github api: {}", other)),
        }
    }

    /// Lift an API error raised while listing repositories of `target`
    pub fn from_listing(err: ApiError, target: &Target) -> Self {
        match err {
            ApiError::NotFound => ClonerError::TargetNotFound(target.clone()),
            other => ClonerError::Api(format!(
                "failed to get {} repositories: {}",
                target.kind(),
                other
            )),
        }
    }
}
