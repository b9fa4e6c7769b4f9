//! github-cloner - Mirror every repository of a GitHub user or organization
//!
//! github-cloner enumerates the repositories owned by a GitHub account and
//! keeps a local directory tree in sync with them: missing repositories are
//! cloned, existing checkouts are fetched.
//!
//! ## Core Features
//!
//! - **Discovery**: Organization, own-account and public-user listings via the GitHub API
//! - **Deterministic Layout**: Lowercased `owner/repo` paths under a base directory
//! - **Filtering**: Substring exclusion on repository names
//! - **Enterprise Support**: Custom API base URL for GitHub Enterprise
//! - **Bounded Parallelism**: Optional concurrent clone/fetch with fail-fast
//!
//! ## Modules
//!
//! - [`config`]: Run configuration and the optional YAML defaults file
//! - [`discovery`]: Repository enumeration and exclusion
//! - [`github`]: GitHub API client
//! - [`git`]: Git command-line driver
//! - [`sync`]: Clone-or-fetch decision and execution
//! - [`cloner`]: End-to-end run orchestration

pub mod cloner;
pub mod config;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod git;
pub mod github;
pub mod health;
pub mod logging;
pub mod paths;
pub mod sync;

pub use cloner::RunOutcome;
pub use config::{FileConfig, RunConfiguration, Target, Transport};
pub use discovery::{HostingApi, RepositoryDescriptor};
pub use error::{ClonerError, Exit};
pub use git::{GitClient, SourceControl};
pub use github::GitHubClient;
pub use sync::{SyncAction, SyncEngine, SyncSummary, SyncTarget};
