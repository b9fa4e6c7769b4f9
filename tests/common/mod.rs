//! Common test utilities and helpers for github-cloner tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use github_cloner::discovery::{HostingApi, RepositoryDescriptor};
use github_cloner::error::ApiError;

/// Path of the compiled binary under test
pub fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_github-cloner"))
}

/// Binary invocation isolated from the caller's environment
///
/// The defaults file is looked up under the temporary config directory and
/// no token is inherited.
pub fn isolated_binary(config_home: &Path) -> Command {
    let mut command = binary();
    command
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG");
    command
}

/// In-memory hosting API serving a fixed listing for one owner
pub struct FakeApi {
    pub login: String,
    pub repositories: Vec<RepositoryDescriptor>,
}

impl FakeApi {
    pub fn new(login: &str, repositories: Vec<RepositoryDescriptor>) -> Self {
        Self {
            login: login.to_string(),
            repositories,
        }
    }
}

#[async_trait]
impl HostingApi for FakeApi {
    fn login(&self) -> String {
        self.login.clone()
    }

    async fn list_organization_repositories(
        &self,
        _organization: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ApiError> {
        Ok(self.repositories.clone())
    }

    async fn list_own_repositories(&self) -> Result<Vec<RepositoryDescriptor>, ApiError> {
        Ok(self.repositories.clone())
    }

    async fn list_user_repositories(
        &self,
        _user: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ApiError> {
        Ok(self.repositories.clone())
    }
}

/// A directory of local git repositories standing in for remotes
pub struct RemoteFixture {
    pub temp_dir: TempDir,
}

impl RemoteFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Create a repository with one commit and describe it as `full_name`
    pub fn repository(&self, full_name: &str) -> RepositoryDescriptor {
        let path = self.temp_dir.path().join(full_name);
        std::fs::create_dir_all(&path).expect("Failed to create remote dir");

        git(&path, &["init", "--quiet"]);
        git(
            &path,
            &[
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "commit",
                "--quiet",
                "--allow-empty",
                "-m",
                "initial",
            ],
        );

        let url = path.to_string_lossy().into_owned();
        RepositoryDescriptor {
            name: full_name.rsplit('/').next().unwrap_or(full_name).to_string(),
            full_name: full_name.to_string(),
            ssh_url: url.clone(),
            https_url: url,
        }
    }
}

/// Run git in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("Failed to run git");
    assert!(status.success(), "git {:?} failed in {}", args, dir.display());
}

/// The git executable, or `None` when the host has no git installed
pub fn git_or_skip() -> Option<PathBuf> {
    let found = github_cloner::git::locate_git();
    if found.is_none() {
        eprintln!("git not installed, skipping");
    }
    found
}

/// Assertion helpers for test validation
pub fn assert_contains_all(text: &str, expected: &[&str]) {
    for item in expected {
        assert!(
            text.contains(item),
            "Expected text to contain '{}', but it didn't. Text: {}",
            item,
            text
        );
    }
}
