//! Sync Engine - clone-or-fetch for every enumerated repository
//!
//! Each repository is resolved to a [`SyncTarget`], then [`SyncAction::decide`]
//! picks clone or fetch from the state of the filesystem. Operations run
//! sequentially by default; with more than one job they run on a
//! semaphore-bounded pool. Either way the first failure aborts the batch.

use futures::stream::{FuturesUnordered, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::{RunConfiguration, Transport};
use crate::discovery::RepositoryDescriptor;
use crate::error::ClonerError;
use crate::git::SourceControl;
use crate::paths;

/// Where a repository goes and where it comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub full_name: String,
    pub local_path: PathBuf,
    pub remote_url: String,
}

impl SyncTarget {
    /// Derive the target of `repo` under `config`
    pub fn resolve(repo: &RepositoryDescriptor, config: &RunConfiguration) -> Self {
        let remote_url = match config.transport {
            Transport::Ssh => repo.ssh_url.clone(),
            Transport::Https => repo.https_url.clone(),
        };

        let local_path = paths::resolve(
            &repo.full_name,
            &config.base_path,
            config.target.name(),
            config.omit_root_segment,
        );

        Self {
            full_name: repo.full_name.clone(),
            local_path,
            remote_url,
        }
    }
}

/// What to do with a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Clone,
    Fetch,
}

impl SyncAction {
    /// Fetch when `local_path` already is a directory, clone otherwise
    pub fn decide(local_path: &Path) -> Self {
        if local_path.is_dir() {
            SyncAction::Fetch
        } else {
            SyncAction::Clone
        }
    }
}

/// Results from a complete sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub cloned: usize,
    pub fetched: usize,
    pub duration: Duration,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.cloned + self.fetched
    }

    fn record(&mut self, action: SyncAction) {
        match action {
            SyncAction::Clone => self.cloned += 1,
            SyncAction::Fetch => self.fetched += 1,
        }
    }
}

/// Clone or fetch a single target
pub async fn sync_one<S>(git: &S, target: &SyncTarget) -> Result<SyncAction, ClonerError>
where
    S: SourceControl + ?Sized,
{
    info!("processing: {}", target.full_name);
    debug!("remote: {}", target.remote_url);
    debug!("path: {}", target.local_path.display());

    paths::ensure_parent_directories(&target.local_path).map_err(|e| {
        ClonerError::Unexpected(anyhow::anyhow!(
            "failed to create parent directories for {}: {}",
            target.local_path.display(),
            e
        ))
    })?;

    let action = SyncAction::decide(&target.local_path);
    match action {
        SyncAction::Clone => clone_staged(git, target).await?,
        SyncAction::Fetch => git
            .fetch_repository(&target.local_path)
            .await
            .map_err(|source| ClonerError::FetchFailed {
                path: target.local_path.clone(),
                source,
            })?,
    }

    Ok(action)
}

/// Clone into the staging sibling and move the finished checkout into place
///
/// Leftovers of an interrupted earlier clone are removed first; a failed
/// clone removes its own.
async fn clone_staged<S>(git: &S, target: &SyncTarget) -> Result<(), ClonerError>
where
    S: SourceControl + ?Sized,
{
    let staging = paths::staging_path(&target.local_path);

    if staging.exists() {
        debug!("removing interrupted clone: {}", staging.display());
        tokio::fs::remove_dir_all(&staging).await.map_err(|e| {
            ClonerError::Unexpected(anyhow::anyhow!(
                "failed to remove interrupted clone {}: {}",
                staging.display(),
                e
            ))
        })?;
    }

    if let Err(source) = git.clone_repository(&target.remote_url, &staging).await {
        if staging.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&staging).await {
                warn!("failed to remove partial clone {}: {}", staging.display(), e);
            }
        }
        return Err(ClonerError::CloneFailed {
            path: target.local_path.clone(),
            source,
        });
    }

    tokio::fs::rename(&staging, &target.local_path)
        .await
        .map_err(|e| {
            ClonerError::Unexpected(anyhow::anyhow!(
                "failed to move clone into {}: {}",
                target.local_path.display(),
                e
            ))
        })
}

/// Drives clone/fetch across all targets of a run
pub struct SyncEngine<S: SourceControl + ?Sized> {
    git: Arc<S>,
    jobs: usize,
}

impl<S: SourceControl + ?Sized + 'static> SyncEngine<S> {
    pub fn new(git: Arc<S>, jobs: usize) -> Self {
        Self {
            git,
            jobs: jobs.max(1),
        }
    }

    /// Sync every target, stopping at the first failure
    pub async fn sync_all(&self, targets: Vec<SyncTarget>) -> Result<SyncSummary, ClonerError> {
        let start_time = Instant::now();

        let mut summary = if self.jobs == 1 {
            self.sync_sequential(targets).await?
        } else {
            self.sync_parallel(targets).await?
        };

        summary.duration = start_time.elapsed();

        info!(
            "sync completed in {:.2}s: {} cloned, {} fetched",
            summary.duration.as_secs_f64(),
            summary.cloned,
            summary.fetched
        );

        Ok(summary)
    }

    /// One target at a time, in enumeration order
    async fn sync_sequential(&self, targets: Vec<SyncTarget>) -> Result<SyncSummary, ClonerError> {
        let mut summary = SyncSummary::default();

        for target in &targets {
            let action = sync_one(self.git.as_ref(), target).await?;
            summary.record(action);
        }

        Ok(summary)
    }

    /// Up to `jobs` targets at a time
    ///
    /// Returning early drops the remaining futures, which kills their git
    /// children. Their clones stay in staging and are redone on the next run.
    async fn sync_parallel(&self, targets: Vec<SyncTarget>) -> Result<SyncSummary, ClonerError> {
        info!(
            "syncing {} repositories with {} parallel jobs",
            targets.len(),
            self.jobs
        );

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut futures = FuturesUnordered::new();

        for target in targets {
            let semaphore = Arc::clone(&semaphore);
            let git = Arc::clone(&self.git);

            futures.push(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ClonerError::Unexpected(e.into()))?;
                sync_one(git.as_ref(), &target).await
            });
        }

        let mut summary = SyncSummary::default();
        while let Some(result) = futures.next().await {
            summary.record(result?);
        }

        Ok(summary)
    }
}
