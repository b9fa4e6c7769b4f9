//! Run orchestration
//!
//! `VALIDATE_ENV → AUTHENTICATE → ENUMERATE → (dry run ? STOP : SYNC_EACH)`.
//! Every stage returns early with its [`ClonerError`]; the API session is
//! owned by [`run`] and dropped on every exit path.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::RunConfiguration;
use crate::discovery::{self, HostingApi};
use crate::error::ClonerError;
use crate::git::{GitClient, SourceControl};
use crate::github::GitHubClient;
use crate::health::Preflight;
use crate::sync::{SyncAction, SyncEngine, SyncSummary, SyncTarget};

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Enumeration only; the action each target would have received
    DryRun(Vec<(SyncTarget, SyncAction)>),
    Completed(SyncSummary),
}

/// Execute a full run against GitHub and the local git installation
pub async fn run(config: &RunConfiguration) -> Result<RunOutcome, ClonerError> {
    let preflight = Preflight::run(&config.base_path)?;

    info!("init github auth");
    if config.is_enterprise() {
        debug!("using github enterprise api: {}", config.api_url);
    }
    let client = GitHubClient::connect(&config.api_url, &config.token)
        .await
        .map_err(ClonerError::from_auth)?;

    let git = Arc::new(GitClient::new(preflight.git, config.timeout));

    execute(config, &client, git).await
}

/// Enumerate and sync using the given collaborators
pub async fn execute<A, S>(
    config: &RunConfiguration,
    api: &A,
    git: Arc<S>,
) -> Result<RunOutcome, ClonerError>
where
    A: HostingApi + ?Sized,
    S: SourceControl + ?Sized + 'static,
{
    let repositories =
        discovery::enumerate(api, &config.target, config.exclude.as_deref()).await?;

    let targets: Vec<SyncTarget> = repositories
        .iter()
        .map(|repo| SyncTarget::resolve(repo, config))
        .collect();

    if config.dry_run {
        let planned: Vec<(SyncTarget, SyncAction)> = targets
            .into_iter()
            .map(|target| {
                let action = SyncAction::decide(&target.local_path);
                let verb = match action {
                    SyncAction::Clone => "would clone",
                    SyncAction::Fetch => "would fetch",
                };
                info!("{}: {} -> {}", verb, target.full_name, target.local_path.display());
                (target, action)
            })
            .collect();

        info!("dry-run completed");
        return Ok(RunOutcome::DryRun(planned));
    }

    let summary = SyncEngine::new(git, config.jobs).sync_all(targets).await?;

    info!("mission accomplished");
    Ok(RunOutcome::Completed(summary))
}
