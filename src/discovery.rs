//! Repository discovery
//!
//! This module holds the provider-agnostic side of enumeration: the
//! [`HostingApi`] seam a hosting platform client implements, the choice of
//! listing strategy for a target, and exclusion filtering of the result.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Target;
use crate::error::{ApiError, ClonerError};
use crate::filter;

/// A remote repository as listed by the hosting platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// Repository name without owner (e.g., "core")
    pub name: String,

    /// Qualified name in `owner/name` form
    pub full_name: String,

    /// git@github.com:owner/name.git
    pub ssh_url: String,

    /// https://github.com/owner/name.git
    pub https_url: String,
}

/// Operations needed from a hosting platform
///
/// Implementations must classify a rejected credential as
/// [`ApiError::BadCredentials`] and a missing account as
/// [`ApiError::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Login of the authenticated principal
    fn login(&self) -> String;

    /// Every repository of `org` visible to the credential
    async fn list_organization_repositories(
        &self,
        org: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ApiError>;

    /// The authenticated principal's own repositories, private ones
    /// included, most recently updated first
    async fn list_own_repositories(&self) -> Result<Vec<RepositoryDescriptor>, ApiError>;

    /// Public repositories owned by `user`
    async fn list_user_repositories(
        &self,
        user: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ApiError>;
}

/// Which listing call serves a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStrategy {
    Organization,
    /// The target is the authenticated user: private repositories are reachable
    OwnAccount,
    PublicUser,
}

impl ListingStrategy {
    pub fn select(target: &Target, login: &str) -> Self {
        match target {
            Target::Organization(_) => ListingStrategy::Organization,
            Target::User(name) if name.eq_ignore_ascii_case(login) => ListingStrategy::OwnAccount,
            Target::User(_) => ListingStrategy::PublicUser,
        }
    }
}

/// List the target's repositories and drop excluded ones
///
/// Retained repositories keep the order the API returned them in.
pub async fn enumerate<A>(
    api: &A,
    target: &Target,
    exclude: Option<&str>,
) -> Result<Vec<RepositoryDescriptor>, ClonerError>
where
    A: HostingApi + ?Sized,
{
    info!("getting repositories: {}", target);

    let strategy = ListingStrategy::select(target, &api.login());
    let listed = match strategy {
        ListingStrategy::Organization => {
            debug!("found organization: {}", target.name());
            api.list_organization_repositories(target.name()).await
        }
        ListingStrategy::OwnAccount => {
            debug!("found authenticated user: {}", target.name());
            api.list_own_repositories().await
        }
        ListingStrategy::PublicUser => {
            debug!("found user: {}", target.name());
            api.list_user_repositories(target.name()).await
        }
    }
    .map_err(|e| ClonerError::from_listing(e, target))?;

    let repositories: Vec<RepositoryDescriptor> = listed
        .into_iter()
        .filter(|repo| {
            if filter::is_excluded(&repo.name, exclude) {
                warn!("excluding: {}", repo.full_name);
                false
            } else {
                debug!("found: {}", repo.full_name);
                true
            }
        })
        .collect();

    info!("found {} repositories to process", repositories.len());

    if repositories.is_empty() && target.is_user() {
        warn!("no repositories found. this could mean:");
        warn!("- the user has no repositories");
        warn!("- all repositories are private and your token lacks 'repo' scope");
        warn!("- check your token has the necessary permissions for private repos");
    }

    Ok(repositories)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;

    pub(crate) fn descriptor(full_name: &str) -> RepositoryDescriptor {
        let name = full_name.rsplit('/').next().unwrap_or(full_name).to_string();
        RepositoryDescriptor {
            name,
            full_name: full_name.to_string(),
            ssh_url: format!("git@github.com:{}.git", full_name),
            https_url: format!("https://github.com/{}.git", full_name),
        }
    }

    fn names(repos: &[RepositoryDescriptor]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_strategy_organization() {
        let target = Target::Organization("octocat".to_string());
        assert_eq!(
            ListingStrategy::select(&target, "octocat"),
            ListingStrategy::Organization
        );
    }

    #[test]
    fn test_strategy_own_account_case_insensitive() {
        let target = Target::User("OctoCat".to_string());
        assert_eq!(
            ListingStrategy::select(&target, "octocat"),
            ListingStrategy::OwnAccount
        );
    }

    #[test]
    fn test_strategy_other_user() {
        let target = Target::User("hubot".to_string());
        assert_eq!(
            ListingStrategy::select(&target, "octocat"),
            ListingStrategy::PublicUser
        );
    }

    #[tokio::test]
    async fn test_enumerate_organization_with_exclusion() {
        let mut api = MockHostingApi::new();
        api.expect_login().return_const("someone".to_string());
        api.expect_list_organization_repositories()
            .withf(|org| org == "acme")
            .times(1)
            .returning(|_| {
                Ok(vec![
                    descriptor("acme/core"),
                    descriptor("acme/core-archived"),
                    descriptor("acme/sdk"),
                ])
            });

        let target = Target::Organization("acme".to_string());
        let repos = enumerate(&api, &target, Some("-archived")).await.unwrap();

        assert_eq!(names(&repos), vec!["core", "sdk"]);
    }

    #[tokio::test]
    async fn test_enumerate_own_account_uses_private_listing() {
        let mut api = MockHostingApi::new();
        api.expect_login().return_const("octocat".to_string());
        api.expect_list_own_repositories()
            .times(1)
            .returning(|| Ok(vec![descriptor("octocat/secret"), descriptor("octocat/public")]));
        api.expect_list_user_repositories().never();

        let target = Target::User("Octocat".to_string());
        let repos = enumerate(&api, &target, None).await.unwrap();

        assert_eq!(names(&repos), vec!["secret", "public"]);
    }

    #[tokio::test]
    async fn test_enumerate_other_user_uses_public_listing() {
        let mut api = MockHostingApi::new();
        api.expect_login().return_const("octocat".to_string());
        api.expect_list_own_repositories().never();
        api.expect_list_user_repositories()
            .withf(|user| user == "hubot")
            .times(1)
            .returning(|_| Ok(vec![descriptor("hubot/scripts")]));

        let target = Target::User("hubot".to_string());
        let repos = enumerate(&api, &target, None).await.unwrap();

        assert_eq!(names(&repos), vec!["scripts"]);
    }

    #[tokio::test]
    async fn test_enumerate_empty_user_is_not_an_error() {
        let mut api = MockHostingApi::new();
        api.expect_login().return_const("octocat".to_string());
        api.expect_list_user_repositories().returning(|_| Ok(Vec::new()));

        let target = Target::User("nobody".to_string());
        let repos = enumerate(&api, &target, None).await.unwrap();

        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn test_enumerate_not_found() {
        let mut api = MockHostingApi::new();
        api.expect_login().return_const("octocat".to_string());
        api.expect_list_organization_repositories()
            .returning(|_| Err(ApiError::NotFound));

        let target = Target::Organization("missing".to_string());
        let err = enumerate(&api, &target, None).await.unwrap_err();

        assert_matches!(
            err,
            ClonerError::TargetNotFound(Target::Organization(ref name)) if name == "missing"
        );
    }

    #[tokio::test]
    async fn test_enumerate_other_failure() {
        let mut api = MockHostingApi::new();
        api.expect_login().return_const("octocat".to_string());
        api.expect_list_user_repositories()
            .returning(|_| Err(ApiError::Other("API rate limit exceeded".to_string())));

        let target = Target::User("hubot".to_string());
        let err = enumerate(&api, &target, None).await.unwrap_err();

        assert_matches!(err, ClonerError::Api(ref msg) if msg.contains("rate limit"));
    }
}
