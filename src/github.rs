use async_trait::async_trait;
use octocrab::models::Repository;
use octocrab::{Octocrab, Page};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::is_enterprise_url;
use crate::discovery::{HostingApi, RepositoryDescriptor};
use crate::error::ApiError;

const PER_PAGE: u8 = 100;

/// GitHub client wrapper holding an authenticated session
#[derive(Debug)]
pub struct GitHubClient {
    client: Octocrab,
    login: String,
}

/// Query for `GET /users/{user}/repos`
#[derive(Serialize)]
struct UserReposQuery {
    #[serde(rename = "type")]
    kind: &'static str,
    per_page: u8,
}

impl GitHubClient {
    /// Open a session against `api_url` and resolve the authenticated user
    ///
    /// A custom base URI is only installed for GitHub Enterprise instances.
    pub async fn connect(api_url: &str, token: &str) -> Result<Self, ApiError> {
        info!("init github api: {}", api_url);

        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if is_enterprise_url(api_url) {
            builder = builder
                .base_uri(api_url)
                .map_err(|e| ApiError::Other(format!("invalid api url {}: {}", api_url, e)))?;
        }

        let client = builder.build().map_err(ApiError::from)?;

        let user = client.current().user().await.map_err(ApiError::from)?;

        debug!("authenticated as: {}", user.login);

        Ok(Self {
            client,
            login: user.login,
        })
    }

    /// Follow `next` links from the first page until the listing is exhausted
    async fn collect_pages(
        &self,
        what: &str,
        first: Page<Repository>,
    ) -> Result<Vec<RepositoryDescriptor>, ApiError> {
        let repositories = self.client.all_pages(first).await?;

        debug!("Fetched {} repositories for {}", repositories.len(), what);
        Ok(repositories.iter().map(to_descriptor).collect())
    }
}

/// Convert an octocrab Repository into our descriptor
///
/// Missing URLs are rebuilt from the qualified name so that a sparse API
/// response still yields something cloneable.
pub fn to_descriptor(repo: &Repository) -> RepositoryDescriptor {
    let full_name = repo.full_name.clone().unwrap_or_else(|| {
        match repo.owner.as_ref() {
            Some(owner) => format!("{}/{}", owner.login, repo.name),
            None => repo.name.clone(),
        }
    });

    let ssh_url = repo
        .ssh_url
        .clone()
        .unwrap_or_else(|| format!("git@github.com:{}.git", full_name));
    let https_url = repo
        .clone_url
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_else(|| format!("https://github.com/{}.git", full_name));

    RepositoryDescriptor {
        name: repo.name.clone(),
        full_name,
        ssh_url,
        https_url,
    }
}

#[async_trait]
impl HostingApi for GitHubClient {
    fn login(&self) -> String {
        self.login.clone()
    }

    async fn list_organization_repositories(
        &self,
        org: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ApiError> {
        let first = self
            .client
            .orgs(org)
            .list_repos()
            .per_page(PER_PAGE)
            .send()
            .await?;

        self.collect_pages(org, first).await
    }

    async fn list_own_repositories(&self) -> Result<Vec<RepositoryDescriptor>, ApiError> {
        let first = self
            .client
            .current()
            .list_repos_for_authenticated_user()
            .affiliation("owner")
            .sort("updated")
            .per_page(PER_PAGE)
            .send()
            .await?;

        self.collect_pages(&self.login, first).await
    }

    async fn list_user_repositories(
        &self,
        user: &str,
    ) -> Result<Vec<RepositoryDescriptor>, ApiError> {
        let query = UserReposQuery {
            kind: "owner",
            per_page: PER_PAGE,
        };
        let first: Page<Repository> = self
            .client
            .get(format!("/users/{}/repos", user), Some(&query))
            .await?;

        self.collect_pages(user, first).await
    }
}
