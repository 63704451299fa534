//! Pull request and release creation via octocrab.

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::info;

use crate::error::GitHubError;

/// The GitHub operations needed to publish a release.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Open a pull request and return its number.
    async fn create_pull_request(
        &self,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<u64, GitHubError>;

    /// Create a GitHub release for an existing tag.
    async fn create_release(
        &self,
        tag: &str,
        name: &str,
        body: &str,
        prerelease: bool,
    ) -> Result<(), GitHubError>;
}

/// [`GitHubClient`] backed by the GitHub REST API.
pub struct OctocrabClient {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

impl OctocrabClient {
    /// Build a client for `owner/repo` authenticated with `token`.
    pub fn new(token: &str, slug: &str) -> Result<Self, GitHubError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| GitHubError::Api(Box::new(e)))?;
        Self::with_client(octocrab, slug)
    }

    /// Use a pre-configured octocrab client, e.g. one pointed at a mock server.
    pub fn with_client(octocrab: Octocrab, slug: &str) -> Result<Self, GitHubError> {
        let (owner, repo) = parse_repo_slug(slug)?;
        Ok(Self {
            octocrab,
            owner,
            repo,
        })
    }

    fn classify(&self, e: octocrab::Error) -> GitHubError {
        let display = e.to_string();
        let debug = format!("{:?}", e);
        if display.to_lowercase().contains("rate limit") || debug.to_lowercase().contains("rate limit") {
            return GitHubError::RateLimited {
                reset_time: "unknown".to_string(),
            };
        }
        if display.contains("Not Found") || debug.contains("Not Found") {
            return GitHubError::RepositoryNotFound {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
            };
        }
        GitHubError::Api(Box::new(e))
    }
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn create_pull_request(
        &self,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<u64, GitHubError> {
        let pr = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        info!(number = pr.number, head, base, "Opened pull request");
        Ok(pr.number)
    }

    async fn create_release(
        &self,
        tag: &str,
        name: &str,
        body: &str,
        prerelease: bool,
    ) -> Result<(), GitHubError> {
        self.octocrab
            .repos(&self.owner, &self.repo)
            .releases()
            .create(tag)
            .name(name)
            .body(body)
            .prerelease(prerelease)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        info!(tag, "Created GitHub release");
        Ok(())
    }
}

/// Split an `owner/repo` slug.
pub fn parse_repo_slug(slug: &str) -> Result<(String, String), GitHubError> {
    match slug.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GitHubError::InvalidRepositoryUrl),
    }
}

/// Extract owner and repo from a git remote URL.
pub fn parse_github_remote(url: &str) -> Result<(String, String), GitHubError> {
    let path = if let Some(path) = url.strip_prefix("git@github.com:") {
        path
    } else if let Some((_, path)) = url.split_once("github.com/") {
        path
    } else {
        return Err(GitHubError::InvalidRepositoryUrl);
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GitHubError::InvalidRepositoryUrl),
    }
}
