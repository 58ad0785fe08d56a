use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use tollgate_core::{ChangeSet, ChangedFile, TollgateError};

/// Anything that can list the files a pull request changes.
///
/// The classifier only ever sees the returned [`ChangeSet`], so tests can
/// substitute a canned source for the network.
#[async_trait]
pub trait ChangedFileSource: Send + Sync {
    /// Fetch the changed files of pull request `pr_number`.
    async fn fetch_changed_files(&self, pr_number: u64) -> Result<ChangeSet, TollgateError>;
}

#[async_trait]
impl ChangedFileSource for ChangeSet {
    async fn fetch_changed_files(&self, _pr_number: u64) -> Result<ChangeSet, TollgateError> {
        Ok(self.clone())
    }
}

/// A repository identity (`owner/name`).
///
/// # Examples
///
/// ```
/// use tollgate_github::client::Repository;
///
/// let repo: Repository = "dan1hc/fqr".parse().unwrap();
/// assert_eq!(repo.owner, "dan1hc");
/// assert_eq!(repo.name, "fqr");
/// assert_eq!(repo.to_string(), "dan1hc/fqr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// User or organization that owns the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl Repository {
    /// Create a repository identity from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for Repository {
    type Err = TollgateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_repository(s)
    }
}

/// Parse a repository reference (`owner/name`).
///
/// # Errors
///
/// Returns [`TollgateError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use tollgate_github::client::parse_repository;
///
/// let repo = parse_repository("octocat/hello-world").unwrap();
/// assert_eq!(repo.owner, "octocat");
/// assert!(parse_repository("hello-world").is_err());
/// ```
pub fn parse_repository(reference: &str) -> Result<Repository, TollgateError> {
    let invalid = || {
        TollgateError::Config(format!(
            "invalid repository '{reference}', expected owner/name"
        ))
    };
    let (owner, name) = reference.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return Err(invalid());
    }
    Ok(Repository::new(owner, name))
}

#[derive(Serialize)]
struct ListFilesParams {
    per_page: usize,
}

/// GitHub client that lists one page of a pull request's changed files.
///
/// # Examples
///
/// ```no_run
/// use tollgate_github::client::{GitHubClient, Repository};
///
/// let client = GitHubClient::new(
///     Some("ghp_xxxx"),
///     None,
///     Repository::new("dan1hc", "fqr"),
///     100,
/// )
/// .unwrap();
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    repository: Repository,
    page_size: usize,
}

impl GitHubClient {
    /// Create a client from an explicit token or the `GITHUB_TOKEN` environment variable.
    ///
    /// `api_url` overrides the API base (GitHub Enterprise, test servers).
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Config`] if no token is available or the URL
    /// is invalid, or [`TollgateError::GitHub`] if the client cannot be built.
    pub fn new(
        token: Option<&str>,
        api_url: Option<&str>,
        repository: Repository,
        page_size: usize,
    ) -> Result<Self, TollgateError> {
        let token = match token {
            Some(t) => t.to_string(),
            None => std::env::var("GITHUB_TOKEN").map_err(|_| {
                TollgateError::Config(
                    "GITHUB_TOKEN not set. Pass --token, set the `token` input, or set GITHUB_TOKEN"
                        .into(),
                )
            })?,
        };

        // one request per run; failures are reported, never retried
        let mut builder = octocrab::Octocrab::builder()
            .personal_token(token)
            .add_retry_config(octocrab::service::middleware::retry::RetryConfig::None);
        if let Some(url) = api_url {
            builder = builder.base_uri(url).map_err(|e| {
                TollgateError::Config(format!("invalid GitHub API URL '{url}': {e}"))
            })?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| TollgateError::GitHub(format!("failed to create GitHub client: {e}")))?;

        Ok(Self {
            octocrab,
            repository,
            page_size,
        })
    }

    /// The repository this client queries.
    pub fn repository(&self) -> &Repository {
        &self.repository
    }
}

#[async_trait]
impl ChangedFileSource for GitHubClient {
    /// Request a single page of `page_size` records; further pages are never fetched.
    async fn fetch_changed_files(&self, pr_number: u64) -> Result<ChangeSet, TollgateError> {
        let route = format!(
            "/repos/{}/{}/pulls/{pr_number}/files",
            self.repository.owner, self.repository.name
        );
        tracing::debug!(%route, per_page = self.page_size, "listing pull request files");

        let files: Vec<ChangedFile> = self
            .octocrab
            .get(
                route,
                Some(&ListFilesParams {
                    per_page: self.page_size,
                }),
            )
            .await
            .map_err(|e| TollgateError::GitHub(describe(e)))?;

        tracing::debug!(count = files.len(), "received pull request files");
        Ok(ChangeSet::new(files))
    }
}

fn describe(err: octocrab::Error) -> String {
    match err {
        octocrab::Error::GitHub { source, .. } => source.message,
        other => other.to_string(),
    }
}
