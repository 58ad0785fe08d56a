//! The workflow event payload that triggered the run.
//!
//! GitHub Actions writes the webhook payload to the file named by
//! `GITHUB_EVENT_PATH`. For `pull_request` events it carries the PR number
//! and the repository the workflow runs in.

use std::path::Path;

use serde::Deserialize;
use tollgate_core::TollgateError;

use crate::client::{parse_repository, Repository};

#[derive(Debug, Clone, Deserialize)]
struct PullRequestRef {
    number: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct RepositoryRef {
    full_name: String,
}

/// The subset of a webhook payload tollgate reads.
///
/// # Examples
///
/// ```
/// use tollgate_github::event::EventPayload;
///
/// let payload = EventPayload::from_json(r#"{
///     "action": "synchronize",
///     "pull_request": { "number": 42 },
///     "repository": { "full_name": "dan1hc/fqr" }
/// }"#).unwrap();
/// assert_eq!(payload.pull_request_number().unwrap(), 42);
/// assert_eq!(payload.repository().unwrap().unwrap().name, "fqr");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pull_request: Option<PullRequestRef>,
    #[serde(default)]
    repository: Option<RepositoryRef>,
}

impl EventPayload {
    /// Parse a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Serialization`] if the JSON is malformed.
    pub fn from_json(content: &str) -> Result<Self, TollgateError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a payload from a file.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::FileNotFound`] if `path` does not exist,
    /// otherwise the errors of [`EventPayload::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, TollgateError> {
        if !path.exists() {
            return Err(TollgateError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Read the payload named by `GITHUB_EVENT_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Config`] when the variable is unset.
    pub fn from_env() -> Result<Self, TollgateError> {
        let path = std::env::var_os("GITHUB_EVENT_PATH").ok_or_else(|| {
            TollgateError::Config(
                "GITHUB_EVENT_PATH not set; pass --pr when running outside GitHub Actions".into(),
            )
        })?;
        Self::from_file(Path::new(&path))
    }

    /// Number of the pull request that triggered the workflow.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Config`] if this is not a pull request event.
    pub fn pull_request_number(&self) -> Result<u64, TollgateError> {
        self.pull_request
            .as_ref()
            .map(|pr| pr.number)
            .ok_or_else(|| {
                TollgateError::Config(
                    "event payload has no pull_request; is the workflow triggered by pull_request?"
                        .into(),
                )
            })
    }

    /// Repository named in the payload, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Config`] if `full_name` is malformed.
    pub fn repository(&self) -> Result<Option<Repository>, TollgateError> {
        self.repository
            .as_ref()
            .map(|r| parse_repository(&r.full_name))
            .transpose()
    }
}
