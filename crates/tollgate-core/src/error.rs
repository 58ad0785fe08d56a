use std::path::PathBuf;

/// Errors that can occur across tollgate.
///
/// Library crates return this type directly; the binary reports it through
/// `miette` at the boundary.
///
/// # Examples
///
/// ```
/// use tollgate_core::TollgateError;
///
/// let err = TollgateError::ChangeSetTooLarge { count: 100, limit: 100 };
/// assert_eq!(
///     err.to_string(),
///     "No more than 99 files may be changed per pull request."
/// );
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TollgateError {
    /// The change set filled an entire API page, so its true size is unknown.
    #[error("No more than {} files may be changed per pull request.", .limit.saturating_sub(1))]
    #[diagnostic(
        code(tollgate::change_set_too_large),
        help("split the pull request so that fewer files change at once")
    )]
    ChangeSetTooLarge {
        /// Number of records returned by the API.
        count: usize,
        /// Page size the request was made with.
        limit: usize,
    },

    /// GitHub API or transport failure, carrying the upstream message.
    #[error("GitHub API error: {0}")]
    #[diagnostic(code(tollgate::github))]
    GitHub(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(tollgate::config))]
    Config(String),

    /// Failure writing to the CI orchestrator's output channel.
    #[error("output error: {0}")]
    #[diagnostic(code(tollgate::output))]
    Output(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
