//! GitHub Actions input and output channels.
//!
//! Inputs arrive as `INPUT_<NAME>` environment variables. Outputs are
//! appended to the file named by `GITHUB_OUTPUT`, and failures are
//! announced with the `::error::` workflow command on stdout.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tollgate_core::TollgateError;

const DELIMITER: &str = "ghadelimiter_tollgate";

/// Environment variable holding the value of action input `name`.
///
/// # Examples
///
/// ```
/// use tollgate_github::actions::input_env_name;
///
/// assert_eq!(input_env_name("token"), "INPUT_TOKEN");
/// assert_eq!(input_env_name("pull request"), "INPUT_PULL_REQUEST");
/// ```
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Read action input `name`. Blank values count as absent.
pub fn get_input(name: &str) -> Option<String> {
    std::env::var(input_env_name(name))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Escape a workflow command message.
///
/// # Examples
///
/// ```
/// use tollgate_github::actions::escape_data;
///
/// assert_eq!(escape_data("50% done\nnext"), "50%25 done%0Anext");
/// ```
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// The `::error::` command that marks the step as failed.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Announce a fatal failure to the runner. The caller must still exit non-zero.
pub fn set_failed(message: &str) {
    println!("{}", error_command(message));
}

/// Render output pairs in the `GITHUB_OUTPUT` file format.
///
/// Single-line values use `name=value`; multi-line values use the
/// heredoc form.
///
/// # Errors
///
/// Returns [`TollgateError::Output`] for an empty name, or a value that
/// contains the heredoc delimiter.
///
/// # Examples
///
/// ```
/// use tollgate_github::actions::render_outputs;
///
/// let text = render_outputs(&[("is_testing_required", "true".into())]).unwrap();
/// assert_eq!(text, "is_testing_required=true\n");
/// ```
pub fn render_outputs(outputs: &[(&str, String)]) -> Result<String, TollgateError> {
    let mut rendered = String::new();
    for (name, value) in outputs {
        if name.is_empty() {
            return Err(TollgateError::Output("output name must not be empty".into()));
        }
        if value.contains('\n') || value.contains('\r') {
            if value.contains(DELIMITER) {
                return Err(TollgateError::Output(format!(
                    "value of output '{name}' contains the delimiter"
                )));
            }
            let _ = write!(rendered, "{name}<<{DELIMITER}\n{value}\n{DELIMITER}\n");
        } else {
            let _ = writeln!(rendered, "{name}={value}");
        }
    }
    Ok(rendered)
}

/// Where step outputs are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// The runner's `GITHUB_OUTPUT` file.
    File(PathBuf),
    /// Standard output, for local runs.
    Stdout,
}

/// Publishes step outputs for downstream workflow steps.
///
/// # Examples
///
/// ```
/// use tollgate_github::actions::ActionsOutput;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("output");
/// let out = ActionsOutput::to_file(&path);
/// out.set_outputs(&[("is_semantic_release_required", "false".into())]).unwrap();
/// assert_eq!(
///     std::fs::read_to_string(&path).unwrap(),
///     "is_semantic_release_required=false\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ActionsOutput {
    target: OutputTarget,
}

impl ActionsOutput {
    /// Use `GITHUB_OUTPUT` when the runner provides it, stdout otherwise.
    pub fn from_env() -> Self {
        match std::env::var_os("GITHUB_OUTPUT") {
            Some(path) if !path.is_empty() => Self::to_file(Path::new(&path)),
            _ => Self::stdout(),
        }
    }

    /// Append outputs to `path`.
    pub fn to_file(path: &Path) -> Self {
        Self {
            target: OutputTarget::File(path.to_path_buf()),
        }
    }

    /// Print outputs to stdout.
    pub fn stdout() -> Self {
        Self {
            target: OutputTarget::Stdout,
        }
    }

    /// The configured target.
    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    /// Publish every pair in one write, so either all land or none do.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Output`] if rendering fails, or
    /// [`TollgateError::Io`] if the output file cannot be written.
    pub fn set_outputs(&self, outputs: &[(&str, String)]) -> Result<(), TollgateError> {
        let rendered = render_outputs(outputs)?;
        match &self.target {
            OutputTarget::File(path) => {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                file.write_all(rendered.as_bytes())?;
            }
            OutputTarget::Stdout => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(rendered.as_bytes())?;
                lock.flush()?;
            }
        }
        for (name, value) in outputs {
            tracing::debug!(output = %name, %value, "output set");
        }
        Ok(())
    }
}
