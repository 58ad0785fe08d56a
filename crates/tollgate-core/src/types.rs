use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One file changed in a pull request, as listed by the GitHub API.
///
/// Only `filename` takes part in classification. The remaining fields are
/// kept when the API supplies them and appear in the JSON report.
///
/// # Examples
///
/// ```
/// use tollgate_core::ChangedFile;
///
/// let file = ChangedFile::new("fqr/__init__.py");
/// assert_eq!(file.filename, "fqr/__init__.py");
/// assert!(file.status.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path of the file relative to the repository root.
    pub filename: String,
    /// Change status reported by GitHub (`added`, `modified`, `removed`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Lines added.
    #[serde(default)]
    pub additions: u64,
    /// Lines deleted.
    #[serde(default)]
    pub deletions: u64,
}

impl ChangedFile {
    /// Create a record carrying only a filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: None,
            additions: 0,
            deletions: 0,
        }
    }
}

/// The files changed by one pull request, in API order.
///
/// # Examples
///
/// ```
/// use tollgate_core::ChangeSet;
///
/// let set = ChangeSet::from_filenames(["pyproject.toml", "fqr/__init__.py"]);
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.filenames().collect::<Vec<_>>(), ["pyproject.toml", "fqr/__init__.py"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    files: Vec<ChangedFile>,
}

impl ChangeSet {
    /// Wrap an already-fetched list of records.
    pub fn new(files: Vec<ChangedFile>) -> Self {
        Self { files }
    }

    /// Build a change set from bare filenames.
    pub fn from_filenames<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: names.into_iter().map(ChangedFile::new).collect(),
        }
    }

    /// Parse newline-separated filenames, skipping blank lines.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate_core::ChangeSet;
    ///
    /// let set = ChangeSet::from_lines("README.md\n\n  src/app.py  \n");
    /// assert_eq!(set.filenames().collect::<Vec<_>>(), ["README.md", "src/app.py"]);
    /// ```
    pub fn from_lines(input: &str) -> Self {
        Self::from_filenames(
            input
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the pull request changed no files at all.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, ChangedFile> {
        self.files.iter()
    }

    /// Iterate over the filenames only.
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.filename.as_str())
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangedFile;
    type IntoIter = std::slice::Iter<'a, ChangedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl FromIterator<ChangedFile> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = ChangedFile>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

/// The two decisions made for a change set.
///
/// Both values are produced together or not at all.
///
/// # Examples
///
/// ```
/// use tollgate_core::Classification;
///
/// let result = Classification { release_required: true, testing_required: false };
/// let json = serde_json::to_string(&result).unwrap();
/// assert_eq!(json, r#"{"releaseRequired":true,"testingRequired":false}"#);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// A semantic-release version bump is required.
    pub release_required: bool,
    /// The test suite must run.
    pub testing_required: bool,
}

impl Classification {
    /// Output name under which `release_required` is published.
    pub const RELEASE_OUTPUT: &'static str = "is_semantic_release_required";
    /// Output name under which `testing_required` is published.
    pub const TESTING_OUTPUT: &'static str = "is_testing_required";

    /// The named outputs handed to the CI orchestrator, in publishing order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate_core::Classification;
    ///
    /// let outputs = Classification { release_required: false, testing_required: true }.outputs();
    /// assert_eq!(outputs[0], ("is_semantic_release_required", "false".to_string()));
    /// assert_eq!(outputs[1], ("is_testing_required", "true".to_string()));
    /// ```
    pub fn outputs(&self) -> [(&'static str, String); 2] {
        [
            (Self::RELEASE_OUTPUT, self.release_required.to_string()),
            (Self::TESTING_OUTPUT, self.testing_required.to_string()),
        ]
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RELEASE REQUIRED: {}", self.release_required)?;
        writeln!(f, "TESTING REQUIRED: {}", self.testing_required)
    }
}

/// Output format for command results.
///
/// # Examples
///
/// ```
/// use tollgate_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
