use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TollgateError;

/// Largest page the GitHub REST API will return.
pub const MAX_PAGE_SIZE: usize = 100;

/// Top-level configuration loaded from `.tollgate.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use tollgate_core::TollgateConfig;
///
/// let config = TollgateConfig::default();
/// assert_eq!(config.github.page_size, 100);
/// assert_eq!(config.classify.metadata_file, "pyproject.toml");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TollgateConfig {
    /// Repository identity and API settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// Release-marker and source-file rules.
    #[serde(default)]
    pub classify: ClassifyConfig,
}

impl TollgateConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Io`] if the file cannot be read,
    /// [`TollgateError::Toml`] if the content is not valid TOML, or
    /// [`TollgateError::Config`] if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tollgate_core::TollgateConfig;
    /// use std::path::Path;
    ///
    /// let config = TollgateConfig::from_file(Path::new(".tollgate.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, TollgateError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Toml`] if parsing fails, or
    /// [`TollgateError::Config`] if `page_size` is outside `1..=100`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tollgate_core::TollgateConfig;
    ///
    /// let toml = r#"
    /// [classify]
    /// package = "fqr"
    /// "#;
    /// let config = TollgateConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.classify.package.as_deref(), Some("fqr"));
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, TollgateError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.tollgate.toml` from the working directory, or defaults if absent.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`TollgateConfig::from_file`] when the file exists.
    pub fn discover() -> Result<Self, TollgateError> {
        let default_path = Path::new(".tollgate.toml");
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), TollgateError> {
        let size = self.github.page_size;
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(TollgateError::Config(format!(
                "github.page_size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
            )));
        }
        Ok(())
    }
}

/// Repository identity and GitHub API settings.
///
/// # Examples
///
/// ```
/// use tollgate_core::GitHubConfig;
///
/// let config = GitHubConfig::default();
/// assert!(config.owner.is_none());
/// assert!(config.api_url.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Repository owner (user or organization).
    pub owner: Option<String>,
    /// Repository name.
    pub repo: Option<String>,
    /// Custom API base URL (GitHub Enterprise).
    pub api_url: Option<String>,
    /// Records requested in the single page (default: 100).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            api_url: None,
            page_size: default_page_size(),
        }
    }
}

/// Which changed paths count as release markers and source files.
///
/// A release needs the metadata file and the package version marker to
/// change together. The version marker is `version_file` when set, else
/// `<package>/__init__.py`.
///
/// # Examples
///
/// ```
/// use tollgate_core::ClassifyConfig;
///
/// let config = ClassifyConfig::default();
/// assert_eq!(config.metadata_file, "pyproject.toml");
/// assert_eq!(config.source_suffix, ".py");
/// assert_eq!(config.version_marker(Some("fqr")).as_deref(), Some("fqr/__init__.py"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Project metadata file suffix (default: `pyproject.toml`).
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
    /// Package whose `__init__.py` carries the version.
    pub package: Option<String>,
    /// Explicit version marker suffix, overriding `package`.
    pub version_file: Option<String>,
    /// Suffix that marks a changed source file (default: `.py`).
    #[serde(default = "default_source_suffix")]
    pub source_suffix: String,
}

fn default_metadata_file() -> String {
    "pyproject.toml".into()
}

fn default_source_suffix() -> String {
    ".py".into()
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            metadata_file: default_metadata_file(),
            package: None,
            version_file: None,
            source_suffix: default_source_suffix(),
        }
    }
}

impl ClassifyConfig {
    /// Resolve the version marker suffix.
    ///
    /// `fallback_package` is used when neither `version_file` nor `package`
    /// is configured; callers pass the repository name.
    pub fn version_marker(&self, fallback_package: Option<&str>) -> Option<String> {
        if let Some(file) = &self.version_file {
            return Some(file.clone());
        }
        self.package
            .as_deref()
            .or(fallback_package)
            .map(|pkg| format!("{}/__init__.py", pkg.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = TollgateConfig::default();
        assert_eq!(config.github.page_size, 100);
        assert!(config.github.owner.is_none());
        assert!(config.github.repo.is_none());
        assert_eq!(config.classify.metadata_file, "pyproject.toml");
        assert_eq!(config.classify.source_suffix, ".py");
        assert!(config.classify.package.is_none());
        assert!(config.classify.version_file.is_none());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[github]
owner = "dan1hc"
repo = "fqr"
api_url = "https://github.example.com/api/v3"
page_size = 50

[classify]
metadata_file = "setup.cfg"
package = "fqr"
source_suffix = ".pyi"
"#;
        let config = TollgateConfig::from_toml(toml).unwrap();
        assert_eq!(config.github.owner.as_deref(), Some("dan1hc"));
        assert_eq!(config.github.repo.as_deref(), Some("fqr"));
        assert_eq!(config.github.page_size, 50);
        assert_eq!(config.classify.metadata_file, "setup.cfg");
        assert_eq!(config.classify.source_suffix, ".pyi");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = TollgateConfig::from_toml("").unwrap();
        assert_eq!(config.github.page_size, 100);
        assert_eq!(config.classify.metadata_file, "pyproject.toml");
    }

    #[test]
    fn invalid_toml_returns_error() {
        assert!(TollgateConfig::from_toml("{{invalid}}").is_err());
    }

    #[test]
    fn page_size_out_of_range_is_rejected() {
        let err = TollgateConfig::from_toml("[github]\npage_size = 101\n").unwrap_err();
        assert!(matches!(err, TollgateError::Config(_)));
        assert!(TollgateConfig::from_toml("[github]\npage_size = 0\n").is_err());
    }

    #[test]
    fn version_marker_prefers_explicit_file() {
        let config = ClassifyConfig {
            package: Some("fqr".into()),
            version_file: Some("src/fqr/__init__.py".into()),
            ..ClassifyConfig::default()
        };
        assert_eq!(
            config.version_marker(Some("other")).as_deref(),
            Some("src/fqr/__init__.py")
        );
    }

    #[test]
    fn version_marker_falls_back_to_repository_name() {
        let config = ClassifyConfig::default();
        assert_eq!(
            config.version_marker(Some("fqr")).as_deref(),
            Some("fqr/__init__.py")
        );
        assert!(config.version_marker(None).is_none());
    }

    #[test]
    fn from_file_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".tollgate.toml");
        std::fs::write(&path, "[classify]\npackage = \"fqr\"\n").unwrap();
        let config = TollgateConfig::from_file(&path).unwrap();
        assert_eq!(config.classify.package.as_deref(), Some("fqr"));
    }
}
