//! Release-marker matching.
//!
//! A release is signalled by two files changing together: the project
//! metadata file and the package version marker. Both are matched as plain
//! path suffixes.

use serde::Serialize;

/// Number of marker hits that signals a release.
pub const RELEASE_PAIR: usize = 2;

/// The pair of path suffixes whose joint change signals a release.
///
/// # Examples
///
/// ```
/// use tollgate_classify::markers::ReleaseMarkers;
///
/// let markers = ReleaseMarkers::for_package("fqr");
/// assert!(markers.matches("pyproject.toml"));
/// assert!(markers.matches("fqr/__init__.py"));
/// assert!(!markers.matches("fqr/models.py"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMarkers {
    metadata_file: String,
    version_file: String,
}

impl ReleaseMarkers {
    /// Markers from explicit suffixes.
    pub fn new(metadata_file: impl Into<String>, version_file: impl Into<String>) -> Self {
        Self {
            metadata_file: metadata_file.into(),
            version_file: version_file.into(),
        }
    }

    /// The conventional Python layout: `pyproject.toml` plus `<package>/__init__.py`.
    pub fn for_package(package: &str) -> Self {
        Self::new(
            "pyproject.toml",
            format!("{}/__init__.py", package.trim_end_matches('/')),
        )
    }

    /// Metadata file suffix.
    pub fn metadata_file(&self) -> &str {
        &self.metadata_file
    }

    /// Version marker suffix.
    pub fn version_file(&self) -> &str {
        &self.version_file
    }

    /// Whether `path` ends with either marker suffix.
    ///
    /// Matching is a raw string suffix test, so `docs/pyproject.toml` also
    /// counts.
    pub fn matches(&self, path: &str) -> bool {
        path.ends_with(&self.metadata_file) || path.ends_with(&self.version_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_package_builds_version_marker() {
        let markers = ReleaseMarkers::for_package("fqr/");
        assert_eq!(markers.metadata_file(), "pyproject.toml");
        assert_eq!(markers.version_file(), "fqr/__init__.py");
    }

    #[test]
    fn nested_paths_match_by_suffix() {
        let markers = ReleaseMarkers::for_package("fqr");
        assert!(markers.matches("src/fqr/__init__.py"));
        assert!(markers.matches("tools/pyproject.toml"));
    }

    #[test]
    fn other_package_init_does_not_match() {
        let markers = ReleaseMarkers::for_package("fqr");
        assert!(!markers.matches("fqr/core/__init__.py"));
        assert!(!markers.matches("tests/__init__.py"));
        assert!(!markers.matches("pyproject.toml.bak"));
    }

    #[test]
    fn custom_markers() {
        let markers = ReleaseMarkers::new("Cargo.toml", "src/version.rs");
        assert!(markers.matches("Cargo.toml"));
        assert!(markers.matches("src/version.rs"));
        assert!(!markers.matches("pyproject.toml"));
    }
}
