//! The change classifier: one pass over a pull request's changed files.

use serde::Serialize;
use tollgate_core::{ChangeSet, Classification, ClassifyConfig, TollgateError};

use crate::markers::{ReleaseMarkers, RELEASE_PAIR};

/// Counters gathered while scanning a change set.
///
/// # Examples
///
/// ```
/// use tollgate_classify::Tally;
///
/// let tally = Tally { release_markers: 1, source_changed: true };
/// let result = tally.decide();
/// assert!(!result.release_required);
/// assert!(result.testing_required);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    /// Filenames that ended with a release marker suffix.
    pub release_markers: usize,
    /// A non-marker file with the source suffix changed.
    pub source_changed: bool,
}

impl Tally {
    /// Apply the decision rule.
    ///
    /// A release needs exactly the marker pair. A full pair suppresses
    /// testing even when other sources changed.
    pub fn decide(&self) -> Classification {
        Classification {
            release_required: self.release_markers == RELEASE_PAIR,
            testing_required: self.source_changed && self.release_markers < RELEASE_PAIR,
        }
    }
}

/// Decides whether a change set needs a release and whether it needs testing.
///
/// # Examples
///
/// ```
/// use tollgate_classify::{Classifier, ReleaseMarkers};
/// use tollgate_core::ChangeSet;
///
/// let classifier = Classifier::new(ReleaseMarkers::for_package("fqr"), ".py", 100);
/// let files = ChangeSet::from_filenames(["pyproject.toml", "fqr/__init__.py"]);
/// let result = classifier.classify(&files).unwrap();
/// assert!(result.release_required);
/// assert!(!result.testing_required);
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    markers: ReleaseMarkers,
    source_suffix: String,
    page_size: usize,
}

impl Classifier {
    /// Create a classifier.
    ///
    /// `page_size` is the number of records requested from the API; a
    /// change set that fills it is rejected.
    pub fn new(markers: ReleaseMarkers, source_suffix: impl Into<String>, page_size: usize) -> Self {
        Self {
            markers,
            source_suffix: source_suffix.into(),
            page_size,
        }
    }

    /// Build a classifier from configuration.
    ///
    /// `repo_name` stands in for the package name when neither
    /// `classify.package` nor `classify.version_file` is set.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::Config`] if no version marker can be resolved.
    pub fn from_config(
        config: &ClassifyConfig,
        page_size: usize,
        repo_name: Option<&str>,
    ) -> Result<Self, TollgateError> {
        let version_file = config.version_marker(repo_name).ok_or_else(|| {
            TollgateError::Config(
                "no version marker configured; set classify.package or classify.version_file"
                    .into(),
            )
        })?;
        Ok(Self::new(
            ReleaseMarkers::new(config.metadata_file.clone(), version_file),
            config.source_suffix.clone(),
            page_size,
        ))
    }

    /// The markers this classifier counts.
    pub fn markers(&self) -> &ReleaseMarkers {
        &self.markers
    }

    /// Change sets with this many records or more are rejected.
    pub fn limit(&self) -> usize {
        self.page_size
    }

    /// Scan every filename once, without the size check.
    pub fn tally(&self, files: &ChangeSet) -> Tally {
        files.filenames().fold(Tally::default(), |mut tally, name| {
            tracing::info!(filename = %name, "changed file");
            if self.markers.matches(name) {
                tally.release_markers += 1;
            } else if name.ends_with(&self.source_suffix) {
                tally.source_changed = true;
            }
            tally
        })
    }

    /// Classify a change set.
    ///
    /// # Errors
    ///
    /// Returns [`TollgateError::ChangeSetTooLarge`] if the set holds
    /// `limit()` records or more. The decision rule never runs in that case.
    pub fn classify(&self, files: &ChangeSet) -> Result<Classification, TollgateError> {
        Ok(self.classify_detailed(files)?.1)
    }

    /// Like [`Classifier::classify`], also returning the intermediate counters.
    ///
    /// # Errors
    ///
    /// Same as [`Classifier::classify`].
    pub fn classify_detailed(
        &self,
        files: &ChangeSet,
    ) -> Result<(Tally, Classification), TollgateError> {
        if files.len() >= self.page_size {
            return Err(TollgateError::ChangeSetTooLarge {
                count: files.len(),
                limit: self.page_size,
            });
        }

        let tally = self.tally(files);
        let result = tally.decide();
        tracing::info!(
            release_required = result.release_required,
            testing_required = result.testing_required,
            release_markers = tally.release_markers,
            "classification complete"
        );
        Ok((tally, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_core::MAX_PAGE_SIZE;

    fn fqr() -> Classifier {
        Classifier::new(ReleaseMarkers::for_package("fqr"), ".py", MAX_PAGE_SIZE)
    }

    fn classify(names: &[&str]) -> Classification {
        fqr()
            .classify(&ChangeSet::from_filenames(names.iter().copied()))
            .unwrap()
    }

    #[test]
    fn marker_pair_requires_release_only() {
        let result = classify(&["pyproject.toml", "fqr/__init__.py"]);
        assert!(result.release_required);
        assert!(!result.testing_required);
    }

    #[test]
    fn single_marker_with_sources_requires_testing() {
        let result = classify(&["fqr/__init__.py", "fqr/models.py"]);
        assert!(!result.release_required);
        assert!(result.testing_required);
    }

    #[test]
    fn non_source_change_requires_nothing() {
        assert_eq!(classify(&["README.md"]), Classification::default());
    }

    #[test]
    fn metadata_alone_requires_nothing() {
        assert_eq!(classify(&["pyproject.toml"]), Classification::default());
    }

    #[test]
    fn marker_pair_suppresses_testing() {
        let result = classify(&["pyproject.toml", "fqr/__init__.py", "fqr/models.py"]);
        assert!(result.release_required);
        assert!(!result.testing_required);
    }

    #[test]
    fn markers_are_not_counted_as_sources() {
        let tally = fqr().tally(&ChangeSet::from_filenames(["fqr/__init__.py"]));
        assert_eq!(tally.release_markers, 1);
        assert!(!tally.source_changed);
    }

    #[test]
    fn three_marker_hits_is_not_a_release() {
        let result = classify(&["pyproject.toml", "fqr/__init__.py", "docs/pyproject.toml"]);
        assert!(!result.release_required);
        assert!(!result.testing_required);
    }

    #[test]
    fn duplicate_metadata_counts_twice() {
        let result = classify(&["pyproject.toml", "tools/pyproject.toml"]);
        assert!(result.release_required);
    }

    #[test]
    fn empty_change_set_requires_nothing() {
        assert_eq!(classify(&[]), Classification::default());
    }

    #[test]
    fn full_page_is_rejected() {
        let names: Vec<String> = (0..100).map(|i| format!("pkg/mod_{i}.py")).collect();
        let err = fqr()
            .classify(&ChangeSet::from_filenames(names))
            .unwrap_err();
        assert!(matches!(
            err,
            TollgateError::ChangeSetTooLarge {
                count: 100,
                limit: 100
            }
        ));
    }

    #[test]
    fn one_short_of_full_page_is_classified() {
        let names: Vec<String> = (0..99).map(|i| format!("pkg/mod_{i}.py")).collect();
        let result = fqr()
            .classify(&ChangeSet::from_filenames(names))
            .unwrap();
        assert!(result.testing_required);
    }

    #[test]
    fn smaller_page_lowers_the_limit() {
        let classifier = Classifier::new(ReleaseMarkers::for_package("fqr"), ".py", 2);
        let err = classifier
            .classify(&ChangeSet::from_filenames(["a.md", "b.md"]))
            .unwrap_err();
        assert!(err.to_string().contains("No more than 1 files"));
    }

    #[test]
    fn from_config_uses_repository_name() {
        let classifier = Classifier::from_config(&ClassifyConfig::default(), 100, Some("fqr")).unwrap();
        assert_eq!(classifier.markers().version_file(), "fqr/__init__.py");
        assert_eq!(classifier.limit(), 100);
    }

    #[test]
    fn from_config_without_package_fails() {
        let err = Classifier::from_config(&ClassifyConfig::default(), 100, None).unwrap_err();
        assert!(matches!(err, TollgateError::Config(_)));
    }

    #[test]
    fn custom_source_suffix() {
        let config = ClassifyConfig {
            metadata_file: "Cargo.toml".into(),
            version_file: Some("src/version.rs".into()),
            source_suffix: ".rs".into(),
            ..ClassifyConfig::default()
        };
        let classifier = Classifier::from_config(&config, 100, None).unwrap();
        let result = classifier
            .classify(&ChangeSet::from_filenames(["src/lib.rs", "app.py"]))
            .unwrap();
        assert!(result.testing_required);
        assert!(!result.release_required);
    }
}
