//! Pull request change classification.
//!
//! Decides from a pull request's changed filenames whether a semantic
//! release is due and whether the test suite must run. The decision is a
//! single fold over the change set; fetching the files is left to callers.

pub mod classifier;
pub mod markers;

pub use classifier::{Classifier, Tally};
pub use markers::ReleaseMarkers;
