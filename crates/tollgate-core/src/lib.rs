//! Core types, configuration, and error handling for tollgate.
//!
//! This crate provides the shared foundation used by the other tollgate crates:
//! - [`TollgateError`], the unified error type using `thiserror`
//! - [`TollgateConfig`], configuration loaded from `.tollgate.toml`
//! - Shared types: [`ChangedFile`], [`ChangeSet`], [`Classification`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{ClassifyConfig, GitHubConfig, TollgateConfig, MAX_PAGE_SIZE};
pub use error::TollgateError;
pub use types::{ChangeSet, ChangedFile, Classification, OutputFormat};

/// A convenience `Result` type for tollgate operations.
pub type Result<T> = std::result::Result<T, TollgateError>;
