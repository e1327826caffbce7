//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::{CatalogError, CatalogResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_file: PathBuf,
    uploads_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// Neither path has to exist yet; the repository creates them on open. Paths that exist
    /// with the wrong kind (a directory where the data file should be, a file where the uploads
    /// directory should be) are rejected here.
    pub fn new(data_file: PathBuf, uploads_dir: PathBuf) -> CatalogResult<Self> {
        if data_file.as_os_str().is_empty() {
            return Err(CatalogError::InvalidInput(
                "data file path cannot be empty".into(),
            ));
        }

        if data_file.is_dir() {
            return Err(CatalogError::InvalidInput(format!(
                "data file path is a directory: {}",
                data_file.display()
            )));
        }

        if uploads_dir.as_os_str().is_empty() {
            return Err(CatalogError::InvalidInput(
                "uploads directory path cannot be empty".into(),
            ));
        }

        if uploads_dir.exists() && !uploads_dir.is_dir() {
            return Err(CatalogError::InvalidInput(format!(
                "uploads path is not a directory: {}",
                uploads_dir.display()
            )));
        }

        Ok(Self {
            data_file,
            uploads_dir,
        })
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }
}

/// Resolve a path from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn path_from_env_value(value: Option<String>, default: &str) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
