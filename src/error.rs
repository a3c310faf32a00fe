/// Centralized error types for repomap using thiserror
///
/// Per-file extraction problems are not errors: they travel as
/// `FileFailure` values so a batch can continue past them. Only
/// acquisition-level and shared-resource faults surface here.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the repository content provider.
///
/// These are fatal and abort before any file processing starts; the core
/// never retries acquisition itself.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Ref not found: {0}")]
    RefNotFound(String),

    #[error("Failed to fetch repository content: {0}")]
    FetchFailure(String),

    #[error("Repository root not found: {0}")]
    RootNotFound(String),
}

/// Batch-aborting pipeline errors (shared-resource faults only)
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to allocate worker pool: {0}")]
    WorkerPoolUnavailable(String),
}

/// Lookup errors from the call stack resolver
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No enclosing definition at {file}:{line}")]
    NoEnclosingDefinition { file: String, line: usize },
}

/// Errors from persisting or loading a repository map
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read map from '{path}': {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Failed to write map to '{path}': {reason}")]
    SaveFailed { path: String, reason: String },

    #[error("Failed to parse map file '{path}': {reason}")]
    ParseFailed { path: String, reason: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Why a single file was skipped during extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum FailureKind {
    /// The file's language is not recognized or has no grammar
    UnsupportedLanguage,
    /// The parser produced no usable tree for the file
    ParseFailure(String),
}

/// A per-file, non-fatal extraction failure.
///
/// Recorded and surfaced as a warning; the batch continues with the
/// remaining files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// Repo-relative path of the skipped file
    pub path: String,
    /// Reason the file was skipped
    pub kind: FailureKind,
}

impl FileFailure {
    pub fn unsupported(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FailureKind::UnsupportedLanguage,
        }
    }

    pub fn parse_failure(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FailureKind::ParseFailure(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResolveError::NoEnclosingDefinition {
            file: "a.py".to_string(),
            line: 42,
        };
        assert_eq!(err.to_string(), "No enclosing definition at a.py:42");
    }

    #[test]
    fn test_fetch_error_ref_not_found() {
        let err = FetchError::RefNotFound("v9.9.9".to_string());
        assert_eq!(err.to_string(), "Ref not found: v9.9.9");
    }

    #[test]
    fn test_file_failure_constructors() {
        let f = FileFailure::unsupported("data.bin");
        assert_eq!(f.kind, FailureKind::UnsupportedLanguage);

        let f = FileFailure::parse_failure("broken.py", "syntax errors in tree");
        assert!(matches!(f.kind, FailureKind::ParseFailure(_)));
    }

    #[test]
    fn test_file_failure_serialization() {
        let f = FileFailure::parse_failure("broken.py", "syntax errors in tree");
        let json = serde_json::to_string(&f).unwrap();
        let back: FileFailure = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
