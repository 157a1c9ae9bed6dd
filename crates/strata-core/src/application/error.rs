//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// The solution directory is already there and overwriting was not asked for.
    #[error("Solution already exists at {path}")]
    SolutionExists { path: PathBuf },

    /// No solution file where one was expected.
    #[error("No solution file found at {path}")]
    SolutionNotFound { path: PathBuf },

    /// The solution file does not contain any recognisable layer project.
    #[error("No layer projects found in {path}")]
    NoLayerProjects { path: PathBuf },

    /// The solution file could not be read or written in its text format.
    #[error("Could not process {format} file: {reason}")]
    CodecFailed { format: &'static str, reason: String },

    /// A project file could not be rendered.
    #[error("Rendering failed for {project}: {reason}")]
    RenderingFailed { project: String, reason: String },

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::SolutionExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Use --force to merge into the existing solution".into(),
                "Or choose a different solution name or --output directory".into(),
            ],
            Self::SolutionNotFound { path } => vec![
                format!("Looked in: {}", path.display()),
                "Pass the solution directory or the .sln file itself".into(),
            ],
            Self::NoLayerProjects { .. } => vec![
                "Test projects are added to solutions generated by strata new".into(),
                "Layer projects are recognised by their suffix (e.g. Acme.Shop.Domain)".into(),
            ],
            Self::CodecFailed { .. } => vec![
                "The solution file may have been edited by hand".into(),
                "Restore it from version control or regenerate it".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FilesystemError { .. } | Self::RollbackFailed { .. } => ErrorCategory::Internal,
            Self::RenderingFailed { .. } => ErrorCategory::Internal,
            Self::SolutionExists { .. } => ErrorCategory::Validation,
            Self::SolutionNotFound { .. } | Self::NoLayerProjects { .. } => {
                ErrorCategory::NotFound
            }
            Self::CodecFailed { .. } => ErrorCategory::Document,
        }
    }
}
