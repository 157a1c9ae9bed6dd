// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

use crate::domain::violation::ViolationList;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel inside reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Invalid solution configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown layer '{0}'")]
    UnknownLayer(String),

    #[error("Layer '{layer}' is mandatory and must be selected")]
    MissingMandatoryLayer { layer: String },

    #[error("Invalid build axis '{0}': expected 'Configuration|Platform'")]
    InvalidBuildAxis(String),

    // ========================================================================
    // Dependency Rule Errors
    // ========================================================================
    #[error("Dependency rule violation detected:\n{0}")]
    DependencyRulesViolated(ViolationList),

    // ========================================================================
    // Manifest Errors
    // ========================================================================
    #[error("'{child}' is already nested under '{current_parent}', cannot nest it under '{requested_parent}'")]
    AlreadyNestedElsewhere {
        child: String,
        current_parent: String,
        requested_parent: String,
    },

    #[error("Malformed solution document: {reason}")]
    MalformedDocument { reason: String },

    #[error("No manifest entry with id {id}")]
    UnknownEntry { id: String },

    #[error("'{name}' is not a folder group and cannot contain entries")]
    NotAFolderGroup { name: String },

    // ========================================================================
    // Output Structure Errors
    // ========================================================================
    #[error("Path '{path}' would be written twice")]
    DuplicatePath { path: String },

    #[error("Absolute path not allowed in generated output: {path}")]
    AbsolutePathNotAllowed { path: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownLayer(_) => vec![
                "Known layers: shared-kernel, domain, application, infrastructure, api".into(),
                "Try: strata layers".into(),
            ],
            Self::MissingMandatoryLayer { layer } => {
                vec![format!("Add '{}' to the selected layers", layer.to_lowercase())]
            }
            Self::DependencyRulesViolated(violations) => {
                let mut out = vec![format!(
                    "{} violation(s) must be fixed before anything is written",
                    violations.len()
                )];
                out.push("Dependencies must point inward, toward Domain".into());
                out.push("Try: strata layers to see what each layer may depend on".into());
                out
            }
            Self::MalformedDocument { .. } => vec![
                "The existing solution file is missing required sections".into(),
                "Restore it from version control or regenerate it".into(),
            ],
            Self::AlreadyNestedElsewhere { child, .. } => vec![format!(
                "Move '{}' out of its current solution folder first",
                child
            )],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration(_)
            | Self::UnknownLayer(_)
            | Self::MissingMandatoryLayer { .. }
            | Self::InvalidBuildAxis(_) => ErrorCategory::Validation,
            Self::DependencyRulesViolated(_) => ErrorCategory::Policy,
            Self::AlreadyNestedElsewhere { .. }
            | Self::MalformedDocument { .. }
            | Self::NotAFolderGroup { .. } => ErrorCategory::Document,
            Self::UnknownEntry { .. }
            | Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Policy,
    Document,
    Internal,
}
