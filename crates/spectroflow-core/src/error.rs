//! Error types for the binary-operation engine.

use thiserror::Error;

/// Errors raised by compatibility checking, correspondence resolution and
/// dispatch. All invocation-fatal conditions abort before any output
/// mutation; per-channel ambiguity is not an error (see
/// [`crate::ops::binary::NO_MATCH`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpectroError {
    #[error("Size mismatch in operation '{operation}': {reason}")]
    SizeIncompatible { operation: String, reason: String },

    #[error("Grouping mismatch in operation '{operation}': {reason}")]
    GroupingDisjoint { operation: String, reason: String },

    /// The message text is an external contract: one line per operand in the
    /// fixed order LHS, RHS, with a trailing newline before the terminal
    /// period. Callers pattern-match it.
    #[error("{message}")]
    StorageModeIncompatible { message: String },

    #[error("Invalid shape in operation '{operation}': {reason}")]
    InvalidShape { operation: String, reason: String },

    #[error("Invalid argument in operation '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    #[error("Operation '{operation}' not supported: {reason}")]
    UnsupportedOperation { operation: String, reason: String },
}

impl SpectroError {
    /// Create a size-incompatibility error with operation context
    pub fn size_incompatible(operation: &str, reason: impl Into<String>) -> Self {
        Self::SizeIncompatible {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a disjoint-grouping error with operation context
    pub fn grouping_disjoint(operation: &str, reason: impl Into<String>) -> Self {
        Self::GroupingDisjoint {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid shape error with operation context
    pub fn invalid_shape(operation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error with operation context
    pub fn invalid_argument(operation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported operation error with operation context
    pub fn unsupported_operation(operation: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Get the operation name for this error, if it carries one
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::SizeIncompatible { operation, .. } => Some(operation),
            Self::GroupingDisjoint { operation, .. } => Some(operation),
            Self::StorageModeIncompatible { .. } => None,
            Self::InvalidShape { operation, .. } => Some(operation),
            Self::InvalidArgument { operation, .. } => Some(operation),
            Self::UnsupportedOperation { operation, .. } => Some(operation),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpectroError>;
