//! Error types for paramtree.
//!
//! Every variant describes a structural mismatch between a configuration
//! tree and the code driving it. None of them are transient, so there is no
//! retry machinery; callers fix the configuration and try again.

/// Result type alias for paramtree operations.
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors raised by configuration trees, tree models and the blit manager.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// A read or write addressed a key or list index that does not exist.
    #[error("path {path} was not found in the configuration")]
    PathNotFound {
        /// The full path that was requested.
        path: String,
    },

    /// A parameter column was written but the row has no `_param` entry.
    #[error("failed to set parameter: no parameter attached at {path}")]
    MissingParameter {
        /// The path where the parameter was expected.
        path: String,
    },

    /// A value could not be converted to the type the target expects.
    #[error("could not convert {found} to type {expected} at {path}")]
    InvalidValueType {
        /// The path being written.
        path: String,
        /// The type the target slot holds.
        expected: &'static str,
        /// A rendering of the rejected value.
        found: String,
    },

    /// A draw event arrived from a canvas the blit manager does not own.
    #[error("event canvas \"{found}\" does not match the manager canvas \"{expected}\"")]
    CanvasMismatch {
        /// The manager's canvas.
        expected: String,
        /// The canvas named by the event.
        found: String,
    },

    /// A list resize or key switch is not allowed at a path.
    #[error("cannot restructure {path}: {reason}")]
    InvalidStructureEdit {
        /// The row the edit addressed.
        path: String,
        /// Why the edit was refused.
        reason: String,
    },

    /// Model options could not be parsed or written.
    #[error("invalid tree model options: {0}")]
    Options(String),
}

impl TreeError {
    /// Create a path-not-found error.
    pub fn path_not_found(path: impl ToString) -> Self {
        Self::PathNotFound {
            path: path.to_string(),
        }
    }

    /// Create a missing-parameter error.
    pub fn missing_parameter(path: impl ToString) -> Self {
        Self::MissingParameter {
            path: path.to_string(),
        }
    }

    /// Create an invalid-value-type error.
    pub fn invalid_value_type(
        path: impl ToString,
        expected: &'static str,
        found: impl ToString,
    ) -> Self {
        Self::InvalidValueType {
            path: path.to_string(),
            expected,
            found: found.to_string(),
        }
    }

    /// Create an invalid-structure-edit error.
    pub fn invalid_structure_edit(path: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidStructureEdit {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an options error.
    pub fn options(message: impl Into<String>) -> Self {
        Self::Options(message.into())
    }
}
