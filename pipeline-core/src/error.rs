// Pipeline error types
// Construction-time and serialization-time failures, each carrying the offending tree path

use thiserror::Error;

/// Errors raised while building or serializing a pipeline tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A parameter reference path is empty or malformed
    #[error("invalid parameter reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// An `elseif`/`else` branch was added to a chain that already ended with `else`
    #[error("invalid conditional chain: {0}")]
    InvalidBranchChain(String),

    /// The structural description of a parameters record is inconsistent
    #[error("invalid parameters schema: {0}")]
    InvalidParameterSchema(String),

    /// A field the target schema requires is missing
    #[error("schema violation at '{path}': {message}")]
    SchemaViolation { path: String, message: String },

    /// An item kind sits in a position the target schema forbids
    #[error("unsupported item at '{path}': {message}")]
    UnsupportedItem { path: String, message: String },
}

impl PipelineError {
    pub fn invalid_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn schema_violation(path: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::SchemaViolation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_item(path: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::UnsupportedItem {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Tree path of the offending node, for serialization errors
    pub fn path(&self) -> Option<&str> {
        match self {
            PipelineError::SchemaViolation { path, .. }
            | PipelineError::UnsupportedItem { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
