//! Error handling for IR construction and verification
//!
//! Structural problems in a finished CFG are reported as values by the
//! checker in `looplow-lower`; this type covers the remaining failures and
//! the conversion of a failing check into an error.

use thiserror::Error;

/// Main error type shared by all crates of the workspace
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Invalid type: {message}")]
    InvalidType { message: String },

    #[error("Constant {value} does not fit in type {ty}")]
    InvalidConstant { value: i64, ty: String },

    #[error("Function '{function}' failed verification with {count} violation(s)")]
    Verification { function: String, count: usize },

    #[error("Execution error in '{function}': {message}")]
    Execution { function: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    /// Create an invalid type error
    pub fn invalid_type(message: impl Into<String>) -> Self {
        CompilerError::InvalidType { message: message.into() }
    }

    /// Create a verification error for a function
    pub fn verification(function: impl Into<String>, count: usize) -> Self {
        CompilerError::Verification { function: function.into(), count }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::IoError {
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InternalError { message }
    }
}
