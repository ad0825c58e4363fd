//! Error types for the pipeline library.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::{InvalidStep, PromptStatus};

/// Comprehensive error type for all pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Database connection or query errors (the persistence boundary)
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A step failed validation
    #[error("Invalid step: {0}")]
    InvalidStep(#[from] InvalidStep),
    /// The inference capability was unreachable or returned an undecodable
    /// payload
    #[error("Failed to parse prompt into steps: {message}")]
    ParseFailure { message: String },
    /// A prompt is missing fields required for submission
    #[error("Prompt {id} cannot be submitted, missing: {}", missing.join(", "))]
    IncompletePromptState { id: u64, missing: Vec<String> },
    /// An operation was attempted against a prompt in the wrong state
    #[error("Prompt {id} is {actual}, operation '{operation}' requires {expected}")]
    InvalidLifecycleState {
        id: u64,
        operation: String,
        expected: PromptStatus,
        actual: PromptStatus,
    },
    /// A finished test result was finished again
    #[error("Test result {id} has already been finished")]
    DoubleFinish { id: u64 },
    /// A run was recorded twice for the same suite
    #[error("Run '{run_id}' has already been recorded for suite {suite_id}")]
    DuplicateRun { suite_id: u64, run_id: String },
    /// Prompt not found for the given ID
    #[error("Prompt with ID {id} not found")]
    PromptNotFound { id: u64 },
    /// Test suite not found for the given ID
    #[error("Test suite with ID {id} not found")]
    SuiteNotFound { id: u64 },
    /// Test result not found for the given ID
    #[error("Test result with ID {id} not found")]
    ResultNotFound { id: u64 },
    /// Environment not found for the given ID
    #[error("Environment with ID {id} not found")]
    EnvironmentNotFound { id: u64 },
    /// Generated test reference not found for the given ID
    #[error("Generated test with ID {id} not found")]
    GeneratedTestNotFound { id: u64 },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> PipelineError {
        PipelineError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PipelineError {
        PipelineError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PipelineError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a parse failure with the given message.
    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self::ParseFailure {
            message: message.into(),
        }
    }

    /// Wraps a `spawn_blocking` join error.
    pub(crate) fn join(error: tokio::task::JoinError) -> Self {
        Self::Configuration {
            message: format!("Task join error: {error}"),
        }
    }

    /// True for the protocol-misuse guards that leave stored data untouched.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::DoubleFinish { .. }
                | Self::DuplicateRun { .. }
                | Self::InvalidLifecycleState { .. }
                | Self::IncompletePromptState { .. }
        )
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| PipelineError::database(message).with_source(e))
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_prompt_lists_missing_fields() {
        let err = PipelineError::IncompletePromptState {
            id: 7,
            missing: vec!["test_type".to_string(), "base_url".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Prompt 7 cannot be submitted, missing: test_type, base_url"
        );
        assert!(err.is_protocol_violation());
    }

    #[test]
    fn test_invalid_lifecycle_message() {
        let err = PipelineError::InvalidLifecycleState {
            id: 3,
            operation: "archive".to_string(),
            expected: PromptStatus::Active,
            actual: PromptStatus::Draft,
        };
        assert_eq!(
            err.to_string(),
            "Prompt 3 is draft, operation 'archive' requires active"
        );
    }

    #[test]
    fn test_invalid_input_builder() {
        let err = PipelineError::invalid_input("run_id").with_reason("must not be empty");
        assert!(matches!(err, PipelineError::InvalidInput { ref field, .. } if field == "run_id"));
        assert!(!err.is_protocol_violation());
    }
}
