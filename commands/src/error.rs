//! Error types for command execution and configuration.

use thiserror::Error;
use vitals_core::ValidationError;
use vitals_sqlite::StoreError;

/// Errors that can occur while executing a command.
///
/// Store failures pass through unchanged in [`CommandError::Store`]; the
/// remaining variants are caller errors raised before the store is touched.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A required field is absent from the input.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The input does not form a valid record.
    #[error("invalid record: {0}")]
    InvalidField(ValidationError),

    /// A stored row could not be read back as a record.
    #[error("unreadable record: {0}")]
    UnreadableRecord(ValidationError),

    /// A delete was requested without any criteria.
    #[error("refusing to delete without criteria")]
    EmptyCriteria,

    /// The command received an input variant it does not accept.
    #[error("{command} expects {expected} input, got {got}")]
    UnexpectedInput {
        command: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    /// Configuration file I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`CommandError`].
pub type Result<T> = std::result::Result<T, CommandError>;
