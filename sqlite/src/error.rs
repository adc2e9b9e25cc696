//! Error types for store operations.
//!
//! Statement failures are classified the way callers need to react to them:
//! constraint violations ([`StoreError::Integrity`]) versus malformed
//! statements ([`StoreError::Operational`]). Both carry the statement text
//! that failed. Caller mistakes that are caught before any SQL is built
//! have their own variants.

use thiserror::Error;
use vitals_core::ValidationError;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A constraint rejected the statement (e.g. a `NOT NULL` column left empty).
    #[error("integrity error in `{statement}`: {source}")]
    Integrity {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The statement is malformed or references a missing table or column.
    #[error("operational error in `{statement}`: {source}")]
    Operational {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A table, column, or sort name is not a plain identifier.
    #[error("{0}")]
    InvalidIdentifier(#[from] ValidationError),

    /// `CREATE TABLE` was requested without any column.
    #[error("table '{0}' needs at least one column")]
    NoColumns(String),

    /// `INSERT` was requested without any field.
    #[error("insert into '{0}' needs at least one field")]
    EmptyFields(String),

    /// `DELETE` was requested without criteria; an unconditional delete is never issued.
    #[error("delete from '{0}' needs at least one criterion")]
    EmptyCriteria(String),

    /// Connection-level failure (open, close, transaction control).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A cell could not be decoded into a [`vitals_core::Value`].
    #[error("decode error: {0}")]
    Decode(String),
}

impl StoreError {
    /// Classifies a failed statement execution.
    pub(crate) fn from_statement(statement: &str, source: rusqlite::Error) -> Self {
        let statement = statement.to_string();
        match source.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => Self::Integrity { statement, source },
            _ => Self::Operational { statement, source },
        }
    }

    /// Returns `true` for constraint violations.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    /// Returns `true` for malformed statements, including rejected identifiers.
    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Operational { .. } | Self::InvalidIdentifier(_))
    }

    /// Returns `true` for requests rejected before any SQL was built.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::NoColumns(_) | Self::EmptyFields(_) | Self::EmptyCriteria(_)
        )
    }

    /// The statement text that failed, when the failure came from SQLite.
    pub fn statement(&self) -> Option<&str> {
        match self {
            Self::Integrity { statement, .. } | Self::Operational { statement, .. } => {
                Some(statement)
            }
            _ => None,
        }
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
