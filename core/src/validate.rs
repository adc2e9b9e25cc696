//! Identifier and record validation.
//!
//! Table and column names cannot be bound as statement parameters, so every
//! identifier that is interpolated into SQL text is checked with
//! [`validate_identifier`] first. Field maps destined for the `vitals` table
//! are checked with [`validate_vital_fields`] before they reach the store.
//!
//! # Examples
//!
//! ```
//! use vitals_core::*;
//!
//! assert!(validate_identifier("vitals").is_ok());
//! assert!(validate_identifier("vitals; DROP TABLE vitals").is_err());
//!
//! let fields = FieldMap::new().with("patient_id", 7).with("heart_rate", 72);
//! assert!(validate_vital_fields(&fields).is_empty());
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::{FieldMap, Value};

/// Record and identifier validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Identifier is empty or contains characters outside `[A-Za-z0-9_]`.
    #[error("invalid identifier '{0}': must start with a letter or underscore and contain only alphanumerics and underscores")]
    InvalidIdentifier(String),
    /// A required column has no value.
    #[error("missing required field: {0}")]
    MissingField(String),
    /// The column does not exist in the `vitals` table.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// The column is assigned by the store and cannot be supplied.
    #[error("column is assigned by the store: {0}")]
    ReadOnlyColumn(String),
    /// A value does not match the column's storage class.
    #[error("column '{column}' expects {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A timestamp column holds text that is not an ISO-8601 date or date-time.
    #[error("column '{column}' expects an ISO-8601 timestamp, found '{value}'")]
    InvalidTimestamp { column: String, value: String },
    /// A row does not have one cell per `vitals` column.
    #[error("expected 8 columns in vitals row, found {0}")]
    RowArity(usize),
}

/// Validates a table or column name for interpolation into SQL text.
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier(name.to_string()))
    }
}

#[derive(Clone, Copy)]
enum Affinity {
    Integer,
    Real,
    Text,
}

fn column_affinity(column: &str) -> Option<Affinity> {
    match column {
        "record_id" | "patient_id" | "heart_rate" | "respiratory_rate" => Some(Affinity::Integer),
        "oxygen_saturation" | "temperature" => Some(Affinity::Real),
        "date" | "blood_pressure" => Some(Affinity::Text),
        _ => None,
    }
}

/// Returns `true` for RFC 3339 date-times, the `YYYY-MM-DD HH:MM:SS[.f]`
/// form SQLite's `CURRENT_TIMESTAMP` writes (also with a `T` separator),
/// and bare `YYYY-MM-DD` dates.
///
/// All of these contain separators, so SQLite's numeric column affinity
/// never turns them into numbers.
pub fn is_timestamp(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

/// Validates a field map for insertion into the `vitals` table.
///
/// Reports every problem found: unknown columns, a caller-supplied
/// `record_id`, a missing or null `patient_id`, and values whose storage
/// class does not fit the column. Real columns accept integers, and `date`
/// text must satisfy [`is_timestamp`].
pub fn validate_vital_fields(fields: &FieldMap) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match fields.get("patient_id") {
        None | Some(Value::Null) => {
            errors.push(ValidationError::MissingField("patient_id".to_string()))
        }
        Some(_) => {}
    }

    for (column, value) in fields.iter() {
        if column == "record_id" {
            errors.push(ValidationError::ReadOnlyColumn(column.to_string()));
            continue;
        }
        let Some(affinity) = column_affinity(column) else {
            errors.push(ValidationError::UnknownColumn(column.to_string()));
            continue;
        };
        let fits = match (affinity, value) {
            (_, Value::Null) => true,
            (Affinity::Integer, Value::Integer(_)) => true,
            (Affinity::Real, Value::Integer(_) | Value::Real(_)) => true,
            (Affinity::Text, Value::Text(_)) => true,
            _ => false,
        };
        if !fits {
            errors.push(ValidationError::TypeMismatch {
                column: column.to_string(),
                expected: match affinity {
                    Affinity::Integer => "integer",
                    Affinity::Real => "real",
                    Affinity::Text => "text",
                },
                found: value.type_name(),
            });
            continue;
        }
        if let ("date", Value::Text(text)) = (column, value) {
            if !is_timestamp(text) {
                errors.push(ValidationError::InvalidTimestamp {
                    column: column.to_string(),
                    value: text.clone(),
                });
            }
        }
    }

    errors
}
