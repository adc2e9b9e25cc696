//! Core record types for the patient vitals store.
//!
//! This crate defines the plain data model shared by the storage backend
//! and the command layer:
//!
//! - [`Value`] — a dynamically typed cell (null, integer, real, text).
//! - [`FieldMap`] — an insertion-ordered column → value map used both for
//!   inserted fields and for conjunctive query criteria.
//! - [`ColumnSpec`] and [`OrderBy`] — table creation and sort descriptions.
//! - [`VitalRecord`] — the typed view of one `vitals` row.
//!
//! Validation ([`validate_identifier`], [`validate_vital_fields`]) keeps
//! untrusted names out of SQL text and catches malformed records before
//! they reach the store.
//!
//! # Example
//!
//! ```
//! use vitals_core::*;
//!
//! let fields = FieldMap::new()
//!     .with("patient_id", 7)
//!     .with("heart_rate", 72)
//!     .with("blood_pressure", "120/80");
//! assert!(validate_vital_fields(&fields).is_empty());
//!
//! let spec = vitals_columns();
//! let columns: Vec<_> = spec.iter().map(|(name, _)| name).collect();
//! assert_eq!(columns, VITALS_COLUMNS);
//! ```

mod types;
mod validate;

pub use types::*;
pub use validate::{ValidationError, is_timestamp, validate_identifier, validate_vital_fields};
