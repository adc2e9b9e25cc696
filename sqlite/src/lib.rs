//! SQLite store for patient vital-sign records.
//!
//! This crate owns the persistence side of the vitals system: it turns table
//! descriptions, field maps, and criteria maps into parameterized SQL,
//! executes it over a single long-lived connection, and returns rows or a
//! classified [`StoreError`].
//!
//! # Architecture
//!
//! The crate is organized into four modules:
//!
//! - **`statement`** — SQL text and positional parameter building
//! - **`convert`** — [`Value`](vitals_core::Value) ↔ SQLite value conversion
//! - **`store`** — the [`Store`] trait and the [`SqliteStore`] implementation
//! - **`error`** — integrity/operational/caller error classification
//!
//! # Quick start
//!
//! ```no_run
//! use vitals_core::{FieldMap, VITALS_TABLE, vitals_columns};
//! use vitals_sqlite::{SqliteStore, Store};
//!
//! let store = SqliteStore::open("patient_monitoring.db").unwrap();
//! store.ensure_table(VITALS_TABLE, &vitals_columns()).unwrap();
//!
//! let fields = FieldMap::new().with("patient_id", 7).with("heart_rate", 72);
//! let record_id = store.insert(VITALS_TABLE, &fields).unwrap();
//!
//! let rows = store
//!     .select(VITALS_TABLE, &FieldMap::new().with("patient_id", 7), None)
//!     .unwrap();
//! println!("record {record_id}; patient 7 has {} rows", rows.len());
//! ```
//!
//! # Injection safety
//!
//! Identifiers (table, column, and sort names) cannot be bound as
//! parameters, so they are checked with
//! [`validate_identifier`](vitals_core::validate_identifier) and
//! interpolated. Values are only ever bound through placeholders.

mod convert;
mod error;
mod statement;
mod store;

pub use error::{Result, StoreError};
pub use statement::Statement;
pub use store::{SqliteStore, Store};
