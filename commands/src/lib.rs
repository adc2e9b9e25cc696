//! Command layer for patient vital-sign records.
//!
//! Each use case is a small stateless command that sequences [`Store`]
//! calls and turns their results into something a front end can show:
//!
//! | Command                  | Input      | Output              |
//! |--------------------------|------------|---------------------|
//! | [`CreateSchema`]         | none       | side effect only    |
//! | [`AddRecord`]            | field map  | confirmation        |
//! | [`ListRecords`]          | none       | records             |
//! | [`GetPatientRecords`]    | patient id | records             |
//! | [`DeleteRecord`]         | record id  | [`Deletion`]        |
//! | [`DeletePatientRecords`] | patient id | [`Deletion`]        |
//! | [`Quit`]                 | none       | quit signal         |
//!
//! The [`Command`] enum wraps all of them behind a single
//! [`execute`](Command::execute) taking a [`CommandInput`] and returning a
//! [`CommandOutput`]. Store errors are never caught here; they reach the
//! front end unchanged inside [`CommandError::Store`].
//!
//! [`Store`]: vitals_sqlite::Store

mod command;
mod config;
mod error;

pub use command::{
    AddRecord, Command, CommandInput, CommandOutput, CreateSchema, DeletePatientRecords,
    DeleteRecord, Deletion, GetPatientRecords, InputKind, ListRecords, Quit, require_criteria,
    timestamp,
};
pub use config::{ListingConfig, MonitorConfig};
pub use error::{CommandError, Result};
