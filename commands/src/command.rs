//! One command per use case, plus a uniform tagged [`Command`] wrapper.
//!
//! Every command is a stateless value; the only configuration any of them
//! carries is the sort order of [`ListRecords`], fixed at construction. The
//! store is passed explicitly on each call, so the same command can be run
//! against any [`Store`] implementation and reused freely.
//!
//! # Example
//!
//! ```
//! use vitals_commands::{AddRecord, CreateSchema, GetPatientRecords};
//! use vitals_core::FieldMap;
//! use vitals_sqlite::SqliteStore;
//!
//! let store = SqliteStore::open_in_memory().unwrap();
//! CreateSchema.execute(&store).unwrap();
//!
//! let fields = FieldMap::new().with("patient_id", 7).with("heart_rate", 72);
//! let message = AddRecord.execute(&store, fields).unwrap();
//! assert_eq!(message, "Vital signs successfully recorded for patient 7.");
//!
//! let records = GetPatientRecords.execute(&store, 7).unwrap();
//! assert_eq!(records.len(), 1);
//! ```

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};
use vitals_core::{
    FieldMap, OrderBy, Row, VITALS_TABLE, Value, VitalRecord, validate_vital_fields,
    vitals_columns,
};
use vitals_sqlite::Store;

use crate::error::{CommandError, Result};

/// Formats a timestamp the way records store it: RFC 3339, UTC, microseconds.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Rejects an empty criteria map before it can reach a `DELETE`.
pub fn require_criteria(criteria: &FieldMap) -> Result<()> {
    if criteria.is_empty() {
        return Err(CommandError::EmptyCriteria);
    }
    Ok(())
}

fn decode(rows: Vec<Row>) -> Result<Vec<VitalRecord>> {
    rows.into_iter()
        .map(|row| VitalRecord::try_from(row).map_err(CommandError::UnreadableRecord))
        .collect()
}

/// Creates the `vitals` table if it does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateSchema;

impl CreateSchema {
    pub fn execute<S: Store + ?Sized>(&self, store: &S) -> Result<()> {
        store.ensure_table(VITALS_TABLE, &vitals_columns())?;
        debug!(table = VITALS_TABLE, "schema ensured");
        Ok(())
    }
}

/// Records one observation for a patient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddRecord;

impl AddRecord {
    /// Inserts `fields`, stamping `date` with the current time when absent.
    pub fn execute<S: Store + ?Sized>(&self, store: &S, fields: FieldMap) -> Result<String> {
        self.execute_at(store, fields, Utc::now())
    }

    /// Inserts `fields`, stamping `date` with `at` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MissingField`] without `patient_id`,
    /// [`CommandError::InvalidField`] for a field the table cannot hold, and
    /// [`CommandError::Store`] when the insert fails.
    pub fn execute_at<S: Store + ?Sized>(
        &self,
        store: &S,
        mut fields: FieldMap,
        at: DateTime<Utc>,
    ) -> Result<String> {
        let patient_id = match fields.get("patient_id") {
            None | Some(Value::Null) => return Err(CommandError::MissingField("patient_id")),
            Some(value) => value.clone(),
        };
        if fields.get("date").is_none_or(Value::is_null) {
            fields.insert("date", timestamp(at));
        }
        if let Some(err) = validate_vital_fields(&fields).into_iter().next() {
            return Err(CommandError::InvalidField(err));
        }

        let record_id = store.insert(VITALS_TABLE, &fields)?;
        info!(record_id, %patient_id, "recorded vital signs");
        Ok(format!(
            "Vital signs successfully recorded for patient {patient_id}."
        ))
    }
}

/// Lists every record in a sort order fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecords {
    order: OrderBy,
}

impl Default for ListRecords {
    fn default() -> Self {
        Self::by_date()
    }
}

impl ListRecords {
    /// Lists ascending by the given column.
    pub fn new(order_by: impl Into<String>) -> Self {
        Self {
            order: OrderBy::asc(order_by),
        }
    }

    pub fn by_date() -> Self {
        Self::new("date")
    }

    pub fn by_patient() -> Self {
        Self::new("patient_id")
    }

    /// Reverses the sort order.
    pub fn descending(mut self) -> Self {
        self.order.descending = true;
        self
    }

    pub fn order(&self) -> &OrderBy {
        &self.order
    }

    pub fn execute<S: Store + ?Sized>(&self, store: &S) -> Result<Vec<VitalRecord>> {
        let rows = store.select(VITALS_TABLE, &FieldMap::new(), Some(&self.order))?;
        decode(rows)
    }
}

/// Returns all records of one patient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetPatientRecords;

impl GetPatientRecords {
    /// An empty result is a valid outcome, not an error.
    pub fn execute<S: Store + ?Sized>(&self, store: &S, patient_id: i64) -> Result<Vec<VitalRecord>> {
        let criteria = FieldMap::new().with("patient_id", patient_id);
        let rows = store.select(VITALS_TABLE, &criteria, None)?;
        decode(rows)
    }
}

/// Outcome of a delete: the user-facing message and how many rows went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub message: String,
    pub affected: usize,
}

impl fmt::Display for Deletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn delete<S: Store + ?Sized>(store: &S, criteria: FieldMap, message: String) -> Result<Deletion> {
    require_criteria(&criteria)?;
    let affected = store.delete(VITALS_TABLE, &criteria)?;
    if affected == 0 {
        debug!(?criteria, "delete matched no rows");
    } else {
        info!(affected, "deleted records");
    }
    Ok(Deletion { message, affected })
}

/// Deletes a single record by id.
///
/// Deleting an id that does not exist succeeds with `affected == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteRecord;

impl DeleteRecord {
    pub fn execute<S: Store + ?Sized>(&self, store: &S, record_id: i64) -> Result<Deletion> {
        delete(
            store,
            FieldMap::new().with("record_id", record_id),
            format!("Record {record_id} deleted."),
        )
    }
}

/// Deletes every record of one patient in a single statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletePatientRecords;

impl DeletePatientRecords {
    pub fn execute<S: Store + ?Sized>(&self, store: &S, patient_id: i64) -> Result<Deletion> {
        delete(
            store,
            FieldMap::new().with("patient_id", patient_id),
            format!("All records deleted for patient {patient_id}."),
        )
    }
}

/// Asks the host front end to stop. Touches no store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quit;

impl Quit {
    pub fn execute(&self) -> CommandOutput {
        CommandOutput::Quit
    }
}

/// Which [`CommandInput`] variant a command expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    None,
    Fields,
    Id,
}

impl InputKind {
    fn name(self) -> &'static str {
        match self {
            Self::None => "no",
            Self::Fields => "field map",
            Self::Id => "integer id",
        }
    }
}

/// Input to [`Command::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandInput {
    None,
    Fields(FieldMap),
    Id(i64),
}

impl CommandInput {
    pub fn kind(&self) -> InputKind {
        match self {
            Self::None => InputKind::None,
            Self::Fields(_) => InputKind::Fields,
            Self::Id(_) => InputKind::Id,
        }
    }
}

/// Output of [`Command::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// Side effect only.
    Done,
    Message(String),
    Records(Vec<VitalRecord>),
    Deleted(Deletion),
    /// The front end should end its session.
    Quit,
}

/// Any command behind a single `execute` entry point.
///
/// Front ends hold a list of these and dispatch on user choice without
/// knowing which concrete command they run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateSchema(CreateSchema),
    AddRecord(AddRecord),
    ListRecords(ListRecords),
    GetPatientRecords(GetPatientRecords),
    DeleteRecord(DeleteRecord),
    DeletePatientRecords(DeletePatientRecords),
    Quit(Quit),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateSchema(_) => "create-schema",
            Self::AddRecord(_) => "add-record",
            Self::ListRecords(_) => "list-records",
            Self::GetPatientRecords(_) => "get-patient-records",
            Self::DeleteRecord(_) => "delete-record",
            Self::DeletePatientRecords(_) => "delete-patient-records",
            Self::Quit(_) => "quit",
        }
    }

    pub fn input_kind(&self) -> InputKind {
        match self {
            Self::CreateSchema(_) | Self::ListRecords(_) | Self::Quit(_) => InputKind::None,
            Self::AddRecord(_) => InputKind::Fields,
            Self::GetPatientRecords(_) | Self::DeleteRecord(_) | Self::DeletePatientRecords(_) => {
                InputKind::Id
            }
        }
    }

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnexpectedInput`] when `input` is not the
    /// variant reported by [`input_kind`](Self::input_kind); otherwise
    /// whatever the wrapped command returns.
    pub fn execute<S: Store + ?Sized>(&self, store: &S, input: CommandInput) -> Result<CommandOutput> {
        debug!(command = self.name(), "executing command");
        match (self, input) {
            (Self::CreateSchema(cmd), CommandInput::None) => {
                cmd.execute(store).map(|()| CommandOutput::Done)
            }
            (Self::AddRecord(cmd), CommandInput::Fields(fields)) => {
                cmd.execute(store, fields).map(CommandOutput::Message)
            }
            (Self::ListRecords(cmd), CommandInput::None) => {
                cmd.execute(store).map(CommandOutput::Records)
            }
            (Self::GetPatientRecords(cmd), CommandInput::Id(id)) => {
                cmd.execute(store, id).map(CommandOutput::Records)
            }
            (Self::DeleteRecord(cmd), CommandInput::Id(id)) => {
                cmd.execute(store, id).map(CommandOutput::Deleted)
            }
            (Self::DeletePatientRecords(cmd), CommandInput::Id(id)) => {
                cmd.execute(store, id).map(CommandOutput::Deleted)
            }
            (Self::Quit(cmd), CommandInput::None) => Ok(cmd.execute()),
            (cmd, input) => Err(CommandError::UnexpectedInput {
                command: cmd.name(),
                expected: cmd.input_kind().name(),
                got: input.kind().name(),
            }),
        }
    }
}
