//! Integration tests for the vitals-commands crate.

use std::cell::RefCell;

use chrono::{TimeZone, Utc};
use vitals_commands::{
    AddRecord, Command, CommandError, CommandInput, CommandOutput, CreateSchema,
    DeletePatientRecords, DeleteRecord, GetPatientRecords, ListRecords, Quit,
};
use vitals_core::{ColumnSpec, FieldMap, OrderBy, Row, VITALS_TABLE, ValidationError, Value};
use vitals_sqlite::{SqliteStore, Store, StoreError};

/// A store double that records every call and returns canned rows.
#[derive(Default)]
struct RecordingStore {
    calls: RefCell<Vec<String>>,
    rows: Vec<Row>,
}

impl Store for RecordingStore {
    fn ensure_table(&self, table: &str, columns: &ColumnSpec) -> vitals_sqlite::Result<()> {
        let names: Vec<_> = columns.iter().map(|(n, d)| format!("{n} {d}")).collect();
        self.calls
            .borrow_mut()
            .push(format!("ensure_table {table} [{}]", names.join(", ")));
        Ok(())
    }

    fn drop_table(&self, table: &str) -> vitals_sqlite::Result<()> {
        self.calls.borrow_mut().push(format!("drop_table {table}"));
        Ok(())
    }

    fn insert(&self, table: &str, fields: &FieldMap) -> vitals_sqlite::Result<i64> {
        let keys: Vec<_> = fields.keys().collect();
        self.calls
            .borrow_mut()
            .push(format!("insert {table} {}", keys.join(",")));
        Ok(1)
    }

    fn select(
        &self,
        table: &str,
        criteria: &FieldMap,
        order: Option<&OrderBy>,
    ) -> vitals_sqlite::Result<Vec<Row>> {
        self.calls
            .borrow_mut()
            .push(format!("select {table} {criteria:?} {order:?}"));
        Ok(self.rows.clone())
    }

    fn delete(&self, table: &str, criteria: &FieldMap) -> vitals_sqlite::Result<usize> {
        self.calls
            .borrow_mut()
            .push(format!("delete {table} {criteria:?}"));
        Ok(0)
    }
}

fn schema_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    CreateSchema.execute(&store).unwrap();
    store
}

fn scenario_fields() -> FieldMap {
    FieldMap::new()
        .with("patient_id", 7)
        .with("heart_rate", 72)
        .with("blood_pressure", "120/80")
        .with("respiratory_rate", 16)
        .with("oxygen_saturation", 98.0)
        .with("temperature", 36.6)
}

fn add_at(store: &SqliteStore, patient_id: i64, day: u32) {
    let at = Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap();
    AddRecord
        .execute_at(store, FieldMap::new().with("patient_id", patient_id), at)
        .unwrap();
}

// ---------------------------------------------------------------------------
// Store interaction (test double)
// ---------------------------------------------------------------------------

#[test]
fn test_create_schema_uses_fixed_columns() {
    let store = RecordingStore::default();
    CreateSchema.execute(&store).unwrap();

    let calls = store.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        "ensure_table vitals [record_id INTEGER PRIMARY KEY AUTOINCREMENT, \
         patient_id INTEGER NOT NULL, date TIMESTAMP DEFAULT CURRENT_TIMESTAMP, \
         heart_rate INTEGER, blood_pressure TEXT, respiratory_rate INTEGER, \
         oxygen_saturation REAL, temperature REAL]"
    );
}

#[test]
fn test_add_record_stamps_date_after_given_fields() {
    let store = RecordingStore::default();
    let message = AddRecord.execute(&store, scenario_fields()).unwrap();

    assert_eq!(message, "Vital signs successfully recorded for patient 7.");
    assert_eq!(
        store.calls.borrow()[0],
        "insert vitals patient_id,heart_rate,blood_pressure,respiratory_rate,\
         oxygen_saturation,temperature,date"
    );
}

#[test]
fn test_add_record_without_patient_never_reaches_store() {
    let store = RecordingStore::default();
    let err = AddRecord
        .execute(&store, FieldMap::new().with("heart_rate", 72))
        .unwrap_err();
    assert!(matches!(err, CommandError::MissingField("patient_id")));
    assert!(store.calls.borrow().is_empty());
}

#[test]
fn test_add_record_rejects_unknown_column() {
    let store = RecordingStore::default();
    let fields = FieldMap::new().with("patient_id", 1).with("pulse", 80);
    let err = AddRecord.execute(&store, fields).unwrap_err();
    assert!(matches!(err, CommandError::InvalidField(_)));
    assert!(store.calls.borrow().is_empty());
}

#[test]
fn test_list_records_passes_configured_order() {
    let store = RecordingStore::default();
    ListRecords::by_patient().execute(&store).unwrap();
    ListRecords::by_date().descending().execute(&store).unwrap();

    let calls = store.calls.borrow();
    assert!(calls[0].contains(r#"column: "patient_id", descending: false"#));
    assert!(calls[1].contains(r#"column: "date", descending: true"#));
}

#[test]
fn test_unreadable_row_is_reported() {
    let store = RecordingStore {
        rows: vec![vec![Value::Integer(1)]],
        ..Default::default()
    };
    let err = ListRecords::default().execute(&store).unwrap_err();
    assert!(matches!(err, CommandError::UnreadableRecord(_)));
}

#[test]
fn test_quit_touches_no_store() {
    let store = RecordingStore::default();
    let output = Command::Quit(Quit).execute(&store, CommandInput::None).unwrap();
    assert_eq!(output, CommandOutput::Quit);
    assert!(store.calls.borrow().is_empty());
}

#[test]
fn test_command_rejects_mismatched_input() {
    let store = RecordingStore::default();
    let err = Command::DeleteRecord(DeleteRecord)
        .execute(&store, CommandInput::None)
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::UnexpectedInput {
            command: "delete-record",
            expected: "integer id",
            got: "no",
        }
    ));
    assert!(store.calls.borrow().is_empty());
}

// ---------------------------------------------------------------------------
// End-to-end against SQLite
// ---------------------------------------------------------------------------

#[test]
fn test_create_schema_is_idempotent() {
    let store = schema_store();
    CreateSchema.execute(&store).unwrap();
    assert!(store.table_exists(VITALS_TABLE).unwrap());
}

#[test]
fn test_add_then_get_patient_records_scenario() {
    let store = schema_store();
    let message = AddRecord.execute(&store, scenario_fields()).unwrap();
    assert_eq!(message, "Vital signs successfully recorded for patient 7.");

    let records = GetPatientRecords.execute(&store, 7).unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(record.record_id > 0);
    assert!(record.date.is_some());

    let mut stored = record.to_fields();
    stored.remove("date");
    assert_eq!(stored, scenario_fields());
}

#[test]
fn test_add_record_keeps_caller_date() {
    let store = schema_store();
    let fields = FieldMap::new()
        .with("patient_id", 4)
        .with("date", "2023-12-31T23:59:59.000000Z");
    AddRecord.execute(&store, fields).unwrap();

    let records = GetPatientRecords.execute(&store, 4).unwrap();
    assert_eq!(records[0].date.as_deref(), Some("2023-12-31T23:59:59.000000Z"));
}

#[test]
fn test_numeric_looking_date_is_rejected_and_listing_survives() {
    let store = schema_store();
    AddRecord
        .execute(&store, FieldMap::new().with("patient_id", 1))
        .unwrap();

    let fields = FieldMap::new()
        .with("patient_id", 2)
        .with("date", "20240101");
    let err = AddRecord.execute(&store, fields).unwrap_err();
    assert!(matches!(
        err,
        CommandError::InvalidField(ValidationError::InvalidTimestamp { .. })
    ));

    assert!(GetPatientRecords.execute(&store, 2).unwrap().is_empty());
    assert_eq!(ListRecords::default().execute(&store).unwrap().len(), 1);
}

#[test]
fn test_sqlite_timestamp_form_is_accepted() {
    let store = schema_store();
    let fields = FieldMap::new()
        .with("patient_id", 3)
        .with("date", "2024-01-15 08:00:00");
    AddRecord.execute(&store, fields).unwrap();

    let records = GetPatientRecords.execute(&store, 3).unwrap();
    assert_eq!(records[0].date.as_deref(), Some("2024-01-15 08:00:00"));
}

#[test]
fn test_numeric_date_written_directly_still_lists() {
    let store = schema_store();
    let fields = FieldMap::new()
        .with("patient_id", 4)
        .with("date", "20240101");
    store.insert(VITALS_TABLE, &fields).unwrap();

    let records = ListRecords::default().execute(&store).unwrap();
    assert_eq!(records[0].date.as_deref(), Some("20240101"));
}

#[test]
fn test_add_record_stamps_given_time() {
    let store = schema_store();
    add_at(&store, 9, 15);
    let records = GetPatientRecords.execute(&store, 9).unwrap();
    assert_eq!(records[0].date.as_deref(), Some("2024-01-15T08:00:00.000000Z"));
}

#[test]
fn test_get_patient_records_returns_all_rows() {
    let store = schema_store();
    add_at(&store, 1, 1);
    add_at(&store, 1, 2);
    add_at(&store, 1, 3);
    add_at(&store, 2, 1);

    assert_eq!(GetPatientRecords.execute(&store, 1).unwrap().len(), 3);
    assert!(GetPatientRecords.execute(&store, 42).unwrap().is_empty());
}

#[test]
fn test_list_records_by_date_and_patient() {
    let store = schema_store();
    add_at(&store, 3, 2);
    add_at(&store, 1, 3);
    add_at(&store, 2, 1);

    let by_date: Vec<_> = ListRecords::by_date()
        .execute(&store)
        .unwrap()
        .into_iter()
        .map(|r| r.patient_id)
        .collect();
    assert_eq!(by_date, [2, 3, 1]);

    let by_patient: Vec<_> = ListRecords::by_patient()
        .execute(&store)
        .unwrap()
        .into_iter()
        .map(|r| r.patient_id)
        .collect();
    assert_eq!(by_patient, [1, 2, 3]);
}

#[test]
fn test_delete_record_then_lookup_is_empty() {
    let store = schema_store();
    AddRecord.execute(&store, scenario_fields()).unwrap();
    let id = GetPatientRecords.execute(&store, 7).unwrap()[0].record_id;

    let deletion = DeleteRecord.execute(&store, id).unwrap();
    assert_eq!(deletion.message, format!("Record {id} deleted."));
    assert_eq!(deletion.affected, 1);

    let rows = store
        .select(VITALS_TABLE, &FieldMap::new().with("record_id", id), None)
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_delete_missing_record_is_not_an_error() {
    let store = schema_store();
    let deletion = DeleteRecord.execute(&store, 999).unwrap();
    assert!(deletion.message.contains("999"));
    assert_eq!(deletion.affected, 0);
}

#[test]
fn test_delete_patient_records_leaves_others() {
    let store = schema_store();
    add_at(&store, 1, 1);
    add_at(&store, 1, 2);
    add_at(&store, 2, 3);

    let deletion = DeletePatientRecords.execute(&store, 1).unwrap();
    assert_eq!(deletion.message, "All records deleted for patient 1.");
    assert_eq!(deletion.affected, 2);

    assert!(GetPatientRecords.execute(&store, 1).unwrap().is_empty());
    assert_eq!(GetPatientRecords.execute(&store, 2).unwrap().len(), 1);
}

#[test]
fn test_store_errors_propagate_unchanged() {
    let store = SqliteStore::open_in_memory().unwrap();
    // No schema: every command that touches the table fails at the store.
    let err = ListRecords::default().execute(&store).unwrap_err();
    assert!(matches!(
        err,
        CommandError::Store(StoreError::Operational { .. })
    ));
}

#[test]
fn test_uniform_dispatch() {
    let store = SqliteStore::open_in_memory().unwrap();
    let commands = [
        (Command::CreateSchema(CreateSchema), CommandInput::None),
        (
            Command::AddRecord(AddRecord),
            CommandInput::Fields(scenario_fields()),
        ),
        (Command::ListRecords(ListRecords::default()), CommandInput::None),
        (
            Command::GetPatientRecords(GetPatientRecords),
            CommandInput::Id(7),
        ),
        (
            Command::DeletePatientRecords(DeletePatientRecords),
            CommandInput::Id(7),
        ),
    ];

    let outputs: Vec<_> = commands
        .into_iter()
        .map(|(cmd, input)| cmd.execute(&store, input).unwrap())
        .collect();

    assert_eq!(outputs[0], CommandOutput::Done);
    assert!(matches!(&outputs[1], CommandOutput::Message(m) if m.contains("patient 7")));
    assert!(matches!(&outputs[2], CommandOutput::Records(r) if r.len() == 1));
    assert!(matches!(&outputs[3], CommandOutput::Records(r) if r.len() == 1));
    assert!(matches!(&outputs[4], CommandOutput::Deleted(d) if d.affected == 1));
}

#[test]
fn test_commands_work_through_trait_objects() {
    let store: Box<dyn Store> = Box::new(SqliteStore::open_in_memory().unwrap());
    CreateSchema.execute(store.as_ref()).unwrap();
    AddRecord.execute(store.as_ref(), scenario_fields()).unwrap();
    assert_eq!(GetPatientRecords.execute(store.as_ref(), 7).unwrap().len(), 1);
}
