mod menu;
mod render;

use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vitals_commands::{
    AddRecord, CreateSchema, DeletePatientRecords, DeleteRecord, GetPatientRecords, ListRecords,
    MonitorConfig,
};
use vitals_core::{FieldMap, VITALS_TABLE, Value, VitalRecord};
use vitals_sqlite::SqliteStore;

use crate::menu::{default_options, run_menu};
use crate::render::{render_json, render_table};

#[derive(Debug, Parser)]
#[command(name = "vitals")]
#[command(about = "Record and review patient vital signs", version)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database file; overrides the configured one.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Runs the interactive menu when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive lettered menu.
    Menu,
    /// Record one observation.
    Add(AddArgs),
    /// List every record.
    List(ListArgs),
    /// Show all records of one patient.
    Patient(PatientArgs),
    /// Delete one record by id.
    Delete(DeleteArgs),
    /// Delete all records of one patient.
    DeletePatient(DeletePatientArgs),
    /// Show the database location and record count.
    Status,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[arg(long)]
    patient_id: i64,
    /// Observation time; the current UTC time when omitted.
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    heart_rate: Option<i64>,
    /// Free-form, e.g. 120/80.
    #[arg(long)]
    blood_pressure: Option<String>,
    #[arg(long)]
    respiratory_rate: Option<i64>,
    #[arg(long)]
    oxygen_saturation: Option<f64>,
    #[arg(long)]
    temperature: Option<f64>,
}

impl AddArgs {
    /// Only the given fields, in schema order.
    fn into_fields(self) -> FieldMap {
        let mut fields = FieldMap::new().with("patient_id", self.patient_id);
        let optional: [(&str, Option<Value>); 6] = [
            ("date", self.date.map(Into::into)),
            ("heart_rate", self.heart_rate.map(Into::into)),
            ("blood_pressure", self.blood_pressure.map(Into::into)),
            ("respiratory_rate", self.respiratory_rate.map(Into::into)),
            ("oxygen_saturation", self.oxygen_saturation.map(Into::into)),
            ("temperature", self.temperature.map(Into::into)),
        ];
        for (column, value) in optional {
            if let Some(value) = value {
                fields.insert(column, value);
            }
        }
        fields
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ListOrder {
    Date,
    Patient,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Sort column; the configured listing order when omitted.
    #[arg(long)]
    by: Option<ListOrder>,
    /// Newest or highest first.
    #[arg(long)]
    desc: bool,
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct PatientArgs {
    patient_id: i64,
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    record_id: i64,
}

#[derive(Debug, Args)]
struct DeletePatientArgs {
    patient_id: i64,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => MonitorConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => MonitorConfig::default(),
    };
    init_tracing(&config.log_filter);

    let db = cli.db.unwrap_or_else(|| config.database.clone());
    let store = SqliteStore::open(&db)
        .map_err(|e| format!("Failed to open database '{}': {e}", db.display()))?;
    CreateSchema
        .execute(&store)
        .map_err(|e| format!("Failed to create schema: {e}"))?;

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => run_interactive(&store, &config)?,
        Command::Add(args) => run_add(&store, args)?,
        Command::List(args) => run_list(&store, &config, args)?,
        Command::Patient(args) => run_patient(&store, args)?,
        Command::Delete(args) => run_delete(&store, args)?,
        Command::DeletePatient(args) => run_delete_patient(&store, args)?,
        Command::Status => run_status(&store)?,
    }

    store
        .close()
        .map_err(|e| format!("Failed to close database '{}': {e}", db.display()))
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_interactive(store: &SqliteStore, config: &MonitorConfig) -> Result<(), String> {
    let options = default_options(config.listing.descending);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_menu(store, &options, &mut stdin.lock(), &mut stdout.lock())
        .map_err(|e| format!("Terminal I/O failed: {e}"))
}

fn run_add(store: &SqliteStore, args: AddArgs) -> Result<(), String> {
    let message = AddRecord
        .execute(store, args.into_fields())
        .map_err(|e| e.to_string())?;
    println!("{message}");
    Ok(())
}

fn run_list(store: &SqliteStore, config: &MonitorConfig, args: ListArgs) -> Result<(), String> {
    let list = match args.by {
        Some(ListOrder::Date) => ListRecords::by_date(),
        Some(ListOrder::Patient) => ListRecords::by_patient(),
        None => config.listing.command(),
    };
    let list = if args.desc { list.descending() } else { list };
    let records = list.execute(store).map_err(|e| e.to_string())?;
    print_records(&records, args.json)
}

fn run_patient(store: &SqliteStore, args: PatientArgs) -> Result<(), String> {
    let records = GetPatientRecords
        .execute(store, args.patient_id)
        .map_err(|e| e.to_string())?;
    print_records(&records, args.json)
}

fn run_delete(store: &SqliteStore, args: DeleteArgs) -> Result<(), String> {
    let deletion = DeleteRecord
        .execute(store, args.record_id)
        .map_err(|e| e.to_string())?;
    println!("{deletion}");
    Ok(())
}

fn run_delete_patient(store: &SqliteStore, args: DeletePatientArgs) -> Result<(), String> {
    let deletion = DeletePatientRecords
        .execute(store, args.patient_id)
        .map_err(|e| e.to_string())?;
    println!("{deletion}");
    Ok(())
}

fn run_status(store: &SqliteStore) -> Result<(), String> {
    let exists = store
        .table_exists(VITALS_TABLE)
        .map_err(|e| format!("Failed to inspect database: {e}"))?;
    println!("Database: {}", store.location());
    println!(
        "Table {VITALS_TABLE}: {}",
        if exists { "present" } else { "missing" }
    );
    if exists {
        let records = store
            .count_rows(VITALS_TABLE)
            .map_err(|e| format!("Failed to count records: {e}"))?;
        println!("Records: {records}");
    }
    Ok(())
}

fn print_records(records: &[VitalRecord], json: bool) -> Result<(), String> {
    if json {
        println!("{}", render_json(records)?);
    } else if records.is_empty() {
        println!("No records found.");
    } else {
        print!("{}", render_table(records));
    }
    Ok(())
}
