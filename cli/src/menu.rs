//! Interactive lettered menu over the command layer.
//!
//! The loop reads from any [`BufRead`] and writes to any [`Write`], so it
//! runs the same against a terminal and against a scripted buffer. A
//! failing command prints its error and the loop continues; only [`Quit`]
//! or end of input ends the session.

use std::io::{self, BufRead, Write};

use tracing::debug;
use vitals_commands::{
    AddRecord, Command, CommandInput, CommandOutput, DeletePatientRecords, DeleteRecord,
    GetPatientRecords, ListRecords, Quit,
};
use vitals_core::{FieldMap, Value};
use vitals_sqlite::Store;

use crate::render::render_table;

/// One selectable menu entry.
#[derive(Debug, Clone)]
pub struct MenuOption {
    pub key: char,
    pub label: &'static str,
    pub command: Command,
}

impl MenuOption {
    fn new(key: char, label: &'static str, command: Command) -> Self {
        Self {
            key,
            label,
            command,
        }
    }
}

/// The standard entries `A` to `F` plus `Q`.
///
/// `descending` applies to both listing entries.
pub fn default_options(descending: bool) -> Vec<MenuOption> {
    let listing = |list: ListRecords| {
        Command::ListRecords(if descending { list.descending() } else { list })
    };
    vec![
        MenuOption::new('A', "Add a record", Command::AddRecord(AddRecord)),
        MenuOption::new('B', "List records by date", listing(ListRecords::by_date())),
        MenuOption::new(
            'C',
            "List records by patient",
            listing(ListRecords::by_patient()),
        ),
        MenuOption::new(
            'D',
            "Get a patient's records",
            Command::GetPatientRecords(GetPatientRecords),
        ),
        MenuOption::new('E', "Delete a record", Command::DeleteRecord(DeleteRecord)),
        MenuOption::new(
            'F',
            "Delete all records for a patient",
            Command::DeletePatientRecords(DeletePatientRecords),
        ),
        MenuOption::new('Q', "Quit", Command::Quit(Quit)),
    ]
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Integer,
    Real,
    Text,
}

/// Prompts for an added record, in schema order. Only `patient_id` is required.
const FIELD_PROMPTS: [(&str, &str, FieldKind); 6] = [
    ("patient_id", "Patient ID", FieldKind::Integer),
    ("heart_rate", "Heart rate (BPM)", FieldKind::Integer),
    ("blood_pressure", "Blood pressure (mmHg)", FieldKind::Text),
    ("respiratory_rate", "Respiratory rate (brpm)", FieldKind::Integer),
    ("oxygen_saturation", "Oxygen saturation (%)", FieldKind::Real),
    ("temperature", "Temperature (°C)", FieldKind::Real),
];

fn parse_field(kind: FieldKind, label: &str, raw: &str) -> Result<Value, String> {
    match kind {
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| format!("{label} must be a whole number, got '{raw}'")),
        FieldKind::Real => raw
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| format!("{label} must be a number, got '{raw}'")),
        FieldKind::Text => Ok(Value::Text(raw.to_string())),
    }
}

/// Runs the menu until `Q` or end of input.
///
/// Returns only I/O errors on `input` or `out`; command failures are
/// printed and the loop continues.
pub fn run_menu<S, R, W>(
    store: &S,
    options: &[MenuOption],
    input: &mut R,
    out: &mut W,
) -> io::Result<()>
where
    S: Store + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(out)?;
        for option in options {
            writeln!(out, "  {}) {}", option.key, option.label)?;
        }
        let Some(choice) = prompt(input, out, "Choose an option: ")? else {
            return Ok(());
        };

        let Some(option) = options
            .iter()
            .find(|o| choice.eq_ignore_ascii_case(&o.key.to_string()))
        else {
            writeln!(out, "Invalid choice '{choice}'.")?;
            continue;
        };
        debug!(choice = %option.key, command = option.command.name(), "menu selection");

        let command_input = match read_input(&option.command, input, out)? {
            Some(Ok(command_input)) => command_input,
            Some(Err(message)) => {
                writeln!(out, "error: {message}")?;
                continue;
            }
            None => return Ok(()),
        };

        match option.command.execute(store, command_input) {
            Ok(CommandOutput::Quit) => return Ok(()),
            Ok(output) => show(out, output)?,
            Err(err) => writeln!(out, "error: {err}")?,
        }
    }
}

/// Collects the input the command needs. `None` means input ran out.
fn read_input<R: BufRead, W: Write>(
    command: &Command,
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Result<CommandInput, String>>> {
    match command {
        Command::AddRecord(_) => read_fields(input, out),
        Command::GetPatientRecords(_) | Command::DeletePatientRecords(_) => {
            read_id(input, out, "Patient ID")
        }
        Command::DeleteRecord(_) => read_id(input, out, "Record ID"),
        Command::CreateSchema(_) | Command::ListRecords(_) | Command::Quit(_) => {
            Ok(Some(Ok(CommandInput::None)))
        }
    }
}

fn read_id<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> io::Result<Option<Result<CommandInput, String>>> {
    let Some(raw) = prompt(input, out, &format!("{label}: "))? else {
        return Ok(None);
    };
    let parsed = raw
        .parse::<i64>()
        .map(CommandInput::Id)
        .map_err(|_| format!("{label} must be a whole number, got '{raw}'"));
    Ok(Some(parsed))
}

fn read_fields<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Result<CommandInput, String>>> {
    let mut fields = FieldMap::new();
    let mut invalid = None;
    for (column, label, kind) in FIELD_PROMPTS {
        let Some(raw) = prompt(input, out, &format!("{label}: "))? else {
            return Ok(None);
        };
        if raw.is_empty() || invalid.is_some() {
            continue;
        }
        match parse_field(kind, label, &raw) {
            Ok(value) => {
                fields.insert(column, value);
            }
            Err(message) => invalid = Some(message),
        }
    }
    Ok(Some(match invalid {
        Some(message) => Err(message),
        None => Ok(CommandInput::Fields(fields)),
    }))
}

/// Writes `text`, then reads one trimmed line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> io::Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn show<W: Write>(out: &mut W, output: CommandOutput) -> io::Result<()> {
    match output {
        CommandOutput::Done | CommandOutput::Quit => Ok(()),
        CommandOutput::Message(message) => writeln!(out, "{message}"),
        CommandOutput::Records(records) if records.is_empty() => writeln!(out, "No records found."),
        CommandOutput::Records(records) => write!(out, "{}", render_table(&records)),
        CommandOutput::Deleted(deletion) if deletion.affected == 0 => {
            writeln!(out, "{deletion} (no matching records)")
        }
        CommandOutput::Deleted(deletion) => writeln!(out, "{deletion}"),
    }
}
