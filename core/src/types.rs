//! Record type definitions for the vitals store.
//!
//! This module defines the data model shared by the storage backend and the
//! command layer: dynamically typed cell [`Value`]s, insertion-ordered
//! [`FieldMap`]s used for both inserted fields and query criteria, column
//! specifications for table creation, and the typed [`VitalRecord`] view of a
//! `vitals` row.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Name of the single table holding vital-sign observations.
pub const VITALS_TABLE: &str = "vitals";

/// Column names of the `vitals` table, in schema order.
///
/// Rows returned by a `SELECT *` against the table carry their cells in
/// exactly this order.
pub const VITALS_COLUMNS: [&str; 8] = [
    "record_id",
    "patient_id",
    "date",
    "heart_rate",
    "blood_pressure",
    "respiratory_rate",
    "oxygen_saturation",
    "temperature",
];

/// Human-readable column labels for front ends, aligned with [`VITALS_COLUMNS`].
pub const VITALS_COLUMN_LABELS: [&str; 8] = [
    "Id",
    "Patient id",
    "Date",
    "Heart rate (BPM)",
    "Blood pressure (mmHg)",
    "Respiratory rate (brpm)",
    "Oxygen saturation (%)",
    "Temperature (°C)",
];

/// A single dynamically typed cell value.
///
/// Mirrors the SQLite storage classes the store deals with (blobs are never
/// produced by the vitals schema).
///
/// # Examples
///
/// ```
/// use vitals_core::Value;
///
/// assert_eq!(Value::from(7), Value::Integer(7));
/// assert_eq!(Value::from("120/80").to_string(), "120/80");
/// assert_eq!(Value::from(None::<f64>), Value::Null);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the integer payload, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Short storage-class name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A positional row as returned by a `SELECT *`.
pub type Row = Vec<Value>;

/// Insertion-ordered mapping from column name to value.
///
/// Used for inserted fields and for conjunctive `WHERE` criteria. The
/// iteration order is the insertion order, so the position of each `?`
/// placeholder in a generated statement always matches the position of its
/// bound value.
///
/// # Examples
///
/// ```
/// use vitals_core::{FieldMap, Value};
///
/// let mut fields = FieldMap::new()
///     .with("patient_id", 7)
///     .with("heart_rate", 72);
/// fields.insert("patient_id", 8);
///
/// let keys: Vec<_> = fields.keys().collect();
/// assert_eq!(keys, ["patient_id", "heart_rate"]);
/// assert_eq!(fields.get("patient_id"), Some(&Value::Integer(8)));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
}

impl FieldMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, replacing an existing entry in place.
    ///
    /// Returns the previous value when the key was already present; the key
    /// keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Inserts `value` only when `key` is absent, appending it at the end.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &Value {
        let key = key.into();
        let index = match self.entries.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                self.entries.push((key, value.into()));
                self.entries.len() - 1
            }
        };
        &self.entries[index].1
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Removes an entry, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Ordered column specification for `CREATE TABLE`.
///
/// Each entry pairs a column name with its SQLite type declaration
/// (including constraints and defaults).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSpec {
    columns: Vec<(String, String)>,
}

impl ColumnSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column; a repeated name replaces the earlier declaration.
    pub fn column(mut self, name: impl Into<String>, declaration: impl Into<String>) -> Self {
        let name = name.into();
        let declaration = declaration.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, decl)) => *decl = declaration,
            None => self.columns.push((name, declaration)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }
}

/// The fixed column specification of the `vitals` table.
pub fn vitals_columns() -> ColumnSpec {
    ColumnSpec::new()
        .column("record_id", "INTEGER PRIMARY KEY AUTOINCREMENT")
        .column("patient_id", "INTEGER NOT NULL")
        .column("date", "TIMESTAMP DEFAULT CURRENT_TIMESTAMP")
        .column("heart_rate", "INTEGER")
        .column("blood_pressure", "TEXT")
        .column("respiratory_rate", "INTEGER")
        .column("oxygen_saturation", "REAL")
        .column("temperature", "REAL")
}

/// Sort order for a `SELECT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// One observation row of the `vitals` table.
///
/// Records are never mutated in place; deleting and re-adding is the only
/// update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    /// Store-assigned identifier.
    pub record_id: i64,
    /// Opaque grouping key for one subject.
    pub patient_id: i64,
    /// ISO-8601 timestamp of the observation.
    pub date: Option<String>,
    pub heart_rate: Option<i64>,
    /// Free-form, e.g. `"120/80"`.
    pub blood_pressure: Option<String>,
    pub respiratory_rate: Option<i64>,
    pub oxygen_saturation: Option<f64>,
    pub temperature: Option<f64>,
}

impl VitalRecord {
    /// Rebuilds the field map of the non-id columns, in schema order.
    ///
    /// Absent optional values are carried as [`Value::Null`].
    pub fn to_fields(&self) -> FieldMap {
        FieldMap::new()
            .with("patient_id", self.patient_id)
            .with("date", self.date.clone())
            .with("heart_rate", self.heart_rate)
            .with("blood_pressure", self.blood_pressure.clone())
            .with("respiratory_rate", self.respiratory_rate)
            .with("oxygen_saturation", self.oxygen_saturation)
            .with("temperature", self.temperature)
    }

    /// Display strings for the eight columns, aligned with [`VITALS_COLUMN_LABELS`].
    pub fn cells(&self) -> [String; 8] {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }
        [
            self.record_id.to_string(),
            self.patient_id.to_string(),
            opt(&self.date),
            opt(&self.heart_rate),
            opt(&self.blood_pressure),
            opt(&self.respiratory_rate),
            opt(&self.oxygen_saturation),
            opt(&self.temperature),
        ]
    }
}

impl TryFrom<Row> for VitalRecord {
    type Error = ValidationError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        let [
            record_id,
            patient_id,
            date,
            heart_rate,
            blood_pressure,
            respiratory_rate,
            oxygen_saturation,
            temperature,
        ]: [Value; 8] = row
            .try_into()
            .map_err(|row: Row| ValidationError::RowArity(row.len()))?;

        Ok(Self {
            record_id: required_integer(VITALS_COLUMNS[0], record_id)?,
            patient_id: required_integer(VITALS_COLUMNS[1], patient_id)?,
            date: optional_timestamp(date),
            heart_rate: optional_integer(VITALS_COLUMNS[3], heart_rate)?,
            blood_pressure: optional_text(VITALS_COLUMNS[4], blood_pressure)?,
            respiratory_rate: optional_integer(VITALS_COLUMNS[5], respiratory_rate)?,
            oxygen_saturation: optional_real(VITALS_COLUMNS[6], oxygen_saturation)?,
            temperature: optional_real(VITALS_COLUMNS[7], temperature)?,
        })
    }
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: found.type_name(),
    }
}

fn required_integer(column: &str, value: Value) -> Result<i64, ValidationError> {
    value
        .as_i64()
        .ok_or_else(|| mismatch(column, "integer", &value))
}

fn optional_integer(column: &str, value: Value) -> Result<Option<i64>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Integer(v) => Ok(Some(v)),
        other => Err(mismatch(column, "integer", &other)),
    }
}

fn optional_real(column: &str, value: Value) -> Result<Option<f64>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        other => other
            .as_f64()
            .map(Some)
            .ok_or_else(|| mismatch(column, "real", &other)),
    }
}

/// Numeric affinity can turn digit-only text into a number on the way in;
/// read such cells back as their decimal text.
fn optional_timestamp(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(v) => Some(v),
        other => Some(other.to_string()),
    }
}

fn optional_text(column: &str, value: Value) -> Result<Option<String>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Text(v) => Ok(Some(v)),
        other => Err(mismatch(column, "text", &other)),
    }
}
