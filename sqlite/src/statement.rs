//! Parameterized SQL statement building.
//!
//! Translates table names, column specifications, field maps, and criteria
//! maps into SQL text plus a positional parameter list. Identifiers are
//! validated and interpolated; values are never interpolated and are always
//! bound through numbered `?N` placeholders whose numbering follows the
//! map's iteration order.

use vitals_core::{ColumnSpec, FieldMap, OrderBy, Value, validate_identifier};

use crate::error::{Result, StoreError};

/// SQL text paired with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn unbound(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }
}

/// Builds `col1 = ?N AND col2 = ?N+1 ...` starting at placeholder `first`.
fn conjunction(criteria: &FieldMap, first: usize) -> Result<(String, Vec<Value>)> {
    let mut clauses = Vec::with_capacity(criteria.len());
    let mut params = Vec::with_capacity(criteria.len());
    for (offset, (column, value)) in criteria.iter().enumerate() {
        validate_identifier(column)?;
        clauses.push(format!("{column} = ?{}", first + offset));
        params.push(value.clone());
    }
    Ok((clauses.join(" AND "), params))
}

fn validate_declaration(table: &str, column: &str, declaration: &str) -> Result<()> {
    let ok = !declaration.trim().is_empty()
        && declaration
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '(' | ')' | ',' | '.' | '\'' | '-'));
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(
            vitals_core::ValidationError::InvalidIdentifier(format!(
                "{table}.{column} {declaration}"
            )),
        ))
    }
}

/// `CREATE TABLE IF NOT EXISTS <table> (<col> <DECL>, ...)`.
///
/// Type declarations are upper-cased.
pub(crate) fn create_table(table: &str, columns: &ColumnSpec) -> Result<Statement> {
    validate_identifier(table)?;
    if columns.is_empty() {
        return Err(StoreError::NoColumns(table.to_string()));
    }
    let mut defs = Vec::with_capacity(columns.len());
    for (name, declaration) in columns.iter() {
        validate_identifier(name)?;
        validate_declaration(table, name, declaration)?;
        defs.push(format!("{name} {}", declaration.trim().to_uppercase()));
    }
    Ok(Statement::unbound(format!(
        "CREATE TABLE IF NOT EXISTS {table} ({})",
        defs.join(", ")
    )))
}

/// `SELECT COUNT(*) FROM <table>`.
pub(crate) fn count(table: &str) -> Result<Statement> {
    validate_identifier(table)?;
    Ok(Statement::unbound(format!("SELECT COUNT(*) FROM {table}")))
}

/// `DROP TABLE <table>`.
pub(crate) fn drop_table(table: &str) -> Result<Statement> {
    validate_identifier(table)?;
    Ok(Statement::unbound(format!("DROP TABLE {table}")))
}

/// `INSERT INTO <table> (<cols>) VALUES (?1, ?2, ...)`.
pub(crate) fn insert(table: &str, fields: &FieldMap) -> Result<Statement> {
    validate_identifier(table)?;
    if fields.is_empty() {
        return Err(StoreError::EmptyFields(table.to_string()));
    }
    let mut columns = Vec::with_capacity(fields.len());
    for column in fields.keys() {
        validate_identifier(column)?;
        columns.push(column);
    }
    let placeholders: Vec<String> = (1..=fields.len()).map(|n| format!("?{n}")).collect();
    Ok(Statement {
        sql: format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        ),
        params: fields.values().cloned().collect(),
    })
}

/// `SELECT * FROM <table> [WHERE ...] [ORDER BY <col> [DESC]]`.
///
/// Empty criteria omit the `WHERE` clause and match every row.
pub(crate) fn select(table: &str, criteria: &FieldMap, order: Option<&OrderBy>) -> Result<Statement> {
    validate_identifier(table)?;
    let mut sql = format!("SELECT * FROM {table}");
    let mut params = Vec::new();
    if !criteria.is_empty() {
        let (clause, values) = conjunction(criteria, 1)?;
        sql.push_str(" WHERE ");
        sql.push_str(&clause);
        params = values;
    }
    if let Some(order) = order {
        validate_identifier(&order.column)?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.column);
        if order.descending {
            sql.push_str(" DESC");
        }
    }
    Ok(Statement { sql, params })
}

/// `DELETE FROM <table> WHERE ...`.
///
/// Empty criteria are rejected; this never produces a `DELETE` without a
/// `WHERE` clause.
pub(crate) fn delete(table: &str, criteria: &FieldMap) -> Result<Statement> {
    validate_identifier(table)?;
    if criteria.is_empty() {
        return Err(StoreError::EmptyCriteria(table.to_string()));
    }
    let (clause, params) = conjunction(criteria, 1)?;
    Ok(Statement {
        sql: format!("DELETE FROM {table} WHERE {clause}"),
        params,
    })
}
