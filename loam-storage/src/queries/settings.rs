//! Per-type settings tables (`tbl_fields_{type}`).
//!
//! The column set of each table comes from the field type's own
//! declaration; everything here builds SQL from that declaration. Handles
//! are validated before being interpolated into identifiers.

use loam_core::errors::StorageError;
use loam_core::field::{is_valid_handle, SettingColumn, SettingKind, SettingsMap};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use rustc_hash::FxHashMap;
use serde_json::Value;

pub fn table_name(handle: &str) -> String {
    format!("tbl_fields_{handle}")
}

fn checked_table_name(handle: &str) -> Result<String, StorageError> {
    if !is_valid_handle(handle) {
        return Err(StorageError::InvalidIdentifier {
            name: handle.to_string(),
        });
    }
    Ok(table_name(handle))
}

fn sql_type(kind: SettingKind) -> &'static str {
    match kind {
        SettingKind::Text => "TEXT",
        SettingKind::Integer | SettingKind::Flag => "INTEGER",
        SettingKind::Real => "REAL",
    }
}

/// Create the settings table for a type if it does not exist yet.
pub fn ensure_table(
    conn: &Connection,
    handle: &str,
    columns: &[SettingColumn],
) -> Result<(), StorageError> {
    let table = checked_table_name(handle)?;
    let mut ddl = format!("CREATE TABLE IF NOT EXISTS {table} (field_id INTEGER PRIMARY KEY");
    for column in columns {
        ddl.push_str(&format!(", {} {}", column.name, sql_type(column.kind)));
    }
    ddl.push_str(") STRICT");
    conn.execute_batch(&ddl).map_err(StorageError::from_sqlite)
}

/// Whether the settings table for a type exists.
pub fn table_exists(conn: &Connection, handle: &str) -> Result<bool, StorageError> {
    let table = checked_table_name(handle)?;
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .map_err(StorageError::from_sqlite)?;
    Ok(count > 0)
}

fn bind_value(kind: SettingKind, value: Option<&Value>) -> SqlValue {
    let Some(value) = value else {
        return SqlValue::Null;
    };
    match kind {
        SettingKind::Text => match value.as_str() {
            Some(s) => SqlValue::Text(s.to_string()),
            None if value.is_null() => SqlValue::Null,
            None => SqlValue::Text(value.to_string()),
        },
        SettingKind::Integer => value.as_i64().map(SqlValue::Integer).unwrap_or(SqlValue::Null),
        SettingKind::Real => value.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        SettingKind::Flag => match value {
            Value::Bool(b) => SqlValue::Integer(*b as i64),
            other => other
                .as_i64()
                .map(|i| SqlValue::Integer((i != 0) as i64))
                .unwrap_or(SqlValue::Null),
        },
    }
}

fn read_value(kind: SettingKind, row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Value>> {
    Ok(match kind {
        SettingKind::Text => row.get::<_, Option<String>>(idx)?.map(Value::String),
        SettingKind::Integer => row.get::<_, Option<i64>>(idx)?.map(Value::from),
        SettingKind::Real => row
            .get::<_, Option<f64>>(idx)?
            .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number)),
        SettingKind::Flag => row.get::<_, Option<i64>>(idx)?.map(|v| Value::Bool(v != 0)),
    })
}

/// Write the settings row for a field, replacing any existing row. This is
/// what keeps the one-row-per-field-per-type invariant.
pub fn upsert(
    conn: &Connection,
    handle: &str,
    columns: &[SettingColumn],
    field_id: i64,
    settings: &SettingsMap,
) -> Result<(), StorageError> {
    let table = checked_table_name(handle)?;
    let names: String = columns.iter().map(|c| format!(", {}", c.name)).collect();
    let marks = ", ?".repeat(columns.len());
    let sql = format!("INSERT OR REPLACE INTO {table} (field_id{names}) VALUES (?{marks})");

    let mut values: Vec<SqlValue> = Vec::with_capacity(columns.len() + 1);
    values.push(SqlValue::Integer(field_id));
    for column in columns {
        values.push(bind_value(column.kind, settings.get(column.name)));
    }

    conn.execute(&sql, params_from_iter(values))
        .map_err(StorageError::from_sqlite)?;
    Ok(())
}

/// Batched settings lookup: one query for a whole set of field ids of the
/// same type. Returns a map from field id to its settings row; ids without
/// a row are absent. A missing table yields an empty map, leaving the
/// missing-settings decision to the caller.
pub fn select_for(
    conn: &Connection,
    handle: &str,
    columns: &[SettingColumn],
    ids: &[i64],
) -> Result<FxHashMap<i64, SettingsMap>, StorageError> {
    let mut result = FxHashMap::default();
    if ids.is_empty() || !table_exists(conn, handle)? {
        return Ok(result);
    }

    let table = table_name(handle);
    let names: String = columns.iter().map(|c| format!(", {}", c.name)).collect();
    let marks = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT field_id{names} FROM {table} WHERE field_id IN ({marks})");

    let mut stmt = conn.prepare(&sql).map_err(StorageError::from_sqlite)?;
    let rows = stmt
        .query_map(
            params_from_iter(ids.iter().map(|&id| SqlValue::Integer(id))),
            |row| {
                let id: i64 = row.get(0)?;
                let mut map = SettingsMap::new();
                for (i, column) in columns.iter().enumerate() {
                    if let Some(value) = read_value(column.kind, row, i + 1)? {
                        map.insert(column.name.to_string(), value);
                    }
                }
                Ok((id, map))
            },
        )
        .map_err(StorageError::from_sqlite)?;

    for row in rows {
        let (id, map) = row.map_err(StorageError::from_sqlite)?;
        result.insert(id, map);
    }
    Ok(result)
}

/// Remove the settings row for a field. Missing tables count as removed.
pub fn delete_row(conn: &Connection, handle: &str, field_id: i64) -> Result<usize, StorageError> {
    if !table_exists(conn, handle)? {
        return Ok(0);
    }
    let table = table_name(handle);
    conn.execute(
        &format!("DELETE FROM {table} WHERE field_id = ?1"),
        params![field_id],
    )
    .map_err(StorageError::from_sqlite)
}
