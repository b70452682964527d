//! tbl_fields base-table queries.

use loam_core::errors::StorageError;
use loam_core::types::{FieldChanges, FieldLocation, FieldQuery, FieldRow, NewField};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};

fn row_to_field(row: &Row<'_>) -> rusqlite::Result<FieldRow> {
    let location: String = row.get(4)?;
    Ok(FieldRow {
        id: row.get(0)?,
        field_type: row.get(1)?,
        parent_section: row.get(2)?,
        element_name: row.get(3)?,
        location: FieldLocation::parse(&location).unwrap_or_default(),
        sortorder: row.get(5)?,
        show_column: row.get::<_, i64>(6)? != 0,
    })
}

const SELECT_COLUMNS: &str =
    "id, type, parent_section, element_name, location, sortorder, show_column";

/// Next sortorder: max(existing)+1, or 1 when the table is empty.
pub fn next_sortorder(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COALESCE(MAX(sortorder), 0) + 1 FROM tbl_fields",
        [],
        |row| row.get(0),
    )
    .map_err(StorageError::from_sqlite)
}

/// Insert a field definition row and return its new id.
pub fn insert(
    conn: &Connection,
    new: &NewField,
    sortorder: i64,
    show_column: bool,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO tbl_fields (type, parent_section, element_name, location, sortorder, show_column)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.field_type,
            new.parent_section,
            new.element_name,
            new.location.as_str(),
            sortorder,
            show_column as i64,
        ],
    )
    .map_err(StorageError::from_sqlite)?;
    Ok(conn.last_insert_rowid())
}

/// Get a single field row by id.
pub fn get(conn: &Connection, id: i64) -> Result<Option<FieldRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM tbl_fields WHERE id = ?1"
        ))
        .map_err(StorageError::from_sqlite)?;

    let mut rows = stmt
        .query_map(params![id], row_to_field)
        .map_err(StorageError::from_sqlite)?;

    match rows.next() {
        Some(Ok(row)) => Ok(Some(row)),
        Some(Err(e)) => Err(StorageError::from_sqlite(e)),
        None => Ok(None),
    }
}

/// Partial update by id. Returns whether any row changed; an empty change
/// set is a no-op returning false.
pub fn update(conn: &Connection, id: i64, changes: &FieldChanges) -> Result<bool, StorageError> {
    let mut sets: Vec<&str> = Vec::new();
    let mut values: Vec<SqlValue> = Vec::new();

    if let Some(field_type) = &changes.field_type {
        sets.push("type = ?");
        values.push(SqlValue::Text(field_type.clone()));
    }
    if let Some(section) = changes.parent_section {
        sets.push("parent_section = ?");
        values.push(SqlValue::Integer(section));
    }
    if let Some(element_name) = &changes.element_name {
        sets.push("element_name = ?");
        values.push(SqlValue::Text(element_name.clone()));
    }
    if let Some(location) = changes.location {
        sets.push("location = ?");
        values.push(SqlValue::Text(location.as_str().to_string()));
    }
    if let Some(sortorder) = changes.sortorder {
        sets.push("sortorder = ?");
        values.push(SqlValue::Integer(sortorder));
    }
    if let Some(show_column) = changes.show_column {
        sets.push("show_column = ?");
        values.push(SqlValue::Integer(show_column as i64));
    }

    if sets.is_empty() {
        return Ok(false);
    }

    values.push(SqlValue::Integer(id));
    let sql = format!("UPDATE tbl_fields SET {} WHERE id = ?", sets.join(", "));
    let changed = conn
        .execute(&sql, params_from_iter(values))
        .map_err(StorageError::from_sqlite)?;
    Ok(changed > 0)
}

/// Delete the base row. Returns the number of rows removed.
pub fn delete_row(conn: &Connection, id: i64) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM tbl_fields WHERE id = ?1", params![id])
        .map_err(StorageError::from_sqlite)
}

/// Select field rows matching the query's composed predicates. The id set,
/// section, type, and location predicates are bound; the free-form WHERE
/// fragment and ORDER BY expression are interpolated as-is.
pub fn select(conn: &Connection, query: &FieldQuery) -> Result<Vec<FieldRow>, StorageError> {
    let mut sql = format!("SELECT {SELECT_COLUMNS} FROM tbl_fields WHERE 1=1");
    let mut values: Vec<SqlValue> = Vec::new();

    if !query.ids.is_empty() {
        let marks = vec!["?"; query.ids.len()].join(", ");
        sql.push_str(&format!(" AND id IN ({marks})"));
        values.extend(query.ids.iter().map(|&id| SqlValue::Integer(id)));
    }
    if let Some(section) = query.section {
        sql.push_str(" AND parent_section = ?");
        values.push(SqlValue::Integer(section));
    }
    if let Some(field_type) = &query.field_type {
        sql.push_str(" AND type = ?");
        values.push(SqlValue::Text(field_type.clone()));
    }
    if let Some(location) = query.location {
        sql.push_str(" AND location = ?");
        values.push(SqlValue::Text(location.as_str().to_string()));
    }
    if let Some(fragment) = &query.where_fragment {
        sql.push_str(" AND (");
        sql.push_str(fragment);
        sql.push(')');
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(query.order_by.as_deref().unwrap_or("sortorder ASC"));

    // Dynamic SQL; not worth the prepared-statement cache.
    let mut stmt = conn.prepare(&sql).map_err(StorageError::from_sqlite)?;
    let rows = stmt
        .query_map(params_from_iter(values), row_to_field)
        .map_err(StorageError::from_sqlite)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(StorageError::from_sqlite)?);
    }
    Ok(result)
}
