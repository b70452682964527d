//! Per-field entry-data tables (`tbl_entries_data_{id}`).

use loam_core::errors::StorageError;
use loam_core::field::Field;
use rusqlite::{params, Connection};

pub fn table_name(field_id: i64) -> String {
    format!("tbl_entries_data_{field_id}")
}

/// Create the entry-data table for a field from its type's DDL.
pub fn create_table(conn: &Connection, field: &Field) -> Result<(), StorageError> {
    conn.execute_batch(&field.entry_table_sql())
        .map_err(StorageError::from_sqlite)
}

/// Drop the entry-data table for a field, if present.
pub fn drop_table(conn: &Connection, field_id: i64) -> Result<(), StorageError> {
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", table_name(field_id)))
        .map_err(StorageError::from_sqlite)
}

/// Whether the entry-data table for a field exists.
pub fn table_exists(conn: &Connection, field_id: i64) -> Result<bool, StorageError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table_name(field_id)],
            |row| row.get(0),
        )
        .map_err(StorageError::from_sqlite)?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection;
    use loam_core::field::builtin::InputField;

    #[test]
    fn create_and_drop() {
        let conn = connection::open_in_memory().unwrap();
        let mut field = Field::from_exemplar(Box::new(InputField::default()));
        field.row.id = 42;

        create_table(&conn, &field).unwrap();
        assert!(table_exists(&conn, 42).unwrap());

        drop_table(&conn, 42).unwrap();
        assert!(!table_exists(&conn, 42).unwrap());

        // Dropping a missing table is not an error.
        drop_table(&conn, 42).unwrap();
    }
}
