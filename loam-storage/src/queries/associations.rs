//! tbl_sections_association queries.

use loam_core::errors::StorageError;
use rusqlite::{params, Connection};

/// A section association row: a link between two sections established
/// through a pair of fields.
#[derive(Debug, Clone)]
pub struct AssociationRow {
    pub parent_section_id: i64,
    pub parent_section_field_id: i64,
    pub child_section_id: i64,
    pub child_section_field_id: i64,
    pub hide_association: bool,
}

/// Insert an association row and return its id.
pub fn insert(conn: &Connection, row: &AssociationRow) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO tbl_sections_association
             (parent_section_id, parent_section_field_id,
              child_section_id, child_section_field_id, hide_association)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            row.parent_section_id,
            row.parent_section_field_id,
            row.child_section_id,
            row.child_section_field_id,
            row.hide_association as i64,
        ],
    )
    .map_err(StorageError::from_sqlite)?;
    Ok(conn.last_insert_rowid())
}

/// Remove every association referencing a field, on either side of the
/// link. Returns the number of rows removed.
pub fn delete_for_field(conn: &Connection, field_id: i64) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM tbl_sections_association
         WHERE parent_section_field_id = ?1 OR child_section_field_id = ?1",
        params![field_id],
    )
    .map_err(StorageError::from_sqlite)
}

/// Count associations referencing a field.
pub fn count_for_field(conn: &Connection, field_id: i64) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM tbl_sections_association
         WHERE parent_section_field_id = ?1 OR child_section_field_id = ?1",
        params![field_id],
        |row| row.get(0),
    )
    .map_err(StorageError::from_sqlite)
}
