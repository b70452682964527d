//! Field types and instances.
//!
//! A field type is a pluggable component bound to a database column set:
//! it declares its own settings schema, its capability predicates, and the
//! DDL for its per-field entry-data table. Concrete types are registered in
//! a [`FieldRegistry`] and hydrated into [`Field`] instances by the manager.

pub mod builtin;
pub mod registry;
pub mod resolver;

use std::collections::BTreeMap;
use std::fmt;

use rusqlite::Connection;
use serde_json::Value;

use crate::errors::StorageError;
use crate::types::FieldRow;

pub use registry::{Constructor, FieldRegistry};
pub use resolver::{RegisterHook, Resolver};

/// Type-specific settings as column-name/value pairs.
pub type SettingsMap = BTreeMap<String, Value>;

/// Storage class of a declared settings column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Text,
    Integer,
    Real,
    /// Stored as INTEGER 0/1, surfaced as a JSON bool.
    Flag,
}

/// One column in a field type's settings table declaration.
#[derive(Debug, Clone, Copy)]
pub struct SettingColumn {
    pub name: &'static str,
    pub kind: SettingKind,
}

/// Returns true when `handle` is a valid field type handle: non-empty,
/// lower-case `[a-z0-9_]`. Handles are interpolated into table names, so
/// everything that touches storage validates them first.
pub fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// A pluggable field type. Implementations are cheap value objects; the
/// manager constructs one exemplar per type and clones it for every fresh
/// instance, so `Clone` must produce fully independent copies.
pub trait FieldType: FieldTypeClone + Send + Sync {
    /// The type handle, e.g. `"input"`. Lower-case `[a-z0-9_]`.
    fn handle(&self) -> &'static str;

    /// Columns of the `tbl_fields_{handle}` settings table. The schema of
    /// that table is determined entirely by this declaration.
    fn settings_columns(&self) -> &'static [SettingColumn];

    /// Current settings as a column/value map. Unset columns are omitted.
    fn settings(&self) -> SettingsMap;

    /// Merge a settings row into this instance. Unknown keys are ignored.
    fn apply_settings(&mut self, row: &SettingsMap);

    fn can_toggle(&self) -> bool {
        false
    }

    fn can_filter(&self) -> bool {
        false
    }

    /// Default for the `show_column` display flag, linked to the toggle
    /// capability.
    fn default_show_column(&self) -> bool {
        self.can_toggle()
    }

    /// DDL for the per-field entry-data table, executed on `add` and
    /// dropped on `delete`.
    fn entry_table_sql(&self, field_id: i64) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS tbl_entries_data_{field_id} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                entry_id INTEGER NOT NULL,
                value TEXT
            ) STRICT;
            CREATE INDEX IF NOT EXISTS idx_entries_data_{field_id}_entry
                ON tbl_entries_data_{field_id}(entry_id);"
        )
    }

    /// Teardown hook, run before the structural removal steps of `delete`.
    fn tear_down(&self, _conn: &Connection, _field_id: i64) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Clone support for boxed field types.
pub trait FieldTypeClone {
    fn clone_box(&self) -> Box<dyn FieldType>;
}

impl<T> FieldTypeClone for T
where
    T: FieldType + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn FieldType> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn FieldType> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A hydrated field: the base definition row plus its type implementation.
#[derive(Clone)]
pub struct Field {
    pub row: FieldRow,
    imp: Box<dyn FieldType>,
}

impl Field {
    /// Build a fresh instance around a (cloned) type exemplar.
    pub fn from_exemplar(imp: Box<dyn FieldType>) -> Self {
        let row = FieldRow {
            field_type: imp.handle().to_string(),
            show_column: imp.default_show_column(),
            sortorder: 1,
            ..FieldRow::default()
        };
        Self { row, imp }
    }

    pub fn handle(&self) -> &'static str {
        self.imp.handle()
    }

    pub fn can_toggle(&self) -> bool {
        self.imp.can_toggle()
    }

    pub fn can_filter(&self) -> bool {
        self.imp.can_filter()
    }

    pub fn settings_columns(&self) -> &'static [SettingColumn] {
        self.imp.settings_columns()
    }

    pub fn settings(&self) -> SettingsMap {
        self.imp.settings()
    }

    pub fn apply_settings(&mut self, row: &SettingsMap) {
        self.imp.apply_settings(row);
    }

    pub fn entry_table_sql(&self) -> String {
        self.imp.entry_table_sql(self.row.id)
    }

    pub fn tear_down(&self, conn: &Connection) -> Result<(), StorageError> {
        self.imp.tear_down(conn, self.row.id)
    }

    pub fn type_impl(&self) -> &dyn FieldType {
        self.imp.as_ref()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("row", &self.row)
            .field("settings", &self.imp.settings())
            .finish()
    }
}
