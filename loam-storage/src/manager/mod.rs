//! The field manager.
//!
//! Mediates all CRUD against the field schema and carries the two-tier
//! instance cache: an exemplar pool keyed by type handle (fresh instances
//! are clones of a pooled prototype, so construction cost is paid once per
//! type) and a hydrated cache keyed by field id (repeated fetches of the
//! same field return the same instance). Both caches live on the manager
//! itself; there is no global state.

use std::collections::BTreeMap;
use std::sync::Arc;

use loam_core::config::ManagerConfig;
use loam_core::discovery;
use loam_core::errors::{FieldError, StorageError};
use loam_core::field::{is_valid_handle, Field, FieldRegistry, FieldType, Resolver};
use loam_core::types::{FieldChanges, FieldQuery, FieldRow, NewField, Restriction};
use moka::sync::Cache;
use rusqlite::Connection;
use rustc_hash::FxHashMap;

use crate::connection;
use crate::queries::{associations, entry_data, fields, settings};

const HYDRATED_CACHE_CAPACITY: u64 = 4096;

pub struct FieldManager {
    conn: Connection,
    config: ManagerConfig,
    registry: FieldRegistry,
    resolver: Resolver,
    exemplars: FxHashMap<String, Box<dyn FieldType>>,
    hydrated: Cache<i64, Arc<Field>>,
}

impl FieldManager {
    /// Open the configured database and build a manager around it.
    pub fn open(config: ManagerConfig) -> Result<Self, FieldError> {
        let conn = connection::open(&config.effective_database())?;
        Ok(Self::with_connection(conn, config))
    }

    /// Build a manager on an in-memory database.
    pub fn in_memory(config: ManagerConfig) -> Result<Self, FieldError> {
        let conn = connection::open_in_memory()?;
        Ok(Self::with_connection(conn, config))
    }

    /// Build a manager around an already-migrated connection.
    pub fn with_connection(conn: Connection, config: ManagerConfig) -> Self {
        Self {
            conn,
            config,
            registry: FieldRegistry::new(),
            resolver: Resolver::builtin(),
            exemplars: FxHashMap::default(),
            hydrated: Cache::new(HYDRATED_CACHE_CAPACITY),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// The registry, for explicit plugin type registration.
    pub fn registry_mut(&mut self) -> &mut FieldRegistry {
        &mut self.registry
    }

    /// The name resolver, for plugin alias registration.
    pub fn resolver_mut(&mut self) -> &mut Resolver {
        &mut self.resolver
    }

    /// Resolve a type handle to a fresh field instance.
    ///
    /// The type is looked up in the registry, falling back to the name
    /// resolver for lazy, at-most-once registration; alias names continue
    /// under the canonical handle the resolver reports. The instance is a
    /// clone of a pooled exemplar, so callers get independent mutable
    /// values while construction runs once per type.
    pub fn create(&mut self, handle: &str) -> Result<Field, FieldError> {
        if !is_valid_handle(handle) {
            return Err(FieldError::InvalidHandle {
                handle: handle.to_string(),
            });
        }

        let imp = match self.exemplars.get(handle) {
            Some(imp) => imp.clone(),
            None => {
                if !self.registry.contains(handle) {
                    if let Some(canonical) = self.resolver.resolve(handle, &mut self.registry) {
                        if canonical != handle {
                            return self.create(&canonical);
                        }
                    }
                }
                let imp = self.registry.instantiate(handle).ok_or_else(|| {
                    FieldError::UnknownType {
                        handle: handle.to_string(),
                        expected: self.config.expected_manifest(handle),
                    }
                })?;
                self.exemplars.insert(handle.to_string(), imp.clone());
                imp
            }
        };

        Ok(Field::from_exemplar(imp))
    }

    /// Persist a new field definition and return its id.
    ///
    /// Assigns sortorder when absent (max+1, 1 on an empty table), derives
    /// `show_column` from the type's capability default when absent, writes
    /// the base row, the settings row (type defaults merged with the
    /// caller's overrides), and creates the entry-data table.
    pub fn add(&mut self, new: &NewField) -> Result<i64, FieldError> {
        let mut field = self.create(&new.field_type)?;
        field.apply_settings(&new.settings);
        let show_column = new.show_column.unwrap_or(field.row.show_column);
        let columns = field.settings_columns();

        let tx = self
            .conn
            .transaction()
            .map_err(StorageError::from_sqlite)?;

        let sortorder = match new.sortorder {
            Some(sortorder) => sortorder,
            None => fields::next_sortorder(&tx)?,
        };

        let id = fields::insert(&tx, new, sortorder, show_column)?;
        settings::ensure_table(&tx, &new.field_type, columns)?;
        settings::upsert(&tx, &new.field_type, columns, id, &field.settings())?;

        field.row.id = id;
        entry_data::create_table(&tx, &field)?;

        tx.commit().map_err(StorageError::from_sqlite)?;
        tracing::info!(id, field_type = %new.field_type, "added field");
        Ok(id)
    }

    /// Partial update by id. Base columns are updated in place; settings
    /// changes are merged into the existing settings row. Changing the
    /// type moves the settings row into the new type's table (old values
    /// do not carry across schemas). Returns whether anything was written.
    pub fn edit(&mut self, id: i64, changes: &FieldChanges) -> Result<bool, FieldError> {
        // Resolve the type before the transaction borrows the connection.
        // A type change touches the settings tables even when the change
        // set carries no settings, to keep one settings row per field.
        let prepared = if changes.field_type.is_none() && changes.settings.is_empty() {
            None
        } else {
            let row = fields::get(&self.conn, id)?.ok_or(FieldError::NotFound { id })?;
            let field_type = changes
                .field_type
                .clone()
                .unwrap_or_else(|| row.field_type.clone());
            let field = self.create(&field_type)?;
            Some((row, field_type, field))
        };

        let tx = self
            .conn
            .transaction()
            .map_err(StorageError::from_sqlite)?;

        let base_changed = fields::update(&tx, id, changes)?;
        let mut settings_written = false;

        if let Some((row, field_type, mut field)) = prepared {
            let columns = field.settings_columns();
            if field_type == row.field_type {
                let existing = settings::select_for(&tx, &row.field_type, columns, &[id])?;
                if let Some(current) = existing.get(&id) {
                    field.apply_settings(current);
                }
            } else {
                settings::delete_row(&tx, &row.field_type, id)?;
            }
            field.apply_settings(&changes.settings);
            settings::ensure_table(&tx, &field_type, columns)?;
            settings::upsert(&tx, &field_type, columns, id, &field.settings())?;
            settings_written = true;
        }

        tx.commit().map_err(StorageError::from_sqlite)?;
        self.hydrated.invalidate(&id);
        Ok(base_changed || settings_written)
    }

    /// Destroy a field definition.
    ///
    /// The field is hydrated first (absence is an error from the lookup
    /// step, not a silent no-op), its type teardown hook runs, and then the
    /// settings row, association rows, base row, and entry-data table are
    /// removed. All destructive steps share one transaction.
    pub fn delete(&mut self, id: i64) -> Result<(), FieldError> {
        let field = self
            .fetch_one(id)?
            .ok_or(FieldError::NotFound { id })?;
        let handle = field.row.field_type.clone();

        let tx = self
            .conn
            .transaction()
            .map_err(StorageError::from_sqlite)?;

        field.tear_down(&tx)?;
        settings::delete_row(&tx, &handle, id)?;
        associations::delete_for_field(&tx, id)?;
        fields::delete_row(&tx, id)?;
        entry_data::drop_table(&tx, id)?;

        tx.commit().map_err(StorageError::from_sqlite)?;
        self.hydrated.invalidate(&id);
        tracing::info!(id, field_type = %handle, "deleted field");
        Ok(())
    }

    /// Fetch fields matching a query, keyed by id.
    ///
    /// Already-hydrated ids are served from cache without touching storage.
    /// The remainder is resolved with one base-table query, then one
    /// settings query per distinct type, then hydration through the
    /// exemplar pool. The capability restriction applies after hydration,
    /// to cached and fresh instances alike. Unresolvable ids are silently
    /// omitted.
    pub fn fetch(&mut self, query: &FieldQuery) -> Result<BTreeMap<i64, Arc<Field>>, FieldError> {
        let mut out: BTreeMap<i64, Arc<Field>> = BTreeMap::new();

        let rows: Vec<FieldRow> = if query.ids.is_empty() {
            let mut uncached = Vec::new();
            for row in fields::select(&self.conn, query)? {
                match self.hydrated.get(&row.id) {
                    Some(field) => {
                        out.insert(row.id, field);
                    }
                    None => uncached.push(row),
                }
            }
            uncached
        } else {
            let mut remaining = Vec::new();
            for &id in &query.ids {
                match self.hydrated.get(&id) {
                    Some(field) => {
                        out.insert(id, field);
                    }
                    None => remaining.push(id),
                }
            }
            if remaining.is_empty() {
                Vec::new()
            } else {
                let narrowed = FieldQuery {
                    ids: remaining,
                    ..query.clone()
                };
                fields::select(&self.conn, &narrowed)?
            }
        };

        // Group by type so settings load with one query per distinct type
        // instead of one per row.
        let mut by_type: FxHashMap<String, Vec<FieldRow>> = FxHashMap::default();
        for row in rows {
            by_type.entry(row.field_type.clone()).or_default().push(row);
        }

        for (handle, rows) in by_type {
            let exemplar = self.create(&handle)?;
            let columns = exemplar.settings_columns();
            let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
            let settings_rows = settings::select_for(&self.conn, &handle, columns, &ids)?;
            tracing::debug!(field_type = %handle, count = rows.len(), "hydrating fields");

            for row in rows {
                let settings_row =
                    settings_rows
                        .get(&row.id)
                        .ok_or_else(|| FieldError::MissingSettings {
                            id: row.id,
                            handle: handle.clone(),
                        })?;
                let mut field = self.create(&handle)?;
                field.apply_settings(settings_row);
                field.row = row;

                let id = field.row.id;
                let field = Arc::new(field);
                self.hydrated.insert(id, field.clone());
                out.insert(id, field);
            }
        }

        match query.restriction {
            Restriction::All => {}
            Restriction::ToggleableOnly => out.retain(|_, field| field.can_toggle()),
            Restriction::FilterableOnly => out.retain(|_, field| field.can_filter()),
        }

        Ok(out)
    }

    /// Fetch a single field by id. Repeated calls return the same cached
    /// instance until it is invalidated by `edit` or `delete`.
    pub fn fetch_one(&mut self, id: i64) -> Result<Option<Arc<Field>>, FieldError> {
        let mut map = self.fetch(&FieldQuery::by_id(id))?;
        Ok(map.remove(&id))
    }

    /// Discover available field type handles from the core fields directory
    /// and every enabled plugin.
    pub fn list_all(&self) -> Vec<String> {
        discovery::list_types(&self.config)
    }
}
