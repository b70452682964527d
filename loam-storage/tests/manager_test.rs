//! Field manager integration tests.

use std::sync::Arc;

use loam_core::config::ManagerConfig;
use loam_core::errors::{FieldError, StorageError};
use loam_core::field::builtin::InputField;
use loam_core::field::{FieldType, SettingColumn, SettingsMap};
use loam_core::types::{FieldChanges, FieldQuery, NewField, Restriction};
use loam_storage::queries::{associations, entry_data, settings};
use loam_storage::FieldManager;
use serde_json::Value;

fn manager() -> FieldManager {
    loam_core::tracing::init_tracing();
    FieldManager::in_memory(ManagerConfig::default()).unwrap()
}

fn new_field(field_type: &str, element_name: &str) -> NewField {
    NewField {
        field_type: field_type.to_string(),
        parent_section: 1,
        element_name: element_name.to_string(),
        ..NewField::default()
    }
}

// ---- add ----

#[test]
fn add_assigns_next_sortorder() {
    let mut mgr = manager();

    let first = mgr.add(&new_field("input", "title")).unwrap();
    let second = mgr.add(&new_field("input", "subtitle")).unwrap();

    let a = mgr.fetch_one(first).unwrap().unwrap();
    let b = mgr.fetch_one(second).unwrap().unwrap();
    assert_eq!(a.row.sortorder, 1);
    assert_eq!(b.row.sortorder, 2);

    // Explicit sortorder is honored, and the next auto value follows it.
    mgr.add(&NewField {
        sortorder: Some(10),
        ..new_field("input", "teaser")
    })
    .unwrap();
    let fourth = mgr.add(&new_field("input", "body")).unwrap();
    assert_eq!(mgr.fetch_one(fourth).unwrap().unwrap().row.sortorder, 11);
}

#[test]
fn add_creates_settings_row_and_entry_table() {
    let mut mgr = manager();
    let id = mgr
        .add(&NewField {
            settings: [("validator".to_string(), Value::String("number".into()))]
                .into_iter()
                .collect(),
            ..new_field("input", "price")
        })
        .unwrap();

    let field = mgr.fetch_one(id).unwrap().unwrap();
    assert_eq!(
        field.settings().get("validator"),
        Some(&Value::String("number".into()))
    );
    assert!(entry_data::table_exists(mgr.connection(), id).unwrap());

    let rows = settings::select_for(
        mgr.connection(),
        "input",
        field.settings_columns(),
        &[id],
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn add_derives_show_column_from_toggle_capability() {
    let mut mgr = manager();
    let checkbox = mgr.add(&new_field("checkbox", "published")).unwrap();
    let input = mgr.add(&new_field("input", "title")).unwrap();

    assert!(mgr.fetch_one(checkbox).unwrap().unwrap().row.show_column);
    assert!(!mgr.fetch_one(input).unwrap().unwrap().row.show_column);
}

#[test]
fn add_unknown_type_names_expected_manifest() {
    let mut mgr = manager();
    let err = mgr.add(&new_field("hologram", "ghost")).unwrap_err();

    match &err {
        FieldError::UnknownType { handle, expected } => {
            assert_eq!(handle, "hologram");
            assert!(expected.contains("field.hologram.toml"));
        }
        other => panic!("expected UnknownType, got {other:?}"),
    }
    assert!(err.to_string().contains("plugin is enabled"));
}

// ---- create ----

#[test]
fn create_returns_independent_clones() {
    let mut mgr = manager();

    let mut a = mgr.create("textarea").unwrap();
    let b = mgr.create("textarea").unwrap();
    assert_eq!(a.settings(), b.settings());

    let mut change = SettingsMap::new();
    change.insert("size".into(), Value::from(99));
    a.apply_settings(&change);

    assert_eq!(a.settings().get("size"), Some(&Value::from(99)));
    assert_eq!(b.settings().get("size"), Some(&Value::from(15)));
}

#[test]
fn create_resolves_class_style_aliases() {
    let mut mgr = manager();

    let field = mgr.create("fieldcheckbox").unwrap();
    assert_eq!(field.handle(), "checkbox");
    assert_eq!(field.row.field_type, "checkbox");

    // The canonical handle shares the pooled exemplar.
    let again = mgr.create("checkbox").unwrap();
    assert_eq!(again.handle(), "checkbox");
}

#[test]
fn create_rejects_invalid_handles() {
    let mut mgr = manager();
    assert!(matches!(
        mgr.create("Drop Table"),
        Err(FieldError::InvalidHandle { .. })
    ));
}

// ---- fetch ----

#[test]
fn fetch_one_returns_cached_instance() {
    let mut mgr = manager();
    let id = mgr.add(&new_field("input", "title")).unwrap();

    let first = mgr.fetch_one(id).unwrap().unwrap();
    let second = mgr.fetch_one(id).unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn fetch_serves_cached_ids_without_storage() {
    let mut mgr = manager();
    let id = mgr.add(&new_field("input", "title")).unwrap();
    let cached = mgr.fetch_one(id).unwrap().unwrap();

    // Remove the base row behind the manager's back; the hydrated cache
    // must still serve the instance.
    mgr.connection()
        .execute("DELETE FROM tbl_fields WHERE id = ?1", [id])
        .unwrap();

    let again = mgr.fetch_one(id).unwrap().unwrap();
    assert!(Arc::ptr_eq(&cached, &again));
}

#[test]
fn fetch_id_set_omits_unresolvable_ids() {
    let mut mgr = manager();
    let a = mgr.add(&new_field("input", "title")).unwrap();
    let b = mgr.add(&new_field("checkbox", "published")).unwrap();

    let map = mgr.fetch(&FieldQuery::by_ids(vec![a, b, 9999])).unwrap();
    assert_eq!(map.len(), 2);
    assert!(map.contains_key(&a));
    assert!(map.contains_key(&b));
    assert!(!map.contains_key(&9999));

    let empty = mgr.fetch(&FieldQuery::by_id(12345)).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn fetch_restrictions_partition_by_capability() {
    let mut mgr = manager();
    let input = mgr.add(&new_field("input", "title")).unwrap();
    let checkbox = mgr.add(&new_field("checkbox", "published")).unwrap();
    let textarea = mgr.add(&new_field("textarea", "body")).unwrap();

    let toggleable = mgr
        .fetch(&FieldQuery {
            restriction: Restriction::ToggleableOnly,
            ..FieldQuery::default()
        })
        .unwrap();
    assert_eq!(toggleable.keys().copied().collect::<Vec<_>>(), vec![checkbox]);

    let filterable = mgr
        .fetch(&FieldQuery {
            restriction: Restriction::FilterableOnly,
            ..FieldQuery::default()
        })
        .unwrap();
    assert!(filterable.contains_key(&input));
    assert!(filterable.contains_key(&checkbox));
    assert!(!filterable.contains_key(&textarea));
}

#[test]
fn fetch_missing_settings_row_is_fatal() {
    let mut mgr = manager();
    let id = mgr.add(&new_field("input", "title")).unwrap();

    mgr.connection()
        .execute("DELETE FROM tbl_fields_input WHERE field_id = ?1", [id])
        .unwrap();

    let err = mgr.fetch_one(id).unwrap_err();
    match err {
        FieldError::MissingSettings { id: bad, handle } => {
            assert_eq!(bad, id);
            assert_eq!(handle, "input");
        }
        other => panic!("expected MissingSettings, got {other:?}"),
    }
}

// ---- edit ----

#[test]
fn edit_updates_base_columns_and_invalidates_cache() {
    let mut mgr = manager();
    let id = mgr.add(&new_field("input", "title")).unwrap();
    let before = mgr.fetch_one(id).unwrap().unwrap();

    let changed = mgr
        .edit(
            id,
            &FieldChanges {
                element_name: Some("headline".into()),
                ..FieldChanges::default()
            },
        )
        .unwrap();
    assert!(changed);

    let after = mgr.fetch_one(id).unwrap().unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.row.element_name, "headline");
}

#[test]
fn edit_merges_settings_over_existing_row() {
    let mut mgr = manager();
    let id = mgr
        .add(&NewField {
            settings: [(
                "description".to_string(),
                Value::String("show on front page".into()),
            )]
            .into_iter()
            .collect(),
            ..new_field("checkbox", "featured")
        })
        .unwrap();

    mgr.edit(
        id,
        &FieldChanges {
            settings: [("default_state".to_string(), Value::Bool(true))]
                .into_iter()
                .collect(),
            ..FieldChanges::default()
        },
    )
    .unwrap();

    let field = mgr.fetch_one(id).unwrap().unwrap();
    assert_eq!(field.settings().get("default_state"), Some(&Value::Bool(true)));
    assert_eq!(
        field.settings().get("description"),
        Some(&Value::String("show on front page".into()))
    );
}

#[test]
fn edit_type_change_moves_the_settings_row() {
    let mut mgr = manager();
    let id = mgr
        .add(&NewField {
            settings: [("validator".to_string(), Value::String("number".into()))]
                .into_iter()
                .collect(),
            ..new_field("input", "price")
        })
        .unwrap();

    let changed = mgr
        .edit(
            id,
            &FieldChanges {
                field_type: Some("checkbox".into()),
                settings: [("default_state".to_string(), Value::Bool(true))]
                    .into_iter()
                    .collect(),
                ..FieldChanges::default()
            },
        )
        .unwrap();
    assert!(changed);

    // The field hydrates under the new type, with the new settings row.
    let field = mgr.fetch_one(id).unwrap().unwrap();
    assert_eq!(field.handle(), "checkbox");
    assert_eq!(field.settings().get("default_state"), Some(&Value::Bool(true)));

    // The old type's table no longer holds a row for this field.
    let old = settings::select_for(
        mgr.connection(),
        "input",
        InputField::default().settings_columns(),
        &[id],
    )
    .unwrap();
    assert!(old.is_empty());
}

#[test]
fn edit_type_change_without_settings_keeps_field_fetchable() {
    let mut mgr = manager();
    let id = mgr.add(&new_field("input", "flag")).unwrap();

    mgr.edit(
        id,
        &FieldChanges {
            field_type: Some("checkbox".into()),
            ..FieldChanges::default()
        },
    )
    .unwrap();

    // A defaults row was written for the new type, so hydration works.
    let field = mgr.fetch_one(id).unwrap().unwrap();
    assert_eq!(field.handle(), "checkbox");
    assert_eq!(field.settings().get("default_state"), Some(&Value::Bool(false)));
}

#[test]
fn edit_to_unknown_type_is_rejected_before_writing() {
    let mut mgr = manager();
    let id = mgr.add(&new_field("input", "title")).unwrap();

    let err = mgr
        .edit(
            id,
            &FieldChanges {
                field_type: Some("hologram".into()),
                ..FieldChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, FieldError::UnknownType { .. }));

    // Nothing was written; the field still hydrates under its old type.
    assert_eq!(mgr.fetch_one(id).unwrap().unwrap().handle(), "input");
}

#[test]
fn edit_missing_field_with_settings_is_not_found() {
    let mut mgr = manager();
    let err = mgr
        .edit(
            404,
            &FieldChanges {
                settings: [("validator".to_string(), Value::String("number".into()))]
                    .into_iter()
                    .collect(),
                ..FieldChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, FieldError::NotFound { id: 404 }));
}

// ---- delete ----

#[test]
fn delete_removes_every_artifact() {
    let mut mgr = manager();
    let id = mgr.add(&new_field("checkbox", "published")).unwrap();
    associations::insert(
        mgr.connection(),
        &associations::AssociationRow {
            parent_section_id: 1,
            parent_section_field_id: id,
            child_section_id: 2,
            child_section_field_id: 77,
            hide_association: false,
        },
    )
    .unwrap();

    mgr.delete(id).unwrap();

    assert!(mgr.fetch_one(id).unwrap().is_none());
    assert!(!entry_data::table_exists(mgr.connection(), id).unwrap());
    assert_eq!(associations::count_for_field(mgr.connection(), id).unwrap(), 0);

    let field = mgr.create("checkbox").unwrap();
    let rows = settings::select_for(
        mgr.connection(),
        "checkbox",
        field.settings_columns(),
        &[id],
    )
    .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn delete_missing_field_is_an_error() {
    let mut mgr = manager();
    assert!(matches!(
        mgr.delete(31337),
        Err(FieldError::NotFound { id: 31337 })
    ));
}

#[derive(Debug, Clone, Default)]
struct MarkerField;

impl FieldType for MarkerField {
    fn handle(&self) -> &'static str {
        "marker"
    }

    fn settings_columns(&self) -> &'static [SettingColumn] {
        &[]
    }

    fn settings(&self) -> SettingsMap {
        SettingsMap::new()
    }

    fn apply_settings(&mut self, _row: &SettingsMap) {}

    fn tear_down(
        &self,
        conn: &rusqlite::Connection,
        field_id: i64,
    ) -> Result<(), StorageError> {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS teardown_marker (field_id INTEGER);
             INSERT INTO teardown_marker (field_id) VALUES ({field_id});"
        ))
        .map_err(StorageError::from_sqlite)
    }
}

#[test]
fn delete_runs_type_teardown_hook() {
    let mut mgr = manager();
    mgr.registry_mut()
        .register("marker", || Box::new(MarkerField));

    let id = mgr.add(&new_field("marker", "tracked")).unwrap();
    mgr.delete(id).unwrap();

    let marked: i64 = mgr
        .connection()
        .query_row(
            "SELECT field_id FROM teardown_marker",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(marked, id);
}

// ---- discovery ----

#[test]
fn list_all_reads_configured_directories() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("fields")).unwrap();
    std::fs::write(root.join("fields/field.input.toml"), "").unwrap();
    std::fs::create_dir_all(root.join("plugins/members/fields")).unwrap();
    std::fs::write(root.join("plugins/members/fields/field.member_role.toml"), "").unwrap();

    let config = ManagerConfig {
        fields_dir: Some(root.join("fields")),
        plugins_dir: Some(root.join("plugins")),
        enabled_plugins: vec!["members".into()],
        database: None,
    };
    let mgr = FieldManager::in_memory(config).unwrap();
    assert_eq!(mgr.list_all(), vec!["input", "member_role"]);
}
