//! V001: Base tables — tbl_fields, tbl_sections_association.

pub const MIGRATION_SQL: &str = r#"
-- Field definitions: one row per field, discriminated by type.
CREATE TABLE IF NOT EXISTS tbl_fields (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    parent_section INTEGER NOT NULL DEFAULT 0,
    element_name TEXT NOT NULL,
    location TEXT NOT NULL DEFAULT 'main',
    sortorder INTEGER NOT NULL DEFAULT 1,
    show_column INTEGER NOT NULL DEFAULT 0
) STRICT;

CREATE INDEX IF NOT EXISTS idx_fields_section ON tbl_fields(parent_section);
CREATE INDEX IF NOT EXISTS idx_fields_type ON tbl_fields(type);
CREATE INDEX IF NOT EXISTS idx_fields_section_order ON tbl_fields(parent_section, sortorder);

-- Links between sections established through link-style fields.
CREATE TABLE IF NOT EXISTS tbl_sections_association (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_section_id INTEGER NOT NULL,
    parent_section_field_id INTEGER NOT NULL,
    child_section_id INTEGER NOT NULL,
    child_section_field_id INTEGER NOT NULL,
    hide_association INTEGER NOT NULL DEFAULT 0
) STRICT;

CREATE INDEX IF NOT EXISTS idx_assoc_parent_field ON tbl_sections_association(parent_section_field_id);
CREATE INDEX IF NOT EXISTS idx_assoc_child_field ON tbl_sections_association(child_section_field_id);
"#;
