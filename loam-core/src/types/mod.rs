//! Base field row and the payload types used by the manager.

use serde::{Deserialize, Serialize};

use crate::field::SettingsMap;

/// Placement of a field within a section's entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    #[default]
    Main,
    Sidebar,
}

impl FieldLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Sidebar => "sidebar",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "main" => Some(Self::Main),
            "sidebar" => Some(Self::Sidebar),
            _ => None,
        }
    }
}

/// A field definition row from `tbl_fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FieldRow {
    pub id: i64,
    /// Type discriminator: the lower-case field type handle.
    pub field_type: String,
    pub parent_section: i64,
    /// Unique per section; uniqueness is enforced by the section layer,
    /// not by this schema.
    pub element_name: String,
    pub location: FieldLocation,
    pub sortorder: i64,
    pub show_column: bool,
}

/// Insert payload for a new field definition.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NewField {
    pub field_type: String,
    pub parent_section: i64,
    pub element_name: String,
    pub location: FieldLocation,
    /// Auto-assigned to max(existing)+1 when absent (1 on an empty table).
    pub sortorder: Option<i64>,
    /// Defaults to the type's capability-linked display flag when absent.
    pub show_column: Option<bool>,
    /// Type-specific settings, merged over the type's defaults.
    pub settings: SettingsMap,
}

/// Partial update payload for `edit`. Absent columns are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FieldChanges {
    pub field_type: Option<String>,
    pub parent_section: Option<i64>,
    pub element_name: Option<String>,
    pub location: Option<FieldLocation>,
    pub sortorder: Option<i64>,
    pub show_column: Option<bool>,
    /// Settings to merge into the type-specific settings row.
    pub settings: SettingsMap,
}

/// Capability restriction applied to `fetch` results after hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Restriction {
    #[default]
    All,
    ToggleableOnly,
    FilterableOnly,
}

/// Filter set for `fetch`. All predicates compose with AND.
#[derive(Debug, Clone, Default)]
pub struct FieldQuery {
    /// Ids to fetch. Already-hydrated ids are served from cache without
    /// touching storage and without re-checking the other predicates.
    pub ids: Vec<i64>,
    pub section: Option<i64>,
    pub field_type: Option<String>,
    pub location: Option<FieldLocation>,
    /// Free-form SQL fragment appended to the WHERE clause. The caller is
    /// responsible for its contents; nothing is bound into it.
    pub where_fragment: Option<String>,
    /// Free-form ORDER BY expression. Defaults to `sortorder ASC`.
    pub order_by: Option<String>,
    pub restriction: Restriction,
}

impl FieldQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: i64) -> Self {
        Self {
            ids: vec![id],
            ..Self::default()
        }
    }

    pub fn by_ids(ids: Vec<i64>) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    pub fn in_section(section: i64) -> Self {
        Self {
            section: Some(section),
            ..Self::default()
        }
    }
}
