//! Builtin field types.
//!
//! These exist to give the registry and resolver real entries; a full CMS
//! would ship many more and plugins would register their own.

use serde_json::Value;

use super::registry::FieldRegistry;
use super::{FieldType, SettingColumn, SettingKind, SettingsMap};

pub fn register_input(registry: &mut FieldRegistry) {
    registry.register("input", || Box::new(InputField::default()));
}

pub fn register_checkbox(registry: &mut FieldRegistry) {
    registry.register("checkbox", || Box::new(CheckboxField::default()));
}

pub fn register_textarea(registry: &mut FieldRegistry) {
    registry.register("textarea", || Box::new(TextareaField::default()));
}

/// Single-line text input with an optional validation rule.
#[derive(Debug, Clone, Default)]
pub struct InputField {
    validator: Option<String>,
}

const INPUT_COLUMNS: &[SettingColumn] = &[SettingColumn {
    name: "validator",
    kind: SettingKind::Text,
}];

impl FieldType for InputField {
    fn handle(&self) -> &'static str {
        "input"
    }

    fn settings_columns(&self) -> &'static [SettingColumn] {
        INPUT_COLUMNS
    }

    fn settings(&self) -> SettingsMap {
        let mut map = SettingsMap::new();
        if let Some(validator) = &self.validator {
            map.insert("validator".into(), Value::String(validator.clone()));
        }
        map
    }

    fn apply_settings(&mut self, row: &SettingsMap) {
        if let Some(v) = row.get("validator") {
            self.validator = v.as_str().map(str::to_string);
        }
    }

    fn can_filter(&self) -> bool {
        true
    }
}

/// Boolean checkbox with a default state and a long description.
#[derive(Debug, Clone)]
pub struct CheckboxField {
    default_state: bool,
    description: Option<String>,
}

impl Default for CheckboxField {
    fn default() -> Self {
        Self {
            default_state: false,
            description: None,
        }
    }
}

const CHECKBOX_COLUMNS: &[SettingColumn] = &[
    SettingColumn {
        name: "default_state",
        kind: SettingKind::Flag,
    },
    SettingColumn {
        name: "description",
        kind: SettingKind::Text,
    },
];

impl FieldType for CheckboxField {
    fn handle(&self) -> &'static str {
        "checkbox"
    }

    fn settings_columns(&self) -> &'static [SettingColumn] {
        CHECKBOX_COLUMNS
    }

    fn settings(&self) -> SettingsMap {
        let mut map = SettingsMap::new();
        map.insert("default_state".into(), Value::Bool(self.default_state));
        if let Some(description) = &self.description {
            map.insert("description".into(), Value::String(description.clone()));
        }
        map
    }

    fn apply_settings(&mut self, row: &SettingsMap) {
        if let Some(v) = row.get("default_state") {
            self.default_state = v.as_bool().unwrap_or(false);
        }
        if let Some(v) = row.get("description") {
            self.description = v.as_str().map(str::to_string);
        }
    }

    fn can_toggle(&self) -> bool {
        true
    }

    fn can_filter(&self) -> bool {
        true
    }
}

/// Multi-line text area with a row count and an optional text formatter.
#[derive(Debug, Clone)]
pub struct TextareaField {
    size: i64,
    formatter: Option<String>,
}

impl Default for TextareaField {
    fn default() -> Self {
        Self {
            size: 15,
            formatter: None,
        }
    }
}

const TEXTAREA_COLUMNS: &[SettingColumn] = &[
    SettingColumn {
        name: "size",
        kind: SettingKind::Integer,
    },
    SettingColumn {
        name: "formatter",
        kind: SettingKind::Text,
    },
];

impl FieldType for TextareaField {
    fn handle(&self) -> &'static str {
        "textarea"
    }

    fn settings_columns(&self) -> &'static [SettingColumn] {
        TEXTAREA_COLUMNS
    }

    fn settings(&self) -> SettingsMap {
        let mut map = SettingsMap::new();
        map.insert("size".into(), Value::from(self.size));
        if let Some(formatter) = &self.formatter {
            map.insert("formatter".into(), Value::String(formatter.clone()));
        }
        map
    }

    fn apply_settings(&mut self, row: &SettingsMap) {
        if let Some(v) = row.get("size") {
            if let Some(size) = v.as_i64() {
                self.size = size;
            }
        }
        if let Some(v) = row.get("formatter") {
            self.formatter = v.as_str().map(str::to_string);
        }
    }
}
