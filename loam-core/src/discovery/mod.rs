//! Field type discovery.
//!
//! Scans the core fields directory and every enabled plugin's `fields/`
//! subdirectory for manifest files named `field.{handle}.toml`, deduplicates
//! by file name (core wins, then first enabled plugin), and derives the
//! type handles. Missing directories are skipped silently.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ManagerConfig;
use crate::field::is_valid_handle;

const MANIFEST_PREFIX: &str = "field.";
const MANIFEST_SUFFIX: &str = ".toml";

/// Discover available field type handles, sorted.
pub fn list_types(config: &ManagerConfig) -> Vec<String> {
    // Keyed by manifest file name so a plugin cannot shadow a core type.
    let mut by_file: BTreeMap<String, String> = BTreeMap::new();

    collect(&config.effective_fields_dir(), &mut by_file);
    for plugin in &config.enabled_plugins {
        let dir = config.effective_plugins_dir().join(plugin).join("fields");
        collect(&dir, &mut by_file);
    }

    let mut handles: Vec<String> = by_file.into_values().collect();
    handles.sort();
    handles.dedup();
    tracing::debug!(count = handles.len(), "discovered field types");
    handles
}

fn collect(dir: &Path, by_file: &mut BTreeMap<String, String>) {
    let pattern = dir.join("field.*.toml");
    let Some(pattern) = pattern.to_str() else {
        return;
    };
    let Ok(paths) = glob::glob(pattern) else {
        return;
    };

    for path in paths.flatten() {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if by_file.contains_key(name) {
            continue;
        }
        let Some(handle) = name
            .strip_prefix(MANIFEST_PREFIX)
            .and_then(|rest| rest.strip_suffix(MANIFEST_SUFFIX))
        else {
            continue;
        };
        if is_valid_handle(handle) {
            by_file.insert(name.to_string(), handle.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn config_for(root: &Path, plugins: &[&str]) -> ManagerConfig {
        ManagerConfig {
            fields_dir: Some(root.join("fields")),
            plugins_dir: Some(root.join("plugins")),
            enabled_plugins: plugins.iter().map(|p| p.to_string()).collect(),
            database: None,
        }
    }

    #[test]
    fn discovers_core_and_plugin_types() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("fields/field.input.toml"));
        touch(&root.join("fields/field.checkbox.toml"));
        touch(&root.join("plugins/members/fields/field.member_role.toml"));

        let handles = list_types(&config_for(root, &["members"]));
        assert_eq!(handles, vec!["checkbox", "input", "member_role"]);
    }

    #[test]
    fn deduplicates_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("fields/field.input.toml"));
        touch(&root.join("plugins/members/fields/field.input.toml"));

        let handles = list_types(&config_for(root, &["members"]));
        assert_eq!(handles, vec!["input"]);
    }

    #[test]
    fn disabled_plugins_are_not_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("plugins/members/fields/field.member_role.toml"));

        let handles = list_types(&config_for(root, &[]));
        assert!(handles.is_empty());
    }

    #[test]
    fn invalid_handles_and_other_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("fields/field.Bad-Name.toml"));
        touch(&root.join("fields/readme.md"));
        touch(&root.join("fields/field.ok.toml"));

        let handles = list_types(&config_for(root, &[]));
        assert_eq!(handles, vec!["ok"]);
    }

    #[test]
    fn missing_directories_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let handles = list_types(&config_for(dir.path(), &["ghost"]));
        assert!(handles.is_empty());
    }
}
