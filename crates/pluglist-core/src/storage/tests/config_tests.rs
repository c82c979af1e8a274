use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::tempdir;

use crate::planner::ScriptDialect;
use crate::repository::{DisplayMode, SortDirection, SortKey};
use crate::storage::config::{ConfigFormat, ManagerConfig};
use crate::storage::error::StorageSystemError;

#[test]
fn test_defaults() {
    let config = ManagerConfig::default();
    assert_eq!(config.module_subdir, PathBuf::from("user/plugin"));
    assert_eq!(config.conventions.disable_prefix, "_");
    assert_eq!(config.conventions.disabled_extension(), ".dll.disabled");
    assert_eq!(config.self_identity.module_name, "PluginList");
    assert_eq!(config.script.file_name, "pluglist_deferred");
    assert_eq!(config.display_mode, DisplayMode::Resolved);
    assert_eq!(config.sort.key, SortKey::Name);
    assert_eq!(config.sort.direction, SortDirection::Ascending);
}

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path(Path::new("a.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), Some(ConfigFormat::Json));
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), Some(ConfigFormat::Toml));
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path(Path::new("a.yml")), Some(ConfigFormat::Yaml));
    assert_eq!(ConfigFormat::from_path(Path::new("a.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("noext")), None);
}

#[test]
fn test_partial_json_keeps_other_defaults() {
    let config = ManagerConfig::deserialize(
        r#"{ "host_base": "/opt/host", "sort": "status-desc", "conventions": { "active_extension": ".so" } }"#,
        ConfigFormat::Json,
    )
    .unwrap();

    assert_eq!(config.host_base, Some(PathBuf::from("/opt/host")));
    assert_eq!(config.module_root(), PathBuf::from("/opt/host/user/plugin"));
    assert_eq!(config.sort.key, SortKey::Status);
    assert_eq!(config.sort.direction, SortDirection::Descending);
    assert_eq!(config.conventions.active_extension, ".so");
    assert_eq!(config.conventions.disable_prefix, "_");
    assert_eq!(config.conventions.disabled_extension(), ".so.disabled");
}

#[cfg(feature = "toml-config")]
#[test]
fn test_toml_script_section() {
    let config = ManagerConfig::deserialize(
        r#"
display_mode = "combined"

[script]
file_name = "cleanup"
poll_interval_secs = 0
grace_interval_secs = 3
dialect = "batch"
"#,
        ConfigFormat::Toml,
    )
    .unwrap();

    assert_eq!(config.display_mode, DisplayMode::Combined);
    assert_eq!(config.script.dialect(), ScriptDialect::Batch);
    // Poll interval never drops below a second
    assert_eq!(config.script.poll_interval(), Duration::from_secs(1));
    assert_eq!(config.script.grace_interval(), Duration::from_secs(3));
    assert!(config.script.script_path().ends_with("cleanup.bat"));
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_yaml_self_identity() {
    let config = ManagerConfig::deserialize(
        "self_identity:\n  module_name: ModManager\n  binary_name: null\n",
        ConfigFormat::Yaml,
    )
    .unwrap();
    assert_eq!(config.self_identity.module_name, "ModManager");
    assert_eq!(config.self_identity.binary_name, None);
}

#[test]
fn test_invalid_sort_is_a_deserialization_error() {
    let err = ManagerConfig::deserialize(r#"{ "sort": "size-asc" }"#, ConfigFormat::Json).unwrap_err();
    assert!(matches!(err, StorageSystemError::DeserializationError { .. }));
}

#[test]
fn test_load_from_disk_and_missing_file() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("pluglist.json");

    let err = ManagerConfig::load(&path).unwrap_err();
    assert!(matches!(err, StorageSystemError::FileNotFound(_)));
    assert_eq!(ManagerConfig::load_or_default(&path).unwrap(), ManagerConfig::default());

    fs::write(&path, r#"{ "module_subdir": "mods" }"#).unwrap();
    let config = ManagerConfig::load_or_default(&path).unwrap();
    assert_eq!(config.module_subdir, PathBuf::from("mods"));
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("pluglist.ini");
    fs::write(&path, "x=1").unwrap();

    let err = ManagerConfig::load(&path).unwrap_err();
    assert!(matches!(err, StorageSystemError::UnsupportedConfigFormat(_)));
}

#[test]
fn test_json_roundtrip_of_customised_config() {
    let mut config = ManagerConfig::default();
    config.host_base = Some(PathBuf::from("/srv/host"));
    config.script.dialect = Some(ScriptDialect::Posix);
    config.display_mode = DisplayMode::OnDisk;

    let text = config.serialize(ConfigFormat::Json).unwrap();
    assert!(text.contains("\"dialect\": \"posix\""));
    assert!(text.contains("\"display_mode\": \"on-disk\""));
    assert_eq!(ManagerConfig::deserialize(&text, ConfigFormat::Json).unwrap(), config);
}
