use std::fs::{self, File};
use std::path::Path;
use tempfile::tempdir;

use crate::identity::{IdentityResolver, LoadedModuleSet};
use crate::repository::conventions::Conventions;
use crate::repository::discovery::{discover, is_dir_disabled, SelfIdentity};

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap();
}

fn resolver() -> IdentityResolver {
    IdentityResolver::with_defaults(LoadedModuleSet::new(), Conventions::default())
}

#[tokio::test]
async fn test_missing_root_is_empty() {
    let temp_dir = tempdir().unwrap();
    let modules = discover(
        &temp_dir.path().join("user/plugin"),
        &Conventions::default(),
        &SelfIdentity::default(),
        &resolver(),
    )
    .await;
    assert!(modules.is_empty());
}

#[tokio::test]
async fn test_discovers_folders_then_files_with_disabled_state() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    touch(&root.join("_MyPlugin/MyPlugin.dll.disabled"));
    touch(&root.join("Enabled/Enabled.dll"));
    touch(&root.join("Partial/lib/deep/helper.dll.disabled"));
    touch(&root.join("Other.dll"));
    touch(&root.join("Legacy.dll.disabled"));
    touch(&root.join("notes.txt"));

    let modules = discover(root, &Conventions::default(), &SelfIdentity::default(), &resolver()).await;
    let summary: Vec<(&str, bool, bool)> = modules
        .iter()
        .map(|m| (m.original_name(), m.is_directory(), m.is_disabled()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("_MyPlugin", true, true),
            ("Enabled", true, false),
            ("Partial", true, true),
            ("Legacy.dll.disabled", false, true),
            ("Other.dll", false, false),
        ]
    );
    for module in &modules {
        assert!(!module.original_name().is_empty());
        assert!(root.join(module.original_name()).exists());
    }
}

#[tokio::test]
async fn test_manager_excludes_itself_regardless_of_naming() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    touch(&root.join("PluginList/PluginList.dll"));
    touch(&root.join("_pluginlist/x.dll"));
    touch(&root.join("Renamed/PluginList.dll.disabled"));
    touch(&root.join("PluginList.dll"));
    touch(&root.join("PluginListExtras/Extras.dll"));
    touch(&root.join("Keep.dll"));

    let modules = discover(root, &Conventions::default(), &SelfIdentity::default(), &resolver()).await;
    let names: Vec<&str> = modules.iter().map(|m| m.original_name()).collect();
    assert_eq!(names, vec!["PluginListExtras", "Keep.dll"]);
}

#[tokio::test]
async fn test_internal_name_from_manifest() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    touch(&root.join("Fx/Fx.dll"));
    fs::write(root.join("Fx/manifest.json"), r#"{ "name": "Fancy Effects" }"#).unwrap();

    let modules = discover(root, &Conventions::default(), &SelfIdentity::default(), &resolver()).await;
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].internal_name(), Some("Fancy Effects"));
    assert_eq!(modules[0].display_name(), "Fancy Effects");
}

#[tokio::test]
async fn test_custom_conventions() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    touch(&root.join("libfoo.so"));
    touch(&root.join("libbar.so.off"));
    touch(&root.join("libbaz.dll"));

    let conventions = Conventions {
        disable_prefix: "-".to_string(),
        active_extension: ".so".to_string(),
        disabled_suffix: ".off".to_string(),
    };
    let modules = discover(root, &conventions, &SelfIdentity::default(), &resolver()).await;
    let names: Vec<(&str, bool)> = modules.iter().map(|m| (m.original_name(), m.is_disabled())).collect();
    assert_eq!(names, vec![("libbar.so.off", true), ("libfoo.so", false)]);
}

#[test]
fn test_is_dir_disabled_rules() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    let conventions = Conventions::default();

    fs::create_dir(root.join("_Prefixed")).unwrap();
    assert!(is_dir_disabled(&root.join("_Prefixed"), "_Prefixed", &conventions));

    touch(&root.join("Clean/a.dll"));
    assert!(!is_dir_disabled(&root.join("Clean"), "Clean", &conventions));

    touch(&root.join("Clean/sub/b.dll.disabled"));
    assert!(is_dir_disabled(&root.join("Clean"), "Clean", &conventions));

    touch(&root.join("Shouty/sub/Helper.DLL.DISABLED"));
    assert!(is_dir_disabled(&root.join("Shouty"), "Shouty", &conventions));
}

#[tokio::test]
async fn test_only_disabled_binaries_disable_a_folder() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    touch(&root.join("Docs/Docs.dll"));
    touch(&root.join("Docs/notes.txt.disabled"));
    touch(&root.join("Half/Half.dll"));
    touch(&root.join("Half/extra/Addon.dll.disabled"));

    let modules = discover(root, &Conventions::default(), &SelfIdentity::default(), &resolver()).await;
    let state: Vec<(&str, bool)> = modules.iter().map(|m| (m.original_name(), m.is_disabled())).collect();
    assert_eq!(state, vec![("Docs", false), ("Half", true)]);
}
