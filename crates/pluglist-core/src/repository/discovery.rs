use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::identity::IdentityResolver;
use crate::kernel::constants;
use crate::repository::conventions::Conventions;
use crate::repository::module::Module;
use crate::utils::ends_with_ignore_case;
use crate::utils::fs::{any_file_matches, file_name_str};

/// How the manager recognises its own module so it never lists or mutates itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfIdentity {
    /// Folder name the manager is installed under
    pub module_name: String,
    /// File name of the manager's own binary
    pub binary_name: Option<String>,
}

impl Default for SelfIdentity {
    fn default() -> Self {
        Self {
            module_name: constants::SELF_MODULE_NAME.to_string(),
            binary_name: Some(constants::SELF_BINARY_NAME.to_string()),
        }
    }
}

impl SelfIdentity {
    /// Folder named after the manager (disable prefix ignored) or holding its binary
    pub fn is_self_dir(&self, path: &Path, name: &str, conventions: &Conventions) -> bool {
        if conventions.same_module_name(name, &self.module_name) {
            return true;
        }
        self.binary_name.as_deref().is_some_and(|binary| {
            path.join(binary).is_file()
                || path.join(conventions.disabled_file_name(binary)).is_file()
        })
    }

    /// The manager's binary, enabled or disabled
    pub fn is_self_file(&self, name: &str, conventions: &Conventions) -> bool {
        self.binary_name
            .as_deref()
            .is_some_and(|binary| conventions.enabled_file_name(name).eq_ignore_ascii_case(binary))
    }
}

/// Immediate children of the module root, split by kind and ordered by name
struct RootEntries {
    dirs: Vec<(String, PathBuf)>,
    files: Vec<(String, PathBuf)>,
}

async fn scan_root(root: &Path) -> io::Result<RootEntries> {
    let mut entries = RootEntries { dirs: Vec::new(), files: Vec::new() };
    let mut read_dir = fs::read_dir(root).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        let entry_path = entry.path();
        let Some(name) = file_name_str(&entry_path).map(str::to_string) else {
            debug!("Skipping non UTF-8 entry {}", entry_path.display());
            continue;
        };
        let metadata = match fs::metadata(&entry_path).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Failed to get metadata for {}: {}", entry_path.display(), e);
                continue;
            }
        };
        if metadata.is_dir() {
            entries.dirs.push((name, entry_path));
        } else if metadata.is_file() {
            entries.files.push((name, entry_path));
        }
    }

    let by_name = |a: &(String, PathBuf), b: &(String, PathBuf)| a.0.to_lowercase().cmp(&b.0.to_lowercase());
    entries.dirs.sort_by(by_name);
    entries.files.sort_by(by_name);
    Ok(entries)
}

/// A folder is disabled when prefixed or when a disabled binary sits at any depth
pub fn is_dir_disabled(path: &Path, name: &str, conventions: &Conventions) -> bool {
    if conventions.is_disabled_dir_name(name) {
        return true;
    }
    let disabled_extension = conventions.disabled_extension();
    let has_disabled = |p: &Path| file_name_str(p).is_some_and(|n| ends_with_ignore_case(n, &disabled_extension));
    match any_file_matches(path, &has_disabled) {
        Ok(found) => found,
        Err(e) => {
            warn!("Could not scan {} for disabled files: {}", path.display(), e);
            false
        }
    }
}

/// Build a fresh set of module records from `root`.
///
/// A missing or unreadable root yields an empty set. Folders come first,
/// then loose module files, each group in case-insensitive name order.
pub async fn discover(
    root: &Path,
    conventions: &Conventions,
    self_identity: &SelfIdentity,
    resolver: &IdentityResolver,
) -> Vec<Module> {
    match fs::try_exists(root).await {
        Ok(true) => {}
        Ok(false) => {
            debug!("Module root {} does not exist", root.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Error checking existence of module root {}: {}", root.display(), e);
            return Vec::new();
        }
    }

    let entries = match scan_root(root).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to enumerate module root {}: {}", root.display(), e);
            return Vec::new();
        }
    };

    let mut modules = Vec::with_capacity(entries.dirs.len() + entries.files.len());

    for (name, path) in entries.dirs {
        if self_identity.is_self_dir(&path, &name, conventions) {
            debug!("Skipping own module folder {}", name);
            continue;
        }
        let is_disabled = is_dir_disabled(&path, &name, conventions);
        let internal_name = resolver.resolve(&path, true);
        trace!("Discovered folder module {} (disabled: {})", name, is_disabled);
        modules.push(Module::new(name, internal_name, true, is_disabled));
    }

    for (name, path) in entries.files {
        if !conventions.is_module_file_name(&name) {
            continue;
        }
        if self_identity.is_self_file(&name, conventions) {
            debug!("Skipping own module file {}", name);
            continue;
        }
        let is_disabled = conventions.is_disabled_file_name(&name);
        let internal_name = resolver.resolve(&path, false);
        trace!("Discovered file module {} (disabled: {})", name, is_disabled);
        modules.push(Module::new(name, internal_name, false, is_disabled));
    }

    debug!("Discovered {} modules under {}", modules.len(), root.display());
    modules
}
