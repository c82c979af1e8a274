use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::identity::{IdentityProvider, ModuleCandidate};

/// Capability names containing this marker identify a plugin entry type
pub const PLUGIN_CAPABILITY_MARKER: &str = "Plugin";

/// A live plugin object built only to read its name
pub trait PluginInstance {
    fn name(&self) -> String;
}

/// A type exported by a module the host has loaded.
///
/// This is the introspection surface the host offers: the capabilities a
/// type implements, a name readable without building the type, and a way to
/// build a default instance. Any of these may fail or panic.
pub trait ExportedType: Send + Sync {
    fn type_name(&self) -> &str;

    /// Names of the capabilities (interfaces) the type implements
    fn capabilities(&self) -> Vec<String>;

    /// Declared name available at type level
    fn static_name(&self) -> Option<String> {
        None
    }

    /// Build a default instance
    fn instantiate(&self) -> Option<Box<dyn PluginInstance>> {
        None
    }
}

/// A module the host has loaded, with the file it was loaded from
#[derive(Clone)]
pub struct LoadedModule {
    pub path: PathBuf,
    pub exports: Vec<Arc<dyn ExportedType>>,
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("path", &self.path)
            .field("exports", &self.exports.iter().map(|e| e.type_name().to_string()).collect::<Vec<_>>())
            .finish()
    }
}

impl LoadedModule {
    pub fn new(path: impl Into<PathBuf>, exports: Vec<Arc<dyn ExportedType>>) -> Self {
        Self {
            path: path.into(),
            exports,
        }
    }
}

/// Snapshot of the host's loaded modules, registered by the embedding host
#[derive(Debug, Clone, Default)]
pub struct LoadedModuleSet {
    modules: Vec<LoadedModule>,
}

impl LoadedModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: LoadedModule) {
        self.modules.push(module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// First loaded module backing `candidate`: the file itself, or any file under the folder
    pub fn find_for(&self, candidate: &ModuleCandidate) -> Option<&LoadedModule> {
        let target = lowercase_path(&candidate.location);
        self.modules.iter().find(|m| {
            let loaded = lowercase_path(&m.path);
            if candidate.is_directory {
                loaded.starts_with(&target)
            } else {
                loaded == target
            }
        })
    }
}

fn lowercase_path(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

/// Runs `f`, turning a panic into `None`
fn guarded<T>(operation: &str, type_name: &str, f: impl FnOnce() -> Option<T>) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(panic_obj) => {
            let panic_msg = if let Some(s_ref) = panic_obj.downcast_ref::<&'static str>() { (*s_ref).to_string() }
                            else if let Some(s_obj) = panic_obj.downcast_ref::<String>() { s_obj.clone() }
                            else { "Unknown panic reason".to_string() };
            warn!("Introspection '{}' on type '{}' panicked: {}", operation, type_name, panic_msg);
            None
        }
    }
}

/// Resolves names by introspecting modules the host already loaded
#[derive(Debug, Clone, Default)]
pub struct LoadedModuleProvider {
    loaded: LoadedModuleSet,
}

impl LoadedModuleProvider {
    pub fn new(loaded: LoadedModuleSet) -> Self {
        Self { loaded }
    }

    fn declared_name_of(export: &dyn ExportedType) -> Option<String> {
        let type_name = export.type_name().to_string();
        let is_plugin = guarded("capabilities", &type_name, || Some(export.capabilities()))?
            .iter()
            .any(|c| c.contains(PLUGIN_CAPABILITY_MARKER));
        if !is_plugin {
            return None;
        }

        let non_blank = |n: String| if n.trim().is_empty() { None } else { Some(n) };
        if let Some(name) = guarded("static_name", &type_name, || export.static_name()).and_then(non_blank) {
            return Some(name);
        }
        debug!("No static name on '{}', building an instance", type_name);
        guarded("instantiate", &type_name, || export.instantiate().map(|instance| instance.name()))
            .and_then(non_blank)
    }
}

impl IdentityProvider for LoadedModuleProvider {
    fn name(&self) -> &str {
        "loaded-modules"
    }

    fn try_get_declared_name(&self, candidate: &ModuleCandidate) -> Option<String> {
        let module = self.loaded.find_for(candidate)?;
        module
            .exports
            .iter()
            .find_map(|export| Self::declared_name_of(export.as_ref()))
    }
}
