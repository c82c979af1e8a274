//! # Pluglist Core Module Repository
//!
//! Owns the collection of [`Module`] records discovered under the module
//! root, along with the live search term, sort order and display mode the
//! presentation layer works with.
//!
//! - **[`conventions`]**: naming rules for disabled folders and binaries.
//! - **[`discovery`]**: one full enumeration pass over the module root.
//! - **[`module`]**: the [`Module`] record and its intent transitions.
//! - **[`view`]**: filter predicate and sort comparator.
//!
//! Each [`refresh`](ModuleRepository::refresh) replaces the whole set, so
//! callers never see stale or duplicated records across passes.
pub mod conventions;
pub mod discovery;
pub mod module;
pub mod view;

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;

use crate::identity::IdentityResolver;
use crate::kernel::error::{Error, Result};
use crate::kernel::host::HostEnvironment;
use crate::storage::config::ManagerConfig;

pub use conventions::Conventions;
pub use discovery::SelfIdentity;
pub use module::{DisplayMode, Module, ModuleAction, PendingIntent};
pub use view::{SortDirection, SortKey, SortOrder, ViewSettings};

/// Callback run with a snapshot each time the module set is replaced
pub type ReplaceListener = Box<dyn Fn(&[Module])>;

pub struct ModuleRepository {
    root: PathBuf,
    conventions: Conventions,
    self_identity: SelfIdentity,
    modules: Vec<Module>,
    view: ViewSettings,
    display_mode: DisplayMode,
    listeners: Vec<ReplaceListener>,
}

impl fmt::Debug for ModuleRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRepository")
            .field("root", &self.root)
            .field("modules", &self.modules.len())
            .field("view", &self.view)
            .field("display_mode", &self.display_mode)
            .finish()
    }
}

impl ModuleRepository {
    pub fn new(root: impl Into<PathBuf>, conventions: Conventions, self_identity: SelfIdentity) -> Self {
        Self {
            root: root.into(),
            conventions,
            self_identity,
            modules: Vec::new(),
            view: ViewSettings::default(),
            display_mode: DisplayMode::default(),
            listeners: Vec::new(),
        }
    }

    /// Repository over `root` using the conventions, sort and display mode from `config`
    pub fn from_config(config: &ManagerConfig, root: impl Into<PathBuf>) -> Self {
        let mut repository = Self::new(root, config.conventions.clone(), config.self_identity.clone());
        repository.view.sort = config.sort;
        repository.display_mode = config.display_mode;
        repository
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// Run a discovery pass and replace the whole collection. Returns the new count.
    pub async fn refresh(&mut self, resolver: &IdentityResolver) -> usize {
        let modules = discovery::discover(&self.root, &self.conventions, &self.self_identity, resolver).await;
        self.replace(modules);
        info!("Loaded {} modules from {}", self.modules.len(), self.root.display());
        self.modules.len()
    }

    pub(crate) fn replace(&mut self, mut modules: Vec<Module>) {
        for module in &mut modules {
            module.set_display_mode(self.display_mode);
        }
        self.modules = modules;
        for listener in &self.listeners {
            listener(&self.modules);
        }
    }

    /// Register a callback run after every replace
    pub fn subscribe(&mut self, listener: ReplaceListener) {
        self.listeners.push(listener);
    }

    /// All records in discovery order
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub(crate) fn modules_mut(&mut self) -> &mut [Module] {
        &mut self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.modules
            .iter()
            .position(|m| m.original_name() == name)
            .or_else(|| {
                self.modules.iter().position(|m| {
                    m.original_name().eq_ignore_ascii_case(name) || m.display_name().eq_ignore_ascii_case(name)
                })
            })
    }

    /// Look up by on-disk name, then case-insensitively by on-disk or display name
    pub fn find(&self, name: &str) -> Option<&Module> {
        self.position(name).and_then(|i| self.modules.get(i))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Module> {
        let index = self.position(name)?;
        self.modules.get_mut(index)
    }

    /// Filtered and sorted snapshot for presentation
    pub fn view(&self) -> Vec<&Module> {
        self.view.apply(&self.modules)
    }

    pub fn search_term(&self) -> &str {
        &self.view.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.view.search_term = term.into();
    }

    pub fn sort(&self) -> SortOrder {
        self.view.sort
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.view.sort = sort;
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
        for module in &mut self.modules {
            module.set_display_mode(mode);
        }
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.set_display_mode(self.display_mode.toggled());
        self.display_mode
    }

    /// Mark one module selected
    pub fn select(&mut self, name: &str) -> Result<()> {
        let module = self.find_mut(name).ok_or_else(|| Error::UnknownModule(name.to_string()))?;
        module.is_selected = true;
        Ok(())
    }

    /// Select every module matching `predicate`; returns how many matched
    pub fn select_where(&mut self, predicate: impl Fn(&Module) -> bool) -> usize {
        let mut count = 0;
        for module in &mut self.modules {
            if predicate(module) {
                module.is_selected = true;
                count += 1;
            }
        }
        count
    }

    pub fn clear_selection(&mut self) {
        for module in &mut self.modules {
            module.is_selected = false;
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|m| m.is_selected)
    }

    /// Records with a staged intent, in discovery order
    pub fn staged(&self) -> Vec<&Module> {
        self.modules.iter().filter(|m| m.is_staged()).collect()
    }

    /// Reveal the module root in the platform file browser
    pub fn open_root(&self, host: &dyn HostEnvironment) -> Result<()> {
        host.open_folder(&self.root)
    }
}

#[cfg(test)]
mod tests;
