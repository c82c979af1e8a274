//! # Pluglist Core Identity Resolution
//!
//! Recovers the declared display name of a module, which usually differs
//! from its folder or file name on disk.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`loaded`]**: looks the module up among the modules the host already
//!   has loaded in-process and introspects its exported plugin type.
//! - **[`metadata`]**: reads product name / file description strings from
//!   the module's representative binary, or a sidecar manifest.
//!
//! Providers are consulted in order and the first name wins. Resolution is
//! read-only and best-effort: every failure degrades to "unresolved" and the
//! caller falls back to the on-disk name.
pub mod loaded;
pub mod metadata;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use crate::repository::conventions::Conventions;

pub use loaded::{ExportedType, LoadedModule, LoadedModuleProvider, LoadedModuleSet, PluginInstance};
pub use metadata::{BinaryMetadataProvider, VersionStrings};

/// A module location handed to identity providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCandidate {
    pub location: PathBuf,
    pub is_directory: bool,
}

impl ModuleCandidate {
    pub fn new(location: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            location: location.into(),
            is_directory,
        }
    }
}

/// A source of declared module names
pub trait IdentityProvider {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// The declared name of `candidate`, if this provider can tell.
    fn try_get_declared_name(&self, candidate: &ModuleCandidate) -> Option<String>;
}

/// Ordered chain of [`IdentityProvider`]s
#[derive(Default)]
pub struct IdentityResolver {
    providers: Vec<Box<dyn IdentityProvider>>,
}

impl IdentityResolver {
    /// Resolver with no providers; resolves nothing
    pub fn new() -> Self {
        Self { providers: Vec::new() }
    }

    /// Loaded-module lookup first, then static file metadata
    pub fn with_defaults(loaded: LoadedModuleSet, conventions: Conventions) -> Self {
        let mut resolver = Self::new();
        resolver.push(Box::new(LoadedModuleProvider::new(loaded)));
        resolver.push(Box::new(BinaryMetadataProvider::new(conventions)));
        resolver
    }

    pub fn push(&mut self, provider: Box<dyn IdentityProvider>) {
        self.providers.push(provider);
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Declared name for the module at `location`, or `None`.
    pub fn resolve(&self, location: &Path, is_directory: bool) -> Option<String> {
        let candidate = ModuleCandidate::new(location, is_directory);
        for provider in &self.providers {
            let attempt = panic::catch_unwind(AssertUnwindSafe(|| provider.try_get_declared_name(&candidate)));
            match attempt {
                Ok(Some(name)) if !name.trim().is_empty() => {
                    debug!(
                        "Resolved '{}' as '{}' via {}",
                        location.display(),
                        name.trim(),
                        provider.name()
                    );
                    return Some(name.trim().to_string());
                }
                Ok(_) => trace!("{} had no name for '{}'", provider.name(), location.display()),
                Err(_) => warn!(
                    "Identity provider {} panicked on '{}'; skipping",
                    provider.name(),
                    location.display()
                ),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests;
