use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::repository::{Conventions, Module, ModuleAction};

/// One filesystem mutation performed after the host exits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum FileOperation {
    /// Recursive forced removal of a folder
    RemoveTree { path: PathBuf },
    /// Forced removal of a single file
    RemoveFile { path: PathBuf },
    /// Move a folder or file to a new name
    Rename { from: PathBuf, to: PathBuf },
    /// Rename every file under `dir`, at any depth, ending in `from_suffix`
    /// so that it ends in `to_suffix` instead
    RenameBinaries {
        dir: PathBuf,
        from_suffix: String,
        to_suffix: String,
    },
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOperation::RemoveTree { path } => write!(f, "remove folder {}", path.display()),
            FileOperation::RemoveFile { path } => write!(f, "remove file {}", path.display()),
            FileOperation::Rename { from, to } => {
                write!(f, "rename {} -> {}", from.display(), to.display())
            }
            FileOperation::RenameBinaries { dir, from_suffix, to_suffix } => write!(
                f,
                "rename *{} -> *{} under {}",
                from_suffix,
                to_suffix,
                dir.display()
            ),
        }
    }
}

/// The operations for one targeted module, kept together in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePlan {
    pub module: String,
    pub action: ModuleAction,
    pub operations: Vec<FileOperation>,
}

/// Operations for a single module, or `None` when nothing is staged on it
pub fn plan_module(module: &Module, root: &Path, conventions: &Conventions) -> Option<ModulePlan> {
    let action = module.planned_action()?;
    let name = module.original_name();
    let current = root.join(name);
    let mut operations = Vec::new();

    match (action, module.is_directory()) {
        (ModuleAction::Delete, true) => operations.push(FileOperation::RemoveTree { path: current }),
        (ModuleAction::Delete, false) => operations.push(FileOperation::RemoveFile { path: current }),
        (ModuleAction::Enable, true) => {
            let target = root.join(conventions.enabled_dir_name(name));
            if target != current {
                operations.push(FileOperation::Rename { from: current, to: target.clone() });
            }
            operations.push(FileOperation::RenameBinaries {
                dir: target,
                from_suffix: conventions.disabled_extension(),
                to_suffix: conventions.active_extension.clone(),
            });
        }
        (ModuleAction::Disable, true) => {
            let target = root.join(conventions.disabled_dir_name(name));
            operations.push(FileOperation::Rename { from: current, to: target.clone() });
            operations.push(FileOperation::RenameBinaries {
                dir: target,
                from_suffix: conventions.active_extension.clone(),
                to_suffix: conventions.disabled_extension(),
            });
        }
        (ModuleAction::Enable, false) => {
            let target = root.join(conventions.enabled_file_name(name));
            operations.push(FileOperation::Rename { from: current, to: target });
        }
        (ModuleAction::Disable, false) => {
            let target = root.join(conventions.disabled_file_name(name));
            operations.push(FileOperation::Rename { from: current, to: target });
        }
    }

    Some(ModulePlan {
        module: name.to_string(),
        action,
        operations,
    })
}

/// One plan per staged module, in the order the modules are given
pub fn plan_operations(modules: &[Module], root: &Path, conventions: &Conventions) -> Vec<ModulePlan> {
    modules
        .iter()
        .filter_map(|m| plan_module(m, root, conventions))
        .collect()
}

/// Total operations across `plans`
pub fn operation_count(plans: &[ModulePlan]) -> usize {
    plans.iter().map(|p| p.operations.len()).sum()
}
