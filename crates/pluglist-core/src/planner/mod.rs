//! # Pluglist Core Deferred Mutation Planner
//!
//! Turns staged intents into filesystem operations that run only after the
//! host process has exited, since the host keeps module binaries locked
//! while it runs.
//!
//! - **[`operation`]**: per-module [`ModulePlan`]s built from naming conventions.
//! - **[`script`]**: pure rendering of a plan into a self-deleting shell script.
//! - **[`executor`]**: in-process application of a serialized plan.
//!
//! [`Planner::commit`] is the terminal action of a session: confirm, write
//! the script, launch it detached, ask the host to exit.
pub mod error;
pub mod executor;
pub mod operation;
pub mod script;

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::kernel::host::HostEnvironment;
use crate::repository::{Conventions, Module, ModuleAction};
use crate::storage::config::{ManagerConfig, ScriptConfig};
use crate::ui_bridge::UserPrompt;
use crate::ui_bridge::messages::util;

pub use error::PlannerError;
pub use executor::{ApplyReport, FailedOperation, apply_plan};
pub use operation::{FileOperation, ModulePlan, plan_module, plan_operations};
pub use script::{DeferredScript, ScriptDialect, plan_to_script};

const SOURCE: &str = "planner";

/// Display names of the staged modules, grouped by action
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub deletions: Vec<String>,
    pub enables: Vec<String>,
    pub disables: Vec<String>,
}

impl CommitSummary {
    pub fn from_modules<'a>(modules: impl IntoIterator<Item = &'a Module>) -> Self {
        let mut summary = Self::default();
        for module in modules {
            let bucket = match module.planned_action() {
                Some(ModuleAction::Delete) => &mut summary.deletions,
                Some(ModuleAction::Enable) => &mut summary.enables,
                Some(ModuleAction::Disable) => &mut summary.disables,
                None => continue,
            };
            bucket.push(module.display_name());
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.deletions.len() + self.enables.len() + self.disables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The following changes will be applied after the host exits:")?;
        for (label, names) in [
            ("Delete", &self.deletions),
            ("Enable", &self.enables),
            ("Disable", &self.disables),
        ] {
            if !names.is_empty() {
                writeln!(f, "  {} ({}): {}", label, names.len(), names.join(", "))?;
            }
        }
        write!(f, "The host will be closed to apply them.")
    }
}

/// Result of [`Planner::commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No module had a pending intent
    NothingToDo,
    /// The operator declined; intents are left as they were
    Declined,
    /// The deferred script is running and waiting for the host to exit
    Launched {
        script_path: PathBuf,
        operation_count: usize,
        shutdown_requested: bool,
    },
}

/// Dry-run output of [`Planner::preview`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub summary: CommitSummary,
    pub plans: Vec<ModulePlan>,
    pub dialect: ScriptDialect,
    pub script_path: PathBuf,
    pub script_text: String,
}

pub struct Planner {
    conventions: Conventions,
    script: ScriptConfig,
}

impl Planner {
    pub fn new(conventions: Conventions, script: ScriptConfig) -> Self {
        Self { conventions, script }
    }

    pub fn from_config(config: &ManagerConfig) -> Self {
        Self::new(config.conventions.clone(), config.script.clone())
    }

    pub fn dialect(&self) -> ScriptDialect {
        self.script.dialect()
    }

    /// Plans for every staged module under `root`, in the given order
    pub fn plan(&self, modules: &[Module], root: &Path) -> Vec<ModulePlan> {
        plan_operations(modules, root, &self.conventions)
    }

    fn deferred_script(&self, plans: Vec<ModulePlan>, host_pid: u32) -> DeferredScript {
        DeferredScript {
            host_pid,
            poll_interval: self.script.poll_interval(),
            grace_interval: self.script.grace_interval(),
            plans,
        }
    }

    /// Everything a commit would do, without touching the filesystem.
    /// `None` when nothing is staged.
    pub fn preview(&self, modules: &[Module], root: &Path, host_pid: u32) -> Option<Preview> {
        let summary = CommitSummary::from_modules(modules);
        if summary.is_empty() {
            return None;
        }
        let plans = self.plan(modules, root);
        let dialect = self.dialect();
        let script_text = plan_to_script(&self.deferred_script(plans.clone(), host_pid), dialect);
        Some(Preview {
            summary,
            plans,
            dialect,
            script_path: self.script.script_path(),
            script_text,
        })
    }

    /// Confirm, write and launch the deferred script, then ask the host to
    /// exit. Nothing under `root` is modified by this call.
    pub fn commit(
        &self,
        modules: &[Module],
        root: &Path,
        host: &dyn HostEnvironment,
        prompt: &mut dyn UserPrompt,
    ) -> Result<CommitOutcome, PlannerError> {
        let summary = CommitSummary::from_modules(modules);
        if summary.is_empty() {
            prompt.notify(util::info(SOURCE, "No changes are staged."));
            return Ok(CommitOutcome::NothingToDo);
        }

        if !prompt.confirm(&summary) {
            debug!("Commit of {} change(s) declined", summary.total());
            return Ok(CommitOutcome::Declined);
        }

        let plans = self.plan(modules, root);
        let operation_count = operation::operation_count(&plans);
        let dialect = self.dialect();
        let text = plan_to_script(
            &self.deferred_script(plans, host.current_process_id()),
            dialect,
        );

        let script_path = self.script.script_path();
        std::fs::write(&script_path, text).map_err(|source| PlannerError::ScriptWrite {
            path: script_path.clone(),
            source,
        })?;
        debug!("Wrote deferred script {}", script_path.display());

        host.launch_detached(&dialect.launch_command(&script_path))
            .map_err(|e| PlannerError::Launch {
                path: script_path.clone(),
                source: Box::new(e),
            })?;
        info!(
            "Deferred script {} launched with {} operation(s)",
            script_path.display(),
            operation_count
        );

        let shutdown_requested = match host.request_host_shutdown() {
            Ok(()) => true,
            Err(e) => {
                warn!("Host shutdown request failed: {}", e);
                prompt.notify(util::warning(
                    SOURCE,
                    "Close the host manually; changes apply once it exits.",
                ));
                false
            }
        };

        Ok(CommitOutcome::Launched {
            script_path,
            operation_count,
            shutdown_requested,
        })
    }
}

/// Serialize plans for `pluglist apply`
pub fn plans_to_json(plans: &[ModulePlan]) -> Result<String, PlannerError> {
    Ok(serde_json::to_string_pretty(plans)?)
}

/// Read plans written by [`plans_to_json`]
pub fn load_plans(path: &Path) -> Result<Vec<ModulePlan>, PlannerError> {
    let data = std::fs::read_to_string(path).map_err(|source| PlannerError::PlanRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests;
