//! In-process application of module plans.
//!
//! Used by `pluglist apply` when the deferred work is delegated to a helper
//! process instead of a shell script. Same contract as the script: wait for
//! the host, then run every operation best-effort and keep going on failure.
use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::kernel::host::HostEnvironment;
use crate::planner::operation::{FileOperation, ModulePlan};
use crate::utils::{self, ends_with_ignore_case, strip_suffix_ignore_case};

/// An operation that could not be carried out, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOperation {
    pub module: String,
    pub operation: FileOperation,
    pub reason: String,
}

/// Outcome of [`apply_plan`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Operations that ran without error
    pub applied: usize,
    pub failures: Vec<FailedOperation>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Block until `pid` exits, polling every `poll`. Returns `false` when
/// `timeout` elapsed first.
pub fn wait_for_exit(
    host: &dyn HostEnvironment,
    pid: u32,
    poll: Duration,
    timeout: Option<Duration>,
) -> bool {
    let started = Instant::now();
    while host.is_process_alive(pid) {
        if timeout.is_some_and(|t| started.elapsed() >= t) {
            warn!("Gave up waiting for pid {} after {:?}", pid, started.elapsed());
            return false;
        }
        thread::sleep(poll);
    }
    debug!("Pid {} has exited", pid);
    true
}

/// Run every operation in `plans`, in order
pub fn apply_plan(plans: &[ModulePlan]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for plan in plans {
        info!("Applying {} to '{}'", plan.action, plan.module);
        for op in &plan.operations {
            match apply_operation(op) {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    warn!("Skipped '{}' for '{}': {}", op, plan.module, e);
                    report.failures.push(FailedOperation {
                        module: plan.module.clone(),
                        operation: op.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    report
}

fn apply_operation(op: &FileOperation) -> io::Result<()> {
    match op {
        FileOperation::RemoveTree { path } => fs::remove_dir_all(path),
        FileOperation::RemoveFile { path } => fs::remove_file(path),
        FileOperation::Rename { from, to } => fs::rename(from, to),
        FileOperation::RenameBinaries { dir, from_suffix, to_suffix } => {
            rename_binaries(dir, from_suffix, to_suffix)
        }
    }
}

fn rename_binaries(dir: &Path, from_suffix: &str, to_suffix: &str) -> io::Result<()> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let matches = utils::find_files(dir, &|p: &Path| {
        utils::fs::file_name_str(p).is_some_and(|n| ends_with_ignore_case(n, from_suffix))
    })?;

    // One stubborn file must not stop the rest of the folder
    let mut first_error = None;
    for path in matches {
        let Some(stem) = utils::fs::file_name_str(&path)
            .and_then(|n| strip_suffix_ignore_case(n, from_suffix))
        else {
            continue;
        };
        let target = path.with_file_name(format!("{}{}", stem, to_suffix));
        if let Err(e) = fs::rename(&path, &target) {
            warn!("Failed to rename {}: {}", path.display(), e);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
