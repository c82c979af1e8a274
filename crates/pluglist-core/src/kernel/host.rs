//! Process and desktop services the manager consumes from its surroundings.
//!
//! Everything that touches the process table or spawns processes goes
//! through [`HostEnvironment`] so the rest of the crate can be driven by an
//! in-memory double in tests.
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};
use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, Signal, System};

use crate::kernel::error::{Error, Result};

/// A program invocation to be started outside the manager's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Services the host application and OS provide to the manager
pub trait HostEnvironment {
    /// Directory holding one entry per installed module
    fn module_root(&self) -> PathBuf;

    /// Process id of the host that keeps module files open
    fn current_process_id(&self) -> u32;

    /// Whether a process with `pid` is still running
    fn is_process_alive(&self, pid: u32) -> bool;

    /// Start `command` detached; the manager never observes its result.
    fn launch_detached(&self, command: &LaunchCommand) -> Result<()>;

    /// Ask the host to terminate. Final action of a session.
    fn request_host_shutdown(&self) -> Result<()>;

    /// Reveal a folder in the platform file browser
    fn open_folder(&self, path: &Path) -> Result<()>;
}

/// [`HostEnvironment`] backed by the real process table
#[derive(Debug, Clone)]
pub struct SystemHost {
    module_root: PathBuf,
    host_pid: u32,
}

impl SystemHost {
    /// Host running in this very process (the manager is loaded inside it).
    pub fn in_process(module_root: PathBuf) -> Self {
        Self {
            module_root,
            host_pid: std::process::id(),
        }
    }

    /// Host running as a separate process with the given pid.
    pub fn external(module_root: PathBuf, host_pid: u32) -> Self {
        Self { module_root, host_pid }
    }

    pub fn is_in_process(&self) -> bool {
        self.host_pid == std::process::id()
    }
}

impl HostEnvironment for SystemHost {
    fn module_root(&self) -> PathBuf {
        self.module_root.clone()
    }

    fn current_process_id(&self) -> u32 {
        self.host_pid
    }

    fn is_process_alive(&self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
        // A zombie has already exited; its files are closed
        system
            .process(pid)
            .is_some_and(|p| p.status() != ProcessStatus::Zombie)
    }

    fn launch_detached(&self, command: &LaunchCommand) -> Result<()> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            const DETACHED_PROCESS: u32 = 0x0000_0008;
            cmd.creation_flags(CREATE_NO_WINDOW | DETACHED_PROCESS);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group so signals aimed at the host leave it alone
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .map_err(|e| Error::io(e, "launch_detached", command.program.clone()))?;
        info!(
            "Launched detached process {} (pid {})",
            command.program.display(),
            child.id()
        );
        Ok(())
    }

    fn request_host_shutdown(&self) -> Result<()> {
        if self.is_in_process() {
            // The caller unwinds and exits once the session is dropped
            debug!("Host is this process; shutdown is left to the caller");
            return Ok(());
        }

        let pid = Pid::from_u32(self.host_pid);
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
        let Some(process) = system.process(pid) else {
            debug!("Host pid {} already gone", self.host_pid);
            return Ok(());
        };

        let delivered = process
            .kill_with(Signal::Term)
            .unwrap_or_else(|| process.kill());
        if delivered {
            info!("Requested shutdown of host pid {}", self.host_pid);
            Ok(())
        } else {
            warn!("Failed to signal host pid {}", self.host_pid);
            Err(Error::host(
                "request_host_shutdown",
                format!("could not signal pid {}", self.host_pid),
            ))
        }
    }

    fn open_folder(&self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(Error::host(
                "open_folder",
                format!("{} is not a directory", path.display()),
            ));
        }
        let opener = if cfg!(windows) {
            "explorer"
        } else if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        Command::new(opener)
            .arg(path)
            .spawn()
            .map_err(|e| Error::io(e, "open_folder", path.to_path_buf()))?;
        Ok(())
    }
}
