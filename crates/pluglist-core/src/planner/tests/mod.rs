use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::kernel::error::{Error, Result};
use crate::kernel::host::{HostEnvironment, LaunchCommand};


/// Host double that records what the planner asked of it
pub(super) struct RecordingHost {
    pub pid: u32,
    pub alive: RefCell<Vec<u32>>,
    pub launched: RefCell<Vec<LaunchCommand>>,
    pub shutdowns: Cell<usize>,
    pub fail_launch: bool,
    pub fail_shutdown: bool,
}

impl RecordingHost {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            alive: RefCell::new(Vec::new()),
            launched: RefCell::new(Vec::new()),
            shutdowns: Cell::new(0),
            fail_launch: false,
            fail_shutdown: false,
        }
    }
}

impl HostEnvironment for RecordingHost {
    fn module_root(&self) -> PathBuf {
        PathBuf::from("/host/user/plugin")
    }

    fn current_process_id(&self) -> u32 {
        self.pid
    }

    fn is_process_alive(&self, pid: u32) -> bool {
        // Each query consumes one "still alive" answer
        let mut alive = self.alive.borrow_mut();
        match alive.iter().position(|p| *p == pid) {
            Some(index) => {
                alive.remove(index);
                true
            }
            None => false,
        }
    }

    fn launch_detached(&self, command: &LaunchCommand) -> Result<()> {
        if self.fail_launch {
            return Err(Error::host("launch_detached", "spawn refused"));
        }
        self.launched.borrow_mut().push(command.clone());
        Ok(())
    }

    fn request_host_shutdown(&self) -> Result<()> {
        self.shutdowns.set(self.shutdowns.get() + 1);
        if self.fail_shutdown {
            return Err(Error::host("request_host_shutdown", "signal refused"));
        }
        Ok(())
    }

    fn open_folder(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
