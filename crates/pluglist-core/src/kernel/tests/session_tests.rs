use std::cell::Cell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use crate::kernel::error::Result;
use crate::kernel::host::{HostEnvironment, LaunchCommand};
use crate::kernel::session::Session;
use crate::planner::{CommitOutcome, ScriptDialect};
use crate::repository::PendingIntent;
use crate::storage::config::ManagerConfig;
use crate::ui_bridge::AutoConfirm;

struct TempHost {
    root: PathBuf,
    launches: Cell<usize>,
    opened: Cell<usize>,
}

impl HostEnvironment for TempHost {
    fn module_root(&self) -> PathBuf {
        self.root.clone()
    }

    fn current_process_id(&self) -> u32 {
        31337
    }

    fn is_process_alive(&self, _pid: u32) -> bool {
        false
    }

    fn launch_detached(&self, _command: &LaunchCommand) -> Result<()> {
        self.launches.set(self.launches.get() + 1);
        Ok(())
    }

    fn request_host_shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn open_folder(&self, path: &Path) -> Result<()> {
        assert_eq!(path, self.root);
        self.opened.set(self.opened.get() + 1);
        Ok(())
    }
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap();
}

fn session(root: &Path, tag: &str) -> Session<TempHost> {
    let mut config = ManagerConfig::default();
    config.script.file_name = format!("pluglist_session_{}_{}", tag, std::process::id());
    config.script.dialect = Some(ScriptDialect::Posix);
    let host = TempHost {
        root: root.to_path_buf(),
        launches: Cell::new(0),
        opened: Cell::new(0),
    };
    Session::with_default_resolver(config, host)
}

#[tokio::test]
async fn test_refresh_stage_and_commit() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    touch(&root.join("_MyPlugin/MyPlugin.dll.disabled"));
    touch(&root.join("Other.dll"));

    let mut session = session(root, "commit");
    assert_eq!(session.refresh().await, 2);

    session.repository_mut().select("_MyPlugin").unwrap();
    assert_eq!(session.staging().bulk_enable(), 1);
    session.staging().stage("Other.dll", PendingIntent::Delete).unwrap();

    let preview = session.preview().expect("staged changes");
    assert!(preview.script_text.contains("kill -0 31337"));

    let outcome = session.commit(&mut AutoConfirm::accept()).unwrap();
    let CommitOutcome::Launched { script_path, operation_count, shutdown_requested } = outcome else {
        panic!("expected Launched");
    };
    assert_eq!(operation_count, 3);
    assert!(shutdown_requested);
    assert_eq!(session.host().launches.get(), 1);
    assert!(session.repository().is_empty());

    // Files under the root are untouched until the script runs
    assert!(root.join("_MyPlugin/MyPlugin.dll.disabled").exists());
    assert!(root.join("Other.dll").exists());
    fs::remove_file(script_path).unwrap();
}

#[tokio::test]
async fn test_commit_with_nothing_staged() {
    let temp_dir = tempdir().unwrap();
    touch(&temp_dir.path().join("Other.dll"));

    let mut session = session(temp_dir.path(), "empty");
    session.refresh().await;

    let outcome = session.commit(&mut AutoConfirm::accept()).unwrap();
    assert_eq!(outcome, CommitOutcome::NothingToDo);
    assert_eq!(session.host().launches.get(), 0);
    assert_eq!(session.repository().len(), 1);
}

#[tokio::test]
async fn test_refresh_drops_staged_intents() {
    let temp_dir = tempdir().unwrap();
    touch(&temp_dir.path().join("Other.dll"));

    let mut session = session(temp_dir.path(), "refresh");
    session.refresh().await;
    session.staging().stage("Other.dll", PendingIntent::Delete).unwrap();
    assert_eq!(session.repository().staged().len(), 1);

    session.refresh().await;
    assert!(session.repository().staged().is_empty());
}

#[test]
fn test_open_root_goes_through_host() {
    let temp_dir = tempdir().unwrap();
    let session = session(temp_dir.path(), "open");
    session.open_root().unwrap();
    assert_eq!(session.host().opened.get(), 1);
}
