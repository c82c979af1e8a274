mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::{debug, error, info};
use tracing_subscriber::EnvFilter;

use pluglist_core::kernel::constants;
use pluglist_core::planner::{self, CommitOutcome, executor};
use pluglist_core::repository::{DisplayMode, SortOrder};
use pluglist_core::{HostEnvironment, ManagerConfig, Result, Session, SystemHost};

use crate::cli::StdioPrompt;

/// pluglist: stage and apply changes to a host application's module folder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Configuration file (.json, .toml or .yaml); defaults to pluglist.toml beside the host
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Host installation directory; the module root is <host-base>/user/plugin
    #[arg(long, global = true)]
    host_base: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List discovered modules
    List {
        /// Only show modules whose name contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
        /// name-asc, name-desc, status-asc or status-desc
        #[arg(long)]
        sort: Option<SortOrder>,
        /// Which name to show for each module
        #[arg(long, value_enum)]
        display: Option<DisplayArg>,
    },
    /// Stage changes, confirm, and hand them to a script that runs after the host exits
    Commit {
        #[command(flatten)]
        stage: StageArgs,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show what a commit would do without writing or launching anything
    Preview {
        #[command(flatten)]
        stage: StageArgs,
        /// Also write the plan as JSON for `pluglist apply`
        #[arg(long)]
        plan_out: Option<PathBuf>,
    },
    /// Apply a JSON plan in-process, optionally after a process exits
    Apply {
        /// Plan file written by `preview --plan-out`
        plan: PathBuf,
        /// Wait for this pid to exit first
        #[arg(long)]
        wait_pid: Option<u32>,
        /// Give up waiting after this many seconds
        #[arg(long, requires = "wait_pid")]
        timeout_secs: Option<u64>,
    },
    /// Open the module folder in the file browser
    Open,
}

/// Modules to stage, by on-disk or display name
#[derive(Args, Debug, Default)]
struct StageArgs {
    /// Enable a disabled module
    #[arg(long, value_name = "NAME")]
    enable: Vec<String>,
    /// Disable an enabled module
    #[arg(long, value_name = "NAME")]
    disable: Vec<String>,
    /// Flip a module's enabled state
    #[arg(long, value_name = "NAME")]
    toggle: Vec<String>,
    /// Delete a module
    #[arg(long, value_name = "NAME")]
    delete: Vec<String>,
    /// Process the deferred work waits for; defaults to this process
    #[arg(long)]
    host_pid: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DisplayArg {
    Resolved,
    OnDisk,
    Combined,
}

impl From<DisplayArg> for DisplayMode {
    fn from(arg: DisplayArg) -> Self {
        match arg {
            DisplayArg::Resolved => DisplayMode::Resolved,
            DisplayArg::OnDisk => DisplayMode::OnDisk,
            DisplayArg::Combined => DisplayMode::Combined,
        }
    }
}

#[derive(Clone, Copy)]
enum BulkAction {
    Enable,
    Disable,
    Toggle,
    Delete,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Also installs the log -> tracing bridge for pluglist-core's log records
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = installed {
        // An earlier subscriber keeps receiving the records
        debug!("Logging subscriber not installed: {}", e);
    }
}

fn load_config(path: Option<&Path>, host_base: Option<&Path>) -> Result<ManagerConfig> {
    let mut config = match path {
        Some(path) => ManagerConfig::load(path)?,
        None => {
            let base = match host_base {
                Some(base) => base.to_path_buf(),
                None => ManagerConfig::default().host_base(),
            };
            ManagerConfig::load_or_default(&base.join(constants::DEFAULT_CONFIG_FILE_NAME))?
        }
    };
    if let Some(base) = host_base {
        config.host_base = Some(base.to_path_buf());
    }
    Ok(config)
}

fn host_for(config: &ManagerConfig, host_pid: Option<u32>) -> SystemHost {
    let root = config.module_root();
    match host_pid {
        Some(pid) => SystemHost::external(root, pid),
        None => SystemHost::in_process(root),
    }
}

async fn open_session(config: ManagerConfig, host_pid: Option<u32>) -> Session<SystemHost> {
    let host = host_for(&config, host_pid);
    let mut session = Session::with_default_resolver(config, host);
    session.refresh().await;
    session
}

/// Select the named modules and run one bulk staging operation per list
fn stage_selections(session: &mut Session<SystemHost>, stage: &StageArgs) -> Result<()> {
    let groups = [
        (&stage.enable, BulkAction::Enable),
        (&stage.disable, BulkAction::Disable),
        (&stage.toggle, BulkAction::Toggle),
        (&stage.delete, BulkAction::Delete),
    ];
    for (names, action) in groups {
        if names.is_empty() {
            continue;
        }
        let repository = session.repository_mut();
        repository.clear_selection();
        for name in names {
            repository.select(name)?;
        }
        let mut staging = session.staging();
        let changed = match action {
            BulkAction::Enable => staging.bulk_enable(),
            BulkAction::Disable => staging.bulk_disable(),
            BulkAction::Toggle => staging.bulk_toggle(),
            BulkAction::Delete => staging.bulk_delete(),
        };
        debug!("{} module(s) changed intent", changed);
    }
    session.repository_mut().clear_selection();
    Ok(())
}

async fn run_list(
    config: ManagerConfig,
    search: Option<String>,
    sort: Option<SortOrder>,
    display: Option<DisplayArg>,
) -> Result<ExitCode> {
    let mut session = open_session(config, None).await;
    let repository = session.repository_mut();
    if let Some(term) = search {
        repository.set_search_term(term);
    }
    if let Some(sort) = sort {
        repository.set_sort(sort);
    }
    if let Some(display) = display {
        repository.set_display_mode(display.into());
    }
    cli::print_modules(session.repository());
    Ok(ExitCode::SUCCESS)
}

async fn run_preview(config: ManagerConfig, stage: StageArgs, plan_out: Option<PathBuf>) -> Result<ExitCode> {
    let mut session = open_session(config, stage.host_pid).await;
    stage_selections(&mut session, &stage)?;

    let Some(preview) = session.preview() else {
        println!("No changes are staged.");
        return Ok(ExitCode::SUCCESS);
    };

    println!("{}", preview.summary);
    println!();
    for plan in &preview.plans {
        println!("{} ({}):", plan.module, plan.action);
        for op in &plan.operations {
            println!("  {}", op);
        }
    }
    println!();
    println!("Script {}:", preview.script_path.display());
    print!("{}", preview.script_text);

    if let Some(path) = plan_out {
        let json = planner::plans_to_json(&preview.plans)?;
        std::fs::write(&path, json).map_err(|e| pluglist_core::Error::io(e, "write_plan", path.clone()))?;
        info!("Wrote plan to {}", path.display());
        println!("Plan written to {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_commit(config: ManagerConfig, stage: StageArgs, yes: bool) -> Result<ExitCode> {
    let mut session = open_session(config, stage.host_pid).await;
    stage_selections(&mut session, &stage)?;

    let mut prompt = StdioPrompt { assume_yes: yes };
    match session.commit(&mut prompt)? {
        CommitOutcome::NothingToDo => {}
        CommitOutcome::Declined => println!("Cancelled; nothing was changed."),
        CommitOutcome::Launched { script_path, operation_count, .. } => println!(
            "{} operation(s) will run from {} once pid {} exits.",
            operation_count,
            script_path.display(),
            session.host().current_process_id()
        ),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_apply(
    config: &ManagerConfig,
    plan: &Path,
    wait_pid: Option<u32>,
    timeout_secs: Option<u64>,
) -> Result<ExitCode> {
    let plans = planner::load_plans(plan)?;

    if let Some(pid) = wait_pid {
        let host = SystemHost::in_process(config.module_root());
        let timeout = timeout_secs.map(Duration::from_secs);
        if !executor::wait_for_exit(&host, pid, config.script.poll_interval(), timeout) {
            eprintln!("Process {} is still running; nothing was applied.", pid);
            return Ok(ExitCode::FAILURE);
        }
        std::thread::sleep(config.script.grace_interval());
    }

    let report = executor::apply_plan(&plans);
    println!(
        "Applied {} operation(s), {} failed.",
        report.applied,
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  {}: {} ({})", failure.module, failure.operation, failure.reason);
    }
    Ok(if report.is_clean() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run(args: CliArgs) -> Result<ExitCode> {
    let config = load_config(args.config.as_deref(), args.host_base.as_deref())?;
    debug!("Module root: {}", config.module_root().display());

    match args.command {
        Commands::List { search, sort, display } => run_list(config, search, sort, display).await,
        Commands::Preview { stage, plan_out } => run_preview(config, stage, plan_out).await,
        Commands::Commit { stage, yes } => run_commit(config, stage, yes).await,
        Commands::Apply { plan, wait_pid, timeout_secs } => run_apply(&config, &plan, wait_pid, timeout_secs),
        Commands::Open => {
            let session = open_session(config, None).await;
            session.open_root()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
