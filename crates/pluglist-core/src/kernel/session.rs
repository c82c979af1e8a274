use log::info;

use crate::identity::{IdentityResolver, LoadedModuleSet};
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::kernel::host::HostEnvironment;
use crate::planner::{CommitOutcome, Planner, Preview};
use crate::repository::ModuleRepository;
use crate::staging::StagingController;
use crate::storage::config::ManagerConfig;
use crate::ui_bridge::UserPrompt;

/// One staging session: discover, stage, commit.
///
/// Owns the repository and planner built from a [`ManagerConfig`] and the
/// [`HostEnvironment`] the session runs against. A session ends with a
/// successful [`commit`](Session::commit); the host is asked to exit then.
pub struct Session<H: HostEnvironment> {
    config: ManagerConfig,
    repository: ModuleRepository,
    resolver: IdentityResolver,
    planner: Planner,
    host: H,
}

impl<H: HostEnvironment> Session<H> {
    pub fn new(config: ManagerConfig, host: H, resolver: IdentityResolver) -> Self {
        info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let repository = ModuleRepository::from_config(&config, host.module_root());
        let planner = Planner::from_config(&config);
        Self {
            config,
            repository,
            resolver,
            planner,
            host,
        }
    }

    /// Session using the default identity providers and no loaded modules
    pub fn with_default_resolver(config: ManagerConfig, host: H) -> Self {
        let resolver = IdentityResolver::with_defaults(LoadedModuleSet::new(), config.conventions.clone());
        Self::new(config, host, resolver)
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn repository(&self) -> &ModuleRepository {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut ModuleRepository {
        &mut self.repository
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Re-run discovery; staged intents from before are dropped with the old records.
    pub async fn refresh(&mut self) -> usize {
        self.repository.refresh(&self.resolver).await
    }

    pub fn staging(&mut self) -> StagingController<'_> {
        StagingController::new(&mut self.repository)
    }

    pub fn preview(&self) -> Option<Preview> {
        self.planner.preview(
            self.repository.modules(),
            self.repository.root(),
            self.host.current_process_id(),
        )
    }

    /// Commit the staged intents. Once the script is launched the records
    /// are discarded; the next discovery pass reflects the applied changes.
    pub fn commit(&mut self, prompt: &mut dyn UserPrompt) -> Result<CommitOutcome> {
        let outcome = self.planner.commit(
            self.repository.modules(),
            self.repository.root(),
            &self.host,
            prompt,
        )?;
        if matches!(outcome, CommitOutcome::Launched { .. }) {
            self.repository.replace(Vec::new());
        }
        Ok(outcome)
    }

    pub fn open_root(&self) -> Result<()> {
        self.repository.open_root(&self.host)
    }
}
