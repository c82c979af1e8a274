// Subsystem modules
pub mod identity;
pub mod kernel;
pub mod planner;
pub mod repository;
pub mod staging;
pub mod storage;
pub mod ui_bridge;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and embedding hosts
pub use kernel::error::{Error, Result};
pub use kernel::host::{HostEnvironment, SystemHost};
pub use kernel::session::Session;
pub use identity::{IdentityProvider, IdentityResolver};
pub use repository::{Module, ModuleRepository, PendingIntent};
pub use staging::StagingController;
pub use planner::{CommitOutcome, Planner};
pub use storage::config::ManagerConfig;
