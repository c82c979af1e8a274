//! # Pluglist Core Storage
//!
//! Configuration loading for the manager. The module root itself is only
//! ever read by discovery; this subsystem owns the manager's own settings
//! file and its supported formats.
pub mod config;
pub mod error;

pub use config::{ConfigFormat, ManagerConfig, ScriptConfig};
pub use error::StorageSystemError;

#[cfg(test)]
mod tests;
