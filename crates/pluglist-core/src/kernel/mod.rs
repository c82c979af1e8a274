//! # Pluglist Core Kernel
//!
//! Crate-wide plumbing shared by every subsystem.
//!
//! - **[`constants`]**: default names, conventions and intervals.
//! - **[`error`]**: the umbrella [`Error`] and its `Result` alias.
//! - **[`host`]**: the [`HostEnvironment`] seam over processes and the desktop.
//! - **[`session`]**: [`Session`], wiring repository, staging and planner together.
pub mod constants;
pub mod error;
pub mod host;
pub mod session;

pub use error::{Error, Result};
pub use host::{HostEnvironment, LaunchCommand, SystemHost};
pub use session::Session;

#[cfg(test)]
mod tests;
