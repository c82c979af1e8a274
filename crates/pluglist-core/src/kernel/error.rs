//! # Pluglist Core Kernel Errors
//!
//! Defines the crate-wide [`Error`] enum. Each subsystem that can fail keeps
//! its own typed error and converts into this one with `?`. Discovery and
//! identity resolution never fail past their boundary, so they have no
//! variant here.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::planner::error::PlannerError;
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Typed planner / deferred script error
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    /// Typed storage / configuration error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// A selection referred to a module that discovery did not produce
    #[error("No module named '{0}' under the module root")]
    UnknownModule(String),

    /// The host environment could not provide a required service
    #[error("Host environment error during '{operation}': {message}")]
    Host { operation: String, message: String },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wrap an I/O failure with the operation and path it happened on.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }

    pub fn host(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Host {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
