//! # Pluglist Core Planner Errors
//!
//! Failures of the commit step itself: writing or launching the deferred
//! script and reading or writing serialized plans. Failures of individual
//! file operations are never errors; the script and the executor skip them.
use std::path::PathBuf;

use thiserror::Error;

use crate::kernel::error::Error as KernelError;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Failed to write deferred script '{path}': {source}")]
    ScriptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch deferred script '{path}': {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Failed to read plan file '{path}': {source}")]
    PlanRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plan serialization error: {0}")]
    PlanSerialization(#[from] serde_json::Error),
}
