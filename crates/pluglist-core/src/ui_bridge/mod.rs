//! # Pluglist Core UI Bridge
//!
//! The seam between the manager and whatever front end drives it. The core
//! never prints or reads from a terminal; it asks a [`UserPrompt`] to confirm
//! a commit and hands it [`UiMessage`]s to show.
pub mod messages;

use std::fmt;
use std::time::SystemTime;

use log::{error, info, warn};

use crate::planner::CommitSummary;

/// UI message severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for MessageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSeverity::Info => write!(f, "info"),
            MessageSeverity::Warning => write!(f, "warning"),
            MessageSeverity::Error => write!(f, "error"),
        }
    }
}

/// A notice for the front end
#[derive(Debug, Clone)]
pub struct UiMessage {
    pub text: String,
    pub severity: MessageSeverity,
    /// Component that produced the message
    pub source: String,
    pub timestamp: SystemTime,
}

impl PartialEq for UiMessage {
    // Timestamps are never equal between two constructions
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.severity == other.severity && self.source == other.source
    }
}

impl fmt::Display for UiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.source, self.severity, self.text)
    }
}

/// Front-end hooks the commit flow calls into
pub trait UserPrompt {
    /// Show the pending changes and ask whether to proceed
    fn confirm(&mut self, summary: &CommitSummary) -> bool;

    fn notify(&mut self, message: UiMessage);
}

/// Prompt that answers every confirmation with a fixed value and forwards
/// notices to the log. For unattended runs (`--yes`) and tests.
#[derive(Debug, Clone)]
pub struct AutoConfirm {
    answer: bool,
    notices: Vec<UiMessage>,
}

impl AutoConfirm {
    pub fn accept() -> Self {
        Self { answer: true, notices: Vec::new() }
    }

    pub fn decline() -> Self {
        Self { answer: false, notices: Vec::new() }
    }

    /// Every notice received so far
    pub fn notices(&self) -> &[UiMessage] {
        &self.notices
    }
}

impl UserPrompt for AutoConfirm {
    fn confirm(&mut self, summary: &CommitSummary) -> bool {
        info!(
            "Auto-{} commit of {} change(s)",
            if self.answer { "accepting" } else { "declining" },
            summary.total()
        );
        self.answer
    }

    fn notify(&mut self, message: UiMessage) {
        match message.severity {
            MessageSeverity::Info => info!("{}", message),
            MessageSeverity::Warning => warn!("{}", message),
            MessageSeverity::Error => error!("{}", message),
        }
        self.notices.push(message);
    }
}
