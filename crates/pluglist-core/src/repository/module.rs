use std::fmt;

use serde::{Deserialize, Serialize};

/// Operator decision recorded against a module, applied on commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PendingIntent {
    #[default]
    None,
    /// Enable if currently disabled, disable if currently enabled
    ToggleEnabled,
    Delete,
}

/// Which name a module is presented under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// Declared identity when resolved, else the on-disk name
    #[default]
    Resolved,
    /// Always the on-disk name
    OnDisk,
    /// `"original / internal"` when both exist and differ
    Combined,
}

impl DisplayMode {
    /// Switch between resolved and on-disk names
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Resolved => DisplayMode::OnDisk,
            DisplayMode::OnDisk | DisplayMode::Combined => DisplayMode::Resolved,
        }
    }
}

/// What a staged intent amounts to for a particular module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleAction {
    Delete,
    Enable,
    Disable,
}

impl fmt::Display for ModuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleAction::Delete => write!(f, "delete"),
            ModuleAction::Enable => write!(f, "enable"),
            ModuleAction::Disable => write!(f, "disable"),
        }
    }
}

/// One discovered extension unit under the module root.
///
/// Records are only built by a discovery pass. The staged intent is a single
/// value, so a pending delete and a pending toggle can never coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    original_name: String,
    internal_name: Option<String>,
    is_directory: bool,
    is_disabled: bool,
    pending_intent: PendingIntent,
    display_mode: DisplayMode,
    /// UI selection; bulk staging reads it, commit ignores it
    pub is_selected: bool,
}

impl Module {
    pub(crate) fn new(
        original_name: impl Into<String>,
        internal_name: Option<String>,
        is_directory: bool,
        is_disabled: bool,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            internal_name: internal_name.filter(|n| !n.trim().is_empty()),
            is_directory,
            is_disabled,
            pending_intent: PendingIntent::None,
            display_mode: DisplayMode::default(),
            is_selected: false,
        }
    }

    /// On-disk folder or file name
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Declared identity, if the resolver found one
    pub fn internal_name(&self) -> Option<&str> {
        self.internal_name.as_deref()
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn is_disabled(&self) -> bool {
        self.is_disabled
    }

    pub fn pending_intent(&self) -> PendingIntent {
        self.pending_intent
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub(crate) fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    pub fn display_name(&self) -> String {
        match (self.display_mode, self.internal_name.as_deref()) {
            (DisplayMode::Resolved, Some(internal)) => internal.to_string(),
            (DisplayMode::Combined, Some(internal)) if internal != self.original_name => {
                format!("{} / {}", self.original_name, internal)
            }
            _ => self.original_name.clone(),
        }
    }

    /// Replace the staged intent, returning whether it changed.
    pub fn set_intent(&mut self, intent: PendingIntent) -> bool {
        let changed = self.pending_intent != intent;
        self.pending_intent = intent;
        changed
    }

    /// Value-returning form of [`set_intent`](Self::set_intent)
    pub fn with_intent(mut self, intent: PendingIntent) -> Self {
        self.pending_intent = intent;
        self
    }

    /// The "toggle" switch. Turning it on overwrites a pending delete;
    /// turning it off only clears a pending toggle.
    pub fn stage_toggle(&mut self, on: bool) -> bool {
        if on {
            self.set_intent(PendingIntent::ToggleEnabled)
        } else if self.is_toggle_pending() {
            self.set_intent(PendingIntent::None)
        } else {
            false
        }
    }

    /// The "delete" switch, mirror of [`stage_toggle`](Self::stage_toggle)
    pub fn stage_delete(&mut self, on: bool) -> bool {
        if on {
            self.set_intent(PendingIntent::Delete)
        } else if self.is_delete_pending() {
            self.set_intent(PendingIntent::None)
        } else {
            false
        }
    }

    pub fn is_toggle_pending(&self) -> bool {
        self.pending_intent == PendingIntent::ToggleEnabled
    }

    pub fn is_delete_pending(&self) -> bool {
        self.pending_intent == PendingIntent::Delete
    }

    pub fn is_staged(&self) -> bool {
        self.pending_intent != PendingIntent::None
    }

    /// Net effect of the staged intent on this module
    pub fn planned_action(&self) -> Option<ModuleAction> {
        match self.pending_intent {
            PendingIntent::None => None,
            PendingIntent::Delete => Some(ModuleAction::Delete),
            PendingIntent::ToggleEnabled if self.is_disabled => Some(ModuleAction::Enable),
            PendingIntent::ToggleEnabled => Some(ModuleAction::Disable),
        }
    }
}
