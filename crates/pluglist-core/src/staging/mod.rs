//! # Pluglist Core Staging
//!
//! Bulk operations that record operator decisions against the currently
//! selected modules. Only in-memory intents change here; nothing on disk is
//! touched until a commit hands the staged set to the planner.
use log::debug;

use crate::kernel::error::{Error, Result};
use crate::repository::{Module, ModuleRepository, PendingIntent};

/// Applies staging operations to a [`ModuleRepository`]
pub struct StagingController<'a> {
    repository: &'a mut ModuleRepository,
}

impl<'a> StagingController<'a> {
    pub fn new(repository: &'a mut ModuleRepository) -> Self {
        Self { repository }
    }

    fn for_each_selected(&mut self, operation: &str, mut f: impl FnMut(&mut Module) -> bool) -> usize {
        let mut changed = 0;
        for module in self.repository.modules_mut().iter_mut().filter(|m| m.is_selected) {
            if f(module) {
                changed += 1;
            }
        }
        debug!("{} changed {} staged intents", operation, changed);
        changed
    }

    /// Stage a toggle on selected disabled modules; clear the toggle on enabled ones.
    pub fn bulk_enable(&mut self) -> usize {
        self.for_each_selected("bulk_enable", |m| {
            let disabled = m.is_disabled();
            m.stage_toggle(disabled)
        })
    }

    /// Stage a toggle on selected enabled modules; clear the toggle on disabled ones.
    pub fn bulk_disable(&mut self) -> usize {
        self.for_each_selected("bulk_disable", |m| {
            let enabled = !m.is_disabled();
            m.stage_toggle(enabled)
        })
    }

    /// Stage a toggle where nothing is staged; clear whatever is staged elsewhere.
    pub fn bulk_toggle(&mut self) -> usize {
        self.for_each_selected("bulk_toggle", |m| {
            let next = if m.pending_intent() == PendingIntent::None {
                PendingIntent::ToggleEnabled
            } else {
                PendingIntent::None
            };
            m.set_intent(next)
        })
    }

    /// Flip each selected module between Delete and None
    pub fn bulk_delete(&mut self) -> usize {
        self.for_each_selected("bulk_delete", |m| {
            let on = !m.is_delete_pending();
            m.stage_delete(on)
        })
    }

    /// Set one module's intent directly, regardless of selection
    pub fn stage(&mut self, name: &str, intent: PendingIntent) -> Result<bool> {
        let module = self
            .repository
            .find_mut(name)
            .ok_or_else(|| Error::UnknownModule(name.to_string()))?;
        Ok(module.set_intent(intent))
    }

    /// Abandon every staged intent
    pub fn reset(&mut self) -> usize {
        let mut changed = 0;
        for module in self.repository.modules_mut() {
            if module.set_intent(PendingIntent::None) {
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests;
