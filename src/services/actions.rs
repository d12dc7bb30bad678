//! Startup resolution of logical controls into backend action handles.

use crate::backend::InputBackend;
use crate::models::{ActionHandle, BindingSlot, LogicalControl};
use crate::state::SettingsError;
use indexmap::IndexMap;

/// One [`ActionHandle`] per [`LogicalControl`], resolved once and never reassigned.
///
/// Controls the backend does not know are left out and logged; looking them up later
/// fails with [`SettingsError::UnknownAction`].
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    map: String,
    handles: IndexMap<LogicalControl, ActionHandle>,
}

impl ActionRegistry {
    pub fn resolve(input: &dyn InputBackend, map: &str) -> Self {
        let mut handles = IndexMap::new();

        for control in LogicalControl::ALL {
            match input.resolve_action(map, control.action_name()) {
                Some(handle) => {
                    tracing::debug!("Resolved {}/{} to {}", map, control, handle);
                    handles.insert(control, handle);
                }
                None => tracing::warn!("Action {}/{} not found in input backend", map, control),
            }
        }

        tracing::info!(
            "Resolved {}/{} logical controls in map '{}'",
            handles.len(),
            LogicalControl::ALL.len(),
            map
        );

        Self {
            map: map.to_string(),
            handles,
        }
    }

    pub fn map_name(&self) -> &str {
        &self.map
    }

    pub fn handle(&self, control: LogicalControl) -> Result<ActionHandle, SettingsError> {
        self.handles
            .get(&control)
            .copied()
            .ok_or_else(|| SettingsError::UnknownAction {
                map: self.map.clone(),
                action: control.action_name().to_string(),
            })
    }

    /// Binding slot `index` of `control`. The index itself is checked by the backend.
    pub fn slot(&self, control: LogicalControl, index: usize) -> Result<BindingSlot, SettingsError> {
        Ok(BindingSlot::new(self.handle(control)?, index))
    }

    /// Resolved controls in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (LogicalControl, ActionHandle)> + '_ {
        self.handles.iter().map(|(control, handle)| (*control, *handle))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
