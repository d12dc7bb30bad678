// Settings context
//
// Owns the option store, the rebind controller and the resolved action handles for the
// lifetime of the application. Constructed explicitly at startup and shut down
// explicitly, instead of living in process-wide globals.

use crate::backend::{InputBackend, RebindView};
use crate::metrics::Metrics;
use crate::models::{BindingSlot, ControllerConfig, LogicalControl};
use crate::rebind::{RebindController, RebindError, RebindOptions};
use crate::services::ActionRegistry;
use crate::state::{OptionBackends, OptionStore, SettingsError};
use std::sync::Arc;
use thiserror::Error;

/// Errors from context-level convenience calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Rebind(#[from] RebindError),
}

/// Every backend the context needs.
#[derive(Clone)]
pub struct Backends {
    pub options: OptionBackends,
    pub input: Arc<dyn InputBackend>,
}

/// Application-lifetime owner of the settings controller.
///
/// # Example
/// ```ignore
/// let context = SettingsContext::init(backends, &config, runtime.handle().clone());
/// context.options().set_sfx_volume(75.0);
/// context.rebind_control(LogicalControl::Jump, 0, view)?;
/// // ...
/// context.shutdown().await;
/// ```
pub struct SettingsContext {
    options: OptionStore,
    rebind: RebindController,
    actions: ActionRegistry,
    metrics: Arc<Metrics>,
}

impl SettingsContext {
    /// Resolve the logical controls and build the store and controller.
    pub fn init(
        backends: Backends,
        config: &ControllerConfig,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());

        let actions = ActionRegistry::resolve(backends.input.as_ref(), &config.input.action_map);
        let options = OptionStore::new(backends.options, config, Arc::clone(&metrics));
        let rebind = RebindController::new(
            backends.input,
            RebindOptions::from(config),
            Arc::clone(&metrics),
            runtime,
        );

        tracing::info!(
            "Settings context initialized (action map '{}', capture timeout {:?})",
            config.input.action_map,
            config.rebind.capture_timeout()
        );

        Self {
            options,
            rebind,
            actions,
            metrics,
        }
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    pub fn rebind(&self) -> &RebindController {
        &self.rebind
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Binding slot for `control`, for use with [`RebindController::start_rebind`].
    pub fn binding_slot(
        &self,
        control: LogicalControl,
        index: usize,
    ) -> Result<BindingSlot, SettingsError> {
        self.actions.slot(control, index)
    }

    /// Current label of a logical control's binding.
    pub fn binding_label(
        &self,
        control: LogicalControl,
        index: usize,
    ) -> Result<Option<String>, SettingsError> {
        let slot = self.actions.slot(control, index)?;
        Ok(self.rebind.binding_label(slot))
    }

    /// Start rebinding one binding of a logical control.
    pub fn rebind_control(
        &self,
        control: LogicalControl,
        index: usize,
        view: Arc<dyn RebindView>,
    ) -> Result<(), ContextError> {
        let slot = self.actions.slot(control, index)?;
        self.rebind.start_rebind(slot, view)?;
        Ok(())
    }

    /// Cancel any pending rebind so the action map is left enabled, then log metrics.
    pub async fn shutdown(self) {
        match self.rebind.cancel_rebind().await {
            Ok(outcome) => {
                tracing::warn!("Rebind was pending at shutdown, ended as {:?}", outcome);
            }
            Err(err) => tracing::debug!("No rebind to cancel at shutdown: {}", err),
        }

        self.metrics.log_summary();
        tracing::info!("Settings context shut down");
    }
}
