//! Capability traits for the engine-side collaborators.
//!
//! The controller never talks to a renderer, mixer or input system directly. Each
//! backend is reached through one of these traits:
//!
//! - [`DisplayBackend`]: enumerate and apply display modes, fullscreen flag
//! - [`QualityBackend`]: rendering quality preset index
//! - [`AudioMixer`]: one scalar parameter store per channel group
//! - [`InputBackend`]: action lookup, action group enable/disable, interactive capture
//! - [`RebindView`]: the label and button of one rebind row on screen
//!
//! [`memory`] holds in-memory implementations of every trait, used by the demo binary
//! and the integration tests.

pub mod memory;

use crate::models::{ActionHandle, BindingSlot, DisplayMode};
use crate::rebind::CaptureOperation;
use thiserror::Error;

/// Errors reported by an input backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown action {0}")]
    UnknownAction(ActionHandle),

    #[error("Binding index {index} out of range ({count} bindings)")]
    BindingOutOfRange { index: usize, count: usize },

    #[error("Capture unavailable: {0}")]
    CaptureUnavailable(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait DisplayBackend: Send + Sync {
    /// Supported modes in backend order. The order is stable for the session.
    fn enumerate_modes(&self) -> Vec<DisplayMode>;

    fn current_mode(&self) -> DisplayMode;

    fn is_fullscreen(&self) -> bool;

    fn apply_mode(&self, mode: DisplayMode, fullscreen: bool);

    fn set_fullscreen(&self, fullscreen: bool);
}

#[cfg_attr(test, mockall::automock)]
pub trait QualityBackend: Send + Sync {
    /// Out-of-range indices are the backend's business.
    fn set_level(&self, index: usize);

    fn level(&self) -> usize;
}

#[cfg_attr(test, mockall::automock)]
pub trait AudioMixer: Send + Sync {
    fn set_parameter(&self, name: &str, value: f32);

    /// `None` when the parameter is not exposed by this channel group.
    fn parameter(&self, name: &str) -> Option<f32>;
}

#[cfg_attr(test, mockall::automock)]
pub trait InputBackend: Send + Sync {
    fn resolve_action(&self, map: &str, action: &str) -> Option<ActionHandle>;

    fn disable_group(&self, map: &str);

    fn enable_group(&self, map: &str);

    /// Check that `slot` names an existing binding that can be captured.
    fn validate_slot(&self, slot: BindingSlot) -> Result<(), InputError>;

    /// Arm a listener for the next qualifying input event on `slot`.
    ///
    /// The returned operation completes at most once, when the backend has written the
    /// new binding.
    fn begin_interactive_capture(&self, slot: BindingSlot) -> Result<CaptureOperation, InputError>;

    /// Canonical control path currently assigned to `slot`, overrides included.
    fn effective_path(&self, slot: BindingSlot) -> Option<String>;

    fn format_path_for_display(&self, path: &str, omit_device: bool) -> String;
}

#[cfg_attr(test, mockall::automock)]
pub trait RebindView: Send + Sync {
    fn set_label(&self, text: &str);

    fn set_interactable(&self, enabled: bool);
}
