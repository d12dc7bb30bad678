//! Data models for the settings controller.
//!
//! - [`DisplayMode`]: one entry of the display backend's mode list
//! - [`ActionHandle`], [`BindingSlot`], [`LogicalControl`]: input action identifiers
//! - [`AudioChannel`]: the channel groups behind the volume sliders
//! - [`ControllerConfig`]: controller configuration loaded by [`ConfigManager`](crate::config::ConfigManager)
//!
//! All of these are plain values. Live settings are owned by the backends and read
//! through [`OptionStore`](crate::state::OptionStore).

pub mod audio;
pub mod config;
pub mod display;
pub mod input;

pub use audio::AudioChannel;
pub use config::{
    AudioSettings, ControllerConfig, DefaultSettings, InputSettings, LoggingSettings,
    RebindSettings,
};
pub use display::DisplayMode;
pub use input::{ActionHandle, BindingSlot, LogicalControl};
