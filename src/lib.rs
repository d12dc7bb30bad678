// gamesettings - Runtime settings controller for interactive applications
//
// This is the library crate: option storage over display/quality/audio backends,
// the volume curve, display mode matching and the interactive rebind state machine.
// The binary crate (main.rs) runs a headless demonstration against in-memory backends.

pub mod backend;
pub mod config;
pub mod context;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod rebind;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use context::{Backends, ContextError, SettingsContext};
pub use models::{ActionHandle, AudioChannel, BindingSlot, ControllerConfig, DisplayMode, LogicalControl};
pub use rebind::{RebindController, RebindError, RebindEvent, RebindOutcome, RebindState};
pub use services::{DisplayModeMatcher, VolumeCurve};
pub use state::{OptionBackends, OptionStore, SettingsChange, SettingsError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
