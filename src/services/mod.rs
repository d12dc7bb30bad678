//! Services module - pure settings logic with no backend state of its own.
//!
//! # Components
//!
//! - [`VolumeCurve`]: slider percentage to mixer decibels and back, on a 40 dB/decade curve
//! - [`DisplayModeMatcher`]: finds the active display mode in the backend's mode list
//! - [`ActionRegistry`]: resolves the logical controls into action handles at startup
//! - [`ControlPathFormatter`]: readable labels for control paths like `<Keyboard>/space`
//!
//! These are used by [`OptionStore`](crate::state::OptionStore) and
//! [`SettingsContext`](crate::context::SettingsContext) and can be tested without any
//! backend in place.

pub mod actions;
pub mod control_path;
pub mod display_match;
pub mod volume;

pub use actions::ActionRegistry;
pub use control_path::ControlPathFormatter;
pub use display_match::DisplayModeMatcher;
pub use volume::VolumeCurve;
