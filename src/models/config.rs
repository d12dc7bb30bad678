use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controller configuration from `settings-controller.yaml` plus environment overrides.
///
/// This configures how the controller talks to its backends. It does not hold the
/// user's chosen settings, which live in the backends themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub input: InputSettings,
    pub audio: AudioSettings,
    pub defaults: DefaultSettings,
    pub rebind: RebindSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Action map holding every logical control. Disabled as a whole while a rebind
    /// is waiting for input.
    #[serde(default = "default_action_map")]
    pub action_map: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            action_map: default_action_map(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Mixer parameter written by the volume setters.
    #[serde(default = "default_volume_parameter")]
    pub volume_parameter: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume_parameter: default_volume_parameter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,

    pub window_mode: bool,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            window_mode: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebindSettings {
    /// Give up on a capture after this many milliseconds. Unset waits forever.
    pub capture_timeout_ms: Option<u64>,
}

impl RebindSettings {
    pub fn capture_timeout(&self) -> Option<Duration> {
        self.capture_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    pub debug: bool,

    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            debug: false,
            console: default_console(),
        }
    }
}

fn default_action_map() -> String {
    "Player".to_string()
}

fn default_volume_parameter() -> String {
    "MainVolume".to_string()
}

fn default_sensitivity() -> f32 {
    80.0
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "gamesettings".to_string()
}

fn default_console() -> bool {
    true
}
