use crate::models::ControllerConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the controller configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "settings-controller.yaml";

/// Prefix for environment overrides, e.g. `GAMESETTINGS_REBIND__CAPTURE_TIMEOUT_MS=5000`.
pub const ENV_PREFIX: &str = "GAMESETTINGS";

/// Configuration manager for the controller configuration file.
///
/// Sources, lowest priority first:
/// - built-in defaults ([`ControllerConfig::default`])
/// - `settings-controller.yaml` in the config directory (optional)
/// - `GAMESETTINGS_*` environment variables, nested keys separated by `__`
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the controller configuration from file and environment.
    pub fn load_config(&self) -> Result<ControllerConfig> {
        self.load_with_env_prefix(ENV_PREFIX)
    }

    /// Load with a custom environment prefix.
    pub fn load_with_env_prefix(&self, prefix: &str) -> Result<ControllerConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults and environment",
                self.config_path
            );
        }

        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::new(self.config_path.as_str(), ::config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: ControllerConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!(
            "Loaded controller config: action_map={}, volume_parameter={}, capture_timeout={:?}",
            config.input.action_map,
            config.audio.volume_parameter,
            config.rebind.capture_timeout()
        );
        Ok(config)
    }

    /// Save the controller configuration file.
    pub fn save_config(&self, config: &ControllerConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved controller config to {}", self.config_path);
        Ok(())
    }

    /// Write a config file with every default filled in, unless one exists already.
    ///
    /// Returns true if a file was written.
    pub fn write_default_if_missing(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }
        self.save_config(&ControllerConfig::default())?;
        Ok(true)
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
