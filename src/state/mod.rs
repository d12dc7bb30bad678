// Option store module
//
// This module provides the OptionStore, the single point of truth for simple settings.
// Values that live in a backend (display mode, volume) are always read back from that
// backend; only quality index, window flag and sensitivity are held locally.

use crate::backend::{AudioMixer, DisplayBackend, QualityBackend};
use crate::metrics::Metrics;
use crate::models::{AudioChannel, ControllerConfig, DisplayMode};
use crate::services::{DisplayModeMatcher, VolumeCurve};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors surfaced by settings reads and action lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{0} audio channel is not bound")]
    MissingChannel(AudioChannel),

    #[error("{channel} audio channel does not expose parameter '{parameter}'")]
    MissingParameter {
        channel: AudioChannel,
        parameter: String,
    },

    #[error("Action {map}/{action} not found")]
    UnknownAction { map: String, action: String },
}

/// Change events emitted when a setting is written
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsChange {
    QualityChanged { level: usize },

    DisplayModeChanged { index: usize, mode: DisplayMode },

    WindowModeChanged { windowed: bool },

    /// `percent` is the clamped value that was converted and applied
    VolumeChanged { channel: AudioChannel, percent: f32 },

    SensitivityChanged { value: f32 },
}

/// Locally held settings
#[derive(Clone, Debug, PartialEq)]
pub struct OptionState {
    pub quality_level: usize,
    pub window_mode: bool,
    pub sensitivity: f32,
}

/// Backends the store writes through to.
///
/// A `None` mixer means the channel group is not bound in this build.
#[derive(Clone)]
pub struct OptionBackends {
    pub display: Arc<dyn DisplayBackend>,
    pub quality: Arc<dyn QualityBackend>,
    pub sfx: Option<Arc<dyn AudioMixer>>,
    pub music: Option<Arc<dyn AudioMixer>>,
}

/// Settings store for display, quality, audio and sensitivity.
///
/// Writers are serialized through one `RwLock`, so concurrent setters from several UI
/// threads never interleave their backend calls.
///
/// # Missing audio channels
///
/// Volume setters skip silently when the channel is unbound, while volume getters fail
/// with [`SettingsError::MissingChannel`]. A partially configured mixer must not break
/// a slider drag, but showing a made-up volume is worse than showing an error.
pub struct OptionStore {
    display: Arc<dyn DisplayBackend>,
    quality: Arc<dyn QualityBackend>,
    mixers: HashMap<AudioChannel, Arc<dyn AudioMixer>>,
    volume_parameter: String,
    state: RwLock<OptionState>,
    change_tx: broadcast::Sender<SettingsChange>,
    metrics: Arc<Metrics>,
}

impl OptionStore {
    /// Create a store over `backends`.
    ///
    /// The quality index is read from the backend once here; sensitivity and window
    /// mode start from `config.defaults`.
    pub fn new(backends: OptionBackends, config: &ControllerConfig, metrics: Arc<Metrics>) -> Self {
        let (change_tx, _) = broadcast::channel(100);

        let mut mixers = HashMap::new();
        for (channel, mixer) in [
            (AudioChannel::Sfx, backends.sfx),
            (AudioChannel::Music, backends.music),
        ] {
            match mixer {
                Some(mixer) => {
                    mixers.insert(channel, mixer);
                }
                None => tracing::error!("{} audio mixer is not bound", channel),
            }
        }

        let state = OptionState {
            quality_level: backends.quality.level(),
            window_mode: config.defaults.window_mode,
            sensitivity: config.defaults.sensitivity,
        };

        tracing::info!(
            "Option store ready: quality={}, window_mode={}, sensitivity={}, mixers={}",
            state.quality_level,
            state.window_mode,
            state.sensitivity,
            mixers.len()
        );

        Self {
            display: backends.display,
            quality: backends.quality,
            mixers,
            volume_parameter: config.audio.volume_parameter.clone(),
            state: RwLock::new(state),
            change_tx,
            metrics,
        }
    }

    pub fn snapshot(&self) -> OptionState {
        self.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SettingsChange> {
        self.change_tx.subscribe()
    }

    // Quality

    /// Forward a quality preset index to the rendering backend.
    ///
    /// The index is not range-checked here.
    pub fn set_quality(&self, index: usize) {
        let mut state = self.write();
        state.quality_level = index;
        self.quality.set_level(index);
        drop(state);

        tracing::debug!("Quality level set to {}", index);
        self.emit(SettingsChange::QualityChanged { level: index });
    }

    pub fn quality(&self) -> usize {
        self.read().quality_level
    }

    // Display mode

    /// Supported display modes in backend order, for populating a selection list.
    pub fn display_modes(&self) -> Vec<DisplayMode> {
        self.display.enumerate_modes()
    }

    /// Apply the mode at `index`, keeping the current fullscreen flag.
    ///
    /// A stale index (the list shrank after a monitor change, say) is skipped without
    /// touching the display. Returns whether a mode was applied.
    pub fn set_display_mode(&self, index: usize) -> bool {
        let guard = self.write();
        let modes = self.display.enumerate_modes();

        let Some(mode) = modes.get(index).copied() else {
            tracing::warn!(
                "Ignoring display mode index {} ({} modes available)",
                index,
                modes.len()
            );
            self.metrics.record_settings_skipped();
            return false;
        };

        let fullscreen = self.display.is_fullscreen();
        self.display.apply_mode(mode, fullscreen);
        drop(guard);

        tracing::info!("Applied display mode {} (fullscreen={})", mode, fullscreen);
        self.emit(SettingsChange::DisplayModeChanged { index, mode });
        true
    }

    /// Index of the active mode, recomputed from the backend on every call.
    pub fn display_mode_index(&self) -> usize {
        let modes = self.display.enumerate_modes();
        let current = self.display.current_mode();
        DisplayModeMatcher::find_index(&modes, &current)
    }

    // Window mode

    /// Flip window mode and apply the inverse as the fullscreen flag.
    ///
    /// Returns the new window mode.
    pub fn toggle_window_mode(&self) -> bool {
        let mut state = self.write();
        state.window_mode = !state.window_mode;
        let windowed = state.window_mode;
        self.display.set_fullscreen(!windowed);
        drop(state);

        tracing::info!("Window mode {}", if windowed { "on" } else { "off" });
        self.emit(SettingsChange::WindowModeChanged { windowed });
        windowed
    }

    pub fn is_window_mode(&self) -> bool {
        self.read().window_mode
    }

    // Volume

    /// Clamp, convert to decibels and write to the channel's volume parameter.
    ///
    /// No-op when the channel is unbound.
    pub fn set_volume(&self, channel: AudioChannel, percent: f32) {
        let Some(mixer) = self.mixers.get(&channel) else {
            tracing::warn!("Skipping {} volume change: channel is not bound", channel);
            self.metrics.record_settings_skipped();
            return;
        };

        let percent = VolumeCurve::clamp_percent(percent);
        let decibels = VolumeCurve::to_gain(percent);

        let guard = self.write();
        mixer.set_parameter(&self.volume_parameter, decibels);
        drop(guard);

        tracing::debug!("{} volume {:.2}% -> {:.2} dB", channel, percent, decibels);
        self.emit(SettingsChange::VolumeChanged { channel, percent });
    }

    /// Read the channel's decibel value back from the mixer as a percentage.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::MissingChannel`] if the channel is unbound
    /// - [`SettingsError::MissingParameter`] if the mixer lacks the volume parameter
    pub fn volume(&self, channel: AudioChannel) -> Result<f32, SettingsError> {
        let mixer = self
            .mixers
            .get(&channel)
            .ok_or(SettingsError::MissingChannel(channel))?;

        let decibels = mixer.parameter(&self.volume_parameter).ok_or_else(|| {
            SettingsError::MissingParameter {
                channel,
                parameter: self.volume_parameter.clone(),
            }
        })?;

        Ok(VolumeCurve::to_percent(decibels))
    }

    pub fn set_sfx_volume(&self, percent: f32) {
        self.set_volume(AudioChannel::Sfx, percent);
    }

    pub fn set_music_volume(&self, percent: f32) {
        self.set_volume(AudioChannel::Music, percent);
    }

    pub fn sfx_volume(&self) -> Result<f32, SettingsError> {
        self.volume(AudioChannel::Sfx)
    }

    pub fn music_volume(&self) -> Result<f32, SettingsError> {
        self.volume(AudioChannel::Music)
    }

    // Sensitivity

    pub fn set_sensitivity(&self, value: f32) {
        self.write().sensitivity = value;
        tracing::debug!("Sensitivity set to {}", value);
        self.emit(SettingsChange::SensitivityChanged { value });
    }

    pub fn sensitivity(&self) -> f32 {
        self.read().sensitivity
    }

    fn read(&self) -> RwLockReadGuard<'_, OptionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, OptionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, change: SettingsChange) {
        self.metrics.record_settings_change();
        // Ignore send errors - it's OK if no one is listening
        let _ = self.change_tx.send(change);
    }
}
