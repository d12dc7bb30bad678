//! gamesettings - headless settings controller demo
//!
//! # Overview
//!
//! Wires the settings controller to the in-memory backends and walks through a typical
//! settings page session:
//! - Logging infrastructure (file rotation + console output)
//! - Tokio runtime (hosts rebind capture sessions)
//! - Controller configuration ([`ConfigManager`])
//! - [`SettingsContext`] over in-memory display, quality, audio and input backends
//!
//! # Execution Flow
//!
//! 1. Load `config/settings-controller.yaml` (+ `GAMESETTINGS_*` environment overrides)
//! 2. Initialize logging → logs/gamesettings.<date>
//! 3. Create tokio runtime with 2 worker threads
//! 4. Build backends and the settings context
//! 5. Change display, audio and sensitivity settings
//! 6. Rebind Jump by simulating a key press, then start and cancel a rebind of Interact
//! 7. Shut the context down and log metrics

use anyhow::{Result, anyhow};
use gamesettings::backend::memory::{MemoryDisplay, MemoryInput, MemoryMixer, MemoryQuality, RecordingView};
use gamesettings::backend::{AudioMixer, InputBackend};
use gamesettings::{
    APP_NAME, Backends, ConfigManager, DisplayMode, LogicalControl, OptionBackends,
    SettingsContext, VERSION,
};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("config")?;
    let config = config_manager.load_config()?;

    let _log_guard = gamesettings::logging::setup_logging(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("gamesettings-worker")
        .build()?;

    let display = Arc::new(MemoryDisplay::new(
        vec![
            DisplayMode::new(1280, 720, 60.0),
            DisplayMode::new(1920, 1080, 60.0),
            DisplayMode::new(1920, 1080, 144.0),
            DisplayMode::new(2560, 1440, 165.0),
        ],
        DisplayMode::new(1920, 1080, 59.94),
        true,
    ));
    let quality = Arc::new(MemoryQuality::new(["Low", "Medium", "High", "Ultra"], 2));
    let volume_parameter = config.audio.volume_parameter.as_str();
    let sfx = Arc::new(MemoryMixer::with_parameter(volume_parameter, 0.0));
    let music = Arc::new(MemoryMixer::with_parameter(volume_parameter, -12.0));

    let input = Arc::new(MemoryInput::new());
    let map = config.input.action_map.as_str();
    input.add_action(map, "Move", &["<Keyboard>/w", "<Gamepad>/leftStick"]);
    input.add_action(map, "Look", &["<Mouse>/delta", "<Gamepad>/rightStick"]);
    input.add_action(map, "Jump", &["<Keyboard>/space", "<Gamepad>/buttonSouth"]);
    input.add_action(map, "Sprint", &["<Keyboard>/leftShift", "<Gamepad>/leftStickPress"]);
    input.add_action(map, "Crouch", &["<Keyboard>/leftCtrl", "<Gamepad>/buttonEast"]);
    input.add_action(map, "Interact", &["<Keyboard>/e", "<Gamepad>/buttonWest"]);
    input.add_action(map, "Flashlight", &["<Keyboard>/f", "<Gamepad>/dpad/up"]);
    input.add_action(map, "Pause", &["<Keyboard>/escape", "<Gamepad>/start"]);

    let backends = Backends {
        options: OptionBackends {
            display: display.clone(),
            quality: quality.clone(),
            sfx: Some(sfx as Arc<dyn AudioMixer>),
            music: Some(music as Arc<dyn AudioMixer>),
        },
        input: input.clone() as Arc<dyn InputBackend>,
    };

    let context = SettingsContext::init(backends, &config, runtime.handle().clone());

    // Display
    let options = context.options();
    for (index, mode) in options.display_modes().iter().enumerate() {
        tracing::info!("Display mode {}: {}", index, mode);
    }
    tracing::info!("Active display mode index: {}", options.display_mode_index());
    options.set_display_mode(3);
    tracing::info!("Active display mode index: {}", options.display_mode_index());
    options.toggle_window_mode();
    tracing::info!("Window mode: {}", options.is_window_mode());

    // Quality, audio, sensitivity
    options.set_quality(3);
    tracing::info!(
        "Quality: {}",
        quality.preset_name(options.quality()).unwrap_or("custom")
    );
    options.set_sfx_volume(75.0);
    options.set_music_volume(0.0);
    tracing::info!(
        "Volumes: sfx={:.1}%, music={:.4}%",
        options.sfx_volume()?,
        options.music_volume()?
    );
    options.set_sensitivity(65.0);

    // Rebinding
    let result = runtime.block_on(async {
        let jump_view = Arc::new(RecordingView::new(
            &context
                .binding_label(LogicalControl::Jump, 0)?
                .unwrap_or_default(),
        ));
        context.rebind_control(LogicalControl::Jump, 0, jump_view.clone())?;
        tracing::info!("Jump label while waiting: {}", jump_view.label());

        input.press("<Keyboard>/j");
        context.rebind().wait_idle().await;
        tracing::info!("Jump rebound to: {}", jump_view.label());

        let interact_view = Arc::new(RecordingView::new("E"));
        context.rebind_control(LogicalControl::Interact, 0, interact_view.clone())?;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let outcome = context.rebind().cancel_rebind().await?;
        tracing::info!(
            "Interact rebind ended as {:?}, label: {}",
            outcome,
            interact_view.label()
        );

        context.shutdown().await;
        Ok::<(), anyhow::Error>(())
    });

    runtime.shutdown_timeout(Duration::from_secs(5));
    tracing::info!("Demo complete");

    result.map_err(|e| {
        tracing::error!("Demo failed: {}", e);
        anyhow!("Demo failed: {}", e)
    })
}
