//! In-memory backends.
//!
//! Each type keeps its state behind a mutex and records what was asked of it, so a
//! caller can drive the controller headless and inspect the result afterwards.

use super::{AudioMixer, DisplayBackend, InputBackend, InputError, QualityBackend, RebindView};
use crate::models::{ActionHandle, BindingSlot, DisplayMode};
use crate::rebind::{CaptureCompleter, CaptureOperation};
use crate::services::ControlPathFormatter;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// Display

#[derive(Debug)]
struct DisplayState {
    current: DisplayMode,
    fullscreen: bool,
    applied: Vec<(DisplayMode, bool)>,
}

/// Display with a fixed mode list.
#[derive(Debug)]
pub struct MemoryDisplay {
    modes: Vec<DisplayMode>,
    state: Mutex<DisplayState>,
}

impl MemoryDisplay {
    pub fn new(modes: Vec<DisplayMode>, current: DisplayMode, fullscreen: bool) -> Self {
        Self {
            modes,
            state: Mutex::new(DisplayState {
                current,
                fullscreen,
                applied: Vec::new(),
            }),
        }
    }

    /// Change the active mode behind the controller's back, as a driver or OS would.
    pub fn set_current(&self, mode: DisplayMode) {
        lock(&self.state).current = mode;
    }

    /// Every `apply_mode` call so far, with its fullscreen flag.
    pub fn applied(&self) -> Vec<(DisplayMode, bool)> {
        lock(&self.state).applied.clone()
    }
}

impl DisplayBackend for MemoryDisplay {
    fn enumerate_modes(&self) -> Vec<DisplayMode> {
        self.modes.clone()
    }

    fn current_mode(&self) -> DisplayMode {
        lock(&self.state).current
    }

    fn is_fullscreen(&self) -> bool {
        lock(&self.state).fullscreen
    }

    fn apply_mode(&self, mode: DisplayMode, fullscreen: bool) {
        let mut state = lock(&self.state);
        state.current = mode;
        state.fullscreen = fullscreen;
        state.applied.push((mode, fullscreen));
    }

    fn set_fullscreen(&self, fullscreen: bool) {
        lock(&self.state).fullscreen = fullscreen;
    }
}

// Quality

/// Quality presets by name. Out-of-range levels are stored as given.
#[derive(Debug)]
pub struct MemoryQuality {
    presets: Vec<String>,
    level: Mutex<usize>,
}

impl MemoryQuality {
    pub fn new<S: Into<String>>(presets: impl IntoIterator<Item = S>, level: usize) -> Self {
        Self {
            presets: presets.into_iter().map(Into::into).collect(),
            level: Mutex::new(level),
        }
    }

    pub fn preset_name(&self, index: usize) -> Option<&str> {
        self.presets.get(index).map(String::as_str)
    }
}

impl QualityBackend for MemoryQuality {
    fn set_level(&self, index: usize) {
        if index >= self.presets.len() {
            tracing::warn!(
                "Quality level {} outside {} presets",
                index,
                self.presets.len()
            );
        }
        *lock(&self.level) = index;
    }

    fn level(&self) -> usize {
        *lock(&self.level)
    }
}

// Audio

/// Mixer exposing named float parameters.
#[derive(Debug, Default)]
pub struct MemoryMixer {
    parameters: Mutex<HashMap<String, f32>>,
}

impl MemoryMixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(name: &str, value: f32) -> Self {
        let mixer = Self::new();
        mixer.set_parameter(name, value);
        mixer
    }
}

impl AudioMixer for MemoryMixer {
    fn set_parameter(&self, name: &str, value: f32) {
        lock(&self.parameters).insert(name.to_string(), value);
    }

    fn parameter(&self, name: &str) -> Option<f32> {
        lock(&self.parameters).get(name).copied()
    }
}

// Input

/// Something the input backend did, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    GroupDisabled(String),
    GroupEnabled(String),
    CaptureArmed(BindingSlot),
    CaptureCompleted { slot: BindingSlot, path: String },
    CaptureReleased(BindingSlot),
    /// A press reached a gameplay action
    ActionTriggered(ActionHandle),
}

#[derive(Debug)]
struct Binding {
    path: String,
    override_path: Option<String>,
}

impl Binding {
    fn effective_path(&self) -> &str {
        self.override_path.as_deref().unwrap_or(&self.path)
    }
}

#[derive(Debug)]
struct ActionEntry {
    map: String,
    bindings: Vec<Binding>,
}

#[derive(Debug, Default)]
struct InputState {
    maps: IndexMap<String, IndexMap<String, ActionHandle>>,
    actions: HashMap<ActionHandle, ActionEntry>,
    disabled: HashSet<String>,
    armed: HashMap<BindingSlot, CaptureCompleter>,
    journal: Vec<InputEvent>,
    next_handle: u32,
}

impl InputState {
    fn check_slot(&self, slot: BindingSlot) -> Result<(), InputError> {
        let entry = self
            .actions
            .get(&slot.action)
            .ok_or(InputError::UnknownAction(slot.action))?;
        if slot.index >= entry.bindings.len() {
            return Err(InputError::BindingOutOfRange {
                index: slot.index,
                count: entry.bindings.len(),
            });
        }
        Ok(())
    }
}

/// Input system with action maps, binding overrides and one pending capture at a time
/// per slot.
///
/// [`press`](Self::press) simulates the user pressing a control: it completes an armed
/// capture if there is one, otherwise it triggers whichever enabled action is bound to
/// the control.
pub struct MemoryInput {
    state: Arc<Mutex<InputState>>,
    formatter: ControlPathFormatter,
}

impl MemoryInput {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InputState::default())),
            formatter: ControlPathFormatter::new(),
        }
    }

    /// Register an action with its default binding paths and return its handle.
    pub fn add_action(&self, map: &str, name: &str, bindings: &[&str]) -> ActionHandle {
        let mut state = lock(&self.state);
        let handle = ActionHandle(state.next_handle);
        state.next_handle += 1;

        state
            .maps
            .entry(map.to_string())
            .or_default()
            .insert(name.to_string(), handle);
        state.actions.insert(
            handle,
            ActionEntry {
                map: map.to_string(),
                bindings: bindings
                    .iter()
                    .map(|path| Binding {
                        path: path.to_string(),
                        override_path: None,
                    })
                    .collect(),
            },
        );
        handle
    }

    pub fn is_group_enabled(&self, map: &str) -> bool {
        !lock(&self.state).disabled.contains(map)
    }

    pub fn is_capturing(&self, slot: BindingSlot) -> bool {
        lock(&self.state).armed.contains_key(&slot)
    }

    pub fn journal(&self) -> Vec<InputEvent> {
        lock(&self.state).journal.clone()
    }

    /// Deliver a press of `path`.
    ///
    /// Returns true if an armed capture consumed it.
    pub fn press(&self, path: &str) -> bool {
        let mut state = lock(&self.state);

        let armed_slot = state.armed.keys().next().copied();
        if let Some(slot) = armed_slot {
            let Some(completer) = state.armed.remove(&slot) else {
                return false;
            };
            if let Some(binding) = state
                .actions
                .get_mut(&slot.action)
                .and_then(|entry| entry.bindings.get_mut(slot.index))
            {
                binding.override_path = Some(path.to_string());
            }
            state.journal.push(InputEvent::CaptureCompleted {
                slot,
                path: path.to_string(),
            });
            // Fired under the lock, so a concurrent release sees either no write or a
            // write with its completion.
            return completer.complete();
        }

        let triggered: Vec<ActionHandle> = state
            .actions
            .iter()
            .filter(|(_, entry)| !state.disabled.contains(&entry.map))
            .filter(|(_, entry)| entry.bindings.iter().any(|b| b.effective_path() == path))
            .map(|(handle, _)| *handle)
            .collect();
        for handle in triggered {
            state.journal.push(InputEvent::ActionTriggered(handle));
        }
        false
    }

    /// Drop the pending capture without completing it, as a backend shutting down would.
    pub fn abandon_capture(&self) -> bool {
        let mut state = lock(&self.state);
        let armed_slot = state.armed.keys().next().copied();
        match armed_slot {
            Some(slot) => state.armed.remove(&slot).is_some(),
            None => false,
        }
    }
}

impl Default for MemoryInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBackend for MemoryInput {
    fn resolve_action(&self, map: &str, action: &str) -> Option<ActionHandle> {
        lock(&self.state).maps.get(map)?.get(action).copied()
    }

    fn disable_group(&self, map: &str) {
        let mut state = lock(&self.state);
        state.disabled.insert(map.to_string());
        state.journal.push(InputEvent::GroupDisabled(map.to_string()));
    }

    fn enable_group(&self, map: &str) {
        let mut state = lock(&self.state);
        state.disabled.remove(map);
        state.journal.push(InputEvent::GroupEnabled(map.to_string()));
    }

    fn validate_slot(&self, slot: BindingSlot) -> Result<(), InputError> {
        lock(&self.state).check_slot(slot)
    }

    fn begin_interactive_capture(&self, slot: BindingSlot) -> Result<CaptureOperation, InputError> {
        let mut state = lock(&self.state);
        state.check_slot(slot)?;
        if state.armed.contains_key(&slot) {
            return Err(InputError::CaptureUnavailable(format!(
                "{} is already being captured",
                slot
            )));
        }

        let shared = Arc::clone(&self.state);
        let (completer, operation) = CaptureOperation::pair(move || {
            let mut state = lock(&shared);
            state.armed.remove(&slot);
            state.journal.push(InputEvent::CaptureReleased(slot));
        });

        state.armed.insert(slot, completer);
        state.journal.push(InputEvent::CaptureArmed(slot));
        Ok(operation)
    }

    fn effective_path(&self, slot: BindingSlot) -> Option<String> {
        let state = lock(&self.state);
        let binding = state.actions.get(&slot.action)?.bindings.get(slot.index)?;
        Some(binding.effective_path().to_string())
    }

    fn format_path_for_display(&self, path: &str, omit_device: bool) -> String {
        self.formatter.format(path, omit_device)
    }
}

// View

/// A view update, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Label(String),
    Interactable(bool),
}

/// Rebind row that remembers its label, button state and update history.
#[derive(Debug)]
pub struct RecordingView {
    label: Mutex<String>,
    interactable: Mutex<bool>,
    history: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn new(label: &str) -> Self {
        Self {
            label: Mutex::new(label.to_string()),
            interactable: Mutex::new(true),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn label(&self) -> String {
        lock(&self.label).clone()
    }

    pub fn is_interactable(&self) -> bool {
        *lock(&self.interactable)
    }

    pub fn history(&self) -> Vec<ViewEvent> {
        lock(&self.history).clone()
    }
}

impl RebindView for RecordingView {
    fn set_label(&self, text: &str) {
        *lock(&self.label) = text.to_string();
        lock(&self.history).push(ViewEvent::Label(text.to_string()));
    }

    fn set_interactable(&self, enabled: bool) {
        *lock(&self.interactable) = enabled;
        lock(&self.history).push(ViewEvent::Interactable(enabled));
    }
}
