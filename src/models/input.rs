use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a logical action, handed out by the input backend.
///
/// Handles are resolved once at startup and never reassigned afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionHandle(pub u32);

impl fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// One physical-control assignment within an action's list of bindings.
///
/// An action may carry several bindings (keyboard and gamepad, for example);
/// `index` selects one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSlot {
    pub action: ActionHandle,
    pub index: usize,
}

impl BindingSlot {
    pub fn new(action: ActionHandle, index: usize) -> Self {
        Self { action, index }
    }
}

impl fmt::Display for BindingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.action, self.index)
    }
}

/// The logical controls exposed on the controls settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalControl {
    Move,
    Look,
    Jump,
    Sprint,
    Crouch,
    Interact,
    Flashlight,
    Pause,
}

impl LogicalControl {
    pub const ALL: [LogicalControl; 8] = [
        LogicalControl::Move,
        LogicalControl::Look,
        LogicalControl::Jump,
        LogicalControl::Sprint,
        LogicalControl::Crouch,
        LogicalControl::Interact,
        LogicalControl::Flashlight,
        LogicalControl::Pause,
    ];

    /// Action name inside the action map.
    pub fn action_name(self) -> &'static str {
        match self {
            LogicalControl::Move => "Move",
            LogicalControl::Look => "Look",
            LogicalControl::Jump => "Jump",
            LogicalControl::Sprint => "Sprint",
            LogicalControl::Crouch => "Crouch",
            LogicalControl::Interact => "Interact",
            LogicalControl::Flashlight => "Flashlight",
            LogicalControl::Pause => "Pause",
        }
    }
}

impl fmt::Display for LogicalControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action_name())
    }
}
