//! Debug domain: state and action definitions for debug tooling.

use bevy::prelude::*;

/// Resource tracking debug mode state
#[derive(Resource, Debug, Default)]
pub struct DebugState {
    /// Whether the info overlay is visible
    pub show_info: bool,
    /// Message to display temporarily in the overlay
    pub status_message: Option<(String, f32)>,
}

impl DebugState {
    /// Set a status message that will fade after a duration
    pub fn set_message(&mut self, message: impl Into<String>, duration: f32) {
        self.status_message = Some((message.into(), duration));
    }

    /// Counts the status message down and clears it once expired.
    pub fn tick(&mut self, dt: f32) {
        if let Some((_, ref mut duration)) = self.status_message {
            *duration -= dt;
            if *duration <= 0.0 {
                self.status_message = None;
            }
        }
    }
}

/// Actions triggered from debug hotkeys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugAction {
    ToggleInfo,
    RemountScene,
    ForceTimerDone,
}

impl DebugAction {
    pub const ALL: [DebugAction; 3] = [
        DebugAction::ToggleInfo,
        DebugAction::RemountScene,
        DebugAction::ForceTimerDone,
    ];

    pub fn hotkey(&self) -> KeyCode {
        match self {
            DebugAction::ToggleInfo => KeyCode::F1,
            DebugAction::RemountScene => KeyCode::F5,
            DebugAction::ForceTimerDone => KeyCode::F6,
        }
    }
}
