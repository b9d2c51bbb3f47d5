//! Debug tooling for fast iteration: an info overlay and scene/session hotkeys.
//!
//! - F1: toggle the info overlay
//! - F5: tear down and remount the scene
//! - F6: announce the active session's deadline as if the timer ran out

mod state;
mod systems;
mod ui;


pub use state::DebugState;

use bevy::prelude::*;

use systems::{handle_debug_hotkeys, update_status_message};
use ui::update_debug_info_overlay;

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>().add_systems(
            Update,
            (
                handle_debug_hotkeys,
                update_status_message,
                update_debug_info_overlay,
            )
                .chain(),
        );
    }
}
