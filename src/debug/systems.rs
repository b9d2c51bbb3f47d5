//! Debug domain: hotkey handling and runtime tweaks.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::bus::{EventBus, WorldEvent};
use crate::client::ClientCore;
use crate::debug::state::{DebugAction, DebugState};
use crate::scene::RemountScene;

pub(crate) fn handle_debug_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut debug_state: ResMut<DebugState>,
    core: Res<ClientCore>,
    mut bus: ResMut<EventBus>,
    mut remount: MessageWriter<RemountScene>,
) {
    for action in DebugAction::ALL {
        if !keyboard.just_pressed(action.hotkey()) {
            continue;
        }
        match action {
            DebugAction::ToggleInfo => {
                debug_state.show_info = !debug_state.show_info;
                info!("[DEBUG] Info overlay {}", if debug_state.show_info { "ON" } else { "OFF" });
            }
            DebugAction::RemountScene => {
                remount.write(RemountScene);
                debug_state.set_message("Remounting scene", 2.0);
                info!("[DEBUG] Remount requested");
            }
            // Stands in for the scene's own timer.
            DebugAction::ForceTimerDone => match core.session.active() {
                Some(active) => {
                    let delivered = bus.world.emit(&WorldEvent::TimerDone {
                        session_id: active.session_id.clone(),
                    });
                    debug_state.set_message(format!("Timer done sent ({} listeners)", delivered), 2.0);
                    info!("[DEBUG] Forced timer done for {}", active.session_id);
                }
                None => debug_state.set_message("No active session", 2.0),
            },
        }
    }
}

pub(crate) fn update_status_message(time: Res<Time>, mut debug_state: ResMut<DebugState>) {
    if debug_state.status_message.is_some() {
        debug_state.tick(time.delta_secs());
    }
}
